//! crates/recipe_share_core/src/rating.rs
//!
//! Aggregate rating recomputation. The summary is a derived cache of a
//! recipe's review set, so it is always rebuilt from the complete current
//! set of ratings rather than patched incrementally; partial failures or
//! reordered concurrent edits cannot make it drift.

use crate::domain::RatingSummary;

/// Computes `{average, count}` for a recipe from the full set of its review
/// ratings. An empty set yields `{0, 0}`.
pub fn summarize(ratings: &[i32]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary::empty();
    }

    let count = ratings.len() as i64;
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();

    RatingSummary {
        average: sum as f64 / count as f64,
        count,
    }
}
