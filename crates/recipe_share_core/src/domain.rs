//! crates/recipe_share_core/src/domain.rs
//!
//! Pure domain types for the recipe-sharing application. These structs are
//! independent of the database and of the HTTP layer; the service crate maps
//! them to records and response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Raised when a stored or submitted string does not name a known enum
/// variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} variant: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Account role. Admins may mutate any recipe or review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(UnknownVariant {
                kind: "user role",
                value: other.to_string(),
            }),
        }
    }
}

/// Dietary preferences a user can record on their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryPreference {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
}

impl DietaryPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::Vegan => "vegan",
            DietaryPreference::GlutenFree => "gluten-free",
            DietaryPreference::DairyFree => "dairy-free",
            DietaryPreference::NutFree => "nut-free",
        }
    }
}

impl FromStr for DietaryPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vegetarian" => Ok(DietaryPreference::Vegetarian),
            "vegan" => Ok(DietaryPreference::Vegan),
            "gluten-free" => Ok(DietaryPreference::GlutenFree),
            "dairy-free" => Ok(DietaryPreference::DairyFree),
            "nut-free" => Ok(DietaryPreference::NutFree),
            other => Err(UnknownVariant {
                kind: "dietary preference",
                value: other.to_string(),
            }),
        }
    }
}

/// Recipe difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(UnknownVariant {
                kind: "difficulty",
                value: other.to_string(),
            }),
        }
    }
}

/// Recipe category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
    Drink,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Breakfast => "breakfast",
            Category::Lunch => "lunch",
            Category::Dinner => "dinner",
            Category::Dessert => "dessert",
            Category::Snack => "snack",
            Category::Drink => "drink",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Category::Breakfast),
            "lunch" => Ok(Category::Lunch),
            "dinner" => Ok(Category::Dinner),
            "dessert" => Ok(Category::Dessert),
            "snack" => Ok(Category::Snack),
            "drink" => Ok(Category::Drink),
            other => Err(UnknownVariant {
                kind: "category",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account. Carries the credential hash; never hand this to the
/// HTTP layer directly, project it through [`User::public`] first.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub dietary_preferences: Vec<DietaryPreference>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The credential-free projection attached to requests and returned in
    /// responses.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            profile_picture: self.profile_picture.clone(),
            dietary_preferences: self.dietary_preferences.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// A user without their password hash.
#[derive(Debug, Clone)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub dietary_preferences: Vec<DietaryPreference>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// One entry of a recipe's ordered ingredient list. Stored as JSONB, hence
/// the serde derives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

/// Derived summary of a recipe's review set. Always recomputed from the full
/// set of reviews, never patched incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub cook_time: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub tags: Vec<String>,
    pub ratings: RatingSummary,
    pub created_at: DateTime<Utc>,
}

/// A recipe row joined with its author's username, for list endpoints.
#[derive(Debug, Clone)]
pub struct RecipeListing {
    pub recipe: Recipe,
    pub author_name: String,
}

/// A single user's review of a single recipe. `(recipe_id, user_id)` is
/// unique.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A review joined with the reviewer's username, for list endpoints.
#[derive(Debug, Clone)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author_name: String,
}
