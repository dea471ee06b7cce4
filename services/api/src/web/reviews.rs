//! services/api/src/web/reviews.rs
//!
//! The review ledger: one review per user per recipe, with the recipe's
//! rating summary recomputed from the full review set after every mutation.
//! The ledger logic lives in plain async functions so it can be exercised
//! against an in-memory store; the axum handlers are thin wrappers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use recipe_share_core::domain::{PublicUser, Review};
use recipe_share_core::policy::can_mutate;
use recipe_share_core::ports::{DatabaseService, NewReview, PortResult, ReviewChanges};
use recipe_share_core::rating::summarize;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::dto::{ReviewDto, ReviewWithAuthorDto};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

//=========================================================================================
// Ledger Operations
//=========================================================================================

fn check_rating(rating: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::InvalidInput(
            "rating must be an integer between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

fn check_comment(comment: &str) -> Result<String, ApiError> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("comment is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Recomputes and stores a recipe's rating summary from its full, current
/// review set. A failure here never invalidates the review mutation that
/// triggered it; the summary is derived state and heals on the next
/// mutation.
pub async fn refresh_rating(db: &dyn DatabaseService, recipe_id: Uuid) {
    if let Err(e) = try_refresh_rating(db, recipe_id).await {
        warn!("rating recompute failed for recipe {}: {}", recipe_id, e);
    }
}

async fn try_refresh_rating(db: &dyn DatabaseService, recipe_id: Uuid) -> PortResult<()> {
    let ratings = db.review_ratings(recipe_id).await?;
    db.set_rating(recipe_id, summarize(&ratings)).await
}

pub async fn create_review(
    db: &dyn DatabaseService,
    actor: &PublicUser,
    recipe_id: Uuid,
    req: CreateReviewRequest,
) -> Result<Review, ApiError> {
    let recipe = db
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".to_string()))?;

    // Early exit only. The store's unique constraint is the authoritative
    // duplicate guard; a concurrent insert racing past this check still
    // surfaces as a conflict from `db.create_review`.
    if db.find_review(recipe.id, actor.id).await?.is_some() {
        return Err(ApiError::Conflict(
            "you have already reviewed this recipe".to_string(),
        ));
    }

    check_rating(req.rating)?;
    let comment = check_comment(&req.comment)?;

    let review = db
        .create_review(NewReview {
            recipe_id: recipe.id,
            user_id: actor.id,
            rating: req.rating,
            comment,
        })
        .await?;

    refresh_rating(db, recipe.id).await;

    Ok(review)
}

pub async fn update_review(
    db: &dyn DatabaseService,
    actor: &PublicUser,
    review_id: Uuid,
    req: UpdateReviewRequest,
) -> Result<Review, ApiError> {
    let review = db
        .review_by_id(review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;

    if !can_mutate(actor, review.user_id) {
        return Err(ApiError::Forbidden(
            "not authorized to update this review".to_string(),
        ));
    }

    if let Some(rating) = req.rating {
        check_rating(rating)?;
    }
    let comment = req.comment.as_deref().map(check_comment).transpose()?;

    let updated = db
        .update_review(
            review_id,
            ReviewChanges {
                rating: req.rating,
                comment,
            },
        )
        .await?;

    refresh_rating(db, review.recipe_id).await;

    Ok(updated)
}

pub async fn delete_review(
    db: &dyn DatabaseService,
    actor: &PublicUser,
    review_id: Uuid,
) -> Result<(), ApiError> {
    let review = db
        .review_by_id(review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;

    if !can_mutate(actor, review.user_id) {
        return Err(ApiError::Forbidden(
            "not authorized to delete this review".to_string(),
        ));
    }

    db.delete_review(review_id).await?;

    // Deleting the last review resets the summary to {0, 0}; it is never
    // left stale.
    refresh_rating(db, review.recipe_id).await;

    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /recipes/{id}/reviews - Review a recipe.
#[utoipa::path(
    post,
    path = "/recipes/{id}/reviews",
    request_body = CreateReviewRequest,
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Review created", body = ReviewDto),
        (status = 400, description = "Rating out of range or empty comment"),
        (status = 404, description = "Recipe not found"),
        (status = 409, description = "The user has already reviewed this recipe")
    ),
    security(("bearer" = [])),
    tag = "reviews"
)]
pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = create_review(state.db.as_ref(), &user, recipe_id, req).await?;
    Ok((StatusCode::CREATED, Json(ReviewDto::from(review))))
}

/// GET /recipes/{id}/reviews - All reviews of a recipe, newest first.
#[utoipa::path(
    get,
    path = "/recipes/{id}/reviews",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Reviews with reviewer usernames", body = [ReviewWithAuthorDto])
    ),
    tag = "reviews"
)]
pub async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state.db.reviews_for_recipe(recipe_id).await?;
    let payload: Vec<ReviewWithAuthorDto> = reviews.into_iter().map(Into::into).collect();
    Ok(Json(payload))
}

/// PUT /reviews/{id} - Update one's own review.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    request_body = UpdateReviewRequest,
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Updated review", body = ReviewDto),
        (status = 403, description = "Not the review's author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer" = [])),
    tag = "reviews"
)]
pub async fn update_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(review_id): Path<Uuid>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = update_review(state.db.as_ref(), &user, review_id, req).await?;
    Ok(Json(ReviewDto::from(review)))
}

/// DELETE /reviews/{id} - Delete one's own review.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not the review's author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer" = [])),
    tag = "reviews"
)]
pub async fn delete_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    delete_review(state.db.as_ref(), &user, review_id).await?;
    Ok(Json(json!({ "message": "review deleted successfully" })))
}
