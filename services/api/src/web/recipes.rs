//! services/api/src/web/recipes.rs
//!
//! Recipe CRUD and filtered listing. Mutations are gated by the ownership
//! policy; the rating summary is not writable here at all, only the review
//! ledger's recompute path touches it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use recipe_share_core::domain::{Category, Difficulty, PublicUser, Recipe};
use recipe_share_core::policy::can_mutate;
use recipe_share_core::ports::{DatabaseService, NewRecipe, RecipeChanges, RecipeFilter};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::dto::{IngredientDto, RecipeDto, RecipeListingDto};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub ingredients: Vec<IngredientDto>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub cook_time: String,
    /// "Easy", "Medium", or "Hard".
    #[schema(value_type = String)]
    pub difficulty: Difficulty,
    /// "Breakfast", "Lunch", "Dinner", "Dessert", "Snack", or "Drink".
    #[schema(value_type = String)]
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// All fields optional; absent fields keep their stored value. There is
/// deliberately no way to submit rating fields.
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientDto>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    #[schema(value_type = Option<String>)]
    pub difficulty: Option<Difficulty>,
    #[schema(value_type = Option<String>)]
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct RecipeListQuery {
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tag: Option<String>,
}

//=========================================================================================
// Validation and service logic
//=========================================================================================

fn check_title(title: &str) -> Result<String, ApiError> {
    let trimmed = title.trim();
    if trimmed.chars().count() < 3 {
        return Err(ApiError::InvalidInput(
            "title must be at least 3 characters long".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn check_description(description: &str) -> Result<String, ApiError> {
    let trimmed = description.trim();
    if trimmed.chars().count() < 10 {
        return Err(ApiError::InvalidInput(
            "description must be at least 10 characters long".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn trim_all(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| v.trim().to_string()).collect()
}

pub async fn update_recipe(
    db: &dyn DatabaseService,
    actor: &PublicUser,
    recipe_id: Uuid,
    req: UpdateRecipeRequest,
) -> Result<Recipe, ApiError> {
    let recipe = db
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".to_string()))?;

    if !can_mutate(actor, recipe.author_id) {
        return Err(ApiError::Forbidden(
            "not authorized to update this recipe".to_string(),
        ));
    }

    let changes = RecipeChanges {
        title: req.title.as_deref().map(check_title).transpose()?,
        description: req.description.as_deref().map(check_description).transpose()?,
        image: req.image,
        ingredients: req
            .ingredients
            .map(|i| i.into_iter().map(Into::into).collect()),
        instructions: req.instructions.map(trim_all),
        prep_time: req.prep_time,
        cook_time: req.cook_time,
        difficulty: req.difficulty,
        category: req.category,
        tags: req.tags.map(trim_all),
    };

    Ok(db.update_recipe(recipe.id, changes).await?)
}

pub async fn delete_recipe(
    db: &dyn DatabaseService,
    actor: &PublicUser,
    recipe_id: Uuid,
) -> Result<(), ApiError> {
    let recipe = db
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".to_string()))?;

    if !can_mutate(actor, recipe.author_id) {
        return Err(ApiError::Forbidden(
            "not authorized to delete this recipe".to_string(),
        ));
    }

    // Reviews cascade at the store.
    Ok(db.delete_recipe(recipe.id).await?)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /recipes - Create a recipe; the caller becomes its author.
#[utoipa::path(
    post,
    path = "/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeDto),
        (status = 400, description = "Malformed fields")
    ),
    security(("bearer" = [])),
    tag = "recipes"
)]
pub async fn create_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Json(req): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state
        .db
        .create_recipe(NewRecipe {
            author_id: user.id,
            title: check_title(&req.title)?,
            description: check_description(&req.description)?,
            image: req.image,
            ingredients: req.ingredients.into_iter().map(Into::into).collect(),
            instructions: trim_all(req.instructions),
            prep_time: req.prep_time.trim().to_string(),
            cook_time: req.cook_time.trim().to_string(),
            difficulty: req.difficulty,
            category: req.category,
            tags: trim_all(req.tags),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RecipeDto::from(recipe))))
}

/// GET /recipes - List recipes, newest first, with optional filters.
#[utoipa::path(
    get,
    path = "/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Matching recipes with author usernames", body = [RecipeListingDto]),
        (status = 400, description = "Unknown category or difficulty filter")
    ),
    tag = "recipes"
)]
pub async fn list_recipes_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = RecipeFilter {
        search: query.search,
        category: query
            .category
            .as_deref()
            .map(|c| Category::from_str(&c.to_lowercase()))
            .transpose()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
        difficulty: query
            .difficulty
            .as_deref()
            .map(|d| Difficulty::from_str(&d.to_lowercase()))
            .transpose()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
        tag: query.tag,
    };

    let listings = state.db.list_recipes(filter).await?;
    let payload: Vec<RecipeListingDto> = listings.into_iter().map(Into::into).collect();
    Ok(Json(payload))
}

/// How many recipes a recommendation query returns at most.
const RECOMMENDATION_LIMIT: i64 = 10;

/// GET /recipes/recommended - Recipes tagged with any of the caller's
/// dietary preferences, best-rated first.
#[utoipa::path(
    get,
    path = "/recipes/recommended",
    responses(
        (status = 200, description = "Up to ten matching recipes, best-rated first", body = [RecipeDto])
    ),
    security(("bearer" = [])),
    tag = "recipes"
)]
pub async fn recommended_recipes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
) -> Result<impl IntoResponse, ApiError> {
    let recipes = state
        .db
        .recommended_recipes(&user.dietary_preferences, RECOMMENDATION_LIMIT)
        .await?;
    let payload: Vec<RecipeDto> = recipes.into_iter().map(Into::into).collect();
    Ok(Json(payload))
}

/// GET /recipes/{id} - A single recipe with its current rating summary.
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "The recipe", body = RecipeDto),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes"
)]
pub async fn get_recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state
        .db
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".to_string()))?;
    Ok(Json(RecipeDto::from(recipe)))
}

/// PUT /recipes/{id} - Update one's own recipe.
#[utoipa::path(
    put,
    path = "/recipes/{id}",
    request_body = UpdateRecipeRequest,
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Updated recipe", body = RecipeDto),
        (status = 403, description = "Not the recipe's author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer" = [])),
    tag = "recipes"
)]
pub async fn update_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = update_recipe(state.db.as_ref(), &user, recipe_id, req).await?;
    Ok(Json(RecipeDto::from(recipe)))
}

/// DELETE /recipes/{id} - Delete one's own recipe and its reviews.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe deleted"),
        (status = 403, description = "Not the recipe's author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer" = [])),
    tag = "recipes"
)]
pub async fn delete_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    delete_recipe(state.db.as_ref(), &user, recipe_id).await?;
    Ok(Json(json!({ "message": "recipe deleted successfully" })))
}
