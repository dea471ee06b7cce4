//! services/api/src/web/users.rs
//!
//! Profile management: profile fields, dietary preferences, and the
//! favorite/saved recipe lists. All routes here sit behind the auth
//! middleware.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use recipe_share_core::domain::{DietaryPreference, PublicUser};
use recipe_share_core::ports::ProfileChanges;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::password;
use crate::error::ApiError;
use crate::web::auth::email_is_valid;
use crate::web::dto::UserDto;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Distinguishes a field that is absent from the payload (no change) from
/// one explicitly set to `null` (clear the stored value).
fn nullable_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Omit to keep, send `null` to clear.
    #[serde(default, deserialize_with = "nullable_field")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    /// Omit to keep, send `null` to clear.
    #[serde(default, deserialize_with = "nullable_field")]
    #[schema(value_type = Option<String>)]
    pub profile_picture: Option<Option<String>>,
    /// When present, replaces the account password.
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePreferencesRequest {
    /// Recognized values: "vegetarian", "vegan", "gluten-free",
    /// "dairy-free", "nut-free".
    pub dietary_preferences: Vec<String>,
}

/// The profile payload: the user plus the ids of their favorite and saved
/// recipes.
#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserDto,
    pub favorites: Vec<Uuid>,
    pub saved_recipes: Vec<Uuid>,
}

//=========================================================================================
// Handlers
//=========================================================================================

async fn profile_response(
    state: &AppState,
    user: PublicUser,
) -> Result<ProfileResponse, ApiError> {
    let favorites = state.db.favorites_of(user.id).await?;
    let saved_recipes = state.db.saved_of(user.id).await?;
    Ok(ProfileResponse {
        user: user.into(),
        favorites,
        saved_recipes,
    })
}

/// GET /users/profile - The authenticated user's profile with their
/// favorite and saved recipe ids.
#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "The profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid credential")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(profile_response(&state, user).await?))
}

/// PUT /users/profile - Update profile fields; a submitted password is
/// hashed before it reaches the store.
#[utoipa::path(
    put,
    path = "/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Malformed fields"),
        (status = 409, description = "Username or email already taken")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = match req.username {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.chars().count() < 3 {
                return Err(ApiError::InvalidInput(
                    "username must be at least 3 characters long".to_string(),
                ));
            }
            Some(trimmed)
        }
        None => None,
    };

    let email = match req.email {
        Some(raw) => {
            let normalized = raw.trim().to_lowercase();
            if !email_is_valid(&normalized) {
                return Err(ApiError::InvalidInput("invalid email format".to_string()));
            }
            Some(normalized)
        }
        None => None,
    };

    let password_hash = match req.password {
        Some(plaintext) => {
            if plaintext.chars().count() < 6 {
                return Err(ApiError::InvalidInput(
                    "password must be at least 6 characters long".to_string(),
                ));
            }
            Some(password::hash(&plaintext).map_err(|e| {
                error!("failed to hash password: {}", e);
                ApiError::Internal("failed to hash password".to_string())
            })?)
        }
        None => None,
    };

    let updated = state
        .db
        .update_profile(
            user.id,
            ProfileChanges {
                username,
                email,
                bio: req.bio,
                profile_picture: req.profile_picture,
                password_hash,
            },
        )
        .await?
        .public();

    Ok(Json(profile_response(&state, updated).await?))
}

/// PUT /users/preferences - Replace the user's dietary preferences.
#[utoipa::path(
    put,
    path = "/users/preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated", body = UserDto),
        (status = 400, description = "Unrecognized preference value")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let preferences = req
        .dietary_preferences
        .iter()
        .map(|p| DietaryPreference::from_str(p.trim()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    state.db.set_preferences(user.id, preferences.clone()).await?;

    let mut user = user;
    user.dietary_preferences = preferences;
    Ok(Json(UserDto::from(user)))
}

async fn require_recipe(state: &AppState, recipe_id: Uuid) -> Result<(), ApiError> {
    state
        .db
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".to_string()))?;
    Ok(())
}

/// POST /users/favorites/{recipe_id} - Add a recipe to the favorites list.
#[utoipa::path(
    post,
    path = "/users/favorites/{recipe_id}",
    params(("recipe_id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Updated favorites id list"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn add_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_recipe(&state, recipe_id).await?;
    state.db.add_favorite(user.id, recipe_id).await?;
    let favorites = state.db.favorites_of(user.id).await?;
    Ok(Json(json!({ "favorites": favorites })))
}

/// DELETE /users/favorites/{recipe_id} - Remove a recipe from the
/// favorites list.
#[utoipa::path(
    delete,
    path = "/users/favorites/{recipe_id}",
    params(("recipe_id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Updated favorites id list")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn remove_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.remove_favorite(user.id, recipe_id).await?;
    let favorites = state.db.favorites_of(user.id).await?;
    Ok(Json(json!({ "favorites": favorites })))
}

/// POST /users/saved/{recipe_id} - Add a recipe to the saved list.
#[utoipa::path(
    post,
    path = "/users/saved/{recipe_id}",
    params(("recipe_id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Updated saved-recipe id list"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn add_saved_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_recipe(&state, recipe_id).await?;
    state.db.add_saved(user.id, recipe_id).await?;
    let saved = state.db.saved_of(user.id).await?;
    Ok(Json(json!({ "saved_recipes": saved })))
}

/// DELETE /users/saved/{recipe_id} - Remove a recipe from the saved list.
#[utoipa::path(
    delete,
    path = "/users/saved/{recipe_id}",
    params(("recipe_id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Updated saved-recipe id list")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn remove_saved_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<PublicUser>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.remove_saved(user.id, recipe_id).await?;
    let saved = state.db.saved_of(user.id).await?;
    Ok(Json(json!({ "saved_recipes": saved })))
}
