//! services/api/src/web/docs.rs
//!
//! The OpenAPI master definition, aggregated from the per-handler
//! `#[utoipa::path]` annotations. Served by the Swagger UI route and dumped
//! to a file by the `openapi` binary.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::web::dto::{
    IngredientDto, RatingDto, RecipeDto, RecipeListingDto, ReviewDto, ReviewWithAuthorDto,
    UserDto,
};
use crate::web::recipes::{CreateRecipeRequest, UpdateRecipeRequest};
use crate::web::reviews::{CreateReviewRequest, UpdateReviewRequest};
use crate::web::users::{ProfileResponse, UpdatePreferencesRequest, UpdateProfileRequest};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::me_handler,
        crate::web::recipes::create_recipe_handler,
        crate::web::recipes::list_recipes_handler,
        crate::web::recipes::recommended_recipes_handler,
        crate::web::recipes::get_recipe_handler,
        crate::web::recipes::update_recipe_handler,
        crate::web::recipes::delete_recipe_handler,
        crate::web::reviews::create_review_handler,
        crate::web::reviews::list_reviews_handler,
        crate::web::reviews::update_review_handler,
        crate::web::reviews::delete_review_handler,
        crate::web::users::get_profile_handler,
        crate::web::users::update_profile_handler,
        crate::web::users::update_preferences_handler,
        crate::web::users::add_favorite_handler,
        crate::web::users::remove_favorite_handler,
        crate::web::users::add_saved_handler,
        crate::web::users::remove_saved_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserDto,
            ProfileResponse,
            UpdateProfileRequest,
            UpdatePreferencesRequest,
            CreateRecipeRequest,
            UpdateRecipeRequest,
            RecipeDto,
            RecipeListingDto,
            IngredientDto,
            RatingDto,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewDto,
            ReviewWithAuthorDto,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login, and identity."),
        (name = "recipes", description = "Recipe CRUD and filtered listing."),
        (name = "reviews", description = "Recipe reviews and the derived rating summary."),
        (name = "users", description = "Profiles, preferences, favorites, and saved recipes.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the protected
/// endpoints.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
