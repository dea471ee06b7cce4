//! services/api/src/web/dto.rs
//!
//! Response payload structs shared across handler modules, mapped from the
//! core domain types.

use chrono::{DateTime, Utc};
use recipe_share_core::domain::{
    Category, DietaryPreference, Difficulty, Ingredient, PublicUser, RatingSummary, Recipe,
    RecipeListing, Review, ReviewWithAuthor, UserRole,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A user as returned to clients. Never carries the credential hash.
#[derive(Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub dietary_preferences: Vec<DietaryPreference>,
    #[schema(value_type = String)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<PublicUser> for UserDto {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            profile_picture: user.profile_picture,
            dietary_preferences: user.dietary_preferences,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct IngredientDto {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

impl From<Ingredient> for IngredientDto {
    fn from(i: Ingredient) -> Self {
        Self {
            name: i.name,
            amount: i.amount,
            unit: i.unit,
        }
    }
}

impl From<IngredientDto> for Ingredient {
    fn from(i: IngredientDto) -> Self {
        Self {
            name: i.name,
            amount: i.amount,
            unit: i.unit,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RatingDto {
    pub average: f64,
    pub count: i64,
}

impl From<RatingSummary> for RatingDto {
    fn from(s: RatingSummary) -> Self {
        Self {
            average: s.average,
            count: s.count,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RecipeDto {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub ingredients: Vec<IngredientDto>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub cook_time: String,
    #[schema(value_type = String)]
    pub difficulty: Difficulty,
    #[schema(value_type = String)]
    pub category: Category,
    pub tags: Vec<String>,
    pub ratings: RatingDto,
    pub created_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeDto {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            author_id: r.author_id,
            title: r.title,
            description: r.description,
            image: r.image,
            ingredients: r.ingredients.into_iter().map(Into::into).collect(),
            instructions: r.instructions,
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            difficulty: r.difficulty,
            category: r.category,
            tags: r.tags,
            ratings: r.ratings.into(),
            created_at: r.created_at,
        }
    }
}

/// A recipe list row: the recipe plus its author's username.
#[derive(Serialize, ToSchema)]
pub struct RecipeListingDto {
    #[serde(flatten)]
    pub recipe: RecipeDto,
    pub author_name: String,
}

impl From<RecipeListing> for RecipeListingDto {
    fn from(l: RecipeListing) -> Self {
        Self {
            recipe: l.recipe.into(),
            author_name: l.author_name,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ReviewDto {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            recipe_id: r.recipe_id,
            user_id: r.user_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

/// A review list row: the review plus the reviewer's username.
#[derive(Serialize, ToSchema)]
pub struct ReviewWithAuthorDto {
    #[serde(flatten)]
    pub review: ReviewDto,
    pub author_name: String,
}

impl From<ReviewWithAuthor> for ReviewWithAuthorDto {
    fn from(r: ReviewWithAuthor) -> Self {
        Self {
            review: r.review.into(),
            author_name: r.author_name,
        }
    }
}
