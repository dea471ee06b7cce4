//! crates/recipe_share_core/src/ports.rs
//!
//! The persistence contract for the application. The trait forms the boundary
//! of the hexagonal architecture: the core stays independent of the concrete
//! database, and tests can run against an in-memory implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, DietaryPreference, Difficulty, Ingredient, RatingSummary, Recipe, RecipeListing,
    Review, ReviewWithAuthor, User,
};

/// A generic error type for all persistence operations, abstracting away the
/// errors of the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint was violated (duplicate review, taken
    /// username or email).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Fields required to create a user. The password arrives already hashed;
/// plaintext never crosses this boundary.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile fields a user may change. `None` leaves a field untouched. A
/// `Some(password_hash)` replaces the credential hash; the caller is
/// responsible for hashing before it gets here.
///
/// `bio` and `profile_picture` are nullable, so they carry an extra level:
/// `Some(None)` clears the stored value, `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<Option<String>>,
    pub profile_picture: Option<Option<String>>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
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
}

/// Recipe fields an author may change. Deliberately has no rating fields:
/// the aggregate is only ever written by the recompute path.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
}

/// Optional filters for the recipe list endpoint.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    /// Inserts a user. Fails with [`PortError::Conflict`] when the username
    /// or email is already taken.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn user_by_id(&self, user_id: Uuid) -> PortResult<Option<User>>;

    async fn user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> PortResult<User>;

    async fn set_preferences(
        &self,
        user_id: Uuid,
        preferences: Vec<DietaryPreference>,
    ) -> PortResult<()>;

    async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    async fn favorites_of(&self, user_id: Uuid) -> PortResult<Vec<Uuid>>;

    async fn add_saved(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    async fn remove_saved(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;

    async fn saved_of(&self, user_id: Uuid) -> PortResult<Vec<Uuid>>;

    // --- Recipes ---
    async fn create_recipe(&self, new_recipe: NewRecipe) -> PortResult<Recipe>;

    async fn recipe_by_id(&self, recipe_id: Uuid) -> PortResult<Option<Recipe>>;

    /// Recipes matching the filter, newest first, each with its author's
    /// username.
    async fn list_recipes(&self, filter: RecipeFilter) -> PortResult<Vec<RecipeListing>>;

    /// Up to `limit` recipes tagged with any of the given preferences,
    /// best-rated first. An empty preference set matches nothing.
    async fn recommended_recipes(
        &self,
        preferences: &[DietaryPreference],
        limit: i64,
    ) -> PortResult<Vec<Recipe>>;

    async fn update_recipe(&self, recipe_id: Uuid, changes: RecipeChanges) -> PortResult<Recipe>;

    /// Removes a recipe; its reviews go with it (cascade at the store).
    async fn delete_recipe(&self, recipe_id: Uuid) -> PortResult<()>;

    /// Writes the derived rating summary. Only the recompute path calls
    /// this.
    async fn set_rating(&self, recipe_id: Uuid, summary: RatingSummary) -> PortResult<()>;

    // --- Reviews ---
    /// Inserts a review. The store's `UNIQUE (recipe_id, user_id)`
    /// constraint is the authoritative duplicate guard; a violation surfaces
    /// as [`PortError::Conflict`].
    async fn create_review(&self, new_review: NewReview) -> PortResult<Review>;

    async fn review_by_id(&self, review_id: Uuid) -> PortResult<Option<Review>>;

    async fn find_review(&self, recipe_id: Uuid, user_id: Uuid) -> PortResult<Option<Review>>;

    /// All reviews of a recipe, newest first, each with the reviewer's
    /// username.
    async fn reviews_for_recipe(&self, recipe_id: Uuid) -> PortResult<Vec<ReviewWithAuthor>>;

    /// The full, current set of ratings for a recipe, as input to the
    /// aggregate recomputation.
    async fn review_ratings(&self, recipe_id: Uuid) -> PortResult<Vec<i32>>;

    async fn update_review(&self, review_id: Uuid, changes: ReviewChanges) -> PortResult<Review>;

    async fn delete_review(&self, review_id: Uuid) -> PortResult<()>;
}
