//! services/api/src/adapters/db.rs
//!
//! The database adapter: the concrete implementation of the
//! `DatabaseService` port from the core crate, over PostgreSQL with `sqlx`.
//! Queries are built at runtime with `.bind(..)` so the workspace compiles
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recipe_share_core::domain::{
    DietaryPreference, Ingredient, RatingSummary, Recipe, RecipeListing, Review, ReviewWithAuthor,
    User,
};
use recipe_share_core::ports::{
    DatabaseService, NewRecipe, NewReview, NewUser, PortError, PortResult, ProfileChanges,
    RecipeChanges, RecipeFilter, ReviewChanges,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, bio, profile_picture, \
     dietary_preferences, role, created_at";

const RECIPE_COLUMNS: &str = "id, author_id, title, description, image, ingredients, \
     instructions, prep_time, cook_time, difficulty, category, tags, rating_average, \
     rating_count, created_at";

const REVIEW_COLUMNS: &str = "id, recipe_id, user_id, rating, comment, created_at";

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Maps a unique-constraint violation onto `Conflict`; everything else is
/// unexpected.
fn insert_error(e: sqlx::Error, conflict_msg: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(conflict_msg.to_string())
        }
        _ => unexpected(e),
    }
}

//=========================================================================================
// Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    bio: Option<String>,
    profile_picture: Option<String>,
    dietary_preferences: Vec<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        let dietary_preferences = self
            .dietary_preferences
            .iter()
            .map(|p| p.parse::<DietaryPreference>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            bio: self.bio,
            profile_picture: self.profile_picture,
            dietary_preferences,
            role: self
                .role
                .parse()
                .map_err(|e: recipe_share_core::domain::UnknownVariant| {
                    PortError::Unexpected(e.to_string())
                })?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct RecipeRecord {
    id: Uuid,
    author_id: Uuid,
    title: String,
    description: String,
    image: Option<String>,
    ingredients: Json<Vec<Ingredient>>,
    instructions: Vec<String>,
    prep_time: String,
    cook_time: String,
    difficulty: String,
    category: String,
    tags: Vec<String>,
    rating_average: f64,
    rating_count: i64,
    created_at: DateTime<Utc>,
}

impl RecipeRecord {
    fn to_domain(self) -> PortResult<Recipe> {
        Ok(Recipe {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            description: self.description,
            image: self.image,
            ingredients: self.ingredients.0,
            instructions: self.instructions,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            difficulty: self
                .difficulty
                .parse()
                .map_err(|e: recipe_share_core::domain::UnknownVariant| {
                    PortError::Unexpected(e.to_string())
                })?,
            category: self
                .category
                .parse()
                .map_err(|e: recipe_share_core::domain::UnknownVariant| {
                    PortError::Unexpected(e.to_string())
                })?,
            tags: self.tags,
            ratings: RatingSummary {
                average: self.rating_average,
                count: self.rating_count,
            },
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct RecipeListingRecord {
    #[sqlx(flatten)]
    recipe: RecipeRecord,
    author_name: String,
}

impl RecipeListingRecord {
    fn to_domain(self) -> PortResult<RecipeListing> {
        Ok(RecipeListing {
            recipe: self.recipe.to_domain()?,
            author_name: self.author_name,
        })
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: Uuid,
    recipe_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}

impl ReviewRecord {
    fn to_domain(self) -> Review {
        Review {
            id: self.id,
            recipe_id: self.recipe_id,
            user_id: self.user_id,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewWithAuthorRecord {
    #[sqlx(flatten)]
    review: ReviewRecord,
    author_name: String,
}

impl ReviewWithAuthorRecord {
    fn to_domain(self) -> ReviewWithAuthor {
        ReviewWithAuthor {
            review: self.review.to_domain(),
            author_name: self.author_name,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let record: UserRecord = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| insert_error(e, "username or email already taken"))?;
        record.to_domain()
    }

    async fn user_by_id(&self, user_id: Uuid) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record: Option<UserRecord> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record: Option<UserRecord> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> PortResult<User> {
        // bio and profile_picture are nullable, so COALESCE cannot express
        // "clear"; a boolean flag per field marks whether it is in the write
        // set.
        let sql = format!(
            "UPDATE users SET \
                 username = COALESCE($2, username), \
                 email = COALESCE($3, email), \
                 bio = CASE WHEN $4 THEN $5 ELSE bio END, \
                 profile_picture = CASE WHEN $6 THEN $7 ELSE profile_picture END, \
                 password_hash = COALESCE($8, password_hash) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let record: UserRecord = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(changes.bio.is_some())
            .bind(changes.bio.clone().flatten())
            .bind(changes.profile_picture.is_some())
            .bind(changes.profile_picture.clone().flatten())
            .bind(&changes.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User {} not found", user_id))
                }
                other => insert_error(other, "username or email already taken"),
            })?;
        record.to_domain()
    }

    async fn set_preferences(
        &self,
        user_id: Uuid,
        preferences: Vec<DietaryPreference>,
    ) -> PortResult<()> {
        let values: Vec<String> = preferences.iter().map(|p| p.as_str().to_string()).collect();
        sqlx::query("UPDATE users SET dietary_preferences = $2 WHERE id = $1")
            .bind(user_id)
            .bind(&values)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_favorites (user_id, recipe_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn favorites_of(&self, user_id: Uuid) -> PortResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT recipe_id FROM user_favorites WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn add_saved(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_saved_recipes (user_id, recipe_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn remove_saved(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM user_saved_recipes WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn saved_of(&self, user_id: Uuid) -> PortResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT recipe_id FROM user_saved_recipes WHERE user_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn create_recipe(&self, new_recipe: NewRecipe) -> PortResult<Recipe> {
        let sql = format!(
            "INSERT INTO recipes (id, author_id, title, description, image, ingredients, \
                 instructions, prep_time, cook_time, difficulty, category, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {RECIPE_COLUMNS}"
        );
        let record: RecipeRecord = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(new_recipe.author_id)
            .bind(&new_recipe.title)
            .bind(&new_recipe.description)
            .bind(&new_recipe.image)
            .bind(Json(&new_recipe.ingredients))
            .bind(&new_recipe.instructions)
            .bind(&new_recipe.prep_time)
            .bind(&new_recipe.cook_time)
            .bind(new_recipe.difficulty.as_str())
            .bind(new_recipe.category.as_str())
            .bind(&new_recipe.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn recipe_by_id(&self, recipe_id: Uuid) -> PortResult<Option<Recipe>> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1");
        let record: Option<RecipeRecord> = sqlx::query_as(&sql)
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        record.map(RecipeRecord::to_domain).transpose()
    }

    async fn list_recipes(&self, filter: RecipeFilter) -> PortResult<Vec<RecipeListing>> {
        let sql = format!(
            "SELECT r.{}, u.username AS author_name \
             FROM recipes r JOIN users u ON u.id = r.author_id \
             WHERE ($1::text IS NULL \
                    OR r.title ILIKE '%' || $1 || '%' \
                    OR r.description ILIKE '%' || $1 || '%') \
               AND ($2::text IS NULL OR r.category = $2) \
               AND ($3::text IS NULL OR r.difficulty = $3) \
               AND ($4::text IS NULL OR $4 = ANY(r.tags)) \
             ORDER BY r.created_at DESC",
            RECIPE_COLUMNS.replace(", ", ", r.")
        );
        let records: Vec<RecipeListingRecord> = sqlx::query_as(&sql)
            .bind(&filter.search)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.difficulty.map(|d| d.as_str()))
            .bind(&filter.tag)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records
            .into_iter()
            .map(RecipeListingRecord::to_domain)
            .collect()
    }

    async fn recommended_recipes(
        &self,
        preferences: &[DietaryPreference],
        limit: i64,
    ) -> PortResult<Vec<Recipe>> {
        let wanted: Vec<String> = preferences.iter().map(|p| p.as_str().to_string()).collect();
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE tags && $1 \
             ORDER BY rating_average DESC, created_at DESC LIMIT $2"
        );
        let records: Vec<RecipeRecord> = sqlx::query_as(&sql)
            .bind(&wanted)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(RecipeRecord::to_domain).collect()
    }

    async fn update_recipe(&self, recipe_id: Uuid, changes: RecipeChanges) -> PortResult<Recipe> {
        let sql = format!(
            "UPDATE recipes SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 image = COALESCE($4, image), \
                 ingredients = COALESCE($5, ingredients), \
                 instructions = COALESCE($6, instructions), \
                 prep_time = COALESCE($7, prep_time), \
                 cook_time = COALESCE($8, cook_time), \
                 difficulty = COALESCE($9, difficulty), \
                 category = COALESCE($10, category), \
                 tags = COALESCE($11, tags) \
             WHERE id = $1 RETURNING {RECIPE_COLUMNS}"
        );
        let record: RecipeRecord = sqlx::query_as(&sql)
            .bind(recipe_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.image)
            .bind(changes.ingredients.as_ref().map(Json))
            .bind(&changes.instructions)
            .bind(&changes.prep_time)
            .bind(&changes.cook_time)
            .bind(changes.difficulty.map(|d| d.as_str()))
            .bind(changes.category.map(|c| c.as_str()))
            .bind(&changes.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Recipe {} not found", recipe_id))
                }
                other => unexpected(other),
            })?;
        record.to_domain()
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Recipe {} not found",
                recipe_id
            )));
        }
        Ok(())
    }

    async fn set_rating(&self, recipe_id: Uuid, summary: RatingSummary) -> PortResult<()> {
        sqlx::query("UPDATE recipes SET rating_average = $2, rating_count = $3 WHERE id = $1")
            .bind(recipe_id)
            .bind(summary.average)
            .bind(summary.count)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_review(&self, new_review: NewReview) -> PortResult<Review> {
        let sql = format!(
            "INSERT INTO reviews (id, recipe_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {REVIEW_COLUMNS}"
        );
        let record: ReviewRecord = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(new_review.recipe_id)
            .bind(new_review.user_id)
            .bind(new_review.rating)
            .bind(&new_review.comment)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| insert_error(e, "you have already reviewed this recipe"))?;
        Ok(record.to_domain())
    }

    async fn review_by_id(&self, review_id: Uuid) -> PortResult<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        let record: Option<ReviewRecord> = sqlx::query_as(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(ReviewRecord::to_domain))
    }

    async fn find_review(&self, recipe_id: Uuid, user_id: Uuid) -> PortResult<Option<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE recipe_id = $1 AND user_id = $2"
        );
        let record: Option<ReviewRecord> = sqlx::query_as(&sql)
            .bind(recipe_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(ReviewRecord::to_domain))
    }

    async fn reviews_for_recipe(&self, recipe_id: Uuid) -> PortResult<Vec<ReviewWithAuthor>> {
        let sql = format!(
            "SELECT rv.{}, u.username AS author_name \
             FROM reviews rv JOIN users u ON u.id = rv.user_id \
             WHERE rv.recipe_id = $1 ORDER BY rv.created_at DESC",
            REVIEW_COLUMNS.replace(", ", ", rv.")
        );
        let records: Vec<ReviewWithAuthorRecord> = sqlx::query_as(&sql)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records
            .into_iter()
            .map(ReviewWithAuthorRecord::to_domain)
            .collect())
    }

    async fn review_ratings(&self, recipe_id: Uuid) -> PortResult<Vec<i32>> {
        sqlx::query_scalar("SELECT rating FROM reviews WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn update_review(&self, review_id: Uuid, changes: ReviewChanges) -> PortResult<Review> {
        let sql = format!(
            "UPDATE reviews SET \
                 rating = COALESCE($2, rating), \
                 comment = COALESCE($3, comment) \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        let record: ReviewRecord = sqlx::query_as(&sql)
            .bind(review_id)
            .bind(changes.rating)
            .bind(&changes.comment)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Review {} not found", review_id))
                }
                other => unexpected(other),
            })?;
        Ok(record.to_domain())
    }

    async fn delete_review(&self, review_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Review {} not found",
                review_id
            )));
        }
        Ok(())
    }
}
