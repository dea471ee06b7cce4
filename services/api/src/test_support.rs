//! services/api/src/test_support.rs
//!
//! An in-memory `DatabaseService` used by the unit tests. It mirrors the
//! store-level guarantees the Postgres adapter relies on: unique usernames
//! and emails, the `(recipe_id, user_id)` uniqueness of reviews, and
//! review cascade on recipe deletion.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use recipe_share_core::domain::{
    Category, DietaryPreference, Difficulty, PublicUser, RatingSummary, Recipe, RecipeListing,
    Review, ReviewWithAuthor, User, UserRole,
};
use recipe_share_core::ports::{
    DatabaseService, NewRecipe, NewReview, NewUser, PortError, PortResult, ProfileChanges,
    RecipeChanges, RecipeFilter, ReviewChanges,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::Level;
use uuid::Uuid;

use crate::auth::TokenSigner;
use crate::config::Config;
use crate::web::state::AppState;

/// An `AppState` over an [`InMemoryDb`], for handler and middleware tests.
pub fn test_state() -> Arc<AppState> {
    let config = Arc::new(Config {
        bind_address: "127.0.0.1:0".parse().expect("test bind address"),
        database_url: String::new(),
        log_level: Level::INFO,
        jwt_secret: "test-secret".to_string(),
        token_ttl_days: 30,
        cors_origin: "http://localhost:5173".to_string(),
    });
    Arc::new(AppState {
        db: Arc::new(InMemoryDb::new()),
        signer: TokenSigner::new(&config.jwt_secret, config.token_ttl_days)
            .expect("test signer"),
        config,
    })
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    recipes: HashMap<Uuid, Recipe>,
    reviews: HashMap<Uuid, Review>,
    favorites: Vec<(Uuid, Uuid)>,
    saved: Vec<(Uuid, Uuid)>,
}

pub struct InMemoryDb {
    tables: Mutex<Tables>,
    clock: AtomicI64,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock: AtomicI64::new(0),
        }
    }

    /// A strictly increasing timestamp, so newest-first ordering is
    /// deterministic in tests.
    fn tick(&self) -> DateTime<Utc> {
        let step = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(step)
    }

    pub async fn seed_user(&self, name: &str, role: UserRole) -> PublicUser {
        let mut user = self
            .create_user(NewUser {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "$argon2id$stub".to_string(),
            })
            .await
            .expect("seed user");
        user.role = role;
        self.tables
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user.public()
    }

    pub async fn seed_recipe(&self, author_id: Uuid) -> Recipe {
        self.create_recipe(NewRecipe {
            author_id,
            title: "Toast".to_string(),
            description: "Bread, but warmer.".to_string(),
            image: None,
            ingredients: vec![],
            instructions: vec!["Toast the bread until golden.".to_string()],
            prep_time: "1 min".to_string(),
            cook_time: "3 min".to_string(),
            difficulty: Difficulty::Easy,
            category: Category::Breakfast,
            tags: vec![],
        })
        .await
        .expect("seed recipe")
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let created_at = self.tick();
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .values()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(PortError::Conflict(
                "username or email already taken".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            bio: None,
            profile_picture: None,
            dietary_preferences: vec![],
            role: UserRole::User,
            created_at,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, user_id: Uuid) -> PortResult<Option<User>> {
        Ok(self.tables.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(username) = &changes.username {
            if tables
                .users
                .values()
                .any(|u| u.id != user_id && &u.username == username)
            {
                return Err(PortError::Conflict(
                    "username or email already taken".to_string(),
                ));
            }
        }
        if let Some(email) = &changes.email {
            if tables
                .users
                .values()
                .any(|u| u.id != user_id && &u.email == email)
            {
                return Err(PortError::Conflict(
                    "username or email already taken".to_string(),
                ));
            }
        }
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(picture) = changes.profile_picture {
            user.profile_picture = picture;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }

    async fn set_preferences(
        &self,
        user_id: Uuid,
        preferences: Vec<DietaryPreference>,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.dietary_preferences = preferences;
        Ok(())
    }

    async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.favorites.contains(&(user_id, recipe_id)) {
            tables.favorites.push((user_id, recipe_id));
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .favorites
            .retain(|entry| entry != &(user_id, recipe_id));
        Ok(())
    }

    async fn favorites_of(&self, user_id: Uuid) -> PortResult<Vec<Uuid>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .favorites
            .iter()
            .rev()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, r)| *r)
            .collect())
    }

    async fn add_saved(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.saved.contains(&(user_id, recipe_id)) {
            tables.saved.push((user_id, recipe_id));
        }
        Ok(())
    }

    async fn remove_saved(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .saved
            .retain(|entry| entry != &(user_id, recipe_id));
        Ok(())
    }

    async fn saved_of(&self, user_id: Uuid) -> PortResult<Vec<Uuid>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .saved
            .iter()
            .rev()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, r)| *r)
            .collect())
    }

    async fn create_recipe(&self, new_recipe: NewRecipe) -> PortResult<Recipe> {
        let created_at = self.tick();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            author_id: new_recipe.author_id,
            title: new_recipe.title,
            description: new_recipe.description,
            image: new_recipe.image,
            ingredients: new_recipe.ingredients,
            instructions: new_recipe.instructions,
            prep_time: new_recipe.prep_time,
            cook_time: new_recipe.cook_time,
            difficulty: new_recipe.difficulty,
            category: new_recipe.category,
            tags: new_recipe.tags,
            ratings: RatingSummary::empty(),
            created_at,
        };
        self.tables
            .lock()
            .unwrap()
            .recipes
            .insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn recipe_by_id(&self, recipe_id: Uuid) -> PortResult<Option<Recipe>> {
        Ok(self.tables.lock().unwrap().recipes.get(&recipe_id).cloned())
    }

    async fn list_recipes(&self, filter: RecipeFilter) -> PortResult<Vec<RecipeListing>> {
        let tables = self.tables.lock().unwrap();
        let mut listings: Vec<RecipeListing> = tables
            .recipes
            .values()
            .filter(|r| {
                filter.search.as_ref().map_or(true, |s| {
                    let needle = s.to_lowercase();
                    r.title.to_lowercase().contains(&needle)
                        || r.description.to_lowercase().contains(&needle)
                })
            })
            .filter(|r| filter.category.map_or(true, |c| r.category == c))
            .filter(|r| filter.difficulty.map_or(true, |d| r.difficulty == d))
            .filter(|r| filter.tag.as_ref().map_or(true, |t| r.tags.contains(t)))
            .map(|r| RecipeListing {
                recipe: r.clone(),
                author_name: tables
                    .users
                    .get(&r.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect();
        listings.sort_by(|a, b| b.recipe.created_at.cmp(&a.recipe.created_at));
        Ok(listings)
    }

    async fn recommended_recipes(
        &self,
        preferences: &[DietaryPreference],
        limit: i64,
    ) -> PortResult<Vec<Recipe>> {
        let wanted: Vec<&str> = preferences.iter().map(|p| p.as_str()).collect();
        let tables = self.tables.lock().unwrap();
        let mut matches: Vec<Recipe> = tables
            .recipes
            .values()
            .filter(|r| r.tags.iter().any(|t| wanted.contains(&t.as_str())))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.ratings
                .average
                .partial_cmp(&a.ratings.average)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.created_at.cmp(&a.created_at))
        });
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn update_recipe(&self, recipe_id: Uuid, changes: RecipeChanges) -> PortResult<Recipe> {
        let mut tables = self.tables.lock().unwrap();
        let recipe = tables
            .recipes
            .get_mut(&recipe_id)
            .ok_or_else(|| PortError::NotFound(format!("Recipe {} not found", recipe_id)))?;
        if let Some(title) = changes.title {
            recipe.title = title;
        }
        if let Some(description) = changes.description {
            recipe.description = description;
        }
        if let Some(image) = changes.image {
            recipe.image = Some(image);
        }
        if let Some(ingredients) = changes.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = changes.instructions {
            recipe.instructions = instructions;
        }
        if let Some(prep_time) = changes.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(cook_time) = changes.cook_time {
            recipe.cook_time = cook_time;
        }
        if let Some(difficulty) = changes.difficulty {
            recipe.difficulty = difficulty;
        }
        if let Some(category) = changes.category {
            recipe.category = category;
        }
        if let Some(tags) = changes.tags {
            recipe.tags = tags;
        }
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .recipes
            .remove(&recipe_id)
            .ok_or_else(|| PortError::NotFound(format!("Recipe {} not found", recipe_id)))?;
        // Cascade, as the schema's ON DELETE CASCADE would.
        tables.reviews.retain(|_, r| r.recipe_id != recipe_id);
        tables.favorites.retain(|(_, r)| *r != recipe_id);
        tables.saved.retain(|(_, r)| *r != recipe_id);
        Ok(())
    }

    async fn set_rating(&self, recipe_id: Uuid, summary: RatingSummary) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let recipe = tables
            .recipes
            .get_mut(&recipe_id)
            .ok_or_else(|| PortError::NotFound(format!("Recipe {} not found", recipe_id)))?;
        recipe.ratings = summary;
        Ok(())
    }

    async fn create_review(&self, new_review: NewReview) -> PortResult<Review> {
        let created_at = self.tick();
        let mut tables = self.tables.lock().unwrap();
        if tables
            .reviews
            .values()
            .any(|r| r.recipe_id == new_review.recipe_id && r.user_id == new_review.user_id)
        {
            return Err(PortError::Conflict(
                "you have already reviewed this recipe".to_string(),
            ));
        }
        let review = Review {
            id: Uuid::new_v4(),
            recipe_id: new_review.recipe_id,
            user_id: new_review.user_id,
            rating: new_review.rating,
            comment: new_review.comment,
            created_at,
        };
        tables.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn review_by_id(&self, review_id: Uuid) -> PortResult<Option<Review>> {
        Ok(self.tables.lock().unwrap().reviews.get(&review_id).cloned())
    }

    async fn find_review(&self, recipe_id: Uuid, user_id: Uuid) -> PortResult<Option<Review>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .reviews
            .values()
            .find(|r| r.recipe_id == recipe_id && r.user_id == user_id)
            .cloned())
    }

    async fn reviews_for_recipe(&self, recipe_id: Uuid) -> PortResult<Vec<ReviewWithAuthor>> {
        let tables = self.tables.lock().unwrap();
        let mut reviews: Vec<ReviewWithAuthor> = tables
            .reviews
            .values()
            .filter(|r| r.recipe_id == recipe_id)
            .map(|r| ReviewWithAuthor {
                review: r.clone(),
                author_name: tables
                    .users
                    .get(&r.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect();
        reviews.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));
        Ok(reviews)
    }

    async fn review_ratings(&self, recipe_id: Uuid) -> PortResult<Vec<i32>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .reviews
            .values()
            .filter(|r| r.recipe_id == recipe_id)
            .map(|r| r.rating)
            .collect())
    }

    async fn update_review(&self, review_id: Uuid, changes: ReviewChanges) -> PortResult<Review> {
        let mut tables = self.tables.lock().unwrap();
        let review = tables
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| PortError::NotFound(format!("Review {} not found", review_id)))?;
        if let Some(rating) = changes.rating {
            review.rating = rating;
        }
        if let Some(comment) = changes.comment {
            review.comment = comment;
        }
        Ok(review.clone())
    }

    async fn delete_review(&self, review_id: Uuid) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .reviews
            .remove(&review_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Review {} not found", review_id)))
    }
}
