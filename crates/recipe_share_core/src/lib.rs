pub mod domain;
pub mod policy;
pub mod ports;
pub mod rating;

pub use domain::{
    Category, DietaryPreference, Difficulty, Ingredient, PublicUser, RatingSummary, Recipe,
    RecipeListing, Review, ReviewWithAuthor, User, UserRole,
};
pub use ports::{DatabaseService, PortError, PortResult};
pub use rating::summarize;
