pub mod auth;
pub mod docs;
pub mod dto;
pub mod middleware;
pub mod recipes;
pub mod reviews;
pub mod state;
pub mod users;

// Re-export the pieces the server binary wires together.
pub use docs::ApiDoc;
pub use middleware::require_auth;
pub use state::AppState;
