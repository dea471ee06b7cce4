//! services/api/src/web/state.rs
//!
//! The shared application state, created once at startup and passed to all
//! handlers.

use crate::auth::TokenSigner;
use crate::config::Config;
use recipe_share_core::ports::DatabaseService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub signer: TokenSigner,
    pub config: Arc<Config>,
}
