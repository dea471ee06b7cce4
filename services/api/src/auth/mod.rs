//! services/api/src/auth/mod.rs
//!
//! Credential primitives: password hashing and stateless session tokens.

pub mod password;
pub mod token;

pub use token::{TokenError, TokenSigner};
