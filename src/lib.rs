//! Doggr - backend for a pet-owner matching and messaging app
//!
//! Users, user-to-user matches and messages between users, served over HTTP.
//! Message bodies pass a profanity screen before they are stored.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{AdminCredentials, AuthPolicy, ProfanityFilter, Verdict};
pub use error::ApiError;
pub use models::{Match, Message, NewUser, User};
pub use routes::AppState;
pub use services::{MemoryStore, PostgresStore, Store, StoreError};
