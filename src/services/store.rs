use std::future::Future;

use thiserror::Error;

use crate::models::{Match, Message, NewUser, User, UserMatches};

/// Errors that can occur when reading or writing entities
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn user_not_found(email: &str) -> Self {
        StoreError::NotFound(format!("no user with email {}", email))
    }

    pub(crate) fn message_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("no message with id {}", id))
    }

    pub(crate) fn duplicate_email(email: &str) -> Self {
        StoreError::Conflict(format!("a user with email {} already exists", email))
    }
}

/// Persistence context shared by every request handler
///
/// Each mutating call commits exactly once. Calls that resolve users and then
/// write (match and message creation, bulk deletes) do so atomically, so a
/// concurrent user delete cannot leave a dangling reference. Deleting a user
/// cascades to every match and message that references it.
pub trait Store: Send + Sync + 'static {
    /// All users ordered by id
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, StoreError>> + Send;

    /// Insert a user; a taken email yields `StoreError::Conflict`
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Overwrite `name` and `pet_type` of the user with `email`
    fn update_user(
        &self,
        email: &str,
        name: &str,
        pet_type: &str,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// Remove the user with `email` together with its matches and messages
    fn delete_user(&self, email: &str) -> impl Future<Output = Result<User, StoreError>> + Send;

    fn create_match(
        &self,
        owner_email: &str,
        matchee_email: &str,
    ) -> impl Future<Output = Result<Match, StoreError>> + Send;

    fn matches_for_user(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<UserMatches, StoreError>> + Send;

    fn create_message(
        &self,
        sender_email: &str,
        receiver_email: &str,
        body: &str,
    ) -> impl Future<Output = Result<Message, StoreError>> + Send;

    fn messages_received_by(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Vec<Message>, StoreError>> + Send;

    fn messages_sent_by(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Replace the body of message `id`; sender and receiver are untouched
    fn update_message(
        &self,
        id: i64,
        body: &str,
    ) -> impl Future<Output = Result<Message, StoreError>> + Send;

    fn delete_message(&self, id: i64) -> impl Future<Output = Result<Message, StoreError>> + Send;

    /// Remove every message authored by the user with `email`
    fn delete_messages_sent_by(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Health check for the backing storage
    fn health_check(&self) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
