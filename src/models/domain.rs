use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered pet owner
///
/// `email` is the external identifier; `id` is internal and assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub name: String,
    #[serde(rename = "petType")]
    pub pet_type: String,
}

/// Fields needed to insert a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub pet_type: String,
}

/// One user's interest in another
///
/// Nothing prevents duplicate or self matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "owner")]
    pub owner_id: i64,
    #[serde(rename = "matchee")]
    pub matchee_id: i64,
}

/// A text message from one user to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "sender_user")]
    pub sender_user_id: i64,
    #[serde(rename = "receiver_user")]
    pub receiver_user_id: i64,
    pub message: String,
}

/// Matches a user takes part in, split by direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMatches {
    /// Matches the user initiated
    pub matches: Vec<Match>,
    /// Matches where the user is the matchee
    pub matched_by: Vec<Match>,
}
