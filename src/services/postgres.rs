use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use crate::models::{Match, Message, NewUser, User, UserMatches};
use crate::services::store::{Store, StoreError};

/// PostgreSQL-backed store
///
/// Foreign keys on `matches` and `messages` are declared `ON DELETE CASCADE`
/// (see `migrations/`), so removing a user removes everything that references it.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Resolve a user id inside a transaction, holding a share lock on the row
    /// until commit so the user cannot be deleted underneath the caller.
    async fn lock_user_id(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT id FROM users WHERE email = $1 FOR SHARE")
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| row.get("id"))
            .ok_or_else(|| StoreError::user_not_found(email))
    }

    async fn user_id(&self, email: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.get("id"))
            .ok_or_else(|| StoreError::user_not_found(email))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

impl Store for PostgresStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let query = r#"
            INSERT INTO users (email, name, pet_type)
            VALUES ($1, $2, $3)
            RETURNING *
        "#;

        sqlx::query_as::<_, User>(query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.pet_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::duplicate_email(&user.email)
                } else {
                    e.into()
                }
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn update_user(&self, email: &str, name: &str, pet_type: &str) -> Result<User, StoreError> {
        let query = r#"
            UPDATE users
            SET name = $2, pet_type = $3, updated_at = NOW()
            WHERE email = $1
            RETURNING *
        "#;

        sqlx::query_as::<_, User>(query)
            .bind(email)
            .bind(name)
            .bind(pet_type)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::user_not_found(email))
    }

    async fn delete_user(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>("DELETE FROM users WHERE email = $1 RETURNING *")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::user_not_found(email))
    }

    async fn create_match(&self, owner_email: &str, matchee_email: &str) -> Result<Match, StoreError> {
        let mut tx = self.pool.begin().await?;

        let matchee_id = Self::lock_user_id(&mut tx, matchee_email).await?;
        let owner_id = Self::lock_user_id(&mut tx, owner_email).await?;

        let created = sqlx::query_as::<_, Match>(
            "INSERT INTO matches (owner_id, matchee_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(owner_id)
        .bind(matchee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn matches_for_user(&self, email: &str) -> Result<UserMatches, StoreError> {
        let user_id = self.user_id(email).await?;

        let all = sqlx::query_as::<_, Match>(
            "SELECT * FROM matches WHERE owner_id = $1 OR matchee_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        // A self-match lands in both lists
        let matched_by = all.iter().filter(|m| m.matchee_id == user_id).cloned().collect();
        let matches = all.into_iter().filter(|m| m.owner_id == user_id).collect();

        Ok(UserMatches { matches, matched_by })
    }

    async fn create_message(
        &self,
        sender_email: &str,
        receiver_email: &str,
        body: &str,
    ) -> Result<Message, StoreError> {
        let mut tx = self.pool.begin().await?;

        let receiver_id = Self::lock_user_id(&mut tx, receiver_email).await?;
        let sender_id = Self::lock_user_id(&mut tx, sender_email).await?;

        let query = r#"
            INSERT INTO messages (sender_user_id, receiver_user_id, message)
            VALUES ($1, $2, $3)
            RETURNING *
        "#;

        let created = sqlx::query_as::<_, Message>(query)
            .bind(sender_id)
            .bind(receiver_id)
            .bind(body)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn messages_received_by(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let user_id = self.user_id(email).await?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE receiver_user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn messages_sent_by(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let user_id = self.user_id(email).await?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE sender_user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn update_message(&self, id: i64, body: &str) -> Result<Message, StoreError> {
        let query = r#"
            UPDATE messages
            SET message = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#;

        sqlx::query_as::<_, Message>(query)
            .bind(id)
            .bind(body)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::message_not_found(id))
    }

    async fn delete_message(&self, id: i64) -> Result<Message, StoreError> {
        sqlx::query_as::<_, Message>("DELETE FROM messages WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::message_not_found(id))
    }

    async fn delete_messages_sent_by(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sender_id = Self::lock_user_id(&mut tx, email).await?;

        let mut removed = sqlx::query_as::<_, Message>(
            "DELETE FROM messages WHERE sender_user_id = $1 RETURNING *",
        )
        .bind(sender_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        removed.sort_by_key(|m| m.id);
        tracing::debug!("Removed {} messages sent by {}", removed.len(), email);

        Ok(removed)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
