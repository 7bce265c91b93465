use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::{Match, Message, NewUser, User, UserMatches};
use crate::services::store::{Store, StoreError};

/// Process-local store with the same semantics as `PostgresStore`
///
/// The table lock is held for the whole of each operation, which makes every
/// call atomic. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    matches: BTreeMap<i64, Match>,
    messages: BTreeMap<i64, Message>,
    user_seq: i64,
    match_seq: i64,
    message_seq: i64,
}

impl Tables {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    fn user_id(&self, email: &str) -> Result<i64, StoreError> {
        self.user_by_email(email)
            .map(|u| u.id)
            .ok_or_else(|| StoreError::user_not_found(email))
    }
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.user_by_email(&user.email).is_some() {
            return Err(StoreError::duplicate_email(&user.email));
        }

        let now = Utc::now();
        let created = User {
            id: next(&mut tables.user_seq),
            created_at: now,
            updated_at: now,
            email: user.email,
            name: user.name,
            pet_type: user.pet_type,
        };
        tables.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.user_by_email(email).cloned())
    }

    async fn update_user(&self, email: &str, name: &str, pet_type: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;

        let id = tables.user_id(email)?;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::user_not_found(email))?;
        user.name = name.to_string();
        user.pet_type = pet_type.to_string();
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, email: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;

        let id = tables.user_id(email)?;
        let removed = tables
            .users
            .remove(&id)
            .ok_or_else(|| StoreError::user_not_found(email))?;

        tables
            .matches
            .retain(|_, m| m.owner_id != id && m.matchee_id != id);
        tables
            .messages
            .retain(|_, m| m.sender_user_id != id && m.receiver_user_id != id);

        Ok(removed)
    }

    async fn create_match(&self, owner_email: &str, matchee_email: &str) -> Result<Match, StoreError> {
        let mut tables = self.tables.lock().await;

        let matchee_id = tables.user_id(matchee_email)?;
        let owner_id = tables.user_id(owner_email)?;

        let now = Utc::now();
        let created = Match {
            id: next(&mut tables.match_seq),
            created_at: now,
            updated_at: now,
            owner_id,
            matchee_id,
        };
        tables.matches.insert(created.id, created.clone());

        Ok(created)
    }

    async fn matches_for_user(&self, email: &str) -> Result<UserMatches, StoreError> {
        let tables = self.tables.lock().await;

        let id = tables.user_id(email)?;
        let matches = tables
            .matches
            .values()
            .filter(|m| m.owner_id == id)
            .cloned()
            .collect();
        let matched_by = tables
            .matches
            .values()
            .filter(|m| m.matchee_id == id)
            .cloned()
            .collect();

        Ok(UserMatches { matches, matched_by })
    }

    async fn create_message(
        &self,
        sender_email: &str,
        receiver_email: &str,
        body: &str,
    ) -> Result<Message, StoreError> {
        let mut tables = self.tables.lock().await;

        let receiver_user_id = tables.user_id(receiver_email)?;
        let sender_user_id = tables.user_id(sender_email)?;

        let now = Utc::now();
        let created = Message {
            id: next(&mut tables.message_seq),
            created_at: now,
            updated_at: now,
            sender_user_id,
            receiver_user_id,
            message: body.to_string(),
        };
        tables.messages.insert(created.id, created.clone());

        Ok(created)
    }

    async fn messages_received_by(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let tables = self.tables.lock().await;

        let id = tables.user_id(email)?;
        Ok(tables
            .messages
            .values()
            .filter(|m| m.receiver_user_id == id)
            .cloned()
            .collect())
    }

    async fn messages_sent_by(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let tables = self.tables.lock().await;

        let id = tables.user_id(email)?;
        Ok(tables
            .messages
            .values()
            .filter(|m| m.sender_user_id == id)
            .cloned()
            .collect())
    }

    async fn update_message(&self, id: i64, body: &str) -> Result<Message, StoreError> {
        let mut tables = self.tables.lock().await;

        let message = tables
            .messages
            .get_mut(&id)
            .ok_or_else(|| StoreError::message_not_found(id))?;
        message.message = body.to_string();
        message.updated_at = Utc::now();

        Ok(message.clone())
    }

    async fn delete_message(&self, id: i64) -> Result<Message, StoreError> {
        let mut tables = self.tables.lock().await;

        tables
            .messages
            .remove(&id)
            .ok_or_else(|| StoreError::message_not_found(id))
    }

    async fn delete_messages_sent_by(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let mut tables = self.tables.lock().await;

        let sender_id = tables.user_id(email)?;
        let ids: Vec<i64> = tables
            .messages
            .values()
            .filter(|m| m.sender_user_id == sender_id)
            .map(|m| m.id)
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| tables.messages.remove(&id))
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
