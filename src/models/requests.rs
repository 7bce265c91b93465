use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::domain::NewUser;

/// Administrative credentials carried in a request body
///
/// Missing fields deserialize to empty strings so they fail the check
/// instead of the JSON extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminFields {
    #[serde(default)]
    pub admin: String,
    #[serde(default)]
    pub pass: String,
}

/// Numeric message id, accepted as a JSON number or a numeric string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(MessageId(id)),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map(MessageId)
                .map_err(|_| de::Error::custom(format!("invalid messageId: {:?}", text))),
        }
    }
}

/// Body of `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    #[serde(rename = "petType", alias = "pet_type")]
    pub pet_type: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            email: req.email,
            name: req.name,
            pet_type: req.pet_type,
        }
    }
}

/// Body of `PUT /users`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    #[serde(rename = "petType", alias = "pet_type")]
    pub pet_type: String,
    #[serde(flatten)]
    pub credentials: AdminFields,
}

/// Body of every lookup keyed by a single email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(length(min = 1))]
    pub email: String,
}

/// Body of `DELETE /users` and `DELETE /messages/all`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminEmailRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(flatten)]
    pub credentials: AdminFields,
}

/// Body of `POST /match`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub matchee_email: String,
}

/// Body of `POST /messages`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1))]
    pub sender: String,
    #[validate(length(min = 1))]
    pub receiver: String,
    #[validate(length(min = 1))]
    pub message: String,
}

/// Body of `PUT /messages`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    #[serde(rename = "messageId", alias = "message_id")]
    pub message_id: MessageId,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(flatten)]
    pub credentials: AdminFields,
}

/// Body of `DELETE /messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessageRequest {
    #[serde(rename = "messageId", alias = "message_id")]
    pub message_id: MessageId,
    #[serde(flatten)]
    pub credentials: AdminFields,
}
