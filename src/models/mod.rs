// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Match, Message, NewUser, User, UserMatches};
pub use requests::{
    AdminEmailRequest, AdminFields, CreateMatchRequest, CreateUserRequest, DeleteMessageRequest,
    EmailRequest, MessageId, SendMessageRequest, UpdateMessageRequest, UpdateUserRequest,
};
pub use responses::{ErrorResponse, HealthResponse};
