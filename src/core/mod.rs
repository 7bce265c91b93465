// Request policy exports
pub mod auth;
pub mod profanity;

pub use auth::{AdminCredentials, AuthPolicy};
pub use profanity::{parse_word_list, screen_with, ProfanityFilter, ScreeningError, Verdict, WordListSource};
