//! titanic-common: Shared wire types, question rules, and API errors used
//! by both the server and the chat client.

pub mod api;
pub mod error;
pub mod question;

// Re-export commonly used types
pub use api::{AskRequest, AskResponse, HealthResponse};
pub use error::ApiError;
pub use question::{is_on_topic, validate_question, QuestionError, OUT_OF_CONTEXT_ANSWER};
