//! titanic-llm: LLM backend abstraction and query audit log.

pub mod audit;
pub mod backend;

pub use audit::{log_user_query, QueryLogEntry};
pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OpenAiCompatibleBackend};
