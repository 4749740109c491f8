use thiserror::Error;

use titanic_data::DataError;
use titanic_llm::LlmError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Dataset unavailable: {0}")]
    Data(#[from] DataError),

    #[error("Prompt template error: {0}")]
    Prompt(#[from] minijinja::Error),
}
