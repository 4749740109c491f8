//! Question admission rules: length bounds and the Titanic topic guard.

use thiserror::Error;

/// Shortest accepted question, in characters, after trimming.
pub const MIN_QUESTION_CHARS: usize = 3;
/// Longest accepted question, in characters, after trimming.
pub const MAX_QUESTION_CHARS: usize = 512;

/// Literal answer returned for questions unrelated to the dataset.
pub const OUT_OF_CONTEXT_ANSWER: &str = "It's out of context";

/// A question must mention at least one of these (case-insensitive,
/// substring match) to reach the agent.
pub const TOPIC_KEYWORDS: &[&str] = &[
    "titanic", "passenger", "survivor", "survived", "pclass", "fare",
    "embarked", "age", "sex", "sibsp", "parch", "cabin", "ticket",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("Question length must be between 3 and 512 characters.")]
    Length { chars: usize },
}

/// Trim a raw question and check its length.
/// Returns the trimmed question on success.
pub fn validate_question(raw: &str) -> Result<String, QuestionError> {
    let question = raw.trim();
    let chars = question.chars().count();
    if !(MIN_QUESTION_CHARS..=MAX_QUESTION_CHARS).contains(&chars) {
        return Err(QuestionError::Length { chars });
    }
    Ok(question.to_string())
}

/// True when the question mentions the Titanic domain.
pub fn is_on_topic(question: &str) -> bool {
    let q = question.to_lowercase();
    TOPIC_KEYWORDS.iter().any(|kw| q.contains(kw))
}
