//! Audit logging for answered questions.
//!
//! Every `/ask` call that reaches the agent produces one entry. Answers are
//! not stored in full; the log carries a short preview and a SHA-256 of the
//! text so a given answer can be matched later.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub id: Uuid,
    pub question: String,
    pub answer_preview: String,
    pub answer_hash: String,
    pub plot_needed: bool,
    pub model: String,
    pub latency_ms: u64,
    pub logged_at: chrono::DateTime<Utc>,
}

impl QueryLogEntry {
    pub fn new(
        question: &str,
        answer: &str,
        plot_needed: bool,
        model: &str,
        latency_ms: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(answer.as_bytes());
        let answer_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            answer_preview: answer.chars().take(PREVIEW_CHARS).collect(),
            answer_hash,
            plot_needed,
            model: model.to_string(),
            latency_ms,
            logged_at: Utc::now(),
        }
    }
}

/// Record a user query. Emits one `titanic::audit` tracing event and
/// returns the entry.
pub fn log_user_query(
    question: &str,
    answer: &str,
    plot_needed: bool,
    model: &str,
    latency_ms: u64,
) -> QueryLogEntry {
    let entry = QueryLogEntry::new(question, answer, plot_needed, model, latency_ms);
    info!(
        target: "titanic::audit",
        id = %entry.id,
        question = %entry.question,
        answer_preview = %entry.answer_preview,
        answer_sha256 = %entry.answer_hash,
        plot_needed = entry.plot_needed,
        model = %entry.model,
        latency_ms = entry.latency_ms,
        "user query"
    );
    entry
}
