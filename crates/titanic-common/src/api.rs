//! JSON bodies exchanged between the chat client and the `/ask` API.

use serde::{Deserialize, Serialize};

use crate::question::OUT_OF_CONTEXT_ANSWER;

/// Body of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into() }
    }
}

/// Response of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub text_answer: String,
    pub plot_needed: bool,
    /// Base64-encoded PNG, present only when a chart was rendered.
    #[serde(default)]
    pub plot_base64: Option<String>,
}

impl AskResponse {
    /// The fixed reply for questions that are not about the dataset.
    pub fn out_of_context() -> Self {
        Self {
            text_answer: OUT_OF_CONTEXT_ANSWER.to_string(),
            plot_needed: false,
            plot_base64: None,
        }
    }
}

/// Liveness payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_base64_serialises_as_null() {
        let json = serde_json::to_value(AskResponse::out_of_context()).unwrap();
        assert_eq!(json["text_answer"], "It's out of context");
        assert_eq!(json["plot_needed"], false);
        assert!(json["plot_base64"].is_null());
    }

    #[test]
    fn test_missing_plot_field_defaults_to_none() {
        let resp: AskResponse =
            serde_json::from_str(r#"{"text_answer": "342 survived", "plot_needed": false}"#).unwrap();
        assert_eq!(resp.plot_base64, None);
    }

    #[test]
    fn test_health_payload() {
        let json = serde_json::to_string(&HealthResponse::ok()).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }
}
