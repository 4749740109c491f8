//! LLM backend trait and the hosted OpenAI-compatible implementation.
//!
//! The default deployment talks to the Hugging Face inference router,
//! which exposes the OpenAI chat-completions API for hosted models
//! (`Qwen/Qwen2.5-7B-Instruct:together` by default).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use titanic_config::LlmConfig;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Generation halts before any of these strings.
    pub stop: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
}

// ── Helpers: OpenAI-style wire format ────────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

/// Map a status code and raw body to either the JSON payload or an
/// `ApiError`. Routers in front of hosted models sometimes answer with
/// plain text or HTML, so the body is read as text first.
fn check_response_body(status: u16, text: &str) -> Result<serde_json::Value, LlmError> {
    let body: Option<serde_json::Value> = serde_json::from_str(text).ok();
    if status >= 400 {
        let msg = body
            .as_ref()
            .and_then(|b| {
                b["error"]["message"]
                    .as_str()
                    .or_else(|| b["error"].as_str())
                    .or_else(|| b["message"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| truncate(text.trim(), 200));
        return Err(LlmError::ApiError { status, message: msg });
    }
    body.ok_or_else(|| LlmError::ApiError {
        status,
        message: format!("non-JSON response: {}", truncate(text.trim(), 200)),
    })
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    check_response_body(status, &text)
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

// ── OpenAI-Compatible (HF router, TogetherAI, vLLM, …) ───────────────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            max_tokens: 512,
            temperature: 0.1,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Build a backend from the `[llm]` section, reading the token from
    /// the configured environment variable.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key: config.api_key(),
            client,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, req: &LlmRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model":       req.model.as_deref().unwrap_or(&self.model),
            "messages":    req.messages,
            "max_tokens":  req.max_tokens.unwrap_or(self.max_tokens),
            "temperature": req.temperature.unwrap_or(self.temperature),
        });
        if let Some(stop) = req.stop.as_ref().filter(|s| !s.is_empty()) {
            body["stop"] = serde_json::json!(stop);
        }
        body
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k.expose_secret()),
            None    => req,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.request_body(&req);
        debug!(model = %body["model"], messages = req.messages.len(), "LLM request");
        let resp = self.auth(self.client.post(self.endpoint())).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        let out = parse_openai_response(&json, &self.model);
        debug!(
            prompt_tokens = out.prompt_tokens,
            completion_tokens = out.completion_tokens,
            "LLM response"
        );
        Ok(out)
    }

    fn model_id(&self) -> &str { &self.model }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_compatible_with_no_key() {
        let b = OpenAiCompatibleBackend::new("http://localhost:1234", "local-model", None);
        assert_eq!(b.model_id(), "local-model");
        assert!(!b.has_api_key());
        assert_eq!(b.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_from_config_uses_defaults() {
        let cfg = LlmConfig { api_key_env: "TITANIC_TEST_UNSET_TOKEN_VAR".into(), ..Default::default() };
        let b = OpenAiCompatibleBackend::from_config(&cfg).unwrap();
        assert_eq!(b.model_id(), "Qwen/Qwen2.5-7B-Instruct:together");
        assert_eq!(b.endpoint(), "https://router.huggingface.co/v1/chat/completions");
        assert_eq!(b.max_tokens, 512);
        assert!(!b.has_api_key());
    }

    #[test]
    fn test_request_body_includes_stop_and_defaults() {
        let b = OpenAiCompatibleBackend::new("http://x/", "m", None);
        let req = LlmRequest {
            messages: vec![Message::user("hi")],
            stop: Some(vec!["\nObservation:".into()]),
            ..Default::default()
        };
        let body = b.request_body(&req);
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["stop"][0], "\nObservation:");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_request_body_omits_empty_stop() {
        let b = OpenAiCompatibleBackend::new("http://x", "m", None);
        let req = LlmRequest { stop: Some(vec![]), ..Default::default() };
        assert!(b.request_body(&req).get("stop").is_none());
    }

    #[test]
    fn test_parse_openai_response() {
        let json = serde_json::json!({
            "model": "qwen",
            "choices": [{"message": {"role": "assistant", "content": "Final Answer: 891"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        });
        let r = parse_openai_response(&json, "fallback");
        assert_eq!(r.content, "Final Answer: 891");
        assert_eq!(r.model, "qwen");
        assert_eq!(r.prompt_tokens, 12);
    }

    #[test]
    fn test_error_body_message_is_extracted() {
        let err = check_response_body(401, r#"{"error": {"message": "Invalid credentials"}}"#).unwrap_err();
        match err {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_bodies_are_api_errors() {
        assert!(matches!(
            check_response_body(502, "<html>Bad Gateway</html>"),
            Err(LlmError::ApiError { status: 502, ref message }) if message.contains("Bad Gateway")
        ));
        assert!(matches!(
            check_response_body(200, "not json"),
            Err(LlmError::ApiError { status: 200, .. })
        ));
        assert!(check_response_body(200, "{}").is_ok());
    }
}
