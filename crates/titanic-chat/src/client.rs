//! HTTP client for the `/ask` and `/health` endpoints.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use titanic_common::{AskRequest, AskResponse, HealthResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Nothing answered at the API address.
    #[error("Cannot reach the backend at {url}. Is the API server running?")]
    Unreachable { url: String },

    #[error("The backend did not answer within {0} seconds")]
    Timeout(u64),

    /// Non-success status; `detail` comes from the `{"detail": ..}` body when present.
    #[error("Backend returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_secs: u64,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, timeout_secs, http })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub async fn ask(&self, question: &str) -> Result<AskResponse, ClientError> {
        let url = format!("{}/ask", self.base_url);
        debug!(url = %url, "Posting question");
        let resp = self
            .http
            .post(&url)
            .json(&AskRequest::new(question))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify(e))?;
        decode_body(status, &body)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.http.get(&url).send().await.map_err(|e| self.classify(e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify(e))?;
        decode_body(status, &body)
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_connect() {
            ClientError::Unreachable { url: self.base_url.clone() }
        } else if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Http(err)
        }
    }
}

/// Map a response body to `T`, or to `ClientError::Api` for error statuses.
pub fn decode_body<T: serde::de::DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    if !status.is_success() {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").map(|d| match d {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(ClientError::Api { status: status.as_u16(), detail });
    }
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_success() {
        let body = r#"{"text_answer":"38.4% survived","plot_needed":false,"plot_base64":null}"#;
        let resp: AskResponse = decode_body(StatusCode::OK, body).unwrap();
        assert_eq!(resp.text_answer, "38.4% survived");
        assert!(!resp.plot_needed);
        assert_eq!(resp.plot_base64, None);
    }

    #[test]
    fn test_decode_detail_on_error() {
        let body = r#"{"detail":"Question length must be between 3 and 512 characters."}"#;
        let err = decode_body::<AskResponse>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            ClientError::Api { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Question length must be between 3 and 512 characters.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_plain_text_error() {
        let err = decode_body::<AskResponse>(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert_eq!(err.to_string(), "Backend returned 502: upstream down");
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_body::<AskResponse>(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
