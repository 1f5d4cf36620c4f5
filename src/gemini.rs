//! Minimal Gemini client for our use-cases.
//!
//! One `generateContent` call per prompt: no generation parameters, no retry, no streaming.
//! Calls are instrumented and log model name, latency, token usage and response size (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Anything that turns a prompt into raw model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

  /// Model identifier for logs.
  fn model(&self) -> &str;
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub timeout: Duration,
}

impl GeminiConfig {
  /// GEMINI_API_KEY is required; GEMINI_BASE_URL, GEMINI_MODEL and GEMINI_TIMEOUT_SECS are optional.
  pub fn from_env() -> Result<Self, GenerationError> {
    Self::from_vars(|name| std::env::var(name).ok())
  }

  /// Build from a variable lookup. A missing or blank key means not configured.
  pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, GenerationError> {
    let api_key = var("GEMINI_API_KEY")
      .filter(|k| !k.trim().is_empty())
      .ok_or(GenerationError::NotConfigured)?;
    let base_url = var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
    let model = var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
    let timeout_secs = var("GEMINI_TIMEOUT_SECS")
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Ok(Self::new(api_key, base_url, model, Duration::from_secs(timeout_secs)))
  }

  pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
    Self {
      api_key: api_key.into(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      model: model.into(),
      timeout,
    }
  }
}

#[derive(Clone)]
pub struct Gemini {
  client: reqwest::Client,
  config: GeminiConfig,
}

impl Gemini {
  /// Build the client from a configuration. An empty key counts as unconfigured.
  pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
    if config.api_key.trim().is_empty() {
      return Err(GenerationError::NotConfigured);
    }
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .user_agent("learngrid-backend/0.1")
      .build()
      .map_err(|e| GenerationError::Network(e.to_string()))?;
    Ok(Self { client, config })
  }

  pub fn from_env() -> Result<Self, GenerationError> {
    Self::new(GeminiConfig::from_env()?)
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.config.base_url, self.config.model)
  }
}

#[async_trait]
impl TextGenerator for Gemini {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
    let req = GenerateRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
    };

    let start = Instant::now();
    let res = self.client.post(self.endpoint())
      .header("x-goog-api-key", &self.config.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| GenerationError::Network(e.to_string()))?;

    let status = res.status();
    let body = res.text().await.map_err(|e| GenerationError::Network(e.to_string()))?;
    if !status.is_success() {
      let message = extract_api_error(&body).unwrap_or(body);
      return Err(GenerationError::Http { status: status.as_u16(), message });
    }

    let parsed: GenerateResponse =
      serde_json::from_str(&body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    if let Some(usage) = &parsed.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, candidates_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }

    let text = response_text(parsed)?;
    info!(elapsed = ?start.elapsed(), text_len = text.len(), "Gemini response received");
    Ok(text)
  }

  fn model(&self) -> &str {
    &self.config.model
  }
}

/// Concatenate the text parts of the first candidate.
fn response_text(res: GenerateResponse) -> Result<String, GenerationError> {
  let Some(candidate) = res.candidates.into_iter().next() else {
    return Err(match res.prompt_feedback.and_then(|f| f.block_reason) {
      Some(reason) => GenerationError::Blocked(reason),
      None => GenerationError::EmptyResponse,
    });
  };
  if let Some(reason) = candidate.finish_reason.as_deref() {
    if reason != "STOP" {
      warn!(finish_reason = %reason, "Gemini candidate did not finish normally");
    }
  }
  let text: String = candidate
    .content
    .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
    .unwrap_or_default();
  if text.trim().is_empty() {
    return Err(GenerationError::EmptyResponse);
  }
  Ok(text)
}

// --- generateContent DTOs ---

#[derive(Serialize)]
struct GenerateRequest {
  contents: Vec<Content>,
}
#[derive(Serialize)]
struct Content { parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] prompt_feedback: Option<PromptFeedback>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  #[serde(default)] content: Option<CandidateContent>,
  #[serde(default)] finish_reason: Option<String>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)] parts: Vec<PartOut>,
}
#[derive(Deserialize)]
struct PartOut {
  #[serde(default)] text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
  #[serde(default)] block_reason: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Google API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(body: &str) -> GenerateResponse {
    serde_json::from_str(body).unwrap()
  }

  #[test]
  fn text_parts_of_first_candidate_are_concatenated() {
    let res = response(r#"{
      "candidates": [
        {"content": {"parts": [{"text": "```json\n{\"skill\":"}, {"text": "\"go\"}\n```"}], "role": "model"}, "finishReason": "STOP"},
        {"content": {"parts": [{"text": "ignored"}]}}
      ],
      "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
    }"#);
    assert_eq!(response_text(res).unwrap(), "```json\n{\"skill\":\"go\"}\n```");
  }

  #[test]
  fn blocked_prompt_is_reported() {
    let res = response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
    assert!(matches!(response_text(res), Err(GenerationError::Blocked(r)) if r == "SAFETY"));
  }

  #[test]
  fn candidate_without_text_is_empty() {
    let res = response(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);
    assert!(matches!(response_text(res), Err(GenerationError::EmptyResponse)));
    let res = response(r#"{"candidates": []}"#);
    assert!(matches!(response_text(res), Err(GenerationError::EmptyResponse)));
  }

  #[test]
  fn api_error_message_is_extracted() {
    let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("API key not valid."));
    assert!(extract_api_error("<html>bad gateway</html>").is_none());
  }

  #[test]
  fn empty_key_is_not_configured() {
    let cfg = GeminiConfig::new("  ", DEFAULT_BASE_URL, DEFAULT_MODEL, Duration::from_secs(1));
    assert!(matches!(Gemini::new(cfg), Err(GenerationError::NotConfigured)));
  }

  #[test]
  fn endpoint_targets_generate_content_for_the_model() {
    let cfg = GeminiConfig::new("k", "http://localhost:9999/v1beta/", "gemini-pro", Duration::from_secs(1));
    let client = Gemini::new(cfg).unwrap();
    assert_eq!(client.endpoint(), "http://localhost:9999/v1beta/models/gemini-pro:generateContent");
    assert_eq!(client.model(), "gemini-pro");
  }

  #[test]
  fn request_body_carries_only_the_prompt() {
    let req = GenerateRequest { contents: vec![Content { parts: vec![Part { text: "hi".into() }] }] };
    assert_eq!(serde_json::to_value(&req).unwrap(), serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]}));
  }

  #[tokio::test]
  async fn unreachable_service_is_a_network_error() {
    let cfg = GeminiConfig::new("k", "http://127.0.0.1:1", "gemini-pro", Duration::from_secs(2));
    let client = Gemini::new(cfg).unwrap();
    assert!(matches!(client.generate("prompt").await, Err(GenerationError::Network(_))));
  }

  fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
  }

  #[test]
  fn blank_or_missing_key_is_not_configured() {
    assert!(matches!(GeminiConfig::from_vars(vars(&[])), Err(GenerationError::NotConfigured)));
    assert!(matches!(GeminiConfig::from_vars(vars(&[("GEMINI_API_KEY", "   ")])), Err(GenerationError::NotConfigured)));
  }

  #[test]
  fn optional_vars_fall_back_to_defaults() {
    let cfg = GeminiConfig::from_vars(vars(&[("GEMINI_API_KEY", "k"), ("GEMINI_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.model, DEFAULT_MODEL);
    assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    let cfg = GeminiConfig::from_vars(vars(&[
      ("GEMINI_API_KEY", "k"),
      ("GEMINI_MODEL", "gemini-1.5-flash"),
      ("GEMINI_TIMEOUT_SECS", "5"),
    ]))
    .unwrap();
    assert_eq!(cfg.model, "gemini-1.5-flash");
    assert_eq!(cfg.timeout, Duration::from_secs(5));
  }

  // --- local stand-in for the Gemini API ---

  const TEST_KEY: &str = "test-key";

  async fn fake_gemini(uri: axum::http::Uri, headers: axum::http::HeaderMap, body: String) -> axum::response::Response {
    use axum::{http::StatusCode, response::IntoResponse, Json};
    use serde_json::json;

    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_KEY) {
      return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"code": 401, "message": "API key not valid."}}))).into_response();
    }
    match uri.path() {
      "/v1beta/models/ok:generateContent" => {
        let sent: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
        if sent != json!({"contents": [{"parts": [{"text": "hello"}]}]}) {
          return StatusCode::BAD_REQUEST.into_response();
        }
        Json(json!({"candidates": [{"content": {"parts": [{"text": "```json\n{}\n```"}]}, "finishReason": "STOP"}]})).into_response()
      }
      "/v1beta/models/quota:generateContent" => (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}})),
      )
        .into_response(),
      "/v1beta/models/garbled:generateContent" => (StatusCode::OK, "{not json").into_response(),
      _ => StatusCode::NOT_FOUND.into_response(),
    }
  }

  async fn start_fake_gemini() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, axum::Router::new().fallback(fake_gemini)).await.unwrap();
    });
    format!("http://{addr}/v1beta")
  }

  fn client(base_url: &str, key: &str, model: &str) -> Gemini {
    Gemini::new(GeminiConfig::new(key, base_url, model, Duration::from_secs(5))).unwrap()
  }

  #[tokio::test]
  async fn successful_reply_returns_the_candidate_text() {
    let base = start_fake_gemini().await;
    let text = client(&base, TEST_KEY, "ok").generate("hello").await.unwrap();
    assert_eq!(text, "```json\n{}\n```");
  }

  #[tokio::test]
  async fn error_status_carries_the_api_message() {
    let base = start_fake_gemini().await;
    let err = client(&base, TEST_KEY, "quota").generate("hello").await.unwrap_err();
    assert!(matches!(err, GenerationError::Http { status: 429, ref message } if message == "quota"), "{err:?}");
  }

  #[tokio::test]
  async fn key_travels_in_the_goog_api_key_header() {
    let base = start_fake_gemini().await;
    let err = client(&base, "wrong-key", "ok").generate("hello").await.unwrap_err();
    assert!(matches!(err, GenerationError::Http { status: 401, ref message } if message == "API key not valid."), "{err:?}");
  }

  #[tokio::test]
  async fn non_json_success_body_is_malformed() {
    let base = start_fake_gemini().await;
    let err = client(&base, TEST_KEY, "garbled").generate("hello").await.unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)), "{err:?}");
  }
}
