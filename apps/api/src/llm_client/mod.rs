/// LLM Client — the single point of entry for all chat-completion calls in ClarityBot.
///
/// ARCHITECTURAL RULE: No other module may call the OpenRouter API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: hardcoded below (do not make configurable to prevent drift).
/// One attempt per call. Retrying is left to the user re-submitting.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// The model used for all LLM calls in ClarityBot.
pub const MODEL: &str = "google/gemma-3-27b-it:free";
/// How much of an unparseable upstream body is kept for diagnostics.
const ERROR_SNIPPET_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not parse upstream body: {snippet}")]
    Unparseable { snippet: String },

    #[error("API error (status {status}): {message:?}")]
    Api { status: u16, message: Option<String> },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// What the caller wants generated. Built fresh per request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Anything that can turn a prompt into completion text.
///
/// `LlmClient` is the production backend; tests swap in stubs.
/// Carried in `AppState` (via the simplification service) as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// A parsed upstream body. Kept as loose JSON: any valid JSON is "parseable",
/// and shape problems are classified afterwards as errors or missing content.
#[derive(Debug)]
pub struct ChatCompletion {
    body: Value,
}

impl From<Value> for ChatCompletion {
    fn from(body: Value) -> Self {
        Self { body }
    }
}

impl ChatCompletion {
    /// Extracts the content of the first choice, if it has any non-blank text.
    pub fn text(&self) -> Option<&str> {
        self.body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    /// True when the body carries a non-null `error` field.
    pub fn has_error(&self) -> bool {
        self.body.get("error").is_some_and(|e| !e.is_null())
    }

    /// The upstream's own error message, when it sent one.
    /// Providers disagree on the shape here: `{ "message": ... }` or a bare string.
    pub fn error_message(&self) -> Option<String> {
        match self.body.get("error")? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }

    fn usage_field(&self, name: &str) -> Option<u64> {
        self.body.get("usage")?.get(name)?.as_u64()
    }
}

/// The single LLM client used by ClarityBot.
/// Wraps an OpenAI-compatible chat-completions endpoint behind bearer auth.
pub struct LlmClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl LlmClient {
    pub fn new(api_key: SecretString, endpoint: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint,
        })
    }

    /// Makes one call to the chat-completions API and returns the parsed body.
    ///
    /// Order of checks matters: an unparseable body wins over a bad status,
    /// so HTML error pages from a proxy surface as `Unparseable`.
    pub async fn call(&self, request: &CompletionRequest<'_>) -> Result<ChatCompletion, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        let body: Value = serde_json::from_str(&raw).map_err(|e| {
            warn!("LLM API returned unparseable body ({status}): {e}");
            LlmError::Unparseable {
                snippet: snippet(&raw),
            }
        })?;
        let completion = ChatCompletion::from(body);

        if !status.is_success() || completion.has_error() {
            let message = completion.error_message();
            warn!("LLM API returned {}: {:?}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(
            "LLM call succeeded: prompt_tokens={:?}, completion_tokens={:?}",
            completion.usage_field("prompt_tokens"),
            completion.usage_field("completion_tokens")
        );

        Ok(completion)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let completion = self.call(request).await?;
        completion
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// First `ERROR_SNIPPET_CHARS` characters of a raw body, cut on a char boundary.
fn snippet(raw: &str) -> String {
    raw.chars().take(ERROR_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, timeout: Duration) -> LlmClient {
        LlmClient::new(
            SecretString::from("test-key".to_string()),
            server.url("/chat/completions"),
            timeout,
        )
        .unwrap()
    }

    fn request() -> CompletionRequest<'static> {
        CompletionRequest {
            prompt: "Please simplify this.",
            max_tokens: 220,
            temperature: 0.7,
        }
    }

    #[test]
    fn test_snippet_truncates_to_limit() {
        let raw = "x".repeat(500);
        assert_eq!(snippet(&raw).chars().count(), ERROR_SNIPPET_CHARS);
    }

    #[test]
    fn test_snippet_respects_multibyte_chars() {
        let raw = "é".repeat(200);
        let cut = snippet(&raw);
        assert_eq!(cut.chars().count(), ERROR_SNIPPET_CHARS);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_error_message_from_object_or_string() {
        let obj = ChatCompletion::from(json!({"error": {"message": "overloaded"}}));
        assert_eq!(obj.error_message().as_deref(), Some("overloaded"));

        let bare = ChatCompletion::from(json!({"error": "rate limited"}));
        assert_eq!(bare.error_message().as_deref(), Some("rate limited"));

        let none = ChatCompletion::from(json!({"error": {"code": 500}}));
        assert!(none.has_error());
        assert_eq!(none.error_message(), None);

        let null = ChatCompletion::from(json!({"error": null, "choices": []}));
        assert!(!null.has_error());
    }

    #[test]
    fn test_text_ignores_blank_content() {
        let blank = ChatCompletion::from(json!({"choices": [{"message": {"content": "   "}}]}));
        assert_eq!(blank.text(), None);

        let missing = ChatCompletion::from(json!({"choices": []}));
        assert_eq!(missing.text(), None);

        let null_choices = ChatCompletion::from(json!({"choices": null}));
        assert_eq!(null_choices.text(), None);
    }

    #[tokio::test]
    async fn test_complete_sends_model_auth_and_limits() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .json_body_partial(
                        json!({
                            "model": MODEL,
                            "max_tokens": 220,
                            "messages": [{"role": "user", "content": "Please simplify this."}]
                        })
                        .to_string(),
                    );
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({
                        "choices": [{"message": {"content": "Short version."}}],
                        "usage": {"prompt_tokens": 12, "completion_tokens": 3}
                    }));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let text = client.complete(&request()).await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(text, "Short version.");
    }

    #[tokio::test]
    async fn test_non_success_status_carries_upstream_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(503)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"error": {"message": "overloaded"}}));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        match client.complete(&request()).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message.as_deref(), Some("overloaded"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_field_on_200_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .json_body(json!({"error": {"message": "model is warming up"}}));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_unparseable_body_keeps_snippet() {
        let server = MockServer::start_async().await;
        let body = format!("<html>{}</html>", "Bad Gateway ".repeat(40));
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(502).body(body.clone());
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        match client.complete(&request()).await {
            Err(LlmError::Unparseable { snippet }) => {
                assert!(snippet.starts_with("<html>Bad Gateway"));
                assert_eq!(snippet.chars().count(), ERROR_SNIPPET_CHARS);
            }
            other => panic!("expected Unparseable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_choices_with_error_keeps_upstream_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(503)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"choices": null, "error": {"message": "overloaded"}}));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        match client.complete(&request()).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message.as_deref(), Some("overloaded"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unfamiliar_usage_shape_does_not_discard_answer() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({
                        "choices": [{"message": {"content": "Fine."}}],
                        "usage": {"total_tokens": 12}
                    }));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert_eq!(client.complete(&request()).await.unwrap(), "Fine.");
    }

    #[tokio::test]
    async fn test_valid_json_of_wrong_shape_is_empty_not_unparseable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .json_body(json!({"choices": "not-a-list", "usage": "n/a"}));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_missing_content_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"choices": [{"message": {"content": "late"}}]}));
            })
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        match client.complete(&request()).await {
            Err(LlmError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
