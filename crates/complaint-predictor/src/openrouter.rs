// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Chat-completions client for the hosted language model
//!
//! This module provides an async client for OpenAI-compatible
//! chat-completions endpoints (OpenRouter or a local inference server), with
//! retry on transient failures and structured error mapping. Retry and
//! timeout policy live here, at the transport boundary; layers above
//! propagate failures without their own policy.

use std::time::{Duration, Instant};

use reqwest::{
    Client, ClientBuilder,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};
use tokio_retry::{
    Retry,
    strategy::{ExponentialBackoff, jitter},
};
use tracing::{Span, debug, error, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    config::LlmSettings,
    error::{PredictorError, PredictorResult},
    lm::{ChatMessage, LanguageModel},
};

/// Chat completion API request
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    /// The model to use for completion
    model: String,
    /// List of messages for the conversation
    messages: Vec<ChatMessage>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat completion API response
#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    /// List of completion choices
    choices: Vec<ChatChoice>,
    /// Token usage information
    usage: Option<TokenUsage>,
}

/// A single completion choice
#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    /// The completion message
    message: ChatMessage,
    /// Reason the completion finished
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
struct TokenUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Provider error response body
#[derive(Debug, Clone, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderError,
}

/// Provider error details
#[derive(Debug, Clone, Deserialize)]
struct ProviderError {
    message: String,
    code: Option<serde_json::Value>,
}

/// Async client for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    /// HTTP client for API requests
    client: Client,
    /// Base URL for the API
    base_url: Url,
    /// Model identifier sent on the wire
    model: String,
    /// Completion token budget
    max_tokens: u32,
    /// Sampling temperature
    temperature: f32,
}

impl OpenRouterClient {
    /// Create a client from resolved settings
    pub fn new(settings: &LlmSettings) -> PredictorResult<Self> {
        let timeout = Duration::from_secs(settings.timeout_seconds);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref api_key) = settings.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| PredictorError::config(format!("invalid API key format: {e}")))?,
            );
        }
        for (name, value) in &settings.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PredictorError::config(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| PredictorError::config(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent("complaint-predictor/0.2.0")
            .build()
            .map_err(|e| PredictorError::http(format!("failed to create HTTP client: {e}")))?;

        debug!(
            base_url = %settings.api_base,
            model = %settings.wire_model_name(),
            timeout_seconds = settings.timeout_seconds,
            "created chat-completions client"
        );

        Ok(Self {
            client,
            base_url: settings.api_base.clone(),
            model: settings.wire_model_name().to_string(),
            max_tokens: settings.max_tokens,
            temperature: 0.0,
        })
    }

    /// The wire model identifier this client requests
    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> PredictorResult<Url> {
        // Ensure the base path ends with a slash so join keeps the prefix
        let mut base_url = self.base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        base_url
            .join("chat/completions")
            .map_err(|e| PredictorError::config(format!("invalid base URL: {e}")))
    }

    /// Run one chat completion, retrying transient failures
    #[instrument(skip(self, messages), fields(model = %self.model, request_id))]
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> PredictorResult<String> {
        let request_id = Uuid::new_v4();
        Span::current().record("request_id", request_id.to_string());

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            stream: false,
        };

        let url = self.completions_url()?;

        let start_time = Instant::now();
        let response = self.retryable_request(&url, &request, request_id).await?;
        debug!(
            request_id = %request_id,
            duration_ms = start_time.elapsed().as_millis(),
            "completion request finished"
        );

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(error_for_response(status.as_u16(), &response_text));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| PredictorError::invalid_response(format!("failed to parse response: {e}")))?;

        if let Some(ref usage) = completion.usage {
            debug!(
                request_id = %request_id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "token usage"
            );
        }

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            PredictorError::invalid_response("no choices in completion response")
        })?;

        Ok(choice.message.content)
    }

    /// POST with exponential backoff on retryable statuses
    async fn retryable_request(
        &self,
        url: &Url,
        request: &ChatCompletionRequest,
        request_id: Uuid,
    ) -> PredictorResult<reqwest::Response> {
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(3)
            .map(jitter);

        let client = &self.client;

        Retry::spawn(retry_strategy, move || {
            let url = url.clone();
            let request = request.clone();

            async move {
                debug!(request_id = %request_id, url = %url, "completion request attempt");

                let response = client.post(url).json(&request).send().await?;
                let status = response.status();

                if should_retry_status(status.as_u16()) {
                    warn!(
                        request_id = %request_id,
                        status = status.as_u16(),
                        "retryable status from provider"
                    );
                    return Err(PredictorError::http(format!(
                        "HTTP {} - retryable provider error [request_id: {request_id}]",
                        status.as_u16()
                    )));
                }

                Ok(response)
            }
        })
        .await
    }
}

impl LanguageModel for OpenRouterClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> PredictorResult<String> {
        self.chat_completion(messages).await
    }
}

/// Determine if an HTTP status code should trigger a retry
fn should_retry_status(status: u16) -> bool {
    matches!(status, 429 | 500..=599 | 408)
}

/// Map an error response body to a typed error
fn error_for_response(status_code: u16, response_text: &str) -> PredictorError {
    let detail = match serde_json::from_str::<ProviderErrorResponse>(response_text) {
        Ok(parsed) => format!(
            "provider error ({status_code}): {} (code: {:?})",
            parsed.error.message, parsed.error.code
        ),
        Err(_) => format!("HTTP {status_code} error: {response_text}"),
    };

    error!("{detail}");

    match status_code {
        401 | 403 => PredictorError::authentication(detail),
        429 => PredictorError::rate_limit(60),
        500..=599 => PredictorError::service_unavailable(detail),
        _ => PredictorError::http(detail),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;
    use crate::config::LlmProvider;

    fn settings_for(base: &str) -> LlmSettings {
        LlmSettings {
            provider: LlmProvider::OpenRouter,
            model: "openrouter/test/model:free".to_string(),
            api_key: Some("sk-or-test-key".to_string()),
            api_base: Url::parse(base).expect("mock server URL is valid"),
            headers: HashMap::new(),
            timeout_seconds: 30,
            max_tokens: 256,
        }
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "gen-test",
            "object": "chat.completion",
            "created": 1234567890,
            "model": "test/model:free",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 50, "completion_tokens": 12, "total_tokens": 62 }
        })
    }

    #[test]
    fn routing_prefix_is_stripped_on_the_wire() {
        let client = OpenRouterClient::new(&settings_for("http://localhost:9")).unwrap();
        assert_eq!(client.model(), "test/model:free");
    }

    #[test]
    fn retry_status_classification() {
        assert!(should_retry_status(500));
        assert!(should_retry_status(503));
        assert!(should_retry_status(429));
        assert!(should_retry_status(408));

        assert!(!should_retry_status(400));
        assert!(!should_retry_status(401));
        assert!(!should_retry_status(200));
    }

    #[tokio::test]
    async fn successful_completion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-or-test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body(
                    "Classification: Adverse Event\nJustification: severe nausea",
                )),
            )
            .mount(&mock_server)
            .await;

        let client = OpenRouterClient::new(&settings_for(&mock_server.uri())).unwrap();
        let content = client
            .complete(vec![ChatMessage::user("I feel sick after the shot.")])
            .await
            .unwrap();

        assert!(content.starts_with("Classification: Adverse Event"));
    }

    #[tokio::test]
    async fn auth_error_is_typed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Invalid API key", "code": 401 }
            })))
            .mount(&mock_server)
            .await;

        let client = OpenRouterClient::new(&settings_for(&mock_server.uri())).unwrap();
        let err = client
            .complete(vec![ChatMessage::user("test")])
            .await
            .unwrap_err();

        assert!(matches!(err, PredictorError::Authentication { .. }));
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .up_to_n_times(2)
            .expect(2)
            .named("transient_failures")
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("Classification: Product Complaint")),
            )
            .expect(1)
            .named("successful_request")
            .mount(&mock_server)
            .await;

        let client = OpenRouterClient::new(&settings_for(&mock_server.uri())).unwrap();
        let content = client
            .complete(vec![ChatMessage::user("cracked pen")])
            .await
            .unwrap();

        assert!(content.contains("Product Complaint"));
    }

    #[tokio::test]
    async fn empty_choices_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "gen-test",
                "object": "chat.completion",
                "created": 0,
                "model": "test/model:free",
                "choices": []
            })))
            .mount(&mock_server)
            .await;

        let client = OpenRouterClient::new(&settings_for(&mock_server.uri())).unwrap();
        let err = client
            .complete(vec![ChatMessage::user("test")])
            .await
            .unwrap_err();

        assert!(matches!(err, PredictorError::InvalidResponse { .. }));
    }
}
