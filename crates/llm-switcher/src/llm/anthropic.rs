//! Anthropic LLM provider with native API format.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::credentials::Credentials;
use super::error::{LLMError, api_error, check_response_error, request_error};
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatResponse, Choice, Message, Role, Usage};

/// Anthropic provider speaking the messages API.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key_env: String,
    credentials: Arc<dyn Credentials>,
    api_version: String,
}

impl AnthropicProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    #[must_use]
    pub fn new(
        client: Client,
        base_url: String,
        api_key_env: String,
        credentials: Arc<dyn Credentials>,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key_env,
            credentials,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let api_key = self.credentials.lookup(&self.api_key_env).ok_or_else(|| {
            LLMError::MissingCredential {
                var: self.api_key_env.clone(),
            }
        })?;

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let anthropic_request = to_request(&request);
        debug!(provider = "anthropic", model = %request.model, %url, "sending chat request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &api_key)
            .header("anthropic-version", &self.api_version)
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| request_error("anthropic", e))?;

        if let Some(err) = check_response_error(&response) {
            return Err(err);
        }
        if !response.status().is_success() {
            return Err(api_error("anthropic", response).await);
        }

        let anthropic_response: Response = response
            .json()
            .await
            .map_err(|e| request_error("anthropic", e))?;
        Ok(from_response(anthropic_response))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request {
    model: String,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(serde::Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(serde::Deserialize)]
struct Response {
    #[serde(default)]
    id: String,
    #[serde(default)]
    content: Vec<ResponseContent>,
    stop_reason: Option<String>,
    usage: Option<ResponseUsage>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(serde::Deserialize)]
struct ResponseUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// ============================================================================
// Conversions
// ============================================================================

fn to_request(request: &ChatRequest) -> Request {
    let messages = request
        .messages
        .iter()
        .map(|msg| RequestMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: msg.content.clone(),
        })
        .collect();

    Request {
        model: request.model.clone(),
        max_tokens: request
            .max_tokens
            .unwrap_or(AnthropicProvider::DEFAULT_MAX_TOKENS),
        messages,
    }
}

/// Fold text blocks into a single OpenAI-shaped choice. A reply with no
/// text blocks yields no choices.
fn from_response(response: Response) -> ChatResponse {
    let texts: Vec<String> = response
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .map(|c| c.text)
        .collect();

    let choices = if texts.is_empty() {
        Vec::new()
    } else {
        vec![Choice {
            index: 0,
            message: Message {
                role: Role::Assistant,
                content: texts.concat(),
            },
            finish_reason: response.stop_reason,
        }]
    };

    ChatResponse {
        id: response.id,
        choices,
        usage: response.usage.map(|u| Usage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens.saturating_add(u.output_tokens),
        }),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::llm::credentials::StaticCredentials;
    use crate::llm::mock;

    fn provider(base_url: String, credentials: StaticCredentials) -> AnthropicProvider {
        AnthropicProvider::new(
            Client::new(),
            base_url,
            "ANTHROPIC_API_KEY".to_string(),
            Arc::new(credentials),
        )
    }

    #[test]
    fn request_uses_default_max_tokens() {
        let request = to_request(&ChatRequest::user("claude-3-sonnet-20240229", "Hello"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-3-sonnet-20240229",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "Hello"}]
            })
        );
    }

    #[test]
    fn assistant_turns_keep_their_role() {
        let mut request = ChatRequest::user("claude", "Hi");
        request.messages.push(Message {
            role: Role::Assistant,
            content: "Hello!".to_string(),
        });

        let json = serde_json::to_value(to_request(&request)).unwrap();
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn usage_total_saturates() {
        let response: Response = serde_json::from_value(serde_json::json!({
            "id": "msg_3",
            "content": [{"type": "text", "text": "ok"}],
            "usage": {"input_tokens": u32::MAX, "output_tokens": 10}
        }))
        .unwrap();

        let usage = from_response(response).usage.unwrap();
        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn response_joins_text_blocks_only() {
        let response: Response = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "Hello, "},
                {"type": "tool_use", "id": "tu_1", "name": "noop", "input": {}},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 3}
        }))
        .unwrap();

        let converted = from_response(response);
        assert_eq!(converted.usage.as_ref().unwrap().total_tokens, 8);
        assert_eq!(converted.into_reply().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn response_without_text_has_no_reply() {
        let response: Response =
            serde_json::from_value(serde_json::json!({"id": "msg_2", "content": []})).unwrap();
        assert!(from_response(response).into_reply().is_none());
    }

    #[tokio::test]
    async fn sends_api_key_and_version_headers() {
        let (base, recorded) = mock::upstream(
            "/v1/messages",
            StatusCode::OK,
            serde_json::json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "Bonjour"}],
                "stop_reason": "end_turn"
            }),
        )
        .await;

        let creds = StaticCredentials::new().with("ANTHROPIC_API_KEY", "ak-test");
        let response = provider(base, creds)
            .chat(ChatRequest::user("claude-3-sonnet-20240229", "Hello"))
            .await
            .unwrap();
        assert_eq!(response.into_reply().as_deref(), Some("Bonjour"));

        let requests = recorded.requests();
        let (headers, body) = &requests[0];
        assert_eq!(headers["x-api-key"], "ak-test");
        assert_eq!(headers["anthropic-version"], "2023-06-01");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let (base, recorded) =
            mock::upstream("/v1/messages", StatusCode::OK, serde_json::json!({})).await;

        let err = provider(base, StaticCredentials::new())
            .chat(ChatRequest::user("claude", "Hello"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, LLMError::MissingCredential { ref var } if var == "ANTHROPIC_API_KEY")
        );
        assert!(recorded.requests().is_empty());
    }

    #[tokio::test]
    async fn error_body_is_kept() {
        let (base, _) = mock::upstream(
            "/v1/messages",
            StatusCode::BAD_REQUEST,
            serde_json::json!({"type": "error", "error": {"type": "invalid_request_error", "message": "max_tokens: field required"}}),
        )
        .await;

        let creds = StaticCredentials::new().with("ANTHROPIC_API_KEY", "ak-test");
        let err = provider(base, creds)
            .chat(ChatRequest::user("claude", "Hello"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("status 400"));
        assert!(err.to_string().contains("max_tokens: field required"));
    }
}
