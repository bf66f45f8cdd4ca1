//! OpenAI chat-completions provider.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::credentials::Credentials;
use super::error::{LLMError, api_error, check_response_error, request_error};
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatResponse};

/// OpenAI-compatible provider speaking `POST {base_url}/chat/completions`.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key_env: String,
    credentials: Arc<dyn Credentials>,
}

impl OpenAICompatibleProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

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
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let api_key = self.credentials.lookup(&self.api_key_env).ok_or_else(|| {
            LLMError::MissingCredential {
                var: self.api_key_env.clone(),
            }
        })?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(provider = "openai", model = %request.model, %url, "sending chat request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("openai", e))?;

        if let Some(err) = check_response_error(&response) {
            return Err(err);
        }
        if !response.status().is_success() {
            return Err(api_error("openai", response).await);
        }

        response.json().await.map_err(|e| request_error("openai", e))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::llm::credentials::StaticCredentials;
    use crate::llm::mock;

    fn provider(base_url: String, credentials: StaticCredentials) -> OpenAICompatibleProvider {
        OpenAICompatibleProvider::new(
            Client::new(),
            base_url,
            "OPENAI_API_KEY".to_string(),
            Arc::new(credentials),
        )
    }

    #[tokio::test]
    async fn sends_bearer_token_and_user_message() {
        let (base, recorded) = mock::upstream(
            "/v1/chat/completions",
            StatusCode::OK,
            serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi there"}, "finish_reason": "stop"}]
            }),
        )
        .await;

        let creds = StaticCredentials::new().with("OPENAI_API_KEY", "sk-test");
        let response = provider(format!("{base}/v1"), creds)
            .chat(ChatRequest::user("gpt-4", "Hello"))
            .await
            .unwrap();
        assert_eq!(response.into_reply().as_deref(), Some("Hi there"));

        let requests = recorded.requests();
        assert_eq!(requests.len(), 1);
        let (headers, body) = &requests[0];
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(
            body,
            &serde_json::json!({
                "model": "gpt-4",
                "messages": [{"role": "user", "content": "Hello"}]
            })
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let (base, recorded) =
            mock::upstream("/v1/chat/completions", StatusCode::OK, serde_json::json!({})).await;

        let err = provider(format!("{base}/v1"), StaticCredentials::new())
            .chat(ChatRequest::user("gpt-4", "Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::MissingCredential { ref var } if var == "OPENAI_API_KEY"));
        assert!(recorded.requests().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let (base, _) = mock::upstream(
            "/v1/chat/completions",
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": {"message": "Incorrect API key provided"}}),
        )
        .await;

        let creds = StaticCredentials::new().with("OPENAI_API_KEY", "sk-bad");
        let err = provider(format!("{base}/v1"), creds)
            .chat(ChatRequest::user("gpt-4", "Hello"))
            .await
            .unwrap_err();

        match err {
            LLMError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Incorrect API key provided"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limit() {
        let (base, _) = mock::upstream(
            "/v1/chat/completions",
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({}),
        )
        .await;

        let creds = StaticCredentials::new().with("OPENAI_API_KEY", "sk-test");
        let err = provider(format!("{base}/v1"), creds)
            .chat(ChatRequest::user("gpt-4", "Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::RateLimit { retry_after: None }));
    }
}
