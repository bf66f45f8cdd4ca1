//! Provider registry mapping model names to provider clients.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use super::anthropic::AnthropicProvider;
use super::credentials::Credentials;
use super::error::LLMError;
use super::openai::OpenAICompatibleProvider;
use super::provider::{LLMProvider, Provider};
use super::types::ChatRequest;
use crate::config::ProvidersConfig;

/// Errors from provider selection.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

/// Registered provider plus its request settings.
struct Entry {
    implementation: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: Option<u32>,
}

/// Registry of LLM providers, keyed by provider type.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<Entry>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both providers from config. Credentials are looked up when a
    /// provider is invoked, not here.
    pub fn from_config(config: &ProvidersConfig, credentials: Arc<dyn Credentials>) -> Self {
        let client = Client::new();
        let mut registry = Self::new();

        let openai = OpenAICompatibleProvider::new(
            client.clone(),
            config.openai.base_url.clone(),
            config.openai.api_key_env.clone(),
            credentials.clone(),
        );
        registry.register(
            Provider::OpenAI,
            Arc::new(openai),
            config.openai.model.clone(),
            config.openai.max_tokens,
        );

        let anthropic = AnthropicProvider::new(
            client,
            config.anthropic.base_url.clone(),
            config.anthropic.api_key_env.clone(),
            credentials,
        );
        registry.register(
            Provider::Anthropic,
            Arc::new(anthropic),
            config.anthropic.model.clone(),
            Some(config.anthropic.max_tokens),
        );

        info!(
            openai = %config.openai.base_url,
            anthropic = %config.anthropic.base_url,
            "Registered providers"
        );
        registry
    }

    /// Register a provider implementation.
    pub fn register(
        &mut self,
        provider: Provider,
        implementation: Arc<dyn LLMProvider>,
        model: String,
        max_tokens: Option<u32>,
    ) {
        self.providers.insert(
            provider,
            Arc::new(Entry {
                implementation,
                model,
                max_tokens,
            }),
        );
    }

    /// Select a provider by case-insensitive model name.
    pub fn select(&self, name: &str) -> Result<ChatTarget, RegistryError> {
        let provider: Provider = name.parse()?;
        let entry = self
            .providers
            .get(&provider)
            .ok_or_else(|| RegistryError::UnknownModel(name.to_string()))?;

        info!(provider = %provider, model = %entry.model, "Selected provider");
        Ok(ChatTarget {
            provider,
            entry: entry.clone(),
        })
    }
}

/// A selected provider, ready to answer messages.
#[derive(Clone)]
pub struct ChatTarget {
    provider: Provider,
    entry: Arc<Entry>,
}

impl ChatTarget {
    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn display_name(&self) -> &'static str {
        self.provider.display_name()
    }

    pub fn model(&self) -> &str {
        &self.entry.model
    }

    /// Send one user message and return the reply text.
    pub async fn send_message(&self, text: &str) -> Result<String, LLMError> {
        let request =
            ChatRequest::user(self.entry.model.as_str(), text).with_max_tokens(self.entry.max_tokens);
        let response = self.entry.implementation.chat(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                provider = %self.provider,
                id = %response.id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "token usage"
            );
        }
        response.into_reply().ok_or(LLMError::EmptyResponse)
    }
}
