//! LLM provider trait and the fixed set of supported providers.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use super::error::LLMError;
use super::registry::RegistryError;
use super::types::{ChatRequest, ChatResponse};

/// Trait for LLM providers with different API formats.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Make a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError>;
}

/// Supported providers, keyed by the model name given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAI, Provider::Anthropic];

    /// Identifier accepted on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4",
            Provider::Anthropic => "claude",
        }
    }

    /// Human-readable name used in the banner and reply prefix.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI GPT-4.0",
            Provider::Anthropic => "Claude 3 (Anthropic)",
        }
    }

    /// Environment variable holding the provider's API key by default.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or_else(|| RegistryError::UnknownModel(s.to_string()))
    }
}
