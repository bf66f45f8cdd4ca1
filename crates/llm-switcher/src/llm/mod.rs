//! LLM provider clients and the registry that selects between them.

mod anthropic;
mod credentials;
mod error;
mod openai;
mod provider;
mod registry;
mod types;

pub use anthropic::AnthropicProvider;
pub use credentials::{Credentials, EnvCredentials, StaticCredentials};
pub use error::LLMError;
pub use openai::OpenAICompatibleProvider;
pub use provider::{LLMProvider, Provider};
pub use registry::{ChatTarget, ProviderRegistry, RegistryError};
pub use types::{ChatRequest, ChatResponse, Choice, Message, Role, Usage};
