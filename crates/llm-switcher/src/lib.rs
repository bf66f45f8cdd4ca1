//! LLM Switcher - chat with OpenAI GPT-4 or Anthropic Claude from the terminal.

pub mod chat;
pub mod config;
pub mod llm;
