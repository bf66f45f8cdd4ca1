//! Credential lookup, consulted each time a provider is invoked.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Process-wide source of API keys.
pub trait Credentials: Send + Sync {
    /// Look up a credential by variable name. Empty values count as missing.
    fn lookup(&self, var: &str) -> Option<String>;
}

/// Reads credentials from environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// Load `.env` from the working directory or its parents into the process
    /// environment. Variables already set are kept. Returns the file loaded.
    pub fn load_dotenv() -> Option<PathBuf> {
        dotenvy::dotenv().ok()
    }

    /// Load a specific env file. Variables already set are kept.
    pub fn load_dotenv_from(path: impl AsRef<Path>) -> Result<(), dotenvy::Error> {
        dotenvy::from_path(path)
    }
}

impl Credentials for EnvCredentials {
    fn lookup(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed set of credentials, for embedding and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(var.into(), value.into());
        self
    }
}

impl Credentials for StaticCredentials {
    fn lookup(&self, var: &str) -> Option<String> {
        self.values.get(var).filter(|v| !v.is_empty()).cloned()
    }
}
