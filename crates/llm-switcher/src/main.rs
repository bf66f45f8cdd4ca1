use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use llm_switcher::chat::{ChatLoop, stdin_source};
use llm_switcher::config::{Config, DEFAULT_CONFIG_PATH};
use llm_switcher::llm::{EnvCredentials, ProviderRegistry};

/// Chat with a remote language model from the terminal
#[derive(Parser)]
#[command(name = "llm-switcher")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with OpenAI GPT-4 or Anthropic Claude from the terminal")]
struct Cli {
    /// Model to chat with (gpt-4 or claude)
    #[arg(value_name = "MODEL")]
    model: String,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let dotenv = EnvCredentials::load_dotenv();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let registry = ProviderRegistry::from_config(&config.providers, Arc::new(EnvCredentials));
    let target = registry.select(&cli.model)?;

    let mut input = stdin_source();
    ChatLoop::new(target, config.chat)
        .run(&mut *input, &mut io::stdout(), &mut io::stderr())
        .await?;

    Ok(())
}
