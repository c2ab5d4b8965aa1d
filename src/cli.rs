//! Command-line interface definitions for the press_brief server.
//!
//! All options can be provided via command-line flags or environment
//! variables; the OpenRouter key is normally supplied through the
//! environment.

use clap::Parser;

/// Command-line arguments for the press_brief server.
///
/// # Examples
///
/// ```sh
/// # Bind on the default address with the key from the environment
/// OPENROUTER_API_KEY=sk-... press_brief
///
/// # Custom bind address and model
/// press_brief --bind 0.0.0.0:9000 --model qwen/qwen3-235b-a22b-2507
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Address the HTTP server listens on
    #[arg(long, env = "PRESS_BRIEF_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// API key for the OpenRouter chat-completion API
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: String,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = "https://openrouter.ai/api/v1")]
    pub api_base: String,

    /// Model used for summarization
    #[arg(long, env = "PRESS_BRIEF_MODEL", default_value = "qwen/qwen3-235b-a22b-2507")]
    pub model: String,

    /// Politeness delay between listing-page fetches, in milliseconds
    #[arg(long, env = "PRESS_BRIEF_PAGE_DELAY_MS", default_value_t = 1000)]
    pub page_delay_ms: u64,
}
