//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{ImageConfig, LlmConfig};

/// BuilderBot - step-by-step build instructions in your terminal
#[derive(Parser)]
#[command(
    name = "bb",
    about = "Ask Bob for build instructions, elaborate on steps, get illustrations",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to chat)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with Bob interactively
    Chat {
        /// Name shown as the message author
        #[arg(short, long, default_value = "you")]
        name: String,
    },

    /// Send a single message and wait for every reply
    Ask {
        /// Message text, e.g. "Bob, please build me a birdhouse"
        message: String,

        /// Name shown as the message author
        #[arg(short, long, default_value = "you")]
        name: String,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("builderbot")
        .join("logs")
        .join("builderbot.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with API key checks and the log location
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let keys = [
        ("text", LlmConfig::default().api_key_env),
        ("image", ImageConfig::default().api_key_env),
    ];

    let mut help = String::new();
    help.push_str("API Keys (default names):\n");
    for (purpose, var) in &keys {
        let set = std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false);
        let icon = if set { "✅".green() } else { "❌".red() };
        help.push_str(&format!("  {} {:<16} {} generation\n", icon, var, purpose));
    }

    help.push_str(&format!("\nLogs are written to: {}", get_log_path().display()));
    help
}
