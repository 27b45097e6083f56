use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use builderbot::cli::{Cli, Command, generate_after_help};
use builderbot::config::Config;
use builderbot::history::HistoryManager;
use builderbot::image::{self, ArtifactPoller};
use builderbot::llm;
use builderbot::prompts::PromptLoader;
use builderbot::repl::ChatSession;
use builderbot::session::{ConsoleReply, InboundMessage, Outcome, SessionController};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("builderbot")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("builderbot.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Wire collaborators into a controller
fn build_controller(config: &Config) -> Result<SessionController> {
    debug!("build_controller: called");
    config.validate().context("Invalid configuration")?;

    let llm = llm::create_client(&config.llm).context("Failed to create LLM client")?;
    let image_client = image::create_client(&config.image).context("Failed to create image client")?;
    let poller = ArtifactPoller::from_config(image_client, &config.image);
    let history = HistoryManager::spawn(config.bot.history_capacity);
    let prompts = Arc::new(PromptLoader::new(config.bot.prompts_dir.as_deref()));

    Ok(SessionController::new(
        llm,
        poller,
        history,
        prompts,
        config.bot.clone(),
        config.llm.max_tokens,
    ))
}

async fn cmd_chat(config: &Config, name: String) -> Result<()> {
    debug!(%name, "cmd_chat: called");
    let controller = build_controller(config)?;
    let history = controller.history().clone();

    ChatSession::new(controller, name).run().await?;

    history.shutdown().await.ok();
    Ok(())
}

async fn cmd_ask(config: &Config, message: String, name: String) -> Result<()> {
    debug!(%name, "cmd_ask: called");
    let controller = build_controller(config)?;

    let message = InboundMessage::from_user(name, message);
    let outcome = controller.handle(&message, &ConsoleReply::default()).await;
    info!(?outcome, "cmd_ask: handled");

    controller.history().shutdown().await.ok();

    match outcome {
        Outcome::Ignored => {
            println!(
                "{} Bob only answers \"{}...\", \"{}...\", elaboration requests and commands.",
                "?".yellow(),
                config.bot.build_trigger,
                config.bot.picture_trigger
            );
            Ok(())
        }
        Outcome::Failed(e) if e.is_internal() => Err(eyre::eyre!(e)),
        _ => Ok(()),
    }
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "BuilderBot loaded config: provider={} model={}",
        config.llm.provider, config.llm.model
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_chat(&config, "you".to_string()).await,
        Some(Command::Chat { name }) => cmd_chat(&config, name).await,
        Some(Command::Ask { message, name }) => cmd_ask(&config, message, name).await,
        Some(Command::Config) => cmd_config(&config),
    }
}
