//! Inbound message classification

use stepstore::{ReferenceRequest, parse};
use tracing::debug;
use uuid::Uuid;

use crate::config::BotConfig;

/// A message as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Correlates log lines for one message
    pub id: Uuid,
    pub author: String,
    pub is_bot: bool,
    pub content: String,
}

impl InboundMessage {
    /// Message typed by a person
    pub fn from_user(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            author: author.into(),
            is_bot: false,
            content: content.into(),
        }
    }
}

/// What a message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Ping { arg: Option<String> },
    Build { request: String },
    Illustrate { prompt: String },
    Elaborate(ReferenceRequest),
    Ignored,
}

/// Classify a message
///
/// Order: bots, commands, build trigger, picture trigger, elaboration grammar.
pub fn classify(message: &InboundMessage, config: &BotConfig) -> Intent {
    debug!(id = %message.id, author = %message.author, is_bot = message.is_bot, "classify: called");
    if message.is_bot {
        return Intent::Ignored;
    }

    let content = message.content.trim();

    if !config.command_prefix.is_empty() {
        if let Some(command) = content.strip_prefix(config.command_prefix.as_str()) {
            return classify_command(command);
        }
    }

    if content.starts_with(config.build_trigger.as_str()) {
        return Intent::Build {
            request: content.to_string(),
        };
    }

    if let Some(prompt) = content.strip_prefix(config.picture_trigger.as_str()) {
        return Intent::Illustrate {
            prompt: prompt.trim().to_string(),
        };
    }

    match parse(content) {
        Some(request) => Intent::Elaborate(request),
        None => Intent::Ignored,
    }
}

fn classify_command(command: &str) -> Intent {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    debug!(%name, "classify_command: called");

    match name {
        "ping" => Intent::Ping {
            arg: (!arg.is_empty()).then(|| arg.to_string()),
        },
        _ => Intent::Ignored,
    }
}
