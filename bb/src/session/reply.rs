//! Outgoing replies

use async_trait::async_trait;
use colored::Colorize;
use stepstore::chunk;
use thiserror::Error;
use tracing::debug;

/// Errors delivering a reply
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Reply channel closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where replies to one inbound message go
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Deliver one message; callers keep it within the transport limit
    async fn reply(&self, text: &str) -> Result<(), ReplyError>;
}

/// Send `text` as consecutive fragments of at most `max_chars`
///
/// Returns the number of fragments sent; stops at the first failure.
pub async fn send_chunked(channel: &dyn ReplyChannel, text: &str, max_chars: usize) -> Result<usize, ReplyError> {
    let fragments = chunk(text, max_chars);
    debug!(fragments = fragments.len(), "send_chunked: called");
    for fragment in &fragments {
        channel.reply(fragment).await?;
    }
    Ok(fragments.len())
}

/// Prints replies to the terminal
#[derive(Debug, Clone)]
pub struct ConsoleReply {
    name: String,
}

impl ConsoleReply {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ConsoleReply {
    fn default() -> Self {
        Self::new("bob")
    }
}

#[async_trait]
impl ReplyChannel for ConsoleReply {
    async fn reply(&self, text: &str) -> Result<(), ReplyError> {
        println!("{} {}", format!("{}>", self.name).green().bold(), text);
        Ok(())
    }
}
