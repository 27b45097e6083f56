//! Conversation handling
//!
//! Classifies inbound messages, runs builds and elaborations against the
//! collaborators, and turns every outcome into replies.

mod controller;
mod error;
mod intent;
pub mod reply;

pub use controller::{NOT_REASONABLE, Outcome, SessionController, representative_steps};
pub use error::BotError;
pub use intent::{InboundMessage, Intent, classify};
pub use reply::{ConsoleReply, ReplyChannel, ReplyError, send_chunked};
