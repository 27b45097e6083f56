//! Build history with actor pattern
//!
//! HistoryManager owns the HistoryStore and processes messages via channels,
//! so concurrent conversation handlers never observe a half-applied push.

mod manager;
mod messages;

pub use manager::HistoryManager;
pub use messages::{HistoryCommand, HistoryManagerError, HistoryResponse, HistoryStats};
