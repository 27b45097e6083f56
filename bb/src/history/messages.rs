//! History manager messages
//!
//! Commands and responses for the actor pattern.

use serde::Serialize;
use stepstore::{Build, HistoryError, ReferenceRequest, ResolvedReference};
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors from history operations
#[derive(Debug, Error)]
pub enum HistoryManagerError {
    #[error(transparent)]
    Lookup(#[from] HistoryError),

    #[error("Channel error")]
    ChannelError,
}

/// Response from history operations
pub type HistoryResponse<T> = Result<T, HistoryManagerError>;

/// Snapshot of the history window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    /// Maximum builds remembered
    pub capacity: usize,
    /// Builds currently held
    pub stored: usize,
    /// Builds pushed since start
    pub pushes: u64,
    /// Steps in the most recent build
    pub most_recent_steps: usize,
}

/// Commands sent to the HistoryManager actor
#[derive(Debug)]
pub enum HistoryCommand {
    Push {
        build: Build,
        reply: oneshot::Sender<HistoryResponse<usize>>,
    },
    Get {
        offset: usize,
        reply: oneshot::Sender<HistoryResponse<Build>>,
    },
    Resolve {
        request: ReferenceRequest,
        reply: oneshot::Sender<HistoryResponse<ResolvedReference>>,
    },
    Stats {
        reply: oneshot::Sender<HistoryResponse<HistoryStats>>,
    },

    // Shutdown
    Shutdown,
}
