//! Image generation for BuilderBot
//!
//! An asynchronous submit/poll collaborator, a BFL HTTP adapter, and the
//! deadline-bounded poller that turns a prompt into an artifact URL.

use std::sync::Arc;

mod bfl;
pub mod client;
mod error;
mod poller;

pub use bfl::BflClient;
pub use client::{ImageClient, JobId, JobStatus, Status};
pub use error::ImageError;
pub use poller::{ArtifactPoller, PollOutcome};

use crate::config::ImageConfig;

/// Create the default image client from config
pub fn create_client(config: &ImageConfig) -> Result<Arc<dyn ImageClient>, ImageError> {
    Ok(Arc::new(BflClient::from_config(config)?))
}
