//! BuilderBot - step-by-step build instructions with elaboration
//!
//! Bob answers "Bob, please build me ..." with generated instructions split
//! into addressable steps, remembers the last few builds, elaborates on
//! requests like "explain step 3 from 2 builds ago", and illustrates steps
//! through an asynchronous image service.
//!
//! # Modules
//!
//! - [`session`] - Message classification and the conversation controller
//! - [`history`] - Actor owning the bounded build history
//! - [`llm`] - Text-generation client trait and chat completions implementation
//! - [`image`] - Image-generation client trait, BFL implementation, and poller
//! - [`prompts`] - Prompt templates
//! - [`config`] - Configuration types and loading
//! - [`cli`] / [`repl`] - Command-line interface and interactive chat

pub mod cli;
pub mod config;
pub mod history;
pub mod image;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::{BotConfig, Config, ImageConfig, LlmConfig};
pub use history::{HistoryManager, HistoryManagerError, HistoryStats};
pub use image::{ArtifactPoller, BflClient, ImageClient, ImageError, JobId, JobStatus, PollOutcome};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use prompts::{PromptContext, PromptLoader};
pub use session::{BotError, InboundMessage, Intent, Outcome, ReplyChannel, SessionController};
