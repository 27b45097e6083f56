//! SessionController - turns one inbound message into replies
//!
//! Owns no state of its own: builds live in the HistoryManager, so any number
//! of messages can be handled concurrently with a cloned controller.

use std::sync::Arc;

use futures::future::join_all;
use stepstore::{Build, Reference, ReferenceRequest, Segmentation, bold_units, segment};
use tracing::{debug, error, info, warn};

use super::error::BotError;
use super::intent::{InboundMessage, Intent, classify};
use super::reply::{ReplyChannel, send_chunked};
use crate::config::BotConfig;
use crate::history::HistoryManager;
use crate::image::{ArtifactPoller, PollOutcome};
use crate::llm::{LlmClient, generate_text};
use crate::prompts::PromptLoader;

/// Reply when the reasonableness check says no
pub const NOT_REASONABLE: &str = "Your request to Bob was not reasonable.";

/// What handling a message amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Pong,
    /// The picture trigger arrived without a description
    Usage,
    /// The reasonableness check refused the request
    Rejected,
    Built {
        steps: usize,
        illustrations: Vec<(usize, PollOutcome)>,
    },
    Elaborated {
        reference: Reference,
        target: String,
        illustration: Option<PollOutcome>,
    },
    Illustrated(PollOutcome),
    Failed(BotError),
}

/// Handles conversation turns against shared collaborators
#[derive(Clone)]
pub struct SessionController {
    llm: Arc<dyn LlmClient>,
    poller: ArtifactPoller,
    history: HistoryManager,
    prompts: Arc<PromptLoader>,
    config: BotConfig,
    max_tokens: u32,
}

impl SessionController {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        poller: ArtifactPoller,
        history: HistoryManager,
        prompts: Arc<PromptLoader>,
        config: BotConfig,
        max_tokens: u32,
    ) -> Self {
        debug!(?config, %max_tokens, "SessionController::new: called");
        Self {
            llm,
            poller,
            history,
            prompts,
            config,
            max_tokens,
        }
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Handle one inbound message
    ///
    /// Never fails: every error becomes a single explanatory reply and an
    /// `Outcome::Failed`.
    pub async fn handle(&self, message: &InboundMessage, reply: &dyn ReplyChannel) -> Outcome {
        debug!(id = %message.id, author = %message.author, content_len = message.content.len(), "handle: called");
        let intent = classify(message, &self.config);

        let result = match intent {
            Intent::Ignored => return Outcome::Ignored,
            Intent::Ping { arg } => self.ping(arg, reply).await,
            Intent::Build { request } => {
                info!("Processing build request from {}: {}", message.author, request);
                self.build(&request, reply).await
            }
            Intent::Illustrate { prompt } => self.illustrate(&prompt, reply).await,
            Intent::Elaborate(request) => {
                info!("Processing elaboration request from {}: {:?}", message.author, request);
                self.elaborate(request, reply).await
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_internal() {
                    error!(id = %message.id, error = %e, "handle: internal failure");
                } else {
                    info!(id = %message.id, error = %e, "handle: request failed");
                }
                self.send(reply, &e.user_message()).await;
                Outcome::Failed(e)
            }
        }
    }

    async fn ping(&self, arg: Option<String>, reply: &dyn ReplyChannel) -> Result<Outcome, BotError> {
        let text = match arg {
            Some(arg) => format!("Pong! Your argument was {}", arg),
            None => "Pong!".to_string(),
        };
        self.send(reply, &text).await;
        Ok(Outcome::Pong)
    }

    async fn build(&self, request: &str, reply: &dyn ReplyChannel) -> Result<Outcome, BotError> {
        debug!("build: called");
        let verify = self.prompts.verify_prompt().map_err(internal)?;
        let verdict = generate_text(&self.llm, &verify, request, self.max_tokens)
            .await
            .ok_or_else(|| BotError::Upstream("check that request".to_string()))?;

        let Some(thing) = thing_to_build(&verdict) else {
            debug!(%verdict, "build: request rejected");
            self.send(reply, NOT_REASONABLE).await;
            return Ok(Outcome::Rejected);
        };

        self.send(reply, &format!("Generating instructions for building {}...", thing))
            .await;

        let system = self.prompts.instructions_prompt().map_err(internal)?;
        let instructions = generate_text(&self.llm, &system, request, self.max_tokens)
            .await
            .ok_or_else(|| BotError::Upstream("generate instructions".to_string()))?;

        let segmentation = segment(&instructions).map_text(bold_units);
        let build = Build::from_segmentation(&segmentation);
        let steps: Vec<String> = build.steps.iter().map(|s| s.text.clone()).collect();

        // Recorded before any reply so history never depends on delivery
        self.history.push(build).await?;
        info!(steps = steps.len(), "Recorded build");

        self.send_sections(&segmentation, reply).await;

        let illustrations = if self.config.illustrate_builds {
            self.illustrate_steps(&steps, reply).await
        } else {
            Vec::new()
        };

        Ok(Outcome::Built {
            steps: steps.len(),
            illustrations,
        })
    }

    async fn elaborate(&self, request: ReferenceRequest, reply: &dyn ReplyChannel) -> Result<Outcome, BotError> {
        debug!(?request, "elaborate: called");
        let resolved = self.history.resolve(request).await?;
        let reference = resolved.reference;

        self.send(
            reply,
            &format!(
                "Elaborating on step {}, {} build(s) ago...",
                reference.step_index, reference.build_offset
            ),
        )
        .await;

        let system = self.prompts.elaboration_prompt().map_err(internal)?;
        let user = self
            .prompts
            .elaboration_request(&resolved.target, &resolved.context)
            .map_err(internal)?;
        let elaboration = generate_text(&self.llm, &system, &user, self.max_tokens)
            .await
            .ok_or_else(|| BotError::Upstream("elaborate on that step".to_string()))?;

        self.send_sections(&segment(&elaboration).map_text(bold_units), reply).await;

        let illustration = if self.config.illustrate_builds {
            let prompt = self.prompts.image_elaboration(&resolved.target).map_err(internal)?;
            let outcome = self.poller.generate(&prompt).await;
            self.send(reply, &illustration_notice(&format!("Step {}", reference.step_index), &outcome))
                .await;
            Some(outcome)
        } else {
            None
        };

        Ok(Outcome::Elaborated {
            reference,
            target: resolved.target,
            illustration,
        })
    }

    async fn illustrate(&self, prompt: &str, reply: &dyn ReplyChannel) -> Result<Outcome, BotError> {
        debug!(prompt_len = prompt.len(), "illustrate: called");
        if prompt.is_empty() {
            self.send(reply, &format!("Usage: {} <description>", self.config.picture_trigger))
                .await;
            return Ok(Outcome::Usage);
        }

        self.send(reply, &format!("Drawing {}...", prompt)).await;
        let outcome = self.poller.generate(prompt).await;
        self.send(reply, &illustration_notice("Illustration", &outcome)).await;
        Ok(Outcome::Illustrated(outcome))
    }

    /// Illustrate representative steps concurrently, replying as each finishes
    async fn illustrate_steps(&self, steps: &[String], reply: &dyn ReplyChannel) -> Vec<(usize, PollOutcome)> {
        let picks = representative_steps(steps.len(), self.config.max_illustrations);
        debug!(?picks, "illustrate_steps: called");

        let jobs = picks.into_iter().map(|index| async move {
            let outcome = match self.prompts.image_step(&steps[index - 1]) {
                Ok(prompt) => self.poller.generate(&prompt).await,
                Err(e) => PollOutcome::Failed { reason: e.to_string() },
            };
            self.send(reply, &illustration_notice(&format!("Step {}", index), &outcome))
                .await;
            (index, outcome)
        });

        join_all(jobs).await
    }

    /// Send every non-blank section, chunked, in order
    async fn send_sections(&self, segmentation: &Segmentation, reply: &dyn ReplyChannel) {
        for section in segmentation.sections().iter().filter(|s| !s.is_blank()) {
            if let Err(e) = send_chunked(reply, &section.text, self.config.max_message_chars).await {
                warn!(error = %e, "send_sections: reply failed");
                return;
            }
        }
    }

    async fn send(&self, reply: &dyn ReplyChannel, text: &str) {
        if let Err(e) = send_chunked(reply, text, self.config.max_message_chars).await {
            warn!(error = %e, "send: reply failed");
        }
    }
}

fn internal(e: eyre::Report) -> BotError {
    BotError::Internal(e.to_string())
}

/// The thing to build named by a verdict, or `None` for a refusal
fn thing_to_build(verdict: &str) -> Option<String> {
    let thing = verdict.trim();
    let thing = thing.strip_prefix("Response:").unwrap_or(thing);
    let thing = thing.trim().trim_matches(|c| c == '"' || c == '.').trim();

    if thing.is_empty() || thing.eq_ignore_ascii_case("no") {
        None
    } else {
        Some(thing.to_string())
    }
}

/// First, middle and last step indexes (1-based), deduplicated, at most `max`
///
/// Under a smaller limit the first and last steps win over the middle one.
pub fn representative_steps(len: usize, max: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let mut picks: Vec<usize> = Vec::with_capacity(3);
    for index in [1, len, len.div_ceil(2)] {
        if !picks.contains(&index) {
            picks.push(index);
        }
    }
    picks.truncate(max);
    picks.sort_unstable();
    picks
}

fn illustration_notice(label: &str, outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Ready { url } => format!("{}: {}", label, url),
        PollOutcome::Failed { reason } => {
            let err = BotError::Upstream(format!("illustrate this ({})", reason));
            format!("{}: {}", label, err.user_message())
        }
        PollOutcome::TimedOut { waited } => format!("{}: {}", label, BotError::Timeout(*waited).user_message()),
    }
}
