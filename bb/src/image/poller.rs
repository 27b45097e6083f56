//! Artifact poller
//!
//! Drives one generation job from submission to a terminal outcome: sleep an
//! interval, query status, repeat until ready, failed, or the deadline passes.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{ImageClient, JobId, Status};
use crate::config::ImageConfig;

/// Terminal state of a job wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { url: String },
    Failed { reason: String },
    TimedOut { waited: Duration },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }
}

/// Submits prompts and waits for their artifacts
#[derive(Clone)]
pub struct ArtifactPoller {
    client: Arc<dyn ImageClient>,
    interval: Duration,
    deadline: Duration,
}

impl ArtifactPoller {
    pub fn new(client: Arc<dyn ImageClient>, interval: Duration, deadline: Duration) -> Self {
        Self {
            client,
            interval,
            deadline,
        }
    }

    pub fn from_config(client: Arc<dyn ImageClient>, config: &ImageConfig) -> Self {
        Self::new(client, config.poll_interval(), config.deadline())
    }

    /// Submit a prompt and wait for its artifact
    ///
    /// A submit failure is terminal and reported without polling.
    pub async fn generate(&self, prompt: &str) -> PollOutcome {
        debug!(prompt_len = prompt.len(), "generate: called");
        match self.client.submit(prompt).await {
            Ok(job) => self.wait(&job).await,
            Err(e) => {
                warn!(error = %e, "generate: submit failed");
                PollOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    /// Wait for an already submitted job, bounded by the deadline
    pub async fn wait(&self, job: &JobId) -> PollOutcome {
        debug!(%job, ?self.interval, ?self.deadline, "wait: called");
        let started = Instant::now();

        match tokio::time::timeout(self.deadline, self.poll_until_terminal(job)).await {
            Ok(outcome) => {
                info!(%job, ready = outcome.is_ready(), elapsed = ?started.elapsed(), "Job finished");
                outcome
            }
            Err(_) => {
                let waited = started.elapsed();
                info!(%job, ?waited, "Job timed out");
                PollOutcome::TimedOut { waited }
            }
        }
    }

    async fn poll_until_terminal(&self, job: &JobId) -> PollOutcome {
        let mut attempt = 0u32;
        loop {
            tokio::time::sleep(self.interval).await;
            attempt += 1;

            let status = match self.client.poll(job).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(%job, attempt, error = %e, "poll_until_terminal: status query failed");
                    return PollOutcome::Failed { reason: e.to_string() };
                }
            };
            debug!(%job, attempt, status = ?status.status, "poll_until_terminal: status");

            match status.status {
                Status::Ready => {
                    return match status.sample {
                        Some(url) => PollOutcome::Ready { url },
                        None => PollOutcome::Failed {
                            reason: "job reported ready without a sample".to_string(),
                        },
                    };
                }
                ref s if s.is_failure() => {
                    return PollOutcome::Failed {
                        reason: s.as_str().to_string(),
                    };
                }
                _ => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::client::mock::MockImageClient;
    use crate::image::JobStatus;

    fn poller(client: Arc<MockImageClient>, interval_ms: u64, deadline_ms: u64) -> ArtifactPoller {
        ArtifactPoller::new(
            client,
            Duration::from_millis(interval_ms),
            Duration::from_millis(deadline_ms),
        )
    }

    #[tokio::test]
    async fn test_ready_after_three_intervals() {
        let client = Arc::new(MockImageClient::new(vec![
            JobStatus::pending(),
            JobStatus::pending(),
            JobStatus::ready("https://cdn.example/a.jpg"),
        ]));
        let outcome = poller(client.clone(), 10, 2_000).generate("a chair").await;

        assert_eq!(
            outcome,
            PollOutcome::Ready {
                url: "https://cdn.example/a.jpg".to_string()
            }
        );
        assert_eq!(client.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_never_ready_times_out() {
        let client = Arc::new(MockImageClient::new(vec![JobStatus::pending()]));
        let outcome = poller(client.clone(), 10, 60).generate("a chair").await;

        match outcome {
            PollOutcome::TimedOut { waited } => assert!(waited >= Duration::from_millis(60)),
            other => panic!("expected TimedOut, got {:?}", other),
        }
        assert!(client.poll_count() >= 1);
    }

    #[tokio::test]
    async fn test_moderated_is_failed() {
        let client = Arc::new(MockImageClient::new(vec![
            JobStatus::pending(),
            JobStatus {
                status: Status::Other("Content Moderated".to_string()),
                sample: None,
            },
        ]));
        let outcome = poller(client, 5, 2_000).generate("x").await;
        assert_eq!(
            outcome,
            PollOutcome::Failed {
                reason: "Content Moderated".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let client = Arc::new(MockImageClient::new(vec![
            JobStatus {
                status: Status::Other("Queued".to_string()),
                sample: None,
            },
            JobStatus::ready("https://cdn.example/b.jpg"),
        ]));
        let outcome = poller(client.clone(), 5, 2_000).generate("x").await;
        assert!(outcome.is_ready());
        assert_eq!(client.poll_count(), 2);
    }

    #[tokio::test]
    async fn test_ready_without_sample_is_failed() {
        let client = Arc::new(MockImageClient::new(vec![JobStatus {
            status: Status::Ready,
            sample: None,
        }]));
        let outcome = poller(client, 5, 2_000).generate("x").await;
        assert!(matches!(outcome, PollOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_submit_failure_skips_polling() {
        let client = Arc::new(MockImageClient::failing_submit());
        let outcome = poller(client.clone(), 5, 2_000).generate("x").await;
        assert!(matches!(outcome, PollOutcome::Failed { .. }));
        assert_eq!(client.poll_count(), 0);
    }
}
