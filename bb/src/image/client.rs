//! ImageClient trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ImageError;

/// Opaque identifier of a submitted generation job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status string reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Pending,
    Other(String),
}

impl Status {
    pub fn parse(s: &str) -> Self {
        match s {
            "Ready" => Status::Ready,
            "Pending" => Status::Pending,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Ready => "Ready",
            Status::Pending => "Pending",
            Status::Other(s) => s,
        }
    }

    /// Statuses after which the job will never become ready
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Status::Other(s) if matches!(
                s.as_str(),
                "Error" | "Content Moderated" | "Request Moderated" | "Task not found"
            )
        )
    }
}

/// One status query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub status: Status,
    /// Artifact URL, present once the job is ready
    pub sample: Option<String>,
}

impl JobStatus {
    pub fn pending() -> Self {
        Self {
            status: Status::Pending,
            sample: None,
        }
    }

    pub fn ready(url: impl Into<String>) -> Self {
        Self {
            status: Status::Ready,
            sample: Some(url.into()),
        }
    }
}

/// Asynchronous image-generation service
///
/// Submission and status queries are separate so the caller owns the wait.
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Start a generation job for the prompt
    async fn submit(&self, prompt: &str) -> Result<JobId, ImageError>;

    /// Query the current status of a job
    async fn poll(&self, job: &JobId) -> Result<JobStatus, ImageError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("Ready"), Status::Ready);
        assert_eq!(Status::parse("Pending"), Status::Pending);
        assert_eq!(Status::parse("Error"), Status::Other("Error".to_string()));
    }

    #[test]
    fn test_failure_statuses() {
        assert!(Status::parse("Error").is_failure());
        assert!(Status::parse("Content Moderated").is_failure());
        assert!(Status::parse("Request Moderated").is_failure());
        assert!(Status::parse("Task not found").is_failure());
        assert!(!Status::parse("Pending").is_failure());
        assert!(!Status::parse("Queued").is_failure());
        assert!(!Status::Ready.is_failure());
    }
}
