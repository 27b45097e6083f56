//! Conversation error taxonomy
//!
//! Every failure a message can hit ends up as one of these and is turned
//! into a single reply by the controller.

use std::time::Duration;

use stepstore::HistoryError;
use thiserror::Error;

use crate::history::HistoryManagerError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    /// The message referred to a build or step that is not available
    #[error(transparent)]
    Validation(#[from] HistoryError),

    /// A collaborator returned no usable result
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The artifact was not ready before the deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A defect on our side, such as the history actor going away
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HistoryManagerError> for BotError {
    fn from(e: HistoryManagerError) -> Self {
        match e {
            HistoryManagerError::Lookup(e) => BotError::Validation(e),
            HistoryManagerError::ChannelError => BotError::Internal("history manager unavailable".to_string()),
        }
    }
}

impl BotError {
    /// Text shown to the person who sent the message
    pub fn user_message(&self) -> String {
        match self {
            BotError::Validation(HistoryError::OutOfWindow { offset, capacity }) => format!(
                "Bob only remembers the last {} build(s), so {} build(s) ago is too far back.",
                capacity, offset
            ),
            BotError::Validation(HistoryError::NoSuchBuild { offset }) => {
                format!("Bob has no build from {} build(s) ago yet.", offset)
            }
            BotError::Validation(HistoryError::StepOutOfRange { step, len }) => {
                format!("That build only has {} step(s); there is no step {}.", len, step)
            }
            BotError::Upstream(what) => format!("Sorry, Bob could not {} right now.", what),
            BotError::Timeout(waited) => {
                format!("The illustration was not ready after {} seconds.", waited.as_secs())
            }
            BotError::Internal(_) => "Something went wrong on Bob's side.".to_string(),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, BotError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_distinct() {
        let out = BotError::from(HistoryError::OutOfWindow { offset: 5, capacity: 2 }).user_message();
        let none = BotError::from(HistoryError::NoSuchBuild { offset: 1 }).user_message();
        let step = BotError::from(HistoryError::StepOutOfRange { step: 9, len: 3 }).user_message();

        assert!(out.contains("last 2 build(s)"));
        assert!(none.contains("no build from 1"));
        assert!(step.contains("no step 9"));
        assert_ne!(out, none);
        assert_ne!(none, step);
    }

    #[test]
    fn test_manager_errors_map() {
        let err = BotError::from(HistoryManagerError::ChannelError);
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "Something went wrong on Bob's side.");

        let err = BotError::from(HistoryManagerError::Lookup(HistoryError::NoSuchBuild { offset: 2 }));
        assert_eq!(err, BotError::Validation(HistoryError::NoSuchBuild { offset: 2 }));
    }

    #[test]
    fn test_timeout_message() {
        let msg = BotError::Timeout(Duration::from_secs(30)).user_message();
        assert!(msg.contains("30 seconds"));
    }
}
