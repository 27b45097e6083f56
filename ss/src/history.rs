//! Bounded build history
//!
//! A fixed-capacity ring of the most recent builds, addressed by recency
//! offset (1 = most recent). Pushing past capacity overwrites the oldest build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::segment::{Segmentation, Step};

/// Errors from addressing the history
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("offset {offset} is outside the history window (1..={capacity})")]
    OutOfWindow { offset: usize, capacity: usize },

    #[error("no build recorded {offset} build(s) ago")]
    NoSuchBuild { offset: usize },

    #[error("step {step} is out of range; that build has {len} step(s)")]
    StepOutOfRange { step: usize, len: usize },
}

/// The ordered steps produced by one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

impl Build {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            created_at: Utc::now(),
        }
    }

    pub fn from_segmentation(segmentation: &Segmentation) -> Self {
        Self::new(segmentation.steps())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step by 1-based index
    pub fn step(&self, index: usize) -> Option<&Step> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }
}

/// Fixed-capacity ring of recent builds
#[derive(Debug, Clone)]
pub struct HistoryStore {
    slots: Vec<Option<Build>>,
    head: usize,
    pushes: u64,
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` builds
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        debug!(capacity, "HistoryStore::new: called");
        Self {
            slots: vec![None; capacity],
            head: 0,
            pushes: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently holding a build
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pushes == 0
    }

    /// Total pushes since creation
    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    /// Record a build as the most recent, evicting the oldest when full
    pub fn push(&mut self, build: Build) {
        debug!(head = self.head, steps = build.len(), "HistoryStore::push: called");
        let capacity = self.capacity();
        self.slots[self.head] = Some(build);
        self.head = (self.head + 1) % capacity;
        self.pushes += 1;
    }

    /// Build written `offset` pushes ago
    pub fn get(&self, offset: usize) -> Result<&Build, HistoryError> {
        debug!(offset, "HistoryStore::get: called");
        let capacity = self.capacity();
        if offset == 0 || offset > capacity {
            return Err(HistoryError::OutOfWindow { offset, capacity });
        }
        if (offset as u64) > self.pushes {
            return Err(HistoryError::NoSuchBuild { offset });
        }

        let slot = (self.head + capacity - offset) % capacity;
        self.slots[slot].as_ref().ok_or(HistoryError::NoSuchBuild { offset })
    }

    /// Step count of the most recent build, 0 when empty
    pub fn most_recent_step_count(&self) -> usize {
        self.get(1).map(Build::len).unwrap_or(0)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(crate::DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(tag: &str, count: usize) -> Build {
        Build::new(
            (1..=count)
                .map(|index| Step {
                    index,
                    text: format!("#### Step {}: {}", index, tag),
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_store() {
        let store = HistoryStore::new(2);
        assert_eq!(store.capacity(), 2);
        assert!(store.is_empty());
        assert_eq!(store.most_recent_step_count(), 0);
        assert_eq!(store.get(1), Err(HistoryError::NoSuchBuild { offset: 1 }));
    }

    #[test]
    fn test_get_recency_order() {
        let mut store = HistoryStore::new(3);
        store.push(build("a", 1));
        store.push(build("b", 2));
        assert_eq!(store.get(1).unwrap().len(), 2);
        assert_eq!(store.get(2).unwrap().len(), 1);
        assert_eq!(store.get(3), Err(HistoryError::NoSuchBuild { offset: 3 }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_wraps_after_capacity() {
        let builds: Vec<Build> = (1..=5).map(|n| build(&format!("b{}", n), n)).collect();
        let mut store = HistoryStore::new(2);
        for b in &builds {
            store.push(b.clone());
        }

        assert_eq!(store.get(1).unwrap(), &builds[4]);
        assert_eq!(store.get(2).unwrap(), &builds[3]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.pushes(), 5);
    }

    #[test]
    fn test_out_of_window() {
        let mut store = HistoryStore::new(2);
        store.push(build("a", 1));
        assert_eq!(
            store.get(3),
            Err(HistoryError::OutOfWindow { offset: 3, capacity: 2 })
        );
        assert_eq!(
            store.get(0),
            Err(HistoryError::OutOfWindow { offset: 0, capacity: 2 })
        );
    }

    #[test]
    fn test_most_recent_step_count() {
        let mut store = HistoryStore::new(2);
        store.push(build("a", 4));
        assert_eq!(store.most_recent_step_count(), 4);
        store.push(build("b", 0));
        assert_eq!(store.most_recent_step_count(), 0);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let mut store = HistoryStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.push(build("a", 2));
        store.push(build("b", 3));
        assert_eq!(store.get(1).unwrap().len(), 3);
    }

    #[test]
    fn test_build_step_lookup() {
        let b = build("a", 3);
        assert_eq!(b.step(1).unwrap().index, 1);
        assert!(b.step(0).is_none());
        assert!(b.step(4).is_none());
    }
}
