//! Elaboration reference resolution
//!
//! Turns requests like "explain step 2 from the previous build" or
//! "step 3 from 2 builds ago" into a validated `(step, build offset)` pair.
//! Grammars are tried in order and the first match wins; validation is shared.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::{HistoryError, HistoryStore};

static STEP_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstep\s+(\d+)\b").expect("STEP_MENTION regex pattern is valid"));

static ELABORATE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:elaborat\w*|explain\w*|expand\w*)\b").expect("ELABORATE_VERB regex pattern is valid")
});

static RECENT_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:previous|past|last)\b").expect("RECENT_QUALIFIER regex pattern is valid"));

static BUILDS_AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(?:builds?|iterations?|sequences?)\s+ago\b").expect("BUILDS_AGO regex pattern is valid")
});

/// Which grammar recognised the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Grammar {
    /// "elaborate on step N of the previous build"
    MostRecent,
    /// "step N from M builds ago"
    BuildsAgo,
}

/// A parsed but not yet validated elaboration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRequest {
    pub step_index: usize,
    pub build_offset: usize,
    pub grammar: Grammar,
}

/// A reference validated against the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub step_index: usize,
    pub build_offset: usize,
}

/// A validated reference plus the text needed to elaborate on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub reference: Reference,
    /// Text of the referenced step
    pub target: String,
    /// Every step of the referenced build, in order
    pub context: Vec<String>,
}

type Matcher = fn(&str) -> Option<ReferenceRequest>;

/// Grammars in priority order
const GRAMMARS: &[Matcher] = &[match_most_recent, match_builds_ago];

/// Numbers too large for usize are clamped so they fail bounds checks
fn parse_number(digits: &str) -> usize {
    digits.parse().unwrap_or(usize::MAX)
}

fn step_mention(text: &str) -> Option<usize> {
    STEP_MENTION.captures(text).map(|c| parse_number(&c[1]))
}

fn match_most_recent(text: &str) -> Option<ReferenceRequest> {
    if !ELABORATE_VERB.is_match(text) || !RECENT_QUALIFIER.is_match(text) {
        return None;
    }
    let step_index = step_mention(text)?;
    Some(ReferenceRequest {
        step_index,
        build_offset: 1,
        grammar: Grammar::MostRecent,
    })
}

fn match_builds_ago(text: &str) -> Option<ReferenceRequest> {
    let step_index = step_mention(text)?;
    let build_offset = BUILDS_AGO.captures(text).map(|c| parse_number(&c[1]))?;
    Some(ReferenceRequest {
        step_index,
        build_offset,
        grammar: Grammar::BuildsAgo,
    })
}

/// Parse an elaboration request; `None` means the text is not one
pub fn parse(text: &str) -> Option<ReferenceRequest> {
    debug!(text_len = text.len(), "parse: called");
    let request = GRAMMARS.iter().find_map(|matcher| matcher(text));
    debug!(?request, "parse: done");
    request
}

/// Validate a parsed request against the store
///
/// Checks, in order: offset inside the window, build present, step in range.
pub fn resolve(request: &ReferenceRequest, store: &HistoryStore) -> Result<ResolvedReference, HistoryError> {
    debug!(?request, "resolve: called");
    let build = store.get(request.build_offset)?;

    let target = build.step(request.step_index).ok_or(HistoryError::StepOutOfRange {
        step: request.step_index,
        len: build.len(),
    })?;

    Ok(ResolvedReference {
        reference: Reference {
            step_index: request.step_index,
            build_offset: request.build_offset,
        },
        target: target.text.clone(),
        context: build.steps.iter().map(|s| s.text.clone()).collect(),
    })
}

/// Parse then validate; `Ok(None)` means the text is not an elaboration request
pub fn resolve_text(text: &str, store: &HistoryStore) -> Result<Option<ResolvedReference>, HistoryError> {
    match parse(text) {
        Some(request) => resolve(&request, store).map(Some),
        None => Ok(None),
    }
}
