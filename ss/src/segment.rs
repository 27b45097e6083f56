//! Section segmentation
//!
//! Splits generated instruction text into ordered sections. Lines that open a
//! step start a new step section; any other `#### ` heading starts a new
//! preamble section (materials, tools, notes). All remaining lines are kept
//! verbatim in whichever section is currently open.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `#### Step 3: Sand the legs`
static HASH_STEP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#### Step \d+: ").expect("HASH_STEP_HEADER regex pattern is valid"));

/// `3. **Sand the legs**`
static BOLD_STEP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\. \*\*[^*]+?\*\*").expect("BOLD_STEP_HEADER regex pattern is valid"));

/// Prefix of any markdown heading that closes the open section
const SECTION_HEADER_PREFIX: &str = "#### ";

/// One addressable instruction unit within a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position within the owning build
    pub index: usize,
    /// Literal step text, header line included
    pub text: String,
}

/// Whether a section is a step or surrounding material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Preamble,
    Step,
}

/// A contiguous block of the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
}

impl Section {
    pub fn is_step(&self) -> bool {
        self.kind == SectionKind::Step
    }

    /// True when the section holds nothing worth sending
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Result of segmenting one generated response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    sections: Vec<Section>,
}

impl Segmentation {
    /// All sections in source order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Step sections numbered from 1 in the order they appear
    pub fn steps(&self) -> Vec<Step> {
        self.sections
            .iter()
            .filter(|s| s.is_step())
            .enumerate()
            .map(|(i, s)| Step {
                index: i + 1,
                text: s.text.clone(),
            })
            .collect()
    }

    /// Preamble sections (materials, tools, trailing notes)
    pub fn preamble(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| !s.is_step())
    }

    pub fn step_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_step()).count()
    }

    pub fn has_steps(&self) -> bool {
        self.sections.iter().any(Section::is_step)
    }

    /// Rewrite every section's text, keeping section kinds and order
    ///
    /// Boundaries are decided on the source text, so a rewrite that touches
    /// header lines cannot merge or split steps.
    pub fn map_text<F>(self, f: F) -> Segmentation
    where
        F: Fn(&str) -> String,
    {
        let sections = self
            .sections
            .into_iter()
            .map(|section| Section {
                kind: section.kind,
                text: f(&section.text),
            })
            .collect();
        Segmentation { sections }
    }
}

/// Returns true if `line` opens a new step, in either header form
pub fn is_step_boundary(line: &str) -> bool {
    HASH_STEP_HEADER.is_match(line) || BOLD_STEP_HEADER.is_match(line)
}

/// Split `text` into preamble and step sections
///
/// Joining every section's text with `\n` reproduces `text` exactly.
pub fn segment(text: &str) -> Segmentation {
    debug!(text_len = text.len(), "segment: called");
    let mut sections = Vec::new();
    let mut kind = SectionKind::Preamble;
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let step = is_step_boundary(line);
        if step || line.starts_with(SECTION_HEADER_PREFIX) {
            if !current.is_empty() {
                sections.push(Section {
                    kind,
                    text: current.join("\n"),
                });
                current.clear();
            }
            kind = if step { SectionKind::Step } else { SectionKind::Preamble };
        }
        current.push(line);
    }

    if !current.is_empty() {
        sections.push(Section {
            kind,
            text: current.join("\n"),
        });
    }

    let segmentation = Segmentation { sections };
    debug!(
        section_count = segmentation.sections.len(),
        step_count = segmentation.step_count(),
        "segment: done"
    );
    segmentation
}
