//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Reasonableness check: answers "no" or the thing to build
pub const VERIFY: &str = include_str!("../../prompts/verify.pmt");

/// System prompt for new build instructions
pub const INSTRUCTIONS: &str = include_str!("../../prompts/instructions.pmt");

/// System prompt for elaborating one step
pub const ELABORATION: &str = include_str!("../../prompts/elaboration.pmt");

/// User text for an elaboration: target step, then the whole build
pub const ELABORATION_REQUEST: &str = include_str!("../../prompts/elaboration-request.pmt");

pub const IMAGE_STEP: &str = include_str!("../../prompts/image-step.pmt");

pub const IMAGE_ELABORATION: &str = include_str!("../../prompts/image-elaboration.pmt");

/// Names of every embedded template
pub const TEMPLATE_NAMES: &[&str] = &[
    "verify",
    "instructions",
    "elaboration",
    "elaboration-request",
    "image-step",
    "image-elaboration",
];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let prompt = match name {
        "verify" => VERIFY,
        "instructions" => INSTRUCTIONS,
        "elaboration" => ELABORATION,
        "elaboration-request" => ELABORATION_REQUEST,
        "image-step" => IMAGE_STEP,
        "image-elaboration" => IMAGE_ELABORATION,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(prompt)
}
