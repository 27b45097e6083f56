//! Measurement highlighting for generated instructions

use std::sync::LazyLock;

use regex::Regex;

static UNITS_AND_DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\b\d{1,3}(?:,\d{3})*(?:\.\d+)?\s*(?:-|)(?:inches|inch|in|feet|foot|ft|yards|yd|miles|mile|mi|centimeters|cm|meters|m|kilometers|km)\b|\b\d+x\d+\b)",
    )
    .expect("UNITS_AND_DIMENSIONS regex pattern is valid")
});

/// Bold numbers followed by imperial/metric units and `NxM` dimensions
pub fn bold_units(text: &str) -> String {
    UNITS_AND_DIMENSIONS.replace_all(text, "**${1}**").into_owned()
}
