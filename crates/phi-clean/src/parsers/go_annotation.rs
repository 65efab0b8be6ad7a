//! GO annotation parser

use phi_common::Result;
use regex::Regex;

/// Evidence codes accepted after a GO ID
pub const EVIDENCE_CODES: &[&str] = &["IDA", "IEA", "IGI", "IMP", "IPI", "ISS", "NAS", "ND", "TAS"];

/// Extracts `GO:<7 digits>` IDs with their optional evidence codes
///
/// The ID width is fixed, so an over-long ID contributes its first seven
/// digits.
pub struct GoAnnotationParser {
    pattern: Regex,
}

impl GoAnnotationParser {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(?P<go_id>GO:\d{{7}})(?:[,;]\s*(?P<evidence>{}))?",
            EVIDENCE_CODES.join("|")
        ))?;
        Ok(Self { pattern })
    }

    /// Rewrite a value as `GO:id[, code]; ...`, keeping it when nothing matches
    pub fn parse(&self, value: &str) -> String {
        let annotations: Vec<String> = self
            .pattern
            .captures_iter(value)
            .filter_map(|caps| {
                let id = caps.name("go_id")?.as_str();
                Some(match caps.name("evidence") {
                    Some(code) => format!("{}, {}", id, code.as_str()),
                    None => id.to_string(),
                })
            })
            .collect();

        if annotations.is_empty() {
            value.to_string()
        } else {
            annotations.join("; ")
        }
    }
}
