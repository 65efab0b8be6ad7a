//! Grammar combinators
//!
//! Small builders over regular-expression fragments, used where a column
//! grammar is easier to read as a composition than as one long pattern.

use phi_common::Result;
use regex::Regex;

/// A regular-expression fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar(String);

impl Grammar {
    /// A raw regular-expression fragment
    pub fn pattern(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }

    /// Text matched literally
    pub fn literal(text: &str) -> Self {
        Self(regex::escape(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compile into a regex that must match the whole value
    pub fn full_match(&self) -> Result<Regex> {
        Ok(Regex::new(&format!("^(?:{})$", self.0))?)
    }
}

/// Each part in order
pub fn seq(parts: &[Grammar]) -> Grammar {
    let body: String = parts.iter().map(|p| format!("(?:{})", p.0)).collect();
    Grammar(body)
}

/// Any one of the options, tried in order
pub fn alt(options: &[Grammar]) -> Grammar {
    let body: Vec<&str> = options.iter().map(Grammar::as_str).collect();
    Grammar(format!("(?:{})", body.join("|")))
}

/// One or more items separated by a literal separator
pub fn sep_by(item: &Grammar, separator: &str) -> Grammar {
    Grammar(format!(
        "(?:{item})(?:{sep}(?:{item}))*",
        item = item.0,
        sep = regex::escape(separator)
    ))
}

/// Zero or one occurrence
pub fn opt(item: &Grammar) -> Grammar {
    Grammar(format!("(?:{})?", item.0))
}

fn chem_id() -> Grammar {
    alt(&[
        Grammar::pattern(r"CHEBI:\d+"),
        Grammar::pattern(r"CAS:\d+-\d+-\d+"),
        Grammar::pattern(r"\d+"),
    ])
}

/// Chemical names: separators only inside parentheses
fn chem_names() -> Grammar {
    sep_by(&Grammar::pattern(r"(?:\([^)]*\)|[^:;,(])+?"), ", ")
}

/// Grammar of `anti-infective` labelled inducer groups
pub fn anti_infective_ids() -> Grammar {
    sep_by(
        &seq(&[
            Grammar::literal("anti-infective: "),
            chem_names(),
            Grammar::literal(": "),
            sep_by(&chem_id(), ", "),
        ]),
        "; ",
    )
}

/// Grammar of a canonical gene inducer ID
///
/// Mirrors the inducer serializer: labelled `anti-infective` groups, groups
/// of names with their IDs, bare ID lists, or name lists. IDs written before
/// any name lead the value.
pub fn inducer_id() -> Grammar {
    let bare_ids = sep_by(&chem_id(), "; ");
    let leading_ids = opt(&seq(&[bare_ids.clone(), Grammar::literal(", ")]));
    let labelled_ids = sep_by(
        &seq(&[chem_names(), Grammar::literal(": "), sep_by(&chem_id(), ", ")]),
        "; ",
    );

    alt(&[
        anti_infective_ids(),
        seq(&[leading_ids.clone(), labelled_ids]),
        bare_ids,
        seq(&[leading_ids, chem_names()]),
    ])
}
