//! Casing normalizer
//!
//! Lowercases free-text columns. Columns with an exclusion list are handled
//! word by word so gene symbols, chemical formulas and organism names keep
//! their casing. The rules live in `resources/casing.toml`.

use phi_common::types::{Cell, Table};
use phi_common::{PhiError, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Casing rules shipped with the crate
pub const DEFAULT_CASING: &str = include_str!("../resources/casing.toml");

const SEPARATORS: &str = r"\s+|[()\[\]:;,./-]";

// ============================================================================
// Rule Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CasingColumn {
    pub name: String,
    /// Words kept as written; an empty list lowercases the whole value
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// Substitution applied after a column has been lowercased
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fixup {
    pub column: String,
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiseaseWords {
    #[serde(default)]
    pub title_case: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TissueWords {
    #[serde(default)]
    pub lowercase: Vec<String>,
}

/// The deserialized casing rules
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CasingRules {
    #[serde(default)]
    pub columns: Vec<CasingColumn>,
    #[serde(default)]
    pub fixups: Vec<Fixup>,
    #[serde(default)]
    pub disease: DiseaseWords,
    #[serde(default)]
    pub tissue: TissueWords,
}

impl CasingRules {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PhiError::rules(format!("casing: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CASING)
    }
}

// ============================================================================
// Casing Normalizer
// ============================================================================

struct ColumnCasing {
    name: String,
    /// `None` lowercases the whole value
    exclusions: Option<Regex>,
}

pub struct CasingNormalizer {
    columns: Vec<ColumnCasing>,
    fixups: Vec<(String, Regex, String)>,
    separators: Regex,
    disease_titles: Option<Regex>,
    tissue_words: Option<Regex>,
}

/// `\b(?:w1|w2|...)\b`, or `None` for an empty list
fn word_alternation(words: &[String], anchored: bool) -> Result<Option<Regex>> {
    if words.is_empty() {
        return Ok(None);
    }
    let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    let anchor = if anchored { "^" } else { "" };
    let pattern = format!(r"{}\b(?:{})\b", anchor, escaped.join("|"));
    Ok(Some(Regex::new(&pattern)?))
}

/// Whether a word looks like a gene symbol or identifier
///
/// True unless the word starts with `A-Z` followed by a lowercase letter or
/// another word character outside `0-9A-Z`.
fn looks_like_symbol(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => match chars.next() {
            None => true,
            Some(next) => {
                next.is_ascii_digit()
                    || next.is_ascii_uppercase()
                    || next == '-'
                    || !(next.is_alphanumeric() || next == '_')
            }
        },
        _ => true,
    }
}

fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl CasingNormalizer {
    pub fn new(rules: &CasingRules) -> Result<Self> {
        let columns = rules
            .columns
            .iter()
            .map(|column| {
                Ok(ColumnCasing {
                    name: column.name.clone(),
                    exclusions: word_alternation(&column.exclusions, true)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let fixups = rules
            .fixups
            .iter()
            .map(|f| Ok((f.column.clone(), Regex::new(&f.pattern)?, f.replacement.clone())))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            columns,
            fixups,
            separators: Regex::new(SEPARATORS)?,
            disease_titles: word_alternation(&rules.disease.title_case, false)?,
            tissue_words: word_alternation(&rules.tissue.lowercase, false)?,
        })
    }

    /// Lowercase one value word by word, keeping excluded words and symbols
    pub fn case_words(&self, value: &str, exclusions: &Regex) -> String {
        let mut cased = String::with_capacity(value.len());
        let mut last = 0;

        for separator in self.separators.find_iter(value) {
            self.push_word(&mut cased, &value[last..separator.start()], exclusions);
            cased.push_str(separator.as_str());
            last = separator.end();
        }
        self.push_word(&mut cased, &value[last..], exclusions);
        cased
    }

    fn push_word(&self, out: &mut String, word: &str, exclusions: &Regex) {
        if word.is_empty() {
            return;
        }
        if exclusions.is_match(word) || looks_like_symbol(word) {
            out.push_str(word);
        } else {
            out.push_str(&lowercase_first(word));
        }
    }

    /// Apply the column casing rules and fix-ups
    pub fn apply(&self, table: &mut Table) {
        for casing in &self.columns {
            let Some(column) = table.column_mut(&casing.name) else {
                debug!(column = %casing.name, "Skipped casing for absent column");
                continue;
            };
            match &casing.exclusions {
                Some(exclusions) => {
                    column.map_text(|value| Cell::text(self.case_words(value, exclusions)))
                }
                None => column.map_text(|value| Cell::text(value.to_lowercase())),
            }
        }

        for (name, pattern, replacement) in &self.fixups {
            if let Some(column) = table.column_mut(name) {
                column.map_text(|value| {
                    Cell::text(pattern.replace_all(value, replacement.as_str()))
                });
            }
        }

        info!(columns = self.columns.len(), "Normalized casing");
    }

    /// Lowercase disease names, then title-case the listed words
    pub fn format_disease(&self, table: &mut Table) {
        let Some(column) = table.column_mut("disease") else {
            return;
        };
        column.map_text(|value| {
            let lower = value.to_lowercase();
            match &self.disease_titles {
                Some(words) => Cell::text(
                    words.replace_all(&lower, |caps: &Captures| title_case(&caps[0])),
                ),
                None => Cell::text(lower),
            }
        });
    }

    /// Lowercase tissue words entered in title case
    pub fn format_tissue(&self, table: &mut Table) {
        let (Some(column), Some(words)) = (table.column_mut("tissue"), &self.tissue_words) else {
            return;
        };
        column.map_text(|value| {
            Cell::text(words.replace_all(value, |caps: &Captures| caps[0].to_lowercase()))
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use phi_common::types::Header;

    fn normalizer() -> CasingNormalizer {
        CasingNormalizer::new(&CasingRules::embedded().unwrap()).unwrap()
    }

    fn exclusions(words: &[&str]) -> Regex {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        word_alternation(&words, true).unwrap().unwrap()
    }

    fn single(key: &str, value: &str) -> Table {
        Table::from_rows(vec![Header::single(key)], vec![vec![Cell::text(value)]]).unwrap()
    }

    fn first(table: &Table, key: &str) -> Cell {
        table.column(key).unwrap().values()[0].clone()
    }

    #[test]
    fn test_excluded_word_keeps_casing() {
        let n = normalizer();
        let ex = exclusions(&["AbaA"]);
        assert_eq!(n.case_words("AbaA Pathway regulator", &ex), "AbaA pathway regulator");
    }

    #[test]
    fn test_symbols_are_kept() {
        let n = normalizer();
        let ex = exclusions(&["Unused"]);
        assert_eq!(
            n.case_words("MAP Kinase (Fus3) CYP51-like Regulator", &ex),
            "MAP kinase (fus3) CYP51-like regulator"
        );
        assert_eq!(n.case_words("T-DNA H2O2 Transporter", &ex), "T-DNA H2O2 transporter");
    }

    #[test]
    fn test_separators_are_reproduced() {
        let n = normalizer();
        let ex = exclusions(&["Unused"]);
        assert_eq!(
            n.case_words("Cell Wall/Membrane;  Stress, [Oxidative]", &ex),
            "cell wall/membrane;  stress, [oxidative]"
        );
    }

    #[test]
    fn test_apply_lowercases_columns_without_exclusions() {
        let n = normalizer();
        let mut table = single("host_description", "Leaf Lesions on BARLEY");
        n.apply(&mut table);
        assert_eq!(first(&table, "host_description"), Cell::text("leaf lesions on barley"));
    }

    #[test]
    fn test_vegetative_spores_fixup() {
        let n = normalizer();
        let mut table = single("vegetative_spores", "Reduced compared to wt");
        n.apply(&mut table);
        assert_eq!(first(&table, "vegetative_spores"), Cell::text("reduced compared to WT"));
    }

    #[test]
    fn test_format_disease() {
        let n = normalizer();
        let mut table = single("disease", "FUSARIUM head blight in FAR EAST");
        n.format_disease(&mut table);
        assert_eq!(first(&table, "disease"), Cell::text("Fusarium head blight in Far East"));
    }

    #[test]
    fn test_format_tissue() {
        let n = normalizer();
        let mut table = single("tissue", "Root and Leaf");
        n.format_tissue(&mut table);
        assert_eq!(first(&table, "tissue"), Cell::text("root and Leaf"));
    }

    #[test]
    fn test_looks_like_symbol() {
        assert!(looks_like_symbol("ABC"));
        assert!(looks_like_symbol("A"));
        assert!(looks_like_symbol("K+"));
        assert!(looks_like_symbol("abc"));
        assert!(!looks_like_symbol("Abc"));
        assert!(!looks_like_symbol("Ca2+"));
    }
}
