//! Replacement engine
//!
//! Applies the rule table in `resources/replacements.toml`: a global list of
//! Unicode fixes that runs over every text column, then column-keyed regex
//! substitutions for known data-entry errors.

use phi_common::types::{Cell, Column, Table};
use phi_common::{PhiError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Rule table shipped with the crate
pub const DEFAULT_REPLACEMENTS: &str = include_str!("../resources/replacements.toml");

// ============================================================================
// Rule Resources
// ============================================================================

/// A replacement rule as written in the resource file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    /// `None` blanks matching cells to missing
    #[serde(default)]
    pub replacement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnRules {
    pub name: String,
    pub rules: Vec<RuleSpec>,
}

/// The deserialized rule table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplacementRules {
    #[serde(default)]
    pub global: Vec<RuleSpec>,
    #[serde(default)]
    pub columns: Vec<ColumnRules>,
}

impl ReplacementRules {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PhiError::rules(format!("replacements: {}", e)))
    }

    /// Load a rule table from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The rule table embedded at build time
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_REPLACEMENTS)
    }
}

// ============================================================================
// Compiled Rules
// ============================================================================

#[derive(Debug)]
enum Action {
    Replace(String),
    Blank,
}

#[derive(Debug)]
struct Rule {
    pattern: Regex,
    action: Action,
}

impl Rule {
    fn compile(spec: &RuleSpec) -> Result<Self> {
        let action = match &spec.replacement {
            Some(replacement) => Action::Replace(replacement.clone()),
            None => Action::Blank,
        };
        Ok(Self {
            pattern: Regex::new(&spec.pattern)?,
            action,
        })
    }
}

/// Run rules in order over one value; stops once the value is blanked
fn apply_rules(rules: &[Rule], value: &str) -> Cell {
    let mut current = value.to_string();
    for rule in rules {
        match &rule.action {
            Action::Blank => {
                if rule.pattern.is_match(&current) {
                    return Cell::Missing;
                }
            }
            Action::Replace(replacement) => {
                let replaced = rule.pattern.replace_all(&current, replacement.as_str());
                current = replaced.into_owned();
            }
        }
    }
    Cell::Text(current)
}

/// Compiled replacement rules
pub struct ReplacementEngine {
    global: Vec<Rule>,
    columns: Vec<(String, Vec<Rule>)>,
}

impl ReplacementEngine {
    pub fn new(rules: &ReplacementRules) -> Result<Self> {
        let global = rules
            .global
            .iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>>>()?;

        let columns = rules
            .columns
            .iter()
            .map(|column| {
                let compiled = column
                    .rules
                    .iter()
                    .map(Rule::compile)
                    .collect::<Result<Vec<_>>>()?;
                Ok((column.name.clone(), compiled))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { global, columns })
    }

    /// Apply the global rules to every text column
    ///
    /// Returns the number of cells changed.
    pub fn apply_global(&self, table: &mut Table) -> usize {
        let mut changed = 0;
        for column in table.columns_mut() {
            changed += rewrite_column(column, &self.global);
        }
        info!(changed, rules = self.global.len(), "Applied global replacements");
        changed
    }

    /// Apply the column-keyed rules
    ///
    /// Rules for columns absent from the table are skipped. Returns the
    /// number of cells changed.
    pub fn apply_columns(&self, table: &mut Table) -> usize {
        let mut changed = 0;
        for (name, rules) in &self.columns {
            match table.column_mut(name) {
                Some(column) => {
                    let count = rewrite_column(column, rules);
                    debug!(column = %name, rules = rules.len(), changed = count, "Applied replacements");
                    changed += count;
                }
                None => debug!(column = %name, "Skipped replacements for absent column"),
            }
        }
        info!(changed, "Applied column replacements");
        changed
    }
}

fn rewrite_column(column: &mut Column, rules: &[Rule]) -> usize {
    let mut changed = 0;
    column.map_text(|value| {
        let cell = apply_rules(rules, value);
        if cell.as_text() != Some(value) {
            changed += 1;
        }
        cell
    });
    changed
}
