// PHI-base Cleaning Pipeline
//
// Runs every cleaning stage over a loaded table, in order, and validates the
// result.

use phi_common::types::{Header, Table};
use phi_common::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::casing::{CasingNormalizer, CasingRules};
use crate::columns::{ColumnNormalizer, HeaderMapping};
use crate::config::PipelineConfig;
use crate::parsers::FieldParsers;
use crate::release::{self, ReleaseTable, ReleaseTarget};
use crate::replace::{ReplacementEngine, ReplacementRules};
use crate::transforms::{self, ValueTransforms};
use crate::validate::Validator;

/// Counts collected during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub rows: usize,
    pub columns: usize,
    pub excluded_columns: usize,
    pub placeholders_replaced: usize,
    pub global_replacements: usize,
    pub column_replacements: usize,
    pub created_columns: usize,
}

/// A validated table with its original headers
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub table: Table,
    pub headers: HeaderMapping,
    pub stats: PipelineStats,
}

/// The cleaning pipeline
///
/// Compiles every rule table once; a single pipeline can clean any number of
/// tables.
pub struct Pipeline {
    normalizer: ColumnNormalizer,
    replacements: ReplacementEngine,
    casing: CasingNormalizer,
    transforms: ValueTransforms,
    parsers: FieldParsers,
    validator: Validator,
}

impl Pipeline {
    pub fn new(replacements: &ReplacementRules, casing: &CasingRules) -> Result<Self> {
        Ok(Self {
            normalizer: ColumnNormalizer::new()?,
            replacements: ReplacementEngine::new(replacements)?,
            casing: CasingNormalizer::new(casing)?,
            transforms: ValueTransforms::new()?,
            parsers: FieldParsers::new()?,
            validator: Validator::new()?,
        })
    }

    /// Build a pipeline from the configured rule files
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(&config.replacement_rules()?, &config.casing_rules()?)
    }

    /// A pipeline over the embedded rule tables
    pub fn embedded() -> Result<Self> {
        Self::new(&ReplacementRules::embedded()?, &CasingRules::embedded()?)
    }

    /// Clean and validate a table
    ///
    /// Any error aborts the run; no partially cleaned table is returned.
    pub fn run(&self, mut table: Table) -> Result<CleanedTable> {
        let mut stats = PipelineStats {
            rows: table.row_count(),
            ..PipelineStats::default()
        };
        info!(rows = stats.rows, columns = table.column_count(), "Starting cleaning pipeline");

        // Step 1: Headers, excluded columns and whitespace
        let columns_before = table.column_count();
        let mut headers = self.normalizer.normalize(&mut table)?;
        stats.excluded_columns = columns_before - table.column_count();

        // Step 2: Missing data placeholders
        stats.placeholders_replaced = self.transforms.replace_placeholders(&mut table);

        // Step 3: Unicode fixes over every text column
        stats.global_replacements = self.replacements.apply_global(&mut table);

        // Step 4: Columns released without content
        let created = transforms::clear_columns(&mut table);
        stats.created_columns = created.len();
        for key in created {
            debug!(column = %key, "Created cleared column");
            headers.insert_if_absent(key.clone(), Header::single(key));
        }

        // Step 5: Column rule table
        stats.column_replacements = self.replacements.apply_columns(&mut table);

        // Step 6: Integer columns
        transforms::coerce_integers(&mut table)?;

        // Step 7: Free-text casing
        self.casing.apply(&mut table);

        // Step 8: Column-specific values
        self.transforms.normalize_multiple_mutation(&mut table);
        self.transforms.convert_curation_dates(&mut table)?;
        self.casing.format_disease(&mut table);
        self.casing.format_tissue(&mut table);
        transforms::lowercase_mutant_phenotype(&mut table);

        // Step 9: Structured fields
        self.parsers.apply(&mut table);

        // Step 10: Grammars
        self.validator.validate(&table)?;

        stats.columns = table.column_count();
        info!(?stats, "Cleaning pipeline complete");

        Ok(CleanedTable {
            table,
            headers,
            stats,
        })
    }

    /// Shape a cleaned table for a release target
    pub fn release(&self, cleaned: CleanedTable, target: ReleaseTarget) -> Result<ReleaseTable> {
        release::prepare(cleaned.table, &cleaned.headers, target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use phi_common::types::Cell;
    use phi_common::PhiError;

    #[test]
    fn test_stats_count_stages() {
        let table = Table::from_rows(
            vec![
                Header::compound("PHI MolConn ID", "PHIMolConnID"),
                Header::compound("Curation comments", "CurationComments"),
                Header::compound("Notes", "Notes.Exclude"),
                Header::compound("Disease", "Disease"),
            ],
            vec![
                vec![
                    Cell::text(" PHI:1 "),
                    Cell::text("check"),
                    Cell::text("x"),
                    Cell::text("no data found"),
                ],
                vec![
                    Cell::text("PHI:2"),
                    Cell::Missing,
                    Cell::Missing,
                    Cell::text("rice blast"),
                ],
            ],
        )
        .unwrap();

        let cleaned = Pipeline::embedded().unwrap().run(table).unwrap();
        assert_eq!(cleaned.stats.rows, 2);
        assert_eq!(cleaned.stats.excluded_columns, 1);
        assert_eq!(cleaned.stats.placeholders_replaced, 1);
        assert_eq!(cleaned.stats.created_columns, 3);
        assert_eq!(cleaned.stats.columns, 6);
        assert!(cleaned.headers.get("todo").is_some());
        assert!(cleaned.table.column("curation_comments").unwrap().is_all_missing());
    }

    #[test]
    fn test_validation_failure_aborts_run() {
        let table = Table::from_rows(
            vec![Header::compound("PHI MolConn ID", "PHIMolConnID")],
            vec![vec![Cell::text("PHI-1")]],
        )
        .unwrap();
        let err = Pipeline::embedded().unwrap().run(table).unwrap_err();
        assert!(matches!(err, PhiError::InvalidValues { column, .. } if column == "phi_id"));
    }
}
