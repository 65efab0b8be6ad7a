//! PHI-base Cleaning Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Cleans and validates the PHI-base pathogen-host interaction export.
//!
//! # Stages
//!
//! - **Columns**: header normalization, column exclusion, whitespace cleanup
//! - **Replacements**: rule-table driven corrections of known data-entry errors
//! - **Casing**: lowercasing of free text that keeps gene symbols intact
//! - **Parsers**: gene inducer IDs, GO annotations, interacting partner IDs
//! - **Validation**: per-column grammars over the cleaned table
//! - **Release**: shaping the cleaned table for spreadsheet or archive export
//!
//! # Example
//!
//! ```no_run
//! use phi_clean::{Pipeline, PipelineConfig};
//! use phi_common::types::Table;
//!
//! fn clean(table: Table) -> phi_common::Result<()> {
//!     let config = PipelineConfig::from_env()?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!     let cleaned = pipeline.run(table)?;
//!     let release = pipeline.release(cleaned, config.target)?;
//!     println!("{} rows ready", release.table.row_count());
//!     Ok(())
//! }
//! ```

pub mod casing;
pub mod columns;
pub mod config;
pub mod parsers;
pub mod pipeline;
pub mod release;
pub mod replace;
pub mod transforms;
pub mod validate;

pub use config::PipelineConfig;
pub use pipeline::{CleanedTable, Pipeline, PipelineStats};
pub use release::{ReleaseTable, ReleaseTarget};
