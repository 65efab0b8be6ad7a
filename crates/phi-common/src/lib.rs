//! PHI-base Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the PHI-base pipeline.
//!
//! # Overview
//!
//! - **Error Handling**: `PhiError` and the crate-wide `Result` alias
//! - **Logging**: tracing subscriber setup for hosts of the pipeline
//! - **Types**: the in-memory table model (`Table`, `Column`, `Header`, `Cell`)
//!
//! # Example
//!
//! ```no_run
//! use phi_common::types::{Cell, Header, Table};
//!
//! fn build() -> phi_common::Result<Table> {
//!     let headers = vec![Header::compound("Record ID", "RecordID")];
//!     let rows = vec![vec![Cell::text("Record 1")]];
//!     Table::from_rows(headers, rows)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PhiError, Result};
