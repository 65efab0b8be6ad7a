//! Release preparation
//!
//! Shapes a cleaned table for one of the two release targets. Nothing is
//! written here; the caller owns the spreadsheet and archive writers.

use phi_common::types::{Cell, Header, Table};
use phi_common::{PhiError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::columns::HeaderMapping;

/// Longest `interacting_partners_id` value the spreadsheet release keeps
pub const SPREADSHEET_PARTNERS_LIMIT: usize = 92;

/// Columns with personal data, left out of the public archive
pub const ARCHIVE_DROPPED_COLUMNS: &[&str] = &["author_email", "species_expert", "entered_by"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseTarget {
    /// Excel-compatible spreadsheet with the original two-part headers
    #[default]
    Spreadsheet,
    /// Public archival CSV dataset
    Archive,
}

impl FromStr for ReleaseTarget {
    type Err = PhiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "spreadsheet" => Ok(ReleaseTarget::Spreadsheet),
            "zenodo" | "archive" => Ok(ReleaseTarget::Archive),
            _ => Err(PhiError::config(format!("Invalid release target: {}", s))),
        }
    }
}

/// A table ready for a release writer
#[derive(Debug, Clone)]
pub struct ReleaseTable {
    pub table: Table,
    /// Original headers, in column order (spreadsheet only)
    pub headers: Option<Vec<Header>>,
}

pub fn prepare(table: Table, mapping: &HeaderMapping, target: ReleaseTarget) -> Result<ReleaseTable> {
    match target {
        ReleaseTarget::Spreadsheet => prepare_spreadsheet(table, mapping),
        ReleaseTarget::Archive => Ok(prepare_archive(table)),
    }
}

fn prepare_spreadsheet(mut table: Table, mapping: &HeaderMapping) -> Result<ReleaseTable> {
    if let Some(column) = table.column_mut("interacting_partners_id") {
        column.map_text(|value| truncate(value, SPREADSHEET_PARTNERS_LIMIT));
    }

    let headers = table
        .columns()
        .iter()
        .map(|column| {
            mapping
                .get(column.key())
                .cloned()
                .ok_or_else(|| PhiError::MissingHeaderMapping(column.key().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        rows = table.row_count(),
        columns = headers.len(),
        "Prepared spreadsheet release"
    );
    Ok(ReleaseTable {
        table,
        headers: Some(headers),
    })
}

fn prepare_archive(mut table: Table) -> ReleaseTable {
    table.retain_columns(|column| !ARCHIVE_DROPPED_COLUMNS.contains(&column.key()));
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "Prepared archive release"
    );
    ReleaseTable {
        table,
        headers: None,
    }
}

/// First `limit` characters of a value
fn truncate(value: &str, limit: usize) -> Cell {
    match value.char_indices().nth(limit) {
        Some((end, _)) => Cell::text(&value[..end]),
        None => Cell::text(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_rows(
            vec![
                Header::single("phi_id"),
                Header::single("interacting_partners_id"),
                Header::single("entered_by"),
            ],
            vec![vec![
                Cell::text("PHI:1"),
                Cell::text(format!("UniProt: {}", "P".repeat(120))),
                Cell::text("AC"),
            ]],
        )
        .unwrap()
    }

    fn mapping() -> HeaderMapping {
        let mut mapping = HeaderMapping::default();
        mapping.insert_if_absent("phi_id", Header::compound("PHI MolConn ID", "PHIMolConnID"));
        mapping.insert_if_absent(
            "interacting_partners_id",
            Header::compound("Interacting partner(s) ID", "InteractingPartnersID"),
        );
        mapping.insert_if_absent("entered_by", Header::compound("Entered by", "EnteredBy"));
        mapping
    }

    #[test]
    fn test_release_target_from_str() {
        assert_eq!("excel".parse::<ReleaseTarget>().unwrap(), ReleaseTarget::Spreadsheet);
        assert_eq!("Zenodo".parse::<ReleaseTarget>().unwrap(), ReleaseTarget::Archive);
        assert!(matches!("csv".parse::<ReleaseTarget>(), Err(PhiError::Config(_))));
    }

    #[test]
    fn test_spreadsheet_truncates_and_restores_headers() {
        let release = prepare(table(), &mapping(), ReleaseTarget::Spreadsheet).unwrap();
        let partners = &release.table.column("interacting_partners_id").unwrap().values()[0];
        assert_eq!(partners.to_string().chars().count(), SPREADSHEET_PARTNERS_LIMIT);

        let headers = release.headers.unwrap();
        assert_eq!(headers[0], Header::compound("PHI MolConn ID", "PHIMolConnID"));
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_spreadsheet_requires_every_mapping() {
        let mut partial = HeaderMapping::default();
        partial.insert_if_absent("phi_id", Header::single("PHIMolConnID"));
        let err = prepare(table(), &partial, ReleaseTarget::Spreadsheet).unwrap_err();
        assert!(matches!(err, PhiError::MissingHeaderMapping(key) if key == "interacting_partners_id"));
    }

    #[test]
    fn test_archive_drops_personal_columns() {
        let release = prepare(table(), &HeaderMapping::default(), ReleaseTarget::Archive).unwrap();
        assert_eq!(release.table.keys(), vec!["phi_id", "interacting_partners_id"]);
        assert!(release.headers.is_none());
        let partners = &release.table.column("interacting_partners_id").unwrap().values()[0];
        assert_eq!(partners.to_string().len(), 129);
    }

    #[test]
    fn test_truncate_short_values() {
        assert_eq!(truncate("UniProt: P1", 92), Cell::text("UniProt: P1"));
        assert_eq!(truncate("abcdef", 3), Cell::text("abc"));
    }
}
