//! In-memory table model shared by the pipeline stages
//!
//! A [`Table`] is stored column-major: every [`Column`] holds exactly one
//! [`Cell`] per row, and row order is never changed by any stage. The row
//! index is the only identity a record has during a pipeline run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PhiError, Result};

// ============================================================================
// Cells
// ============================================================================

/// A single cell value
///
/// `Missing` is the distinguished "no value" marker and is never the same as
/// an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Missing,
    Text(String),
    Integer(i64),
    /// Raw numeric value as loaded from a spreadsheet
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Create a text cell
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Borrow the text of a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(value) => f.write_str(value),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

// ============================================================================
// Headers
// ============================================================================

/// A column header
///
/// Two-row spreadsheet exports carry a free-text label above an internal
/// code; single-row exports carry the code only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    pub label: Option<String>,
    pub code: String,
}

impl Header {
    /// Header from a two-row export
    pub fn compound(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            code: code.into(),
        }
    }

    /// Header from a single-row export
    pub fn single(code: impl Into<String>) -> Self {
        Self {
            label: None,
            code: code.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} / {}", label, self.code),
            None => f.write_str(&self.code),
        }
    }
}

// ============================================================================
// Columns
// ============================================================================

/// A named column of cells
///
/// The number of values is fixed at construction; [`Column::values_mut`]
/// hands out a slice so stages can rewrite cells without resizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub header: Header,
    values: Vec<Cell>,
}

impl Column {
    pub fn new(header: Header, values: Vec<Cell>) -> Self {
        Self { header, values }
    }

    /// A column of `len` missing cells
    pub fn missing(header: Header, len: usize) -> Self {
        Self::new(header, vec![Cell::Missing; len])
    }

    /// The column key (the header code)
    pub fn key(&self) -> &str {
        &self.header.code
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Cell] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Cell::is_missing)
    }

    /// Rewrite every text cell; other cells are left alone
    pub fn map_text<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> Cell,
    {
        for cell in self.values.iter_mut() {
            if let Cell::Text(value) = cell {
                *cell = f(value);
            }
        }
    }

    /// Set every cell to missing
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|cell| *cell = Cell::Missing);
    }

    pub fn into_values(self) -> Vec<Cell> {
        self.values
    }
}

// ============================================================================
// Tables
// ============================================================================

/// An ordered, column-major table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

/// Serialized form of a [`Table`], checked before use
#[derive(Deserialize)]
struct RawTable {
    columns: Vec<Column>,
    rows: usize,
}

impl TryFrom<RawTable> for Table {
    type Error = PhiError;

    fn try_from(raw: RawTable) -> Result<Self> {
        check_lengths(&raw.columns, raw.rows)?;
        Ok(Self {
            columns: raw.columns,
            rows: raw.rows,
        })
    }
}

impl Table {
    /// Build a table from row-major data
    ///
    /// Rows shorter than the header are padded with missing cells, which is
    /// how spreadsheet readers report trailing empty cells. Longer rows are
    /// rejected.
    pub fn from_rows(headers: Vec<Header>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = headers.len();
        let row_count = rows.len();
        let mut values: Vec<Vec<Cell>> = (0..width).map(|_| Vec::with_capacity(row_count)).collect();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(PhiError::RowLength {
                    column: format!("row {}", index),
                    expected: width,
                    actual: row.len(),
                });
            }
            let mut cells = row.into_iter();
            for column in values.iter_mut() {
                column.push(cells.next().unwrap_or_default());
            }
        }

        let columns = headers
            .into_iter()
            .zip(values)
            .map(|(header, values)| Column::new(header, values))
            .collect();

        Ok(Self {
            columns,
            rows: row_count,
        })
    }

    /// Build a table from columns that must all have the same length
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        check_lengths(&columns, rows)?;
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Column keys in table order
    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(Column::key).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key() == key)
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key() == key)
    }

    pub fn column_mut(&mut self, key: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.key() == key)
    }

    /// Get a column, appending an all-missing one if the key is absent
    pub fn ensure_column(&mut self, key: &str) -> &mut Column {
        let index = match self.columns.iter().position(|c| c.key() == key) {
            Some(index) => index,
            None => {
                self.columns.push(Column::missing(Header::single(key), self.rows));
                self.columns.len() - 1
            }
        };
        &mut self.columns[index]
    }

    /// Append a column
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        check_lengths(std::slice::from_ref(&column), self.rows)?;
        self.columns.push(column);
        Ok(())
    }

    pub fn remove_column(&mut self, key: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.key() == key)?;
        Some(self.columns.remove(index))
    }

    pub fn retain_columns<F>(&mut self, f: F)
    where
        F: FnMut(&Column) -> bool,
    {
        self.columns.retain(f);
    }

    /// Cells of one row in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values()[index]).collect())
    }
}

fn check_lengths(columns: &[Column], expected: usize) -> Result<()> {
    match columns.iter().find(|c| c.len() != expected) {
        Some(column) => Err(PhiError::RowLength {
            column: column.key().to_string(),
            expected,
            actual: column.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec![Header::compound("Record ID", "RecordID"), Header::single("Gene")],
            vec![
                vec![Cell::text("Record 1"), Cell::text("abaA")],
                vec![Cell::text("Record 2")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.keys(), vec!["RecordID", "Gene"]);
        assert!(table.column("Gene").unwrap().values()[1].is_missing());
    }

    #[test]
    fn test_from_rows_rejects_long_rows() {
        let result = Table::from_rows(
            vec![Header::single("A")],
            vec![vec![Cell::text("x"), Cell::text("y")]],
        );
        assert!(matches!(result, Err(PhiError::RowLength { actual: 2, .. })));
    }

    #[test]
    fn test_from_columns_checks_lengths() {
        let result = Table::from_columns(vec![
            Column::new(Header::single("a"), vec![Cell::Integer(1)]),
            Column::new(Header::single("b"), vec![]),
        ]);
        match result {
            Err(PhiError::RowLength { column, expected, actual }) => {
                assert_eq!(column, "b");
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ensure_column_creates_missing_column() {
        let mut table = sample();
        assert!(table.ensure_column("todo").is_all_missing());
        assert_eq!(table.column_count(), 3);
        // second call reuses the column
        table.ensure_column("todo");
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_row_preserves_column_order() {
        let table = sample();
        let row = table.row(0).unwrap();
        assert_eq!(row, vec![&Cell::text("Record 1"), &Cell::text("abaA")]);
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_map_text_skips_other_cells() {
        let mut column = Column::new(
            Header::single("year"),
            vec![Cell::text("2001"), Cell::Integer(2002), Cell::Missing],
        );
        column.map_text(|s| Cell::text(s.to_uppercase() + "!"));
        assert_eq!(
            column.values(),
            &[Cell::text("2001!"), Cell::Integer(2002), Cell::Missing]
        );
    }

    #[test]
    fn test_cell_display() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(Cell::Date(date).to_string(), "2021-03-04");
        assert_eq!(Cell::Missing.to_string(), "");
        assert_eq!(Cell::Integer(42).to_string(), "42");
    }

    #[test]
    fn test_deserialize_rejects_short_columns() {
        let json = r#"{"columns":[{"header":{"label":null,"code":"a"},"values":[]}],"rows":1}"#;
        assert!(serde_json::from_str::<Table>(json).is_err());
    }

    #[test]
    fn test_deserialize_keeps_valid_table() {
        let table = sample();
        let json = serde_json::to_string(&table).unwrap();
        let restored: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
        assert_eq!(restored.row(1).unwrap().len(), 2);
    }

    #[test]
    fn test_cell_serializes_untagged() {
        let json = serde_json::to_string(&vec![Cell::text("a"), Cell::Missing, Cell::Integer(3)]).unwrap();
        assert_eq!(json, r#"["a",null,3]"#);
    }
}
