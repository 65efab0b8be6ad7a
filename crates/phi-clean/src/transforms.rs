//! Column-specific value transforms
//!
//! The smaller fixes that sit between the rule-driven stages: missing-data
//! placeholders, cleared columns, integer coercion, PHI ID lists, curation
//! dates and mutant phenotype casing.

use chrono::{NaiveDate, NaiveDateTime};
use phi_common::types::{Cell, Table};
use phi_common::{PhiError, Result};
use regex::Regex;
use tracing::{debug, info};

/// Columns whose `no data found` placeholder is a real value
pub const PLACEHOLDER_EXEMPT_COLUMNS: &[&str] = &["protein_id", "doi"];

/// Columns never released with content
pub const CLEARED_COLUMNS: &[&str] = &["curation_comments", "todo", "aa_sequence", "nt_sequence"];

/// Columns holding whole numbers
pub const INTEGER_COLUMNS: &[&str] = &["pathogen_id", "pathogen_strain_id", "host_id", "pmid", "year"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// Day first wherever day and month are ambiguous. Two-digit years are tried
// before four-digit ones, which would otherwise accept `19` as year 19.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

const MONTH_FORMATS: &[&str] = &["%b-%Y", "%B-%Y", "%b %Y", "%B %Y"];

pub struct ValueTransforms {
    placeholder: Regex,
    phi_id: Regex,
    month_year: Regex,
    year_month: Regex,
    year: Regex,
}

impl ValueTransforms {
    pub fn new() -> Result<Self> {
        Ok(Self {
            placeholder: Regex::new(r"(?i)^no data found$")?,
            phi_id: Regex::new(r"PHI:\d+")?,
            month_year: Regex::new(r"^([A-Z][a-z]{2})-(\d{2})$")?,
            year_month: Regex::new(r"^(\d{2})-([A-Z][a-z]{2})$")?,
            year: Regex::new(r"^\d{4}$")?,
        })
    }

    /// Turn `no data found` into missing outside the exempt columns
    pub fn replace_placeholders(&self, table: &mut Table) -> usize {
        let mut replaced = 0;
        for column in table.columns_mut() {
            if PLACEHOLDER_EXEMPT_COLUMNS.contains(&column.key()) {
                continue;
            }
            column.map_text(|value| {
                if self.placeholder.is_match(value) {
                    replaced += 1;
                    Cell::Missing
                } else {
                    Cell::text(value)
                }
            });
        }
        info!(replaced, "Replaced missing data placeholders");
        replaced
    }

    /// Rejoin the PHI IDs in `multiple_mutation` with `; `
    ///
    /// Values without any PHI ID are left for validation to report.
    pub fn normalize_multiple_mutation(&self, table: &mut Table) {
        let Some(column) = table.column_mut("multiple_mutation") else {
            debug!("No multiple_mutation column");
            return;
        };
        column.map_text(|value| {
            let ids: Vec<&str> = self.phi_id.find_iter(value).map(|m| m.as_str()).collect();
            if ids.is_empty() {
                Cell::text(value)
            } else {
                Cell::text(ids.join("; "))
            }
        });
    }

    /// Parse `curation_date` into dates
    pub fn convert_curation_dates(&self, table: &mut Table) -> Result<()> {
        let Some(column) = table.column_mut("curation_date") else {
            debug!("No curation_date column");
            return Ok(());
        };
        for cell in column.values_mut() {
            let converted = match &*cell {
                Cell::Missing | Cell::Date(_) => continue,
                Cell::Text(value) => self.parse_date(value)?,
                other => self.parse_date(&other.to_string())?,
            };
            *cell = Cell::Date(converted);
        }
        Ok(())
    }

    /// Parse one curation date, day first
    pub fn parse_date(&self, value: &str) -> Result<NaiveDate> {
        let trimmed = value.trim();
        let fixed = self.month_year.replace(trimmed, "${1}-20${2}");
        let fixed = self.year_month.replace(&fixed, "${2}-20${1}");

        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(&fixed, format) {
                return Ok(datetime.date());
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&fixed, format) {
                return Ok(date);
            }
        }
        for format in MONTH_FORMATS {
            let with_day = format!("1 {}", fixed);
            if let Ok(date) = NaiveDate::parse_from_str(&with_day, &format!("%d {}", format)) {
                return Ok(date);
            }
        }
        if self.year.is_match(&fixed) {
            if let Some(date) = fixed.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
                return Ok(date);
            }
        }

        Err(PhiError::InvalidDate(value.to_string()))
    }
}

/// Set the cleared columns to missing, creating any that are absent
///
/// Returns the keys of the columns that had to be created.
pub fn clear_columns(table: &mut Table) -> Vec<String> {
    let mut created = Vec::new();
    for key in CLEARED_COLUMNS {
        if !table.contains(key) {
            created.push(key.to_string());
        }
        table.ensure_column(key).clear();
    }
    debug!(created = ?created, "Cleared columns");
    created
}

/// Coerce the integer columns to `Cell::Integer`
///
/// Empty text becomes missing; fractional or non-numeric values fail.
pub fn coerce_integers(table: &mut Table) -> Result<()> {
    for key in INTEGER_COLUMNS {
        let Some(column) = table.column_mut(key) else {
            continue;
        };
        for cell in column.values_mut() {
            let coerced = match &*cell {
                Cell::Missing | Cell::Integer(_) => continue,
                Cell::Text(value) if value.trim().is_empty() => Cell::Missing,
                Cell::Text(value) => Cell::Integer(parse_integer(key, value.trim())?),
                Cell::Number(number) => Cell::Integer(integral(key, *number, &cell.to_string())?),
                Cell::Date(_) => {
                    return Err(PhiError::InvalidInteger {
                        column: key.to_string(),
                        value: cell.to_string(),
                    })
                }
            };
            *cell = coerced;
        }
    }
    Ok(())
}

fn parse_integer(column: &str, value: &str) -> Result<i64> {
    if let Ok(integer) = value.parse::<i64>() {
        return Ok(integer);
    }
    match value.parse::<f64>() {
        Ok(number) => integral(column, number, value),
        Err(_) => Err(PhiError::InvalidInteger {
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

fn integral(column: &str, number: f64, original: &str) -> Result<i64> {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Ok(number as i64)
    } else {
        Err(PhiError::InvalidInteger {
            column: column.to_string(),
            value: original.to_string(),
        })
    }
}

/// Lowercase `mutant_phenotype`
pub fn lowercase_mutant_phenotype(table: &mut Table) {
    if let Some(column) = table.column_mut("mutant_phenotype") {
        column.map_text(|value| Cell::text(value.to_lowercase()));
    }
}
