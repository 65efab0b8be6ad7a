//! Validation of the cleaned table
//!
//! Every non-missing value of a validated column must fully match the
//! column grammar. The first column with invalid values fails the run, and
//! the error lists each distinct invalid value once.

pub mod grammar;
pub mod partners;

use phi_common::types::{Column, Table};
use phi_common::{PhiError, Result};
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info};

use self::grammar::{anti_infective_ids, inducer_id, Grammar};
use self::partners::is_valid_partner_id;

/// Column grammars, in validation order
const COLUMN_GRAMMARS: &[(&str, &str)] = &[
    ("record_id", r"Record \d+"),
    ("phi_id", r"PHI:\d+"),
    ("protein_id_source", r"UniProt"),
    ("protein_id", r"[0-9A-Z]+(?:-[0-9A-Z]+)?|no data found"),
    (
        "gene_id_source",
        r"(EMBL|GenBank|Broad|Ensembl Genomes|MUMDB|ASAP|FCGP|JGI|BROAD|FGDB|Ecogene|FTFD|Geo|FVG|MIPS|Author)",
    ),
    (
        "gene_id",
        r"(?:AER|ABF)-\d+|\w+-\w+|(Ensembl: )?[\w.]+?(; (Ensembl: )?[\w.]+?)*|Myc .+|SPA0021 sRNA",
    ),
    ("nt_sequence", r"[ACGT]+"),
    ("multiple_mutation", r"PHI:\d+(?:; PHI:\d+)*"),
    (
        "pathogen_species",
        r"[A-Z][a-z]+ (?:sp\. '.+?'|[a-z]+(?:-[a-z]+)?)(?: VGIII)?",
    ),
    (
        "host_species",
        r"[A-Z][a-z]+(?: (?:[a-z]+|x [a-z]+|[a-z]+ x [A-Z][a-z]+ [a-z]+))? \(.+?\)",
    ),
    (
        "host_genotype_id",
        r"(?:.+ )?(?:UniProt: [0-9A-Z]+|(?:GenBank|Ensembl): \w+)(?:; (?:.+, )?(?:UniProt: [0-9A-Z]+|(?:GenBank|Ensembl): \w+))*",
    ),
    (
        "go_annotation",
        r"GO:\d{7}(?:, (?:IDA|IEA|IGI|IMP|IPI|ISS|NAS|ND|TAS))?(?:; GO:\d{7}(?:, (?:IDA|IEA|IGI|IMP|IPI|ISS|NAS|ND|TAS))?)*",
    ),
    ("database", r"GO"),
    ("mating_defect", r"(?:yes|no)(?: \(.+?\))?"),
    ("pre_penetration_defect", r"(?:yes|no)(?: \(.+?\))?"),
    ("penetration_defect", r"(?:yes|no)(?: \(.+?\))?"),
    ("post_penetration_defect", r"(?:yes|no|yes/no)(?: \(.+?\))?"),
    ("essential_gene", r"(?:yes|no)"),
    // gene_inducer_id is built from combinators
    ("gene_inducer_id", ""),
    (
        "host_target_id",
        r"(?:.+ )?(?:UniProt: [0-9A-Z]+|GenBank: \w+|Ensembl: \S+)(?:; (?:.+, )?(?:UniProt: [0-9A-Z]+|GenBank: \w+|Ensembl: \S+))*",
    ),
    ("species_expert", r"[A-Z]+(?:; [A-Z]+)*"),
    ("entered_by", r"[A-Z]+(?:; [A-Z]+)*"),
    ("reference_source", r"PubMed|ISBN|Not in PubMed"),
    ("doi", r"\d+(?:\.\d+)?/.+|no data found"),
    ("curator_organization", r"(?:AC|MC|MU|RRes)(?:; (?:AC|MC|MU|RRes))*"),
];

enum Check {
    Grammar(Regex),
    /// Values naming the `anti-infective` label must be fully labelled groups
    InducerId { any: Regex, labelled: Regex },
    PartnerStructure,
}

impl Check {
    fn accepts(&self, value: &str) -> bool {
        match self {
            Check::Grammar(regex) => regex.is_match(value),
            Check::InducerId { any, labelled } => {
                any.is_match(value)
                    && (!value.contains("anti-infective") || labelled.is_match(value))
            }
            Check::PartnerStructure => is_valid_partner_id(value),
        }
    }
}

pub struct Validator {
    checks: Vec<(&'static str, Check)>,
}

impl Validator {
    pub fn new() -> Result<Self> {
        let mut checks = Vec::with_capacity(COLUMN_GRAMMARS.len() + 1);
        for (column, pattern) in COLUMN_GRAMMARS {
            let check = if *column == "gene_inducer_id" {
                Check::InducerId {
                    any: inducer_id().full_match()?,
                    labelled: anti_infective_ids().full_match()?,
                }
            } else {
                Check::Grammar(Grammar::pattern(*pattern).full_match()?)
            };
            checks.push((*column, check));
        }
        checks.push(("interacting_partners_id", Check::PartnerStructure));
        Ok(Self { checks })
    }

    /// Validated column keys in validation order
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|(column, _)| *column)
    }

    /// Check one value against a column grammar
    ///
    /// Returns `None` for columns that are not validated.
    pub fn accepts(&self, column: &str, value: &str) -> Option<bool> {
        self.checks
            .iter()
            .find(|(key, _)| *key == column)
            .map(|(_, check)| check.accepts(value))
    }

    /// Validate every checked column present in the table
    pub fn validate(&self, table: &Table) -> Result<()> {
        for (key, check) in &self.checks {
            let Some(column) = table.column(key) else {
                debug!(column = key, "Skipped validation of absent column");
                continue;
            };
            let values = invalid_values(column, check);
            if !values.is_empty() {
                return Err(PhiError::InvalidValues {
                    column: key.to_string(),
                    values,
                });
            }
        }
        info!(columns = self.checks.len(), rows = table.row_count(), "Validated table");
        Ok(())
    }
}

/// Distinct invalid values in first-seen order
fn invalid_values(column: &Column, check: &Check) -> Vec<String> {
    let mut seen = HashSet::new();
    column
        .values()
        .iter()
        .filter(|cell| !cell.is_missing())
        .map(|cell| cell.to_string())
        .filter(|value| !check.accepts(value))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use phi_common::types::{Cell, Header};

    fn single(key: &str, values: Vec<Cell>) -> Table {
        Table::from_rows(vec![Header::single(key)], values.into_iter().map(|v| vec![v]).collect())
            .unwrap()
    }

    #[test]
    fn test_every_grammar_compiles() {
        let validator = Validator::new().unwrap();
        assert_eq!(validator.columns().count(), COLUMN_GRAMMARS.len() + 1);
    }

    #[test]
    fn test_batch_reports_distinct_values() {
        let table = single(
            "phi_id",
            vec![
                Cell::text("PHI 1"),
                Cell::text("PHI:2"),
                Cell::text("phi:3"),
                Cell::text("PHI 1"),
                Cell::text("PHI:"),
            ],
        );
        match Validator::new().unwrap().validate(&table).unwrap_err() {
            PhiError::InvalidValues { column, values } => {
                assert_eq!(column, "phi_id");
                assert_eq!(values, vec!["PHI 1", "phi:3", "PHI:"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_values_are_exempt() {
        let table = single("doi", vec![Cell::Missing, Cell::text("10.1111/mpp.13321")]);
        Validator::new().unwrap().validate(&table).unwrap();
    }

    #[test]
    fn test_full_match_required() {
        let validator = Validator::new().unwrap();
        assert_eq!(validator.accepts("record_id", "Record 12"), Some(true));
        assert_eq!(validator.accepts("record_id", "Record 12a"), Some(false));
        assert_eq!(validator.accepts("database", "GO"), Some(true));
        assert_eq!(validator.accepts("database", "GOA"), Some(false));
        assert_eq!(validator.accepts("gene", "anything"), None);
    }

    #[test]
    fn test_column_grammars() {
        let v = Validator::new().unwrap();
        assert_eq!(v.accepts("go_annotation", "GO:0001602, IDA; GO:0001602"), Some(true));
        assert_eq!(v.accepts("go_annotation", "GO:0001602,IDA"), Some(false));
        assert_eq!(v.accepts("pathogen_species", "Fusarium graminearum"), Some(true));
        assert_eq!(v.accepts("pathogen_species", "Botrytis Cinerea"), Some(false));
        assert_eq!(v.accepts("host_species", "Triticum aestivum (wheat)"), Some(true));
        assert_eq!(v.accepts("post_penetration_defect", "yes (reduced)"), Some(true));
        assert_eq!(v.accepts("curator_organization", "RRes; MU"), Some(true));
        assert_eq!(v.accepts("host_target_id", "Rcr3 UniProt: Q9ZP12"), Some(true));
        assert_eq!(v.accepts("gene_inducer_id", "carbendazim: CHEBI:3392"), Some(true));
    }

    #[test]
    fn test_inducer_id_check() {
        let v = Validator::new().unwrap();
        assert_eq!(v.accepts("gene_inducer_id", "CHEBI:3392, congo red"), Some(true));
        assert_eq!(v.accepts("gene_inducer_id", "anti-infective: benomyl: CHEBI:3015"), Some(true));
        assert_eq!(v.accepts("gene_inducer_id", "anti-infective"), Some(false));
        assert_eq!(v.accepts("gene_inducer_id", "anti-infective: A: 1; B: 2"), Some(false));
        assert_eq!(v.accepts("gene_inducer_id", ": ; ,"), Some(false));
        assert_eq!(v.accepts("gene_inducer_id", "CHEBI:1;;"), Some(false));
    }

    #[test]
    fn test_partner_structure_check() {
        let v = Validator::new().unwrap();
        assert_eq!(v.accepts("interacting_partners_id", "geneA, UniProt: P12345"), Some(true));
        assert_eq!(v.accepts("interacting_partners_id", "UniProt:"), Some(false));
        assert_eq!(v.accepts("interacting_partners_id", "UniProt: P1, GenBank: G1"), Some(true));
    }

    #[test]
    fn test_non_text_cells_use_display() {
        let table = single("phi_id", vec![Cell::Integer(5)]);
        let err = Validator::new().unwrap().validate(&table).unwrap_err();
        assert!(matches!(err, PhiError::InvalidValues { values, .. } if values == vec!["5"]));
    }
}
