//! Parsers for the structured text columns
//!
//! Each parser lexes a free-text value into tokens and serializes them back
//! in the canonical notation checked by the validator.

pub mod go_annotation;
pub mod inducer;
pub mod partners;

pub use go_annotation::GoAnnotationParser;
pub use inducer::{ChemId, InducerParser, Token};
pub use partners::PartnersParser;

use phi_common::types::{Cell, Table};
use phi_common::Result;
use tracing::{debug, info};

/// The three field parsers, applied in pipeline order
pub struct FieldParsers {
    inducer: InducerParser,
    go_annotation: GoAnnotationParser,
    partners: PartnersParser,
}

impl FieldParsers {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inducer: InducerParser::new()?,
            go_annotation: GoAnnotationParser::new()?,
            partners: PartnersParser::new()?,
        })
    }

    /// Rewrite `gene_inducer_id`, `go_annotation` and `interacting_partners_id`
    pub fn apply(&self, table: &mut Table) {
        parse_column(table, "gene_inducer_id", |v| self.inducer.parse(v));
        parse_column(table, "go_annotation", |v| self.go_annotation.parse(v));
        parse_column(table, "interacting_partners_id", |v| self.partners.parse(v));
    }
}

fn parse_column<F>(table: &mut Table, key: &str, parse: F)
where
    F: Fn(&str) -> String,
{
    let Some(column) = table.column_mut(key) else {
        debug!(column = key, "Skipped parsing absent column");
        return;
    };
    let mut rewritten = 0usize;
    column.map_text(|value| {
        let parsed = parse(value);
        if parsed != value {
            rewritten += 1;
        }
        Cell::Text(parsed)
    });
    info!(column = key, rewritten, "Parsed structured column");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use phi_common::types::Header;

    #[test]
    fn test_apply_rewrites_structured_columns() {
        let mut table = Table::from_rows(
            vec![
                Header::single("gene_inducer_id"),
                Header::single("go_annotation"),
                Header::single("interacting_partners_id"),
            ],
            vec![
                vec![
                    Cell::text("congo red CHEBI:3392;"),
                    Cell::text("GO:0005515,IPI"),
                    Cell::text("geneA UniProt: P1"),
                ],
                vec![Cell::Missing, Cell::Missing, Cell::Missing],
            ],
        )
        .unwrap();

        FieldParsers::new().unwrap().apply(&mut table);

        assert_eq!(table.row(0).unwrap(), vec![
            &Cell::text("congo red: CHEBI:3392"),
            &Cell::text("GO:0005515, IPI"),
            &Cell::text("geneA, UniProt: P1"),
        ]);
        assert!(table.row(1).unwrap().iter().all(|c| c.is_missing()));
    }
}
