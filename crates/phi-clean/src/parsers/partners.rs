//! Interacting partners ID parser
//!
//! Rebuilds values of the form `gene name, Database: Accession; ...` from
//! loosely punctuated input.

use phi_common::Result;
use regex::Regex;

/// Databases an interacting partner accession can come from
pub const PARTNER_DATABASES: &[&str] = &["UniProt", "GenBank", "EMBL", "Ensembl Genomes"];

/// Sentinel for a partner without an identifier
pub const NO_DATA: &str = "no data found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Collecting the words of a gene name
    Gene,
    /// Just saw a database name; the next word is its accession
    Database,
}

pub struct PartnersParser {
    tokens: Regex,
}

impl PartnersParser {
    pub fn new() -> Result<Self> {
        let tokens = Regex::new(&format!(
            r"(?P<db>{})|(?P<nan>{})|(?P<word>\S+)",
            PARTNER_DATABASES.join("|"),
            NO_DATA
        ))?;
        Ok(Self { tokens })
    }

    /// Parse and re-serialize one value
    ///
    /// Gene words with no database after them are emitted as they are, so
    /// validation reports the value.
    pub fn parse(&self, value: &str) -> String {
        let mut parsed: Vec<String> = Vec::new();
        let mut gene: Vec<&str> = Vec::new();
        let mut state: Option<State> = None;

        for caps in self.tokens.captures_iter(value) {
            if let Some(db) = caps.name("db") {
                if state == Some(State::Gene) {
                    let name = gene.join(" ");
                    parsed.push(format!("{},", name.trim_end_matches(',')));
                    gene.clear();
                }
                parsed.push(format!("{}:", db.as_str()));
                state = Some(State::Database);
            } else if caps.name("nan").is_some() {
                if !gene.is_empty() {
                    parsed.push(gene.join(" "));
                    gene.clear();
                }
                parsed.push(format!("{};", NO_DATA));
                state = None;
            } else if let Some(word) = caps.name("word") {
                let word = word.as_str();
                if matches!(word, ":" | ";" | ",") {
                    continue;
                }
                if state == Some(State::Database) {
                    let accession = word.trim_start_matches(':');
                    if let Some(accession) = accession.strip_suffix(',') {
                        parsed.push(format!("{},", accession.trim_end_matches([',', ';'])));
                    } else {
                        parsed.push(format!("{};", accession.trim_end_matches(';')));
                    }
                    state = None;
                } else {
                    gene.push(word);
                    state = Some(State::Gene);
                }
            }
        }

        if !gene.is_empty() {
            parsed.push(gene.join(" "));
        }

        parsed.join(" ").trim_end_matches([';', ',']).to_string()
    }
}
