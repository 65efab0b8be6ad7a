//! Column normalization
//!
//! Maps the internal header codes of the PHI-base export onto canonical
//! snake-case keys, drops columns that are never released, and collapses
//! stray whitespace in text cells.

use phi_common::types::{Cell, Header, Table};
use phi_common::{PhiError, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Header code to canonical key
const CANONICAL_KEYS: &[(&str, &str)] = &[
    ("CurationComments", "curation_comments"),
    ("Todo", "todo"),
    ("RecordID", "record_id"),
    ("PHIMolConnID", "phi_id"),
    ("ProteinIDsource", "protein_id_source"),
    ("ProteinID", "protein_id"),
    ("GeneIDsource", "gene_id_source"),
    ("GeneID", "gene_id"),
    ("AAsequence", "aa_sequence"),
    ("NTsequence", "nt_sequence"),
    ("SequenceStrain", "sequence_strain"),
    ("Gene", "gene"),
    ("Chrlocation", "chromosome_location"),
    ("GeneProteinmodification", "gene_protein_modification"),
    ("ModifiedgeneproteinId", "modified_gene_protein_id"),
    ("Interactingpartners", "interacting_partners"),
    ("InteractingpartnersId", "interacting_partners_id"),
    ("Multiplemutation", "multiple_mutation"),
    ("PathogenID", "pathogen_id"),
    ("Pathogenspecies", "pathogen_species"),
    ("PathogenstrainID", "pathogen_strain_id"),
    ("Pathogenstrain", "pathogen_strain"),
    ("Disease", "disease"),
    ("Hostdescription", "host_description"),
    ("HostID", "host_id"),
    ("Hostspecies", "host_species"),
    ("Hoststrain", "host_strain"),
    ("Hostgenotype", "host_genotype"),
    ("HostgenotypeId", "host_genotype_id"),
    ("Tissue", "tissue"),
    ("GeneFunction", "gene_function"),
    ("GOannotation", "go_annotation"),
    ("Database", "database"),
    ("Pathway", "pathway"),
    ("MutantPhenotype", "mutant_phenotype"),
    ("Matingdefect", "mating_defect"),
    ("Prepenetrationdefect", "pre_penetration_defect"),
    ("Penetrationdefect", "penetration_defect"),
    ("Postpenetrationdefect", "post_penetration_defect"),
    ("Diseasemanifestation", "disease_manifestation"),
    ("Vegetativespores", "vegetative_spores"),
    ("Sexualspores", "sexual_spores"),
    ("Invitrogrowth", "in_vitro_growth"),
    ("Sporegermination", "spore_germination"),
    ("Essentialgene", "essential_gene"),
    ("Geneinducer", "gene_inducer"),
    ("GeneinducerId", "gene_inducer_id"),
    ("Hosttarget", "host_target"),
    ("HosttargetId", "host_target_id"),
    ("Interactionphenotype", "interaction_phenotype"),
    ("Hostresponse", "host_response"),
    ("ExpTechniquestable", "exp_technique_stable"),
    ("ExpTechniquetransient", "exp_technique_transient"),
    ("Speciesexpert", "species_expert"),
    ("Enteredby", "entered_by"),
    ("PMID", "pmid"),
    ("RefSource", "reference_source"),
    ("DOI", "doi"),
    ("Refdetail", "reference_detail"),
    ("Authoremail", "author_email"),
    ("Comments", "comments"),
    ("Authorreference", "author_reference"),
    ("Year", "year"),
    ("Curationdetails", "curation_details"),
    ("Filename", "file_name"),
    ("Batchno", "batch_number"),
    ("Curationdate", "curation_date"),
    ("Curatororganization", "curator_organization"),
    ("Lab", "lab"),
    ("FGmycotoxin", "fg_mycotoxin"),
    ("AntiinfectiveagentId", "anti_infective_agent_id"),
    ("Antiinfectiveagent", "anti_infective_agent"),
    ("Antiinfectivecompound", "anti_infective_compound"),
    ("Antiinfectivetargetsite", "anti_infective_target_site"),
    ("Antiinfectivegroupname", "anti_infective_group_name"),
    ("AntiinfectiveChemicalgroup", "anti_infective_chemical_group"),
    ("AntiinfectiveModeinplanta", "anti_infective_mode_in_planta"),
    ("FRACCODE", "frac_code"),
    ("Antiinfectivecomments", "anti_infective_comments"),
];

/// Columns never parsed into the database, as (label, code)
const EXCLUDED_COLUMNS: &[(&str, &str)] = &[
    ("__FG_mycotoxin__", "FGmycotoxin"),
    ("Anti-infective (Chemical)", "AntiinfectiveagentId"),
    ("Compound", "Antiinfectiveagent"),
    ("Target site", "Antiinfectivecompound"),
    ("Group name", "Antiinfectivetargetsite"),
    ("Chemical group", "Antiinfectivegroupname"),
    ("Mode in planta", "AntiinfectiveChemicalgroup"),
    ("Mode of action", "AntiinfectiveModeinplanta"),
    ("FRAC CODE", "FRACCODE"),
    ("Additional comments  on anti-infectives", "Antiinfectivecomments"),
];

/// Look up the canonical key for a header code
pub fn canonical_key(code: &str) -> Option<&'static str> {
    CANONICAL_KEYS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, key)| *key)
}

/// Whether a header marks a column that is never released
///
/// Two-row headers are matched on the full (label, code) pair, single-row
/// headers on the code alone.
pub fn is_excluded(header: &Header) -> bool {
    let code = header.code.as_str();
    if code.ends_with(".Exclude") || code == "notParsed" {
        return true;
    }
    EXCLUDED_COLUMNS.iter().any(|(label, excluded_code)| {
        *excluded_code == code
            && header.label.as_deref().is_none_or(|l| l == *label)
    })
}

// ============================================================================
// Header Mapping
// ============================================================================

/// Canonical key to original header, in table order
///
/// Used to put the two-row headers back for the spreadsheet release.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderMapping {
    entries: Vec<(String, Header)>,
}

impl HeaderMapping {
    pub fn get(&self, key: &str) -> Option<&Header> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, h)| h)
    }

    /// Record a header unless the key is already mapped
    pub fn insert_if_absent(&mut self, key: impl Into<String>, header: Header) {
        let key = key.into();
        if self.get(&key).is_none() {
            self.entries.push((key, header));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Header)> {
        self.entries.iter().map(|(k, h)| (k.as_str(), h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Column Normalizer
// ============================================================================

pub struct ColumnNormalizer {
    whitespace: Regex,
    identifier: Regex,
}

impl ColumnNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            identifier: Regex::new(r"^\w+$")?,
        })
    }

    /// Run every header and whitespace step, returning the header mapping
    pub fn normalize(&self, table: &mut Table) -> Result<HeaderMapping> {
        trim_headers(table);
        let removed = remove_excluded(table);
        self.collapse_whitespace(table);
        let mapping = self.rename(table)?;

        info!(
            columns = table.column_count(),
            removed,
            "Normalized column headers"
        );
        Ok(mapping)
    }

    /// Replace every whitespace run in text cells with one space and trim
    ///
    /// A cell holding only whitespace becomes the empty string, not missing.
    pub fn collapse_whitespace(&self, table: &mut Table) {
        for column in table.columns_mut() {
            column.map_text(|value| {
                Cell::text(self.whitespace.replace_all(value, " ").trim())
            });
        }
    }

    /// Rename columns to canonical keys
    ///
    /// Codes without a canonical key are kept as they are.
    pub fn rename(&self, table: &mut Table) -> Result<HeaderMapping> {
        // every key is checked before any header changes
        let keys = table
            .columns()
            .iter()
            .map(|column| self.column_key(&column.header.code))
            .collect::<Result<Vec<String>>>()?;

        let mut mapping = HeaderMapping::default();
        for (column, key) in table.columns_mut().iter_mut().zip(keys) {
            let original = std::mem::replace(&mut column.header, Header::single(key.clone()));
            debug!(code = %original.code, key = %key, "Renamed column");
            mapping.insert_if_absent(key, original);
        }

        Ok(mapping)
    }

    fn column_key(&self, code: &str) -> Result<String> {
        let key = match canonical_key(code) {
            Some(key) => key.to_string(),
            None => {
                warn!(code = %code, "Unrecognized column header");
                code.to_string()
            }
        };

        if !self.identifier.is_match(&key) {
            return Err(PhiError::SchemaDrift { column: key });
        }
        Ok(key)
    }
}

/// Trim surrounding whitespace from every header label and code
pub fn trim_headers(table: &mut Table) {
    for column in table.columns_mut() {
        let header = &mut column.header;
        header.code = header.code.trim().to_string();
        if let Some(label) = header.label.as_mut() {
            *label = label.trim().to_string();
        }
    }
}

/// Drop excluded columns, returning how many were removed
pub fn remove_excluded(table: &mut Table) -> usize {
    let before = table.column_count();
    table.retain_columns(|column| {
        let excluded = is_excluded(&column.header);
        if excluded {
            debug!(header = %column.header, "Removed excluded column");
        }
        !excluded
    });
    before - table.column_count()
}
