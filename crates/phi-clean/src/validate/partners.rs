//! Structural check for interacting partner IDs
//!
//! The optional gene name in front of each group can contain almost anything,
//! so the value is taken apart instead of matched: groups on `; `, entries on
//! `, `, database pairs on `: `.

use crate::parsers::partners::{NO_DATA, PARTNER_DATABASES};

pub fn is_valid_partner_id(value: &str) -> bool {
    value.split("; ").all(is_valid_group)
}

fn is_valid_group(group: &str) -> bool {
    if group == NO_DATA {
        return true;
    }

    let mut pairs = 0;
    for (index, entry) in group.split(", ").enumerate() {
        let parts: Vec<&str> = entry.split(": ").collect();
        match parts.as_slice() {
            // leading gene name
            [name] if index == 0 && !name.trim().is_empty() => continue,
            [database, accession] => {
                if !PARTNER_DATABASES.contains(database)
                    || accession.trim().is_empty()
                    || accession.contains([',', ';'])
                {
                    return false;
                }
                pairs += 1;
            }
            _ => return false,
        }
    }
    pairs > 0
}
