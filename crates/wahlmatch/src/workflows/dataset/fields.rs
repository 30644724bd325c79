//! Column names understood by the normalizer.
//!
//! The first entry of every list is the header used by the published data
//! files; the remaining entries are accepted aliases.

pub(crate) const ID: &str = "id";

pub(crate) const PARTY_NAME: &[&str] = &["name"];
pub(crate) const PARTY_SHORT_NAME: &[&str] = &["kurzname", "short_name", "shortName"];
pub(crate) const PARTY_COLOR: &[&str] = &["farbe", "color"];
pub(crate) const PARTY_LOGO: &[&str] = &["logo"];
pub(crate) const PARTY_DESCRIPTION: &[&str] = &["beschreibung", "description"];

pub(crate) const THESIS_STATEMENT: &[&str] = &["these", "statement"];
pub(crate) const THESIS_EXPLANATION: &[&str] = &["erklaerung", "explanation"];

const STANCE_PREFIXES: &[&str] = &["partei_", "stance_"];
const JUSTIFICATION_PREFIXES: &[&str] = &["erklaerung_", "justification_"];

/// Nested per-party maps in structured documents, keyed by party id.
pub(crate) const NESTED_STANCES: &[&str] = &["positionen", "positions"];
pub(crate) const NESTED_JUSTIFICATIONS: &[&str] = &["erklaerungen", "justifications"];

/// Flat column a nested `map_key[party_id]` entry is stored under, if
/// `map_key` names one of the nested per-party maps.
pub(crate) fn flattened_column(map_key: &str, party_id: &str) -> Option<String> {
    if NESTED_STANCES.contains(&map_key) {
        Some(format!("{}{party_id}", STANCE_PREFIXES[0]))
    } else if NESTED_JUSTIFICATIONS.contains(&map_key) {
        Some(format!("{}{party_id}", JUSTIFICATION_PREFIXES[0]))
    } else {
        None
    }
}

/// Per-party stance columns for `party_id`, in lookup order.
pub(crate) fn stance_columns(party_id: &str) -> Vec<String> {
    prefixed(STANCE_PREFIXES, party_id)
}

/// Per-party justification columns for `party_id`, in lookup order.
pub(crate) fn justification_columns(party_id: &str) -> Vec<String> {
    prefixed(JUSTIFICATION_PREFIXES, party_id)
}

fn prefixed(prefixes: &[&str], party_id: &str) -> Vec<String> {
    prefixes
        .iter()
        .map(|prefix| format!("{prefix}{party_id}"))
        .collect()
}
