//! Synonym-driven column detection.
//!
//! Each logical field carries a prioritized list of header names seen in
//! the wild; detection is case-insensitive and the first synonym present
//! wins. Extending coverage means adding a name to a list, not a branch.

use serde::Serialize;

/// Header synonyms for the measurement-group identifier.
pub const GROUP_SYNONYMS: &[&str] = &[
    "measurement",
    "measure",
    "measure_num",
    "meritev",
    "id",
    "measurement_number",
    "measurement_no",
    "measure_no",
];

/// Header synonyms for the pin44 (horizontal detector) reading.
pub const PIN44_SYNONYMS: &[&str] = &["pin44", "pin_44", "p44", "pin 44"];

/// Header synonyms for the pin45 (vertical detector) reading.
pub const PIN45_SYNONYMS: &[&str] = &["pin45", "pin_45", "p45", "pin 45"];

/// Positional fallback indexes: group id, pin44, pin45.
pub const FALLBACK_INDEXES: (usize, usize, usize) = (1, 3, 4);

/// How the three logical columns were located in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnMapping {
    /// Header names matched the synonym lists.
    Named {
        /// Matched group-id header.
        group: String,
        /// Matched pin44 header.
        pin44: String,
        /// Matched pin45 header.
        pin45: String,
    },
    /// No complete synonym set found — fixed indexes 1, 3, 4 used.
    Positional,
}

impl ColumnMapping {
    /// Short description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            ColumnMapping::Named {
                group,
                pin44,
                pin45,
            } => format!("named columns ({group}, {pin44}, {pin45})"),
            ColumnMapping::Positional => format!(
                "positional fallback (indexes {}, {}, {})",
                FALLBACK_INDEXES.0, FALLBACK_INDEXES.1, FALLBACK_INDEXES.2
            ),
        }
    }
}

/// Indexes of the detected named columns within the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColumns {
    /// Group-id column index.
    pub group: usize,
    /// pin44 column index.
    pub pin44: usize,
    /// pin45 column index.
    pub pin45: usize,
}

fn find_synonym(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    synonyms
        .iter()
        .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

/// Detect all three logical columns by name. Partial matches do not count;
/// the caller falls back to positions in that case.
pub fn detect(headers: &[String]) -> Option<NamedColumns> {
    Some(NamedColumns {
        group: find_synonym(headers, GROUP_SYNONYMS)?,
        pin44: find_synonym(headers, PIN44_SYNONYMS)?,
        pin45: find_synonym(headers, PIN45_SYNONYMS)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_case_insensitively() {
        let cols = detect(&headers(&["time", "Meritev", "raw", "PIN44", "Pin_45"])).unwrap();
        assert_eq!(cols.group, 1);
        assert_eq!(cols.pin44, 3);
        assert_eq!(cols.pin45, 4);
    }

    #[test]
    fn synonym_priority_is_list_order() {
        // "measurement" outranks "id" even when "id" comes first in the file.
        let cols = detect(&headers(&["id", "measurement", "pin44", "pin45"])).unwrap();
        assert_eq!(cols.group, 1);
    }

    #[test]
    fn partial_header_sets_do_not_match() {
        assert!(detect(&headers(&["measurement", "pin44", "voltage"])).is_none());
        assert!(detect(&headers(&["a", "b", "c"])).is_none());
    }
}
