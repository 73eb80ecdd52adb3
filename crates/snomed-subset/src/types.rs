//! Reader-level types for RF2 snapshot processing.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while locating or parsing RF2 files.
#[derive(Error, Debug)]
pub enum Rf2Error {
    /// I/O error reading RF2 file.
    #[error("IO error reading RF2 file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A file-name pattern could not be compiled.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Invalid SCTID format.
    #[error("Invalid SCTID format in column {column}: {value:?}")]
    InvalidSctId {
        /// The column holding the value.
        column: &'static str,
        /// The invalid value that was encountered.
        value: String,
    },

    /// Missing required column in RF2 file.
    #[error("Missing required column {column:?} in {kind} file")]
    MissingColumn {
        /// The row kind being read.
        kind: RowKind,
        /// The name of the missing column.
        column: &'static str,
    },

    /// Invalid boolean value.
    #[error("Invalid boolean value: {value:?} (expected 0 or 1)")]
    InvalidBoolean {
        /// The invalid boolean value.
        value: String,
    },

    /// Release root does not exist or is not a directory.
    #[error("Release directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// No file under the release root matched any pattern for a row kind.
    #[error("RF2 {kind} snapshot not found under {root}; tried patterns: {patterns}")]
    NotFound {
        /// The row kind that was searched for.
        kind: RowKind,
        /// The release root that was searched.
        root: String,
        /// The patterns that were tried, in order.
        patterns: String,
    },
}

/// Result type for RF2 operations.
pub type Rf2Result<T> = Result<T, Rf2Error>;

/// The four snapshot row kinds a subset build reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// `sct2_Concept_Snapshot`
    Concept,
    /// `sct2_Description_Snapshot`
    Description,
    /// `der2_cRefset_LanguageSnapshot`
    LanguageRefset,
    /// `sct2_Relationship_Snapshot`
    Relationship,
}

impl RowKind {
    /// File-name patterns for this kind, in priority order.
    ///
    /// Description and language refset files carry a language code in most
    /// releases; the language-specific spellings are tried first.
    pub fn file_patterns(self, lang: &str) -> Vec<String> {
        match self {
            Self::Concept => vec![
                "sct2_Concept_Snapshot_*.txt".to_string(),
                "sct2_Concept_Snapshot_*".to_string(),
            ],
            Self::Description => vec![
                format!("sct2_Description_Snapshot-{lang}_*.txt"),
                format!("sct2_Description_Snapshot_{lang}_*.txt"),
                "sct2_Description_Snapshot_*.txt".to_string(),
                "sct2_Description_Snapshot_*".to_string(),
            ],
            Self::LanguageRefset => vec![
                format!("der2_cRefset_LanguageSnapshot-{lang}_*.txt"),
                format!("der2_cRefset_LanguageSnapshot_{lang}_*.txt"),
                "der2_cRefset_LanguageSnapshot_*.txt".to_string(),
                "der2_cRefset_LanguageSnapshot_*".to_string(),
            ],
            Self::Relationship => vec![
                "sct2_Relationship_Snapshot_*.txt".to_string(),
                "sct2_Relationship_Snapshot_*".to_string(),
            ],
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Concept => "concept",
            Self::Description => "description",
            Self::LanguageRefset => "language refset",
            Self::Relationship => "relationship",
        };
        f.write_str(name)
    }
}

/// Configuration for RF2 row streams.
#[derive(Debug, Clone)]
pub struct Rf2Config {
    /// Skip rows whose `active` column is not exactly `"1"`.
    pub active_only: bool,
}

impl Default for Rf2Config {
    fn default() -> Self {
        Self { active_only: true }
    }
}

impl Rf2Config {
    /// A config that yields every row, active or not.
    pub fn all_rows() -> Self {
        Self { active_only: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rf2_config_default() {
        assert!(Rf2Config::default().active_only);
        assert!(!Rf2Config::all_rows().active_only);
    }

    #[test]
    fn test_description_patterns_prefer_language() {
        let patterns = RowKind::Description.file_patterns("en");
        assert_eq!(patterns[0], "sct2_Description_Snapshot-en_*.txt");
        assert_eq!(patterns[1], "sct2_Description_Snapshot_en_*.txt");
        assert_eq!(patterns.last().map(String::as_str), Some("sct2_Description_Snapshot_*"));
    }

    #[test]
    fn test_relationship_patterns_skip_concrete_values() {
        let pattern = glob::Pattern::new(&RowKind::Relationship.file_patterns("en")[0]).unwrap();
        assert!(pattern.matches("sct2_Relationship_Snapshot_INT_20250101.txt"));
        assert!(!pattern.matches("sct2_RelationshipConcreteValues_Snapshot_INT_20250101.txt"));
        assert!(!pattern.matches("sct2_StatedRelationship_Snapshot_INT_20250101.txt"));
    }

    #[test]
    fn test_not_found_message_lists_patterns() {
        let err = Rf2Error::NotFound {
            kind: RowKind::Concept,
            root: "/data/rf2".to_string(),
            patterns: RowKind::Concept.file_patterns("en").join(", "),
        };
        let message = err.to_string();
        assert!(message.contains("concept"));
        assert!(message.contains("sct2_Concept_Snapshot_*.txt"));
    }
}
