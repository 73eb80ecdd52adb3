//! Feature-token mapping files.
//!
//! A mapping file is a delimited sheet with a header row. Only rows whose
//! should-map flag is affirmative and whose concept id is an integer are
//! imported; every other row is skipped without complaint, since an unset
//! flag is how authors mark a token as not ready.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use snomed_types::{FeatureConceptMapping, SctId};
use thiserror::Error;
use tracing::warn;

/// Header spellings accepted for the token column.
const TOKEN_COLUMNS: &[&str] = &["token", "feature_key"];
/// Header spellings accepted for the should-map flag.
const FLAG_COLUMNS: &[&str] = &["map_to_snomed", "should_map", "map"];
/// Header spellings accepted for the concept id.
const CONCEPT_COLUMNS: &[&str] = &["concept_id", "snomed_concept_id"];
/// Header spellings accepted for the note.
const NOTE_COLUMNS: &[&str] = &["note", "notes"];
/// Header spellings accepted for the expected display name.
const NAME_COLUMNS: &[&str] = &["expected_name", "snomed_fsn", "fsn"];

/// Errors from reading a mapping file.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The mapping file could not be opened.
    #[error("cannot read mapping file {path}: {source}")]
    Io {
        /// The mapping file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The mapping file is not valid delimited text.
    #[error("malformed mapping file: {0}")]
    Csv(#[from] csv::Error),
}

/// One imported mapping plus the author's expected display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    /// The mapping to persist.
    pub mapping: FeatureConceptMapping,
    /// Display name the author expects the concept to have, if given.
    pub expected_name: Option<String>,
}

/// The result of reading a mapping file.
#[derive(Debug, Clone, Default)]
pub struct MappingImport {
    /// Imported mappings, one per token, in first-seen order.
    pub rows: Vec<MappingRow>,
    /// Data rows read from the file.
    pub source_rows: usize,
    /// Required columns the header lacked.
    pub missing_columns: Vec<&'static str>,
}

impl MappingImport {
    /// Returns true if nothing was imported.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The mappings to persist.
    pub fn mappings(&self) -> impl Iterator<Item = &FeatureConceptMapping> {
        self.rows.iter().map(|row| &row.mapping)
    }
}

/// Reads a mapping file. `.tsv` and `.txt` files are tab-delimited,
/// anything else is comma-delimited.
pub fn read_mapping_file<P: AsRef<Path>>(path: P) -> Result<MappingImport, MappingError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MappingError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    };
    parse_mappings(file, delimiter)
}

/// Parses mapping rows from any reader.
pub fn parse_mappings<R: Read>(reader: R, delimiter: u8) -> Result<MappingImport, MappingError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let token_col = find_column(&headers, TOKEN_COLUMNS);
    let flag_col = find_column(&headers, FLAG_COLUMNS);
    let concept_col = find_column(&headers, CONCEPT_COLUMNS);
    let note_col = find_column(&headers, NOTE_COLUMNS);
    let name_col = find_column(&headers, NAME_COLUMNS);

    let mut import = MappingImport::default();
    for (column, found) in [("token", token_col), ("flag", flag_col), ("concept_id", concept_col)] {
        if found.is_none() {
            import.missing_columns.push(column);
        }
    }
    if !import.missing_columns.is_empty() {
        warn!(missing = ?import.missing_columns, "mapping file header lacks required columns");
    }

    let mut by_token: HashMap<String, usize> = HashMap::new();
    for record in csv_reader.records() {
        let record = record?;
        import.source_rows += 1;

        let (Some(token_col), Some(flag_col), Some(concept_col)) = (token_col, flag_col, concept_col)
        else {
            continue;
        };
        let Some(token) = field(&record, Some(token_col)) else {
            continue;
        };
        if !field(&record, Some(flag_col)).is_some_and(is_affirmative) {
            continue;
        }
        let Some(concept_id) =
            field(&record, Some(concept_col)).and_then(|v| v.parse::<SctId>().ok())
        else {
            continue;
        };

        let row = MappingRow {
            mapping: FeatureConceptMapping {
                token: token.to_string(),
                concept_id,
                active: true,
                note: field(&record, note_col).map(str::to_string),
            },
            expected_name: field(&record, name_col).map(str::to_string),
        };

        // Last write wins; the token keeps its first position.
        match by_token.get(token) {
            Some(&index) => import.rows[index] = row,
            None => {
                by_token.insert(token.to_string(), import.rows.len());
                import.rows.push(row);
            }
        }
    }

    Ok(import)
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim_start_matches('\u{feff}').trim();
        names.iter().any(|name| header.eq_ignore_ascii_case(name))
    })
}

fn field<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
    column
        .and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn is_affirmative(value: &str) -> bool {
    ["true", "1", "yes", "y"]
        .iter()
        .any(|yes| value.eq_ignore_ascii_case(yes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> MappingImport {
        parse_mappings(text.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_imports_affirmative_numeric_rows() {
        let import = parse(
            "token,map_to_snomed,snomed_concept_id,snomed_fsn,notes\n\
             sick.hpi.fever,TRUE,386661006,,\n\
             sick.hpi.cough,yes,29857009,Cough (finding),reviewed\n\
             sick.hpi.rash,FALSE,271807003,,\n\
             sick.hpi.pending,TRUE,,,\n\
             sick.hpi.typo,TRUE,29857009x,,\n",
        );

        assert_eq!(import.source_rows, 5);
        assert_eq!(import.rows.len(), 2);

        let fever = &import.rows[0];
        assert_eq!(fever.mapping.token, "sick.hpi.fever");
        assert_eq!(fever.mapping.concept_id, 386661006);
        assert!(fever.mapping.active);
        assert_eq!(fever.mapping.note, None);
        assert_eq!(fever.expected_name, None);

        let cough = &import.rows[1];
        assert_eq!(cough.expected_name.as_deref(), Some("Cough (finding)"));
        assert_eq!(cough.mapping.note.as_deref(), Some("reviewed"));
    }

    #[test]
    fn test_duplicate_token_last_write_wins() {
        let import = parse(
            "token,should_map,concept_id,note\n\
             sick.hpi.fever,1,111111111,first\n\
             sick.hpi.cough,1,29857009,\n\
             sick.hpi.fever,1,386661006,second\n",
        );

        assert_eq!(import.rows.len(), 2);
        assert_eq!(import.rows[0].mapping.token, "sick.hpi.fever");
        assert_eq!(import.rows[0].mapping.concept_id, 386661006);
        assert_eq!(import.rows[0].mapping.note.as_deref(), Some("second"));
    }

    #[test]
    fn test_unrecognized_columns_are_ignored() {
        let import = parse(
            "domain,token,field,map_to_snomed,snomed_concept_id,mapping_confidence\n\
             hpi,sick.hpi.fever,complaint,TRUE,386661006,high\n",
        );
        assert_eq!(import.rows.len(), 1);
        assert!(import.missing_columns.is_empty());
    }

    #[test]
    fn test_missing_flag_column_imports_nothing() {
        let import = parse("token,concept_id\nsick.hpi.fever,386661006\n");
        assert!(import.is_empty());
        assert_eq!(import.source_rows, 1);
        assert_eq!(import.missing_columns, vec!["flag"]);
    }

    #[test]
    fn test_tab_delimited() {
        let import = parse_mappings(
            "token\tmap\tconcept_id\nsick.hpi.fever\tY\t386661006\n".as_bytes(),
            b'\t',
        )
        .unwrap();
        assert_eq!(import.rows.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = read_mapping_file("/no/such/map.csv").unwrap_err();
        assert!(matches!(err, MappingError::Io { .. }));
    }
}
