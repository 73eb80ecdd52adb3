//! Generic RF2 snapshot parser.
//!
//! Provides a streaming, header-keyed parser for tab-delimited RF2 files.
//! Columns are looked up by name, so reordered or additional columns in
//! newer releases are tolerated.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use snomed_types::SctId;

use crate::types::{Rf2Config, Rf2Error, Rf2Result, RowKind};

/// Trait for row types that can be parsed from RF2 records.
pub trait Rf2Record: Sized {
    /// Which snapshot this record comes from.
    const KIND: RowKind;

    /// Columns this record reads, by header name.
    ///
    /// [`Fields::get`] slots follow this order.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Builds a record from the resolved fields of one row.
    fn from_fields(fields: &Fields<'_>) -> Rf2Result<Self>;
}

/// One row's values, addressed by the slot order of
/// [`Rf2Record::REQUIRED_COLUMNS`].
pub struct Fields<'a> {
    record: &'a StringRecord,
    positions: &'a [usize],
}

impl<'a> Fields<'a> {
    /// Returns the value of the `slot`-th required column.
    ///
    /// Short rows read as empty strings.
    pub fn get(&self, slot: usize) -> &'a str {
        self.positions
            .get(slot)
            .and_then(|&pos| self.record.get(pos))
            .unwrap_or("")
    }
}

/// Maps header names to column positions.
#[derive(Debug, Clone)]
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            // Handle UTF-8 BOM at start of file
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();
        Self { positions }
    }

    fn require(&self, kind: RowKind, column: &'static str) -> Rf2Result<usize> {
        self.positions
            .get(column)
            .copied()
            .ok_or(Rf2Error::MissingColumn { kind, column })
    }
}

/// A streaming parser for RF2 files.
///
/// Rows are read one at a time; nothing beyond the current record is held
/// in memory.
pub struct Rf2Parser<R: Read, T: Rf2Record> {
    reader: Reader<R>,
    config: Rf2Config,
    positions: Vec<usize>,
    active_position: usize,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: Rf2Record> Rf2Parser<BufReader<File>, T> {
    /// Opens an RF2 file and validates its header.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or lacks a required column.
    pub fn from_path<P: AsRef<Path>>(path: P, config: Rf2Config) -> Rf2Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<R: Read, T: Rf2Record> Rf2Parser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, config: Rf2Config) -> Rf2Result<Self> {
        // RF2 is not quoted CSV: terms may contain bare double quotes.
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .quoting(false)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let index = ColumnIndex::from_headers(csv_reader.headers()?);
        let positions = T::REQUIRED_COLUMNS
            .iter()
            .map(|column| index.require(T::KIND, column))
            .collect::<Rf2Result<Vec<_>>>()?;
        let active_position = index.require(T::KIND, "active")?;

        Ok(Self {
            reader: csv_reader,
            config,
            positions,
            active_position,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Returns the number of records read so far, filtered or not.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Parses all remaining records into a Vec.
    ///
    /// Stops at the first malformed row.
    pub fn parse_all(self) -> Rf2Result<Vec<T>> {
        self.collect()
    }
}

impl<R: Read, T: Rf2Record> Iterator for Rf2Parser<R, T> {
    type Item = Rf2Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;

                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    if self.config.active_only
                        && record.get(self.active_position) != Some("1")
                    {
                        continue;
                    }

                    let fields = Fields {
                        record: &record,
                        positions: &self.positions,
                    };
                    return Some(T::from_fields(&fields));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for parsing RF2 field values.
pub mod parse {
    use super::{Rf2Error, Rf2Result, SctId};

    /// Parses an SCTID, naming the column on failure.
    pub fn sctid(column: &'static str, value: &str) -> Rf2Result<SctId> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| Rf2Error::InvalidSctId {
                column,
                value: value.to_string(),
            })
    }

    /// Parses a boolean from "0" or "1".
    pub fn boolean(value: &str) -> Rf2Result<bool> {
        match value.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(Rf2Error::InvalidBoolean {
                value: value.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snomed_types::Rf2Concept;

    const HEADER: &str = "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n";

    fn concepts(body: &str, config: Rf2Config) -> Rf2Result<Vec<Rf2Concept>> {
        let data = format!("{HEADER}{body}");
        Rf2Parser::<_, Rf2Concept>::from_reader(data.as_bytes(), config)?.parse_all()
    }

    #[test]
    fn test_parse_sctid() {
        assert_eq!(parse::sctid("id", "404684003").unwrap(), 404684003u64);
        assert_eq!(
            parse::sctid("moduleId", "900000000000207008").unwrap(),
            900000000000207008u64
        );
        assert!(parse::sctid("id", "not_a_number").is_err());
        assert!(parse::sctid("id", "").is_err());
    }

    #[test]
    fn test_parse_boolean() {
        assert!(!parse::boolean("0").unwrap());
        assert!(parse::boolean("1").unwrap());
        assert!(parse::boolean("true").is_err());
        assert!(parse::boolean("2").is_err());
    }

    #[test]
    fn test_active_only_skips_inactive_rows() {
        let body = "1\t20020131\t1\t900000000000207008\t900000000000074008\n\
                    2\t20020131\t0\t900000000000207008\t900000000000074008\n";
        let active = concepts(body, Rf2Config::default()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);

        let all = concepts(body, Rf2Config::all_rows()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_records_read_counts_filtered_rows() {
        let data = format!(
            "{HEADER}1\t20020131\t1\t900000000000207008\t900000000000074008\n\
             2\t20020131\t0\t900000000000207008\t900000000000074008\n"
        );
        let mut rows =
            Rf2Parser::<_, Rf2Concept>::from_reader(data.as_bytes(), Rf2Config::default()).unwrap();
        assert_eq!(rows.by_ref().count(), 1);
        assert_eq!(rows.records_read(), 2);
    }

    #[test]
    fn test_active_only_requires_exact_one() {
        // Anything other than "1" counts as inactive, even if it would not parse.
        let body = "1\t20020131\ttrue\t900000000000207008\t900000000000074008\n";
        assert!(concepts(body, Rf2Config::default()).unwrap().is_empty());
        assert!(concepts(body, Rf2Config::all_rows()).is_err());
    }

    #[test]
    fn test_reordered_and_extra_columns() {
        let data = "\u{feff}active\tdefinitionStatusId\textra\tid\tmoduleId\teffectiveTime\n\
                    1\t900000000000074008\tignored\t386661006\t900000000000207008\t20020131\n";
        let rows = Rf2Parser::<_, Rf2Concept>::from_reader(data.as_bytes(), Rf2Config::default())
            .unwrap()
            .parse_all()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 386661006);
        assert_eq!(rows[0].effective_time, "20020131");
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let data = "id\teffectiveTime\tactive\tmoduleId\n1\t20020131\t1\t900000000000207008\n";
        let err = Rf2Parser::<_, Rf2Concept>::from_reader(data.as_bytes(), Rf2Config::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Rf2Error::MissingColumn {
                column: "definitionStatusId",
                ..
            }
        ));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let body = "\n1\t20020131\t1\t900000000000207008\t900000000000074008\n\n";
        let rows = concepts(body, Rf2Config::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
