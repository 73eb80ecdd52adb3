//! Seed concept lists.
//!
//! A seed file holds one concept id per line. Anything after `#` is a
//! comment and blank lines are ignored. A single malformed line rejects the
//! whole file, so a partially valid list never drives an extraction.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use snomed_types::SctId;
use thiserror::Error;

/// Errors from reading a seed list.
#[derive(Error, Debug)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("cannot read seed file {path}: {source}")]
    Io {
        /// The seed file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A line held something other than a concept id.
    #[error("invalid concept id on seed line {line_number}: {line:?}")]
    InvalidLine {
        /// 1-based line number.
        line_number: usize,
        /// The raw line as written.
        line: String,
    },
}

/// The set of concept ids a subset is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    ids: HashSet<SctId>,
}

impl SeedSet {
    /// Reads and parses a seed file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses seed list text.
    pub fn parse(text: &str) -> Result<Self, SeedError> {
        let mut ids = HashSet::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let id = line
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| line.parse::<SctId>().ok())
                .flatten()
                .ok_or_else(|| SeedError::InvalidLine {
                    line_number: i + 1,
                    line: raw.to_string(),
                })?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    /// Returns true if `id` is a seed.
    pub fn contains(&self, id: SctId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of distinct seeds.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if there are no seeds.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<SctId> for SeedSet {
    fn from_iter<I: IntoIterator<Item = SctId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
