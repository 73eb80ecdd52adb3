//! RF2 release discovery and row streams.
//!
//! An [`Rf2Snapshot`] wraps an extracted release folder. Each accessor
//! locates its file by pattern and returns a fresh one-pass stream, so
//! calling it again re-reads the file from the start.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use snomed_types::{Rf2Concept, Rf2Description, Rf2LanguageRefsetMember, Rf2Relationship};
use tracing::debug;

use crate::parser::{Rf2Parser, Rf2Record};
use crate::types::{Rf2Config, Rf2Error, Rf2Result, RowKind};

/// A file-backed stream of RF2 rows.
pub type Rf2Rows<T> = Rf2Parser<BufReader<File>, T>;

/// An extracted RF2 release folder.
#[derive(Debug, Clone)]
pub struct Rf2Snapshot {
    root: PathBuf,
    lang: String,
}

impl Rf2Snapshot {
    /// Opens a release folder, using `lang` to prefer language-specific files.
    ///
    /// # Errors
    /// Returns [`Rf2Error::DirectoryNotFound`] if `root` is not a directory.
    pub fn open<P: AsRef<Path>>(root: P, lang: impl Into<String>) -> Rf2Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Rf2Error::DirectoryNotFound {
                path: root.display().to_string(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
            lang: lang.into(),
        })
    }

    /// The release root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The language code used for file discovery.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Infers a `YYYYMMDD` release identifier from the root folder name.
    ///
    /// Release folders are named like
    /// `SnomedCT_InternationalRF2_PRODUCTION_20251201T120000Z`.
    pub fn infer_release_id(&self) -> Option<String> {
        let name = self.root.file_name()?.to_string_lossy();
        extract_release_date(&name)
    }

    /// Locates the snapshot file for a row kind.
    ///
    /// Patterns are tried in priority order and matched recursively below the
    /// root. The first pattern with any match wins; among its matches the
    /// lexicographically greatest path is chosen, which favors the most
    /// recent dated file.
    pub fn locate(&self, kind: RowKind) -> Rf2Result<PathBuf> {
        let patterns = kind.file_patterns(&self.lang);
        let escaped_root = glob::Pattern::escape(&self.root.to_string_lossy());

        for pattern in &patterns {
            let full = format!("{escaped_root}/**/{pattern}");
            let mut matches = Vec::new();
            for entry in glob::glob(&full)? {
                let path = entry.map_err(glob::GlobError::into_error)?;
                if path.is_file() {
                    matches.push(path);
                }
            }
            matches.sort();
            matches.dedup();
            if let Some(path) = matches.pop() {
                debug!(%kind, pattern = %pattern, path = %path.display(), "located RF2 file");
                return Ok(path);
            }
        }

        Err(Rf2Error::NotFound {
            kind,
            root: self.root.display().to_string(),
            patterns: patterns.join(", "),
        })
    }

    /// Streams concept rows.
    pub fn concepts(&self, config: Rf2Config) -> Rf2Result<Rf2Rows<Rf2Concept>> {
        self.rows(config)
    }

    /// Streams description rows.
    pub fn descriptions(&self, config: Rf2Config) -> Rf2Result<Rf2Rows<Rf2Description>> {
        self.rows(config)
    }

    /// Streams language reference set rows.
    pub fn language_refset(
        &self,
        config: Rf2Config,
    ) -> Rf2Result<Rf2Rows<Rf2LanguageRefsetMember>> {
        self.rows(config)
    }

    /// Streams relationship rows of every type.
    pub fn relationships(&self, config: Rf2Config) -> Rf2Result<Rf2Rows<Rf2Relationship>> {
        self.rows(config)
    }

    fn rows<T: Rf2Record>(&self, config: Rf2Config) -> Rf2Result<Rf2Rows<T>> {
        let path = self.locate(T::KIND)?;
        Rf2Parser::from_path(path, config)
    }
}

/// Extracts the first `20YYMMDD` run from a name.
fn extract_release_date(name: &str) -> Option<String> {
    name.as_bytes()
        .windows(8)
        .find(|w| w.starts_with(b"20") && w.iter().all(u8::is_ascii_digit))
        .map(|w| String::from_utf8_lossy(w).into_owned())
}
