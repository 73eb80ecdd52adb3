//! Single-file SQLite store writer.
//!
//! Every bulk load is an upsert keyed by the entity's natural key, so
//! loading the same rows twice leaves the store unchanged. [`SubsetWriter::finalize`]
//! checkpoints any write-ahead log and switches to rollback journaling, so
//! the finished store is one self-contained file.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use snomed_types::{
    FeatureConceptMapping, IsaEdge, Rf2Concept, Rf2Description, Rf2LanguageRefsetMember, SctId,
};
use thiserror::Error;
use tracing::debug;

use crate::subset::SubsetResult;

/// Schema shipped with this crate; used when no schema file is supplied.
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/snomed_subset.sql");

/// Errors from writing the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The schema file could not be read.
    #[error("cannot read schema file {path}: {source}")]
    Schema {
        /// The schema file path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A previous output file could not be removed.
    #[error("cannot remove previous output {path}: {source}")]
    Clean {
        /// The file that could not be removed.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// SQLite refused to leave write-ahead journaling.
    #[error("journal mode is {found:?} after finalize, expected \"delete\"")]
    JournalMode {
        /// The mode SQLite reported.
        found: String,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Where a build's schema comes from.
#[derive(Debug, Clone, Default)]
pub enum SchemaSource {
    /// [`BUNDLED_SCHEMA`].
    #[default]
    Bundled,
    /// SQL statements read from a file and executed verbatim.
    File(PathBuf),
}

impl SchemaSource {
    /// Loads the schema text.
    pub fn load(&self) -> StoreResult<String> {
        match self {
            Self::Bundled => Ok(BUNDLED_SCHEMA.to_string()),
            Self::File(path) => fs::read_to_string(path).map_err(|source| StoreError::Schema {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Key/value pairs describing a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Name of the subset.
    pub subset_name: String,
    /// Version of the subset.
    pub subset_version: String,
    /// Version of the store schema.
    pub schema_version: String,
    /// Identifier of the source release.
    pub rf2_release: String,
}

impl BuildMetadata {
    /// The metadata as `(key, value)` pairs.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("subset_name", self.subset_name.as_str()),
            ("subset_version", self.subset_version.as_str()),
            ("schema_version", self.schema_version.as_str()),
            ("rf2_release", self.rf2_release.as_str()),
        ]
    }
}

/// Natural keys of the rows one build keeps, per table.
#[derive(Debug, Clone, Default)]
pub struct RetainedKeys {
    /// Kept concept ids.
    pub concepts: HashSet<SctId>,
    /// Kept description ids.
    pub descriptions: HashSet<SctId>,
    /// Kept language refset member ids.
    pub language_refset: HashSet<String>,
    /// Kept IS_A edges.
    pub isa_edges: HashSet<IsaEdge>,
    /// Imported feature tokens.
    pub tokens: HashSet<String>,
}

impl RetainedKeys {
    /// Keys of a subset plus the feature mappings loaded with it.
    pub fn new<'a, I>(subset: &SubsetResult, mappings: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureConceptMapping>,
    {
        Self {
            concepts: subset.concept_ids(),
            descriptions: subset.descriptions.iter().map(|d| d.id).collect(),
            language_refset: subset.language_refset.iter().map(|m| m.id.clone()).collect(),
            isa_edges: subset.isa_edges.iter().copied().collect(),
            tokens: mappings.into_iter().map(|m| m.token.clone()).collect(),
        }
    }
}

/// Deletes a store file and any journal companions next to it.
pub fn remove_store_files(path: &Path) -> StoreResult<()> {
    let mut targets = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut companion = path.as_os_str().to_owned();
        companion.push(suffix);
        targets.push(PathBuf::from(companion));
    }
    for target in targets {
        match fs::remove_file(&target) {
            Ok(()) => debug!(path = %target.display(), "removed previous output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::Clean {
                    path: target.display().to_string(),
                    source,
                })
            }
        }
    }
    Ok(())
}

/// Writes a subset into a SQLite file.
#[derive(Debug)]
pub struct SubsetWriter {
    conn: Connection,
}

impl SubsetWriter {
    /// Opens (or creates) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = DELETE;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Executes schema statements verbatim.
    pub fn init_schema(&self, sql: &str) -> StoreResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Upserts concepts by `concept_id`.
    pub fn upsert_concepts(&mut self, rows: &[Rf2Concept]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO concept
                   (concept_id, active, effective_time, module_id, definition_status_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(concept_id) DO UPDATE SET
                   active = excluded.active,
                   effective_time = excluded.effective_time,
                   module_id = excluded.module_id,
                   definition_status_id = excluded.definition_status_id",
            )?;
            for c in rows {
                stmt.execute(params![
                    c.id,
                    c.active,
                    c.effective_time,
                    c.module_id,
                    c.definition_status_id
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Upserts descriptions by `description_id`.
    pub fn upsert_descriptions(&mut self, rows: &[Rf2Description]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO description
                   (description_id, concept_id, active, effective_time, module_id,
                    language_code, type_id, term, case_significance_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(description_id) DO UPDATE SET
                   concept_id = excluded.concept_id,
                   active = excluded.active,
                   effective_time = excluded.effective_time,
                   module_id = excluded.module_id,
                   language_code = excluded.language_code,
                   type_id = excluded.type_id,
                   term = excluded.term,
                   case_significance_id = excluded.case_significance_id",
            )?;
            for d in rows {
                stmt.execute(params![
                    d.id,
                    d.concept_id,
                    d.active,
                    d.effective_time,
                    d.module_id,
                    d.language_code,
                    d.type_id,
                    d.term,
                    d.case_significance_id
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Upserts language refset rows by `langrefset_id`.
    pub fn upsert_language_refset(&mut self, rows: &[Rf2LanguageRefsetMember]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO langrefset
                   (langrefset_id, active, effective_time, module_id,
                    refset_id, referenced_component_id, acceptability_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(langrefset_id) DO UPDATE SET
                   active = excluded.active,
                   effective_time = excluded.effective_time,
                   module_id = excluded.module_id,
                   refset_id = excluded.refset_id,
                   referenced_component_id = excluded.referenced_component_id,
                   acceptability_id = excluded.acceptability_id",
            )?;
            for m in rows {
                stmt.execute(params![
                    m.id,
                    m.active,
                    m.effective_time,
                    m.module_id,
                    m.refset_id,
                    m.referenced_component_id,
                    m.acceptability_id
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Inserts IS_A edges; an edge already present is left alone.
    pub fn upsert_isa_edges(&mut self, rows: &[IsaEdge]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO isa_edge (child_concept_id, parent_concept_id)
                 VALUES (?1, ?2)
                 ON CONFLICT(child_concept_id, parent_concept_id) DO NOTHING",
            )?;
            for edge in rows {
                stmt.execute(params![edge.child_concept_id, edge.parent_concept_id])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Upserts feature mappings by token.
    pub fn upsert_feature_map<'a, I>(&mut self, rows: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = &'a FeatureConceptMapping>,
    {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO feature_snomed_map (feature_key, concept_id, active, note)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(feature_key) DO UPDATE SET
                   concept_id = excluded.concept_id,
                   active = excluded.active,
                   note = excluded.note",
            )?;
            for m in rows {
                stmt.execute(params![m.token, m.concept_id, m.active, m.note])?;
                count += 1;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// Writes build metadata, replacing any earlier values.
    pub fn write_meta(&mut self, meta: &BuildMetadata) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            for (key, value) in meta.entries() {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Deletes every row whose key is not in `keep`, dependents first.
    ///
    /// Returns the number of rows removed.
    pub fn retain(&mut self, keep: &RetainedKeys) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "CREATE TEMP TABLE IF NOT EXISTS keep_concept (id INTEGER PRIMARY KEY);
             CREATE TEMP TABLE IF NOT EXISTS keep_description (id INTEGER PRIMARY KEY);
             CREATE TEMP TABLE IF NOT EXISTS keep_langrefset (id TEXT PRIMARY KEY);
             CREATE TEMP TABLE IF NOT EXISTS keep_edge (
               child INTEGER NOT NULL, parent INTEGER NOT NULL, PRIMARY KEY (child, parent));
             CREATE TEMP TABLE IF NOT EXISTS keep_token (key TEXT PRIMARY KEY);
             DELETE FROM keep_concept;
             DELETE FROM keep_description;
             DELETE FROM keep_langrefset;
             DELETE FROM keep_edge;
             DELETE FROM keep_token;",
        )?;
        {
            let mut stmt = tx.prepare_cached("INSERT OR IGNORE INTO keep_concept (id) VALUES (?1)")?;
            for id in &keep.concepts {
                stmt.execute(params![id])?;
            }
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO keep_description (id) VALUES (?1)")?;
            for id in &keep.descriptions {
                stmt.execute(params![id])?;
            }
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO keep_langrefset (id) VALUES (?1)")?;
            for id in &keep.language_refset {
                stmt.execute(params![id])?;
            }
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO keep_edge (child, parent) VALUES (?1, ?2)")?;
            for edge in &keep.isa_edges {
                stmt.execute(params![edge.child_concept_id, edge.parent_concept_id])?;
            }
            let mut stmt = tx.prepare_cached("INSERT OR IGNORE INTO keep_token (key) VALUES (?1)")?;
            for token in &keep.tokens {
                stmt.execute(params![token])?;
            }
        }

        let mut removed = 0;
        for sql in [
            "DELETE FROM langrefset WHERE langrefset_id NOT IN (SELECT id FROM keep_langrefset)",
            "DELETE FROM description WHERE description_id NOT IN (SELECT id FROM keep_description)",
            "DELETE FROM isa_edge WHERE NOT EXISTS (
               SELECT 1 FROM keep_edge k
               WHERE k.child = isa_edge.child_concept_id AND k.parent = isa_edge.parent_concept_id)",
            "DELETE FROM concept WHERE concept_id NOT IN (SELECT id FROM keep_concept)",
            "DELETE FROM feature_snomed_map WHERE feature_key NOT IN (SELECT key FROM keep_token)",
        ] {
            removed += tx.execute(sql, [])?;
        }
        tx.commit()?;

        if removed > 0 {
            debug!(removed, "stale rows removed");
        }
        Ok(removed)
    }

    /// Makes the store safe to ship as one file and closes it.
    pub fn finalize(self) -> StoreResult<()> {
        // Returns a status row; fails harmlessly when no WAL was ever used.
        if let Err(e) = self
            .conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
        {
            debug!(error = %e, "wal checkpoint skipped");
        }

        let mode: String = self.conn.pragma_update_and_check(
            None,
            "journal_mode",
            "DELETE",
            |row| row.get(0),
        )?;
        if !mode.eq_ignore_ascii_case("delete") {
            return Err(StoreError::JournalMode { found: mode });
        }

        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}
