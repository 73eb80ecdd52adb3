//! End-to-end subset build.
//!
//! Inputs are checked before the output is touched: the seed list, the
//! mapping file and the release are all read (and validation run) before
//! the store is opened, so an input error never leaves a half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::mapping::{read_mapping_file, MappingError, MappingImport};
use crate::release::Rf2Snapshot;
use crate::seed::{SeedError, SeedSet};
use crate::subset::{extract_subset, SubsetConfig, SubsetCounts};
use crate::types::Rf2Error;
use crate::validate::{validate_mappings, MappingStatus, ValidationReport};
use crate::writer::{
    remove_store_files, BuildMetadata, RetainedKeys, SchemaSource, StoreError, SubsetWriter,
};

/// Release identifier stored when none is given or inferable.
pub const UNKNOWN_RELEASE: &str = "unknown";

/// Everything a build needs.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root directory of the RF2 release.
    pub release_root: PathBuf,
    /// Seed list of concept ids.
    pub seeds_path: PathBuf,
    /// Output SQLite file.
    pub output_path: PathBuf,
    /// Schema to execute before loading.
    pub schema: SchemaSource,
    /// Stored as `subset_name`.
    pub subset_name: String,
    /// Stored as `subset_version`.
    pub subset_version: String,
    /// Stored as `schema_version`.
    pub schema_version: String,
    /// Stored as `rf2_release`; inferred from the release root when unset.
    pub release_id: Option<String>,
    /// Language code used to locate description and language refset files.
    pub lang: String,
    /// Row-selection options.
    pub subset: SubsetConfig,
    /// Feature-token mapping file to import.
    pub mappings_path: Option<PathBuf>,
    /// Cross-check imported mappings against the release.
    pub validate_mappings: bool,
    /// Where to write the validation report. Defaults next to the output.
    pub report_path: Option<PathBuf>,
    /// Abort when any mapping is not classified `ok`.
    pub fail_on_mismatch: bool,
    /// Reload into an existing output instead of starting from a fresh
    /// file. Rows the current build does not keep are deleted.
    pub in_place: bool,
}

impl BuildConfig {
    /// A config with the default options for the given inputs.
    pub fn new(
        release_root: impl Into<PathBuf>,
        seeds_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            release_root: release_root.into(),
            seeds_path: seeds_path.into(),
            output_path: output_path.into(),
            schema: SchemaSource::Bundled,
            subset_name: "custom_subset".to_string(),
            subset_version: "dev".to_string(),
            schema_version: "1.0".to_string(),
            release_id: None,
            lang: "en".to_string(),
            subset: SubsetConfig::default(),
            mappings_path: None,
            validate_mappings: false,
            report_path: None,
            fail_on_mismatch: false,
            in_place: false,
        }
    }

    /// The validation report location.
    pub fn resolved_report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| self.output_path.with_extension("validation.csv"))
    }
}

/// Errors that abort a build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Reading the release failed.
    #[error(transparent)]
    Rf2(#[from] Rf2Error),

    /// The seed list could not be read.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// The mapping file could not be read.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Writing the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The validation report could not be written.
    #[error("cannot write validation report: {0}")]
    Report(#[from] csv::Error),

    /// A mapping file was given but nothing in it was importable.
    #[error("mapping file {path} yielded no usable rows ({source_rows} rows read)")]
    NoUsableMappings {
        /// The mapping file.
        path: String,
        /// Data rows in the file.
        source_rows: usize,
    },

    /// Mismatch escalation was requested and some mappings are not `ok`.
    #[error("{count} feature mappings failed validation")]
    MappingMismatches {
        /// Mappings not classified `ok`.
        count: usize,
    },
}

impl BuildError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoUsableMappings { .. } => 2,
            Self::MappingMismatches { .. } => 3,
            _ => 1,
        }
    }
}

/// Result type for builds.
pub type BuildResult<T> = Result<T, BuildError>;

/// What a finished build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    /// Seed ids read.
    pub seeds: usize,
    /// Kept-row counts.
    pub counts: SubsetCounts,
    /// Whether the description cap was hit.
    pub description_limit_reached: bool,
    /// Feature mappings written.
    pub mappings: usize,
    /// Classification counts, when validation ran.
    pub classifications: BTreeMap<MappingStatus, usize>,
    /// Validation report location, when one was written.
    pub report_path: Option<PathBuf>,
    /// The stored release identifier.
    pub release_id: String,
}

/// Runs a full build.
pub fn run_build(config: &BuildConfig) -> BuildResult<BuildSummary> {
    let seeds = SeedSet::from_path(&config.seeds_path)?;
    info!(path = %config.seeds_path.display(), seeds = seeds.len(), "seed list loaded");

    let mapping_import = match &config.mappings_path {
        Some(path) => Some(load_mappings(path)?),
        None => None,
    };

    let release = Rf2Snapshot::open(&config.release_root, config.lang.as_str())?;
    let release_id = config
        .release_id
        .clone()
        .or_else(|| release.infer_release_id())
        .unwrap_or_else(|| UNKNOWN_RELEASE.to_string());
    info!(
        root = %release.root().display(),
        lang = release.lang(),
        release = %release_id,
        "reading release"
    );

    let subset = extract_subset(&release, &seeds, &config.subset)?;
    let counts = subset.counts();
    if counts.concepts < seeds.len() {
        info!(
            seeds = seeds.len(),
            kept = counts.concepts,
            "some seeds are absent or inactive in this release"
        );
    }

    let mut summary = BuildSummary {
        seeds: seeds.len(),
        counts,
        description_limit_reached: subset.description_limit_reached,
        release_id: release_id.clone(),
        ..BuildSummary::default()
    };

    if let (Some(import), true) = (&mapping_import, config.validate_mappings) {
        let report = validate_mappings(&release, &import.rows, &subset.concept_ids())?;
        let report_path = config.resolved_report_path();
        report.write_csv(&report_path)?;
        info!(path = %report_path.display(), "validation report written");
        summary.classifications = report.status_counts();
        summary.report_path = Some(report_path);
        escalate(&report, config.fail_on_mismatch)?;
    }

    let schema = config.schema.load()?;
    if !config.in_place {
        remove_store_files(&config.output_path)?;
    }

    let mut writer = SubsetWriter::open(&config.output_path)?;
    writer.init_schema(&schema)?;
    writer.upsert_concepts(&subset.concepts)?;
    writer.upsert_descriptions(&subset.descriptions)?;
    writer.upsert_language_refset(&subset.language_refset)?;
    writer.upsert_isa_edges(&subset.isa_edges)?;
    if let Some(import) = &mapping_import {
        summary.mappings = writer.upsert_feature_map(import.mappings())?;
    }
    if config.in_place {
        let mappings = mapping_import.iter().flat_map(|import| import.mappings());
        writer.retain(&RetainedKeys::new(&subset, mappings))?;
    }
    writer.write_meta(&BuildMetadata {
        subset_name: config.subset_name.clone(),
        subset_version: config.subset_version.clone(),
        schema_version: config.schema_version.clone(),
        rf2_release: release_id,
    })?;
    writer.finalize()?;

    info!(path = %config.output_path.display(), "subset store written");
    Ok(summary)
}

fn load_mappings(path: &Path) -> BuildResult<MappingImport> {
    let import = read_mapping_file(path)?;
    if import.is_empty() {
        return Err(BuildError::NoUsableMappings {
            path: path.display().to_string(),
            source_rows: import.source_rows,
        });
    }
    info!(
        path = %path.display(),
        imported = import.rows.len(),
        rows = import.source_rows,
        "feature mappings loaded"
    );
    Ok(import)
}

fn escalate(report: &ValidationReport, fail_on_mismatch: bool) -> BuildResult<()> {
    let count = report.problem_count();
    if count == 0 {
        return Ok(());
    }
    for row in report.rows.iter().filter(|r| r.status != MappingStatus::Ok) {
        warn!(token = %row.token, concept_id = row.concept_id, status = %row.status, "mapping flagged");
    }
    if fail_on_mismatch {
        return Err(BuildError::MappingMismatches { count });
    }
    Ok(())
}
