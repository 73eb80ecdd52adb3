//! SNOMED CT subset builder binary.
//!
//! Usage:
//!   snomed-subset-build \
//!     --rf2 data/SnomedCT_InternationalRF2_PRODUCTION_20260131T120000Z \
//!     --subset subset_concepts.txt \
//!     --out snomed.sqlite \
//!     --mappings sick_token_map.csv --validate-mappings

use std::path::PathBuf;
use std::process;

use clap::Parser;
use snomed_subset::snomed_types::{well_known, SctId};
use snomed_subset::{run_build, BuildConfig, BuildSummary, SchemaSource, SubsetConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build a SNOMED CT subset SQLite store from an RF2 snapshot release.
#[derive(Parser, Debug)]
#[command(name = "snomed-subset-build", version)]
struct Args {
    /// Extracted RF2 release folder
    #[arg(long, env = "SNOMED_DATA_PATH")]
    rf2: PathBuf,

    /// Seed list: one concept id per line, `#` comments allowed
    #[arg(long, env = "SNOMED_SUBSET")]
    subset: PathBuf,

    /// Output SQLite file
    #[arg(long, env = "SNOMED_OUT")]
    out: PathBuf,

    /// Schema file to execute; the bundled schema is used when omitted
    #[arg(long, env = "SNOMED_SCHEMA")]
    schema: Option<PathBuf>,

    #[arg(long, env = "SNOMED_SUBSET_NAME", default_value = "custom_subset")]
    subset_name: String,

    /// Defaults to today's date
    #[arg(long, env = "SNOMED_SUBSET_VERSION")]
    subset_version: Option<String>,

    #[arg(long, env = "SNOMED_SCHEMA_VERSION", default_value = "1.0")]
    schema_version: String,

    /// Release identifier; inferred from the release folder name when omitted
    #[arg(long, env = "SNOMED_RF2_RELEASE")]
    rf2_release: Option<String>,

    /// Language code of the description and language refset files
    #[arg(long, env = "SNOMED_LANG", default_value = "en")]
    lang: String,

    /// Stop after this many descriptions (0 disables the cap)
    #[arg(long, env = "SNOMED_LIMIT", default_value_t = 0)]
    limit: usize,

    /// Language refsets to keep; defaults to en-US and en-GB
    #[arg(long = "lang-refset", value_delimiter = ',')]
    lang_refsets: Vec<SctId>,

    /// Keep every description type, not only FSNs and synonyms
    #[arg(long)]
    all_description_types: bool,

    /// Feature-token mapping file (.csv, or tab-delimited .tsv/.txt)
    #[arg(long, env = "SNOMED_MAPPINGS")]
    mappings: Option<PathBuf>,

    /// Cross-check mappings against the release and write a report
    #[arg(long, requires = "mappings")]
    validate_mappings: bool,

    /// Validation report path; defaults next to the output
    #[arg(long, requires = "validate_mappings")]
    report: Option<PathBuf>,

    /// Fail the build when any mapping is not classified `ok`
    #[arg(long, requires = "validate_mappings")]
    fail_on_mismatch: bool,

    /// Reload into the existing output; rows outside this build are deleted.
    /// Without it the output and its journal files are replaced
    #[arg(long)]
    in_place: bool,
}

impl Args {
    fn into_config(self) -> BuildConfig {
        let mut config = BuildConfig::new(self.rf2, self.subset, self.out);
        config.schema = self.schema.map_or(SchemaSource::Bundled, SchemaSource::File);
        config.subset_name = self.subset_name;
        config.subset_version = self
            .subset_version
            .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
        config.schema_version = self.schema_version;
        config.release_id = self.rf2_release;
        config.lang = self.lang;
        config.subset = SubsetConfig {
            lang_refset_ids: if self.lang_refsets.is_empty() {
                well_known::DEFAULT_LANG_REFSETS.to_vec()
            } else {
                self.lang_refsets
            },
            terms_only: !self.all_description_types,
            description_limit: (self.limit > 0).then_some(self.limit),
        };
        config.mappings_path = self.mappings;
        config.validate_mappings = self.validate_mappings;
        config.report_path = self.report;
        config.fail_on_mismatch = self.fail_on_mismatch;
        config.in_place = self.in_place;
        config
    }
}

fn log_summary(summary: &BuildSummary) {
    tracing::info!(
        "Kept {} of {} seed concepts, {} descriptions, {} language refset rows, {} IS_A edges",
        summary.counts.concepts,
        summary.seeds,
        summary.counts.descriptions,
        summary.counts.language_refset,
        summary.counts.isa_edges
    );
    if summary.description_limit_reached {
        tracing::warn!("Description cap reached; this is a partial build");
    }
    if summary.mappings > 0 {
        tracing::info!("Wrote {} feature mappings", summary.mappings);
    }
    for (status, count) in &summary.classifications {
        tracing::info!("  {}: {}", status, count);
    }
    if let Some(path) = &summary.report_path {
        tracing::info!("Validation report: {}", path.display());
    }
    tracing::info!("Release: {}", summary.release_id);
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Args::parse().into_config();
    tracing::info!("Building subset store at {}", config.output_path.display());

    match run_build(&config) {
        Ok(summary) => log_summary(&summary),
        Err(e) => {
            tracing::error!("Build failed: {}", e);
            process::exit(e.exit_code());
        }
    }
}
