//! # snomed-subset
//!
//! Extracts a small, referentially closed SNOMED CT subset from an RF2
//! snapshot release and writes it to a single-file SQLite store.
//!
//! The pipeline has four stages:
//!
//! - [`Rf2Snapshot`] locates the snapshot files below a release root and
//!   streams their rows.
//! - [`extract_subset`] keeps the seed concepts plus their descriptions,
//!   language refset rows and IS_A edges.
//! - [`validate_mappings`] cross-checks a feature-token mapping file against
//!   the release.
//! - [`SubsetWriter`] upserts everything into SQLite and leaves a file that
//!   can be copied on its own.
//!
//! [`run_build`] wires the stages together.
//!
//! ## Usage
//!
//! ```no_run
//! use snomed_subset::{run_build, BuildConfig};
//!
//! let mut config = BuildConfig::new(
//!     "SnomedCT_InternationalRF2_PRODUCTION_20260131T120000Z",
//!     "subset_concepts.txt",
//!     "snomed.sqlite",
//! );
//! config.mappings_path = Some("sick_token_map.csv".into());
//! config.validate_mappings = true;
//!
//! let summary = run_build(&config)?;
//! println!("kept {} concepts", summary.counts.concepts);
//! # Ok::<(), snomed_subset::BuildError>(())
//! ```

#![warn(missing_docs)]

mod concept;
mod description;
pub mod mapping;
pub mod parser;
pub mod pipeline;
mod refset;
mod relationship;
pub mod release;
pub mod seed;
pub mod subset;
pub mod types;
pub mod validate;
pub mod writer;

#[cfg(test)]
mod testutil;

pub use mapping::{read_mapping_file, MappingError, MappingImport, MappingRow};
pub use parser::{Rf2Parser, Rf2Record};
pub use pipeline::{run_build, BuildConfig, BuildError, BuildResult, BuildSummary};
pub use release::Rf2Snapshot;
pub use seed::{SeedError, SeedSet};
pub use subset::{extract_subset, SubsetConfig, SubsetCounts, SubsetResult};
pub use types::{Rf2Config, Rf2Error, Rf2Result, RowKind};
pub use validate::{
    validate_mappings, ActiveStatus, InMemorySource, MappingStatus, TerminologySource,
    ValidationReport, ValidationRow,
};
pub use writer::{
    BuildMetadata, RetainedKeys, SchemaSource, StoreError, SubsetWriter, BUNDLED_SCHEMA,
};

// Re-export snomed-types for convenience
pub use snomed_types;
