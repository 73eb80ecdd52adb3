//! # snomed-types
//!
//! Row types for extracting a SNOMED CT subset.
//!
//! Only the parts of a Release Format 2 (RF2) snapshot that a subset keeps
//! are modeled: concepts, descriptions, language reference set members and
//! relationships, plus the derived [`IsaEdge`] and the application bridge
//! [`FeatureConceptMapping`].
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!
//! ## Usage
//!
//! ```rust
//! use snomed_types::{Rf2Concept, DefinitionStatus, SctId};
//! use snomed_types::well_known;
//!
//! let concept = Rf2Concept {
//!     id: 386661006,
//!     effective_time: "20020131".to_string(),
//!     active: true,
//!     module_id: well_known::SNOMED_CT_CORE_MODULE,
//!     definition_status_id: DefinitionStatus::PRIMITIVE_ID,
//! };
//!
//! assert!(concept.is_primitive());
//! let is_a_type: SctId = well_known::IS_A;
//! ```

#![warn(missing_docs)]

mod concept;
mod description;
mod enums;
mod feature;
pub mod refset;
mod relationship;
mod sctid;
pub mod well_known;

pub use concept::Rf2Concept;
pub use description::Rf2Description;
pub use enums::{Acceptability, CaseSignificance, DefinitionStatus, DescriptionType};
pub use feature::FeatureConceptMapping;
pub use refset::Rf2LanguageRefsetMember;
pub use relationship::{IsaEdge, Rf2Relationship};
pub use sctid::SctId;
