//! SNOMED CT Concept type.

use crate::{DefinitionStatus, SctId};

/// A SNOMED CT concept from the RF2 Concept snapshot.
///
/// Represents a row from `sct2_Concept_Snapshot_*.txt`. The effective time
/// is kept verbatim; it is only ever displayed, never compared.
///
/// # Examples
///
/// ```
/// use snomed_types::{Rf2Concept, DefinitionStatus};
///
/// let concept = Rf2Concept {
///     id: 386661006,
///     effective_time: "20020131".to_string(),
///     active: true,
///     module_id: 900000000000207008,
///     definition_status_id: DefinitionStatus::PRIMITIVE_ID,
/// };
///
/// assert!(concept.is_primitive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2Concept {
    /// Unique identifier for this concept (SCTID).
    pub id: SctId,
    /// Versioning stamp, usually `YYYYMMDD`.
    pub effective_time: String,
    /// Whether this concept is active.
    pub active: bool,
    /// The module containing this concept.
    pub module_id: SctId,
    /// Whether this concept is primitive or fully defined.
    pub definition_status_id: SctId,
}

impl Rf2Concept {
    /// Returns the definition status enum value.
    pub fn definition_status(&self) -> Option<DefinitionStatus> {
        DefinitionStatus::from_id(self.definition_status_id)
    }

    /// Returns true if this concept is primitively defined.
    pub fn is_primitive(&self) -> bool {
        self.definition_status_id == DefinitionStatus::PRIMITIVE_ID
    }
}
