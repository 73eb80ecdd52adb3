//! Application feature-token bridge type.

use crate::SctId;

/// Maps an application vocabulary token to a SNOMED CT concept.
///
/// The concept id references the whole release, not just the kept subset;
/// whether it resolves is checked separately by validation.
///
/// # Examples
///
/// ```
/// use snomed_types::FeatureConceptMapping;
///
/// let mapping = FeatureConceptMapping {
///     token: "sick.hpi.fever".to_string(),
///     concept_id: 386661006,
///     active: true,
///     note: None,
/// };
///
/// assert!(mapping.active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureConceptMapping {
    /// Stable application key, e.g. `sick.pe.lungs.wheezing`.
    pub token: String,
    /// The mapped concept.
    pub concept_id: SctId,
    /// Whether the mapping is endorsed by its author.
    pub active: bool,
    /// Optional free-text note.
    pub note: Option<String>,
}
