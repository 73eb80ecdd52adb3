//! SNOMED CT Relationship and IS-A edge types.

use crate::{well_known, SctId};

/// A SNOMED CT relationship from the RF2 Relationship snapshot.
///
/// Only the columns needed to derive hierarchy edges are modeled; filtering
/// by relationship type happens in the subset extractor.
///
/// # Examples
///
/// ```
/// use snomed_types::Rf2Relationship;
///
/// let relationship = Rf2Relationship {
///     id: 100000028,
///     effective_time: "20020131".to_string(),
///     active: true,
///     module_id: 900000000000207008,
///     source_id: 386661006,       // Fever
///     destination_id: 404684003,  // Clinical finding
///     type_id: 116680003,         // IS_A
/// };
///
/// assert!(relationship.is_is_a());
/// assert_eq!(relationship.to_isa_edge().parent_concept_id, 404684003);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2Relationship {
    /// Unique identifier for this relationship (SCTID).
    pub id: SctId,
    /// Versioning stamp, usually `YYYYMMDD`.
    pub effective_time: String,
    /// Whether this relationship is active.
    pub active: bool,
    /// The module containing this relationship.
    pub module_id: SctId,
    /// Source concept (the child for IS_A).
    pub source_id: SctId,
    /// Destination concept (the parent for IS_A).
    pub destination_id: SctId,
    /// Relationship type (e.g., IS_A, Finding site).
    pub type_id: SctId,
}

impl Rf2Relationship {
    /// Returns true if this is an IS_A (subtype) relationship.
    pub fn is_is_a(&self) -> bool {
        self.type_id == well_known::IS_A
    }

    /// Projects this relationship onto a hierarchy edge.
    pub fn to_isa_edge(&self) -> IsaEdge {
        IsaEdge {
            child_concept_id: self.source_id,
            parent_concept_id: self.destination_id,
        }
    }
}

/// A directed hierarchy edge from a more specific concept to a more general one.
///
/// The child is always a kept concept. The parent may lie outside the subset,
/// in which case it resolves to an identifier but not to a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsaEdge {
    /// The more specific concept.
    pub child_concept_id: SctId,
    /// The more general concept.
    pub parent_concept_id: SctId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_relationship(type_id: SctId) -> Rf2Relationship {
        Rf2Relationship {
            id: 100000028,
            effective_time: "20020131".to_string(),
            active: true,
            module_id: well_known::SNOMED_CT_CORE_MODULE,
            source_id: 29857009,
            destination_id: 404684003,
            type_id,
        }
    }

    #[test]
    fn test_rf2_relationship_is_a() {
        let rel = make_relationship(well_known::IS_A);
        assert!(rel.is_is_a());
        assert_eq!(
            rel.to_isa_edge(),
            IsaEdge {
                child_concept_id: 29857009,
                parent_concept_id: 404684003,
            }
        );
    }

    #[test]
    fn test_rf2_relationship_non_is_a() {
        let rel = make_relationship(well_known::FINDING_SITE);
        assert!(!rel.is_is_a());
    }
}
