//! SNOMED CT language reference set types.
//!
//! Language refsets say whether a description is preferred or acceptable in a
//! particular dialect. They are the only refset family a subset carries.

use crate::{Acceptability, SctId};

/// A language reference set member from `der2_cRefset_LanguageSnapshot` files.
///
/// # RF2 Columns
///
/// | Column | Type | Description |
/// |--------|------|-------------|
/// | id | UUID | Unique identifier for this member |
/// | effectiveTime | Text | Versioning stamp |
/// | active | Boolean | Whether this membership is active |
/// | moduleId | SCTID | Module containing this member |
/// | refsetId | SCTID | The language reference set (e.g., US English, GB English) |
/// | referencedComponentId | SCTID | The description ID |
/// | acceptabilityId | SCTID | Preferred or Acceptable |
///
/// Member ids are UUIDs in international releases and plain integers in some
/// derived packages, so the id is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2LanguageRefsetMember {
    /// Unique identifier for this reference set member.
    pub id: String,
    /// Versioning stamp, usually `YYYYMMDD`.
    pub effective_time: String,
    /// Whether this membership is currently active.
    pub active: bool,
    /// Module this member belongs to.
    pub module_id: SctId,
    /// The language reference set (dialect) this member belongs to.
    pub refset_id: SctId,
    /// The description ID that is a member.
    pub referenced_component_id: SctId,
    /// Preferred (900000000000548007) or Acceptable (900000000000549004).
    pub acceptability_id: SctId,
}

impl Rf2LanguageRefsetMember {
    /// Returns the acceptability enum value.
    pub fn acceptability(&self) -> Option<Acceptability> {
        Acceptability::from_id(self.acceptability_id)
    }

    /// Returns true if this description is preferred in this dialect.
    pub fn is_preferred(&self) -> bool {
        self.acceptability_id == Acceptability::PREFERRED_ID
    }
}
