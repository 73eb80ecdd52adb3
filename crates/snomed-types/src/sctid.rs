//! SNOMED CT Identifier (SCTID) type.

/// A SNOMED CT identifier (SCTID).
///
/// SCTIDs are 64-bit unsigned integers that uniquely identify components
/// within SNOMED CT.
///
/// # Examples
///
/// ```
/// use snomed_types::SctId;
///
/// let fever: SctId = 386661006;
/// let is_a_type: SctId = 116680003;
/// ```
pub type SctId = u64;
