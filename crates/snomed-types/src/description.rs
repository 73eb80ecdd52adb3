//! SNOMED CT Description type.

use crate::{CaseSignificance, DescriptionType, SctId};

/// A SNOMED CT description from the RF2 Description snapshot.
///
/// # Examples
///
/// ```
/// use snomed_types::{Rf2Description, DescriptionType};
///
/// let description = Rf2Description {
///     id: 1000101,
///     effective_time: "20260131".to_string(),
///     active: true,
///     module_id: 900000000000207008,
///     concept_id: 386661006,
///     language_code: "en".to_string(),
///     type_id: DescriptionType::FSN_ID,
///     term: "Fever (finding)".to_string(),
///     case_significance_id: 900000000000448009,
/// };
///
/// assert!(description.is_fsn());
/// assert!(description.is_term());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2Description {
    /// Unique identifier for this description (SCTID).
    pub id: SctId,
    /// Versioning stamp, usually `YYYYMMDD`.
    pub effective_time: String,
    /// Whether this description is active.
    pub active: bool,
    /// The module containing this description.
    pub module_id: SctId,
    /// The concept this description belongs to.
    pub concept_id: SctId,
    /// ISO language code (e.g., "en").
    pub language_code: String,
    /// Type of description (FSN, Synonym, etc.).
    pub type_id: SctId,
    /// The description text.
    pub term: String,
    /// Case significance rules for this term.
    pub case_significance_id: SctId,
}

impl Rf2Description {
    /// Returns the description type enum value.
    pub fn description_type(&self) -> Option<DescriptionType> {
        DescriptionType::from_id(self.type_id)
    }

    /// Returns true if this is a Fully Specified Name.
    pub fn is_fsn(&self) -> bool {
        self.type_id == DescriptionType::FSN_ID
    }

    /// Returns true if this is one of the term kinds (FSN or synonym).
    pub fn is_term(&self) -> bool {
        self.description_type().is_some_and(DescriptionType::is_term)
    }

    /// Returns the case significance enum value.
    pub fn case_significance(&self) -> Option<CaseSignificance> {
        CaseSignificance::from_id(self.case_significance_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_description(type_id: SctId) -> Rf2Description {
        Rf2Description {
            id: 1000201,
            effective_time: "20260131".to_string(),
            active: true,
            module_id: 900000000000207008,
            concept_id: 29857009,
            language_code: "en".to_string(),
            type_id,
            term: "Cough (finding)".to_string(),
            case_significance_id: 900000000000448009,
        }
    }

    #[test]
    fn test_fsn_is_term() {
        let desc = make_description(DescriptionType::FSN_ID);
        assert!(desc.is_fsn());
        assert!(desc.is_term());
        assert_eq!(
            desc.case_significance(),
            Some(CaseSignificance::CaseInsensitive)
        );
    }

    #[test]
    fn test_definition_is_not_term() {
        let desc = make_description(DescriptionType::DEFINITION_ID);
        assert!(!desc.is_fsn());
        assert!(!desc.is_term());
    }

    #[test]
    fn test_unknown_type_is_not_term() {
        let desc = make_description(12345);
        assert_eq!(desc.description_type(), None);
        assert!(!desc.is_term());
    }
}
