//! SNOMED CT enumeration types.
//!
//! Enum representations for the coded values carried by the rows a subset
//! keeps: definition status, description type, case significance and
//! language acceptability.

use crate::SctId;

/// Definition status for a SNOMED CT concept.
///
/// # Examples
///
/// ```
/// use snomed_types::DefinitionStatus;
///
/// let status = DefinitionStatus::from_id(900000000000074008);
/// assert_eq!(status, Some(DefinitionStatus::Primitive));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefinitionStatus {
    /// Concept is primitively defined (necessary conditions only).
    Primitive,
    /// Concept is fully defined (necessary and sufficient conditions).
    FullyDefined,
}

impl DefinitionStatus {
    /// SCTID for primitive definition status.
    pub const PRIMITIVE_ID: SctId = 900000000000074008;
    /// SCTID for fully defined definition status.
    pub const FULLY_DEFINED_ID: SctId = 900000000000073002;

    /// Creates a DefinitionStatus from its SCTID.
    pub fn from_id(id: SctId) -> Option<Self> {
        match id {
            Self::PRIMITIVE_ID => Some(Self::Primitive),
            Self::FULLY_DEFINED_ID => Some(Self::FullyDefined),
            _ => None,
        }
    }

    /// Returns the SCTID for this definition status.
    pub fn to_id(self) -> SctId {
        match self {
            Self::Primitive => Self::PRIMITIVE_ID,
            Self::FullyDefined => Self::FULLY_DEFINED_ID,
        }
    }
}

/// Description type for SNOMED CT descriptions.
///
/// Subset builds in "terms only" mode keep [`DescriptionType::Fsn`] and
/// [`DescriptionType::Synonym`] rows and drop everything else.
///
/// # Examples
///
/// ```
/// use snomed_types::DescriptionType;
///
/// let desc_type = DescriptionType::from_id(900000000000003001);
/// assert_eq!(desc_type, Some(DescriptionType::Fsn));
/// assert!(DescriptionType::Fsn.is_term());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DescriptionType {
    /// Fully Specified Name - unambiguous description with semantic tag.
    Fsn,
    /// Synonym - additional acceptable term for the concept.
    Synonym,
    /// Definition - textual definition.
    Definition,
}

impl DescriptionType {
    /// SCTID for Fully Specified Name type.
    pub const FSN_ID: SctId = 900000000000003001;
    /// SCTID for Synonym type.
    pub const SYNONYM_ID: SctId = 900000000000013009;
    /// SCTID for Definition type.
    pub const DEFINITION_ID: SctId = 900000000000550004;

    /// Creates a DescriptionType from its SCTID.
    pub fn from_id(id: SctId) -> Option<Self> {
        match id {
            Self::FSN_ID => Some(Self::Fsn),
            Self::SYNONYM_ID => Some(Self::Synonym),
            Self::DEFINITION_ID => Some(Self::Definition),
            _ => None,
        }
    }

    /// Returns the SCTID for this description type.
    pub fn to_id(self) -> SctId {
        match self {
            Self::Fsn => Self::FSN_ID,
            Self::Synonym => Self::SYNONYM_ID,
            Self::Definition => Self::DEFINITION_ID,
        }
    }

    /// Returns true for the two term kinds (FSN and synonym).
    pub fn is_term(self) -> bool {
        matches!(self, Self::Fsn | Self::Synonym)
    }
}

/// Case significance for SNOMED CT descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseSignificance {
    /// Entire term is case insensitive.
    CaseInsensitive,
    /// Entire term is case sensitive.
    EntireTermCaseSensitive,
    /// Only initial character is case sensitive.
    InitialCharacterCaseSensitive,
}

impl CaseSignificance {
    /// SCTID for case insensitive.
    pub const CASE_INSENSITIVE_ID: SctId = 900000000000448009;
    /// SCTID for entire term case sensitive.
    pub const ENTIRE_TERM_CASE_SENSITIVE_ID: SctId = 900000000000017005;
    /// SCTID for initial character case sensitive.
    pub const INITIAL_CHAR_CASE_SENSITIVE_ID: SctId = 900000000000020002;

    /// Creates a CaseSignificance from its SCTID.
    pub fn from_id(id: SctId) -> Option<Self> {
        match id {
            Self::CASE_INSENSITIVE_ID => Some(Self::CaseInsensitive),
            Self::ENTIRE_TERM_CASE_SENSITIVE_ID => Some(Self::EntireTermCaseSensitive),
            Self::INITIAL_CHAR_CASE_SENSITIVE_ID => Some(Self::InitialCharacterCaseSensitive),
            _ => None,
        }
    }
}

/// Acceptability of a description within a language reference set.
///
/// # Examples
///
/// ```
/// use snomed_types::Acceptability;
///
/// assert_eq!(
///     Acceptability::from_id(900000000000548007),
///     Some(Acceptability::Preferred)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acceptability {
    /// The preferred term for the concept in this dialect.
    Preferred,
    /// An acceptable, non-preferred term.
    Acceptable,
}

impl Acceptability {
    /// SCTID for "Preferred" acceptability.
    pub const PREFERRED_ID: SctId = 900000000000548007;
    /// SCTID for "Acceptable" acceptability.
    pub const ACCEPTABLE_ID: SctId = 900000000000549004;

    /// Creates an Acceptability from its SCTID.
    pub fn from_id(id: SctId) -> Option<Self> {
        match id {
            Self::PREFERRED_ID => Some(Self::Preferred),
            Self::ACCEPTABLE_ID => Some(Self::Acceptable),
            _ => None,
        }
    }
}
