//! Well-known SNOMED CT identifiers used by subset builds.
//!
//! # Examples
//!
//! ```
//! use snomed_types::well_known;
//!
//! assert_eq!(well_known::IS_A, 116680003);
//! assert_eq!(well_known::DEFAULT_LANG_REFSETS.len(), 2);
//! ```

use crate::SctId;

// =============================================================================
// Root and top-level concepts
// =============================================================================

/// SNOMED CT root concept (138875005).
pub const SNOMED_CT_ROOT: SctId = 138875005;

/// Clinical finding (finding) - 404684003.
pub const CLINICAL_FINDING: SctId = 404684003;

// =============================================================================
// Relationship types
// =============================================================================

/// IS_A relationship type - 116680003.
///
/// The only relationship type a subset keeps; it defines the hierarchy.
pub const IS_A: SctId = 116680003;

/// Finding site - 363698007.
pub const FINDING_SITE: SctId = 363698007;

// =============================================================================
// Modules
// =============================================================================

/// SNOMED CT core module - 900000000000207008.
pub const SNOMED_CT_CORE_MODULE: SctId = 900000000000207008;

// =============================================================================
// Language reference sets
// =============================================================================

/// US English language reference set - 900000000000509007.
pub const US_ENGLISH_LANG_REFSET: SctId = 900000000000509007;

/// GB English language reference set - 900000000000508004.
pub const GB_ENGLISH_LANG_REFSET: SctId = 900000000000508004;

/// Language refsets kept when no allow-list is configured.
pub const DEFAULT_LANG_REFSETS: [SctId; 2] = [US_ENGLISH_LANG_REFSET, GB_ENGLISH_LANG_REFSET];
