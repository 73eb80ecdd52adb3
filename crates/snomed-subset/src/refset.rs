//! Language reference set parser.
//!
//! Parses `der2_cRefset_LanguageSnapshot*.txt` RF2 files.

use snomed_types::Rf2LanguageRefsetMember;

use crate::parser::{parse, Fields, Rf2Record};
use crate::types::{Rf2Result, RowKind};

impl Rf2Record for Rf2LanguageRefsetMember {
    const KIND: RowKind = RowKind::LanguageRefset;
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "refsetId",
        "referencedComponentId",
        "acceptabilityId",
    ];

    fn from_fields(fields: &Fields<'_>) -> Rf2Result<Self> {
        Ok(Self {
            id: fields.get(0).to_string(),
            effective_time: fields.get(1).to_string(),
            active: parse::boolean(fields.get(2))?,
            module_id: parse::sctid("moduleId", fields.get(3))?,
            refset_id: parse::sctid("refsetId", fields.get(4))?,
            referenced_component_id: parse::sctid("referencedComponentId", fields.get(5))?,
            acceptability_id: parse::sctid("acceptabilityId", fields.get(6))?,
        })
    }
}
