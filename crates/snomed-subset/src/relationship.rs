//! SNOMED CT Relationship file parser.
//!
//! Parses `sct2_Relationship_Snapshot_*.txt` RF2 files. No type filtering
//! happens here; the subset extractor picks out IS_A rows.

use snomed_types::Rf2Relationship;

use crate::parser::{parse, Fields, Rf2Record};
use crate::types::{Rf2Result, RowKind};

impl Rf2Record for Rf2Relationship {
    const KIND: RowKind = RowKind::Relationship;
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "sourceId",
        "destinationId",
        "typeId",
    ];

    fn from_fields(fields: &Fields<'_>) -> Rf2Result<Self> {
        Ok(Rf2Relationship {
            id: parse::sctid("id", fields.get(0))?,
            effective_time: fields.get(1).to_string(),
            active: parse::boolean(fields.get(2))?,
            module_id: parse::sctid("moduleId", fields.get(3))?,
            source_id: parse::sctid("sourceId", fields.get(4))?,
            destination_id: parse::sctid("destinationId", fields.get(5))?,
            type_id: parse::sctid("typeId", fields.get(6))?,
        })
    }
}
