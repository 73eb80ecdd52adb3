//! SNOMED CT Concept file parser.
//!
//! Parses `sct2_Concept_Snapshot_*.txt` RF2 files.

use snomed_types::Rf2Concept;

use crate::parser::{parse, Fields, Rf2Record};
use crate::types::{Rf2Result, RowKind};

impl Rf2Record for Rf2Concept {
    const KIND: RowKind = RowKind::Concept;
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "definitionStatusId",
    ];

    fn from_fields(fields: &Fields<'_>) -> Rf2Result<Self> {
        Ok(Rf2Concept {
            id: parse::sctid("id", fields.get(0))?,
            effective_time: fields.get(1).to_string(),
            active: parse::boolean(fields.get(2))?,
            module_id: parse::sctid("moduleId", fields.get(3))?,
            definition_status_id: parse::sctid("definitionStatusId", fields.get(4))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Rf2Parser;
    use crate::types::{Rf2Config, Rf2Error};

    fn parse_rows(data: &str) -> Rf2Result<Vec<Rf2Concept>> {
        Rf2Parser::<_, Rf2Concept>::from_reader(data.as_bytes(), Rf2Config::all_rows())?
            .parse_all()
    }

    #[test]
    fn test_parse_concept_record() {
        let rows = parse_rows(
            "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
             404684003\t20020131\t1\t900000000000207008\t900000000000074008\n",
        )
        .unwrap();

        let concept = &rows[0];
        assert_eq!(concept.id, 404684003);
        assert_eq!(concept.effective_time, "20020131");
        assert!(concept.active);
        assert_eq!(concept.module_id, 900000000000207008);
        assert!(concept.is_primitive());
    }

    #[test]
    fn test_parse_inactive_concept() {
        let rows = parse_rows(
            "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
             100005\t20020131\t0\t900000000000207008\t900000000000074008\n",
        )
        .unwrap();
        assert!(!rows[0].active);
    }

    #[test]
    fn test_non_numeric_id_names_column() {
        let err = parse_rows(
            "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
             abc\t20020131\t1\t900000000000207008\t900000000000074008\n",
        )
        .unwrap_err();
        assert!(matches!(err, Rf2Error::InvalidSctId { column: "id", .. }));
    }
}
