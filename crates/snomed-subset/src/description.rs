//! SNOMED CT Description file parser.
//!
//! Parses `sct2_Description_Snapshot*.txt` RF2 files.

use snomed_types::Rf2Description;

use crate::parser::{parse, Fields, Rf2Record};
use crate::types::{Rf2Result, RowKind};

impl Rf2Record for Rf2Description {
    const KIND: RowKind = RowKind::Description;
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "conceptId",
        "languageCode",
        "typeId",
        "term",
        "caseSignificanceId",
    ];

    fn from_fields(fields: &Fields<'_>) -> Rf2Result<Self> {
        Ok(Rf2Description {
            id: parse::sctid("id", fields.get(0))?,
            effective_time: fields.get(1).to_string(),
            active: parse::boolean(fields.get(2))?,
            module_id: parse::sctid("moduleId", fields.get(3))?,
            concept_id: parse::sctid("conceptId", fields.get(4))?,
            language_code: fields.get(5).to_string(),
            type_id: parse::sctid("typeId", fields.get(6))?,
            term: fields.get(7).to_string(),
            case_significance_id: parse::sctid("caseSignificanceId", fields.get(8))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Rf2Parser;
    use crate::types::Rf2Config;
    use snomed_types::DescriptionType;

    const HEADER: &str =
        "id\teffectiveTime\tactive\tmoduleId\tconceptId\tlanguageCode\ttypeId\tterm\tcaseSignificanceId\n";

    #[test]
    fn test_parse_description_record() {
        let data = format!(
            "{HEADER}1000101\t20260131\t1\t900000000000207008\t386661006\ten\t900000000000003001\tFever (finding)\t900000000000448009\n"
        );
        let rows = Rf2Parser::<_, Rf2Description>::from_reader(data.as_bytes(), Rf2Config::default())
            .unwrap()
            .parse_all()
            .unwrap();

        let desc = &rows[0];
        assert_eq!(desc.id, 1000101);
        assert_eq!(desc.concept_id, 386661006);
        assert_eq!(desc.language_code, "en");
        assert_eq!(desc.type_id, DescriptionType::FSN_ID);
        assert_eq!(desc.term, "Fever (finding)");
        assert!(desc.is_fsn());
    }

    #[test]
    fn test_term_with_quotes_is_kept_verbatim() {
        let data = format!(
            "{HEADER}1000301\t20260131\t1\t900000000000207008\t29857009\ten\t900000000000013009\t\"Barking\" cough\t900000000000448009\n"
        );
        let rows = Rf2Parser::<_, Rf2Description>::from_reader(data.as_bytes(), Rf2Config::default())
            .unwrap()
            .parse_all()
            .unwrap();
        assert_eq!(rows[0].term, "\"Barking\" cough");
    }
}
