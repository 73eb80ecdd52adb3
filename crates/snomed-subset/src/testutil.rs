//! Tiny on-disk RF2 releases for unit tests.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use snomed_types::{well_known, Acceptability, DefinitionStatus, SctId};
use tempfile::TempDir;

use crate::release::Rf2Snapshot;

const EFFECTIVE: &str = "20260131";

pub(crate) struct ReleaseFixture {
    concepts: String,
    descriptions: String,
    language: String,
    relationships: String,
    next_relationship_id: SctId,
}

impl ReleaseFixture {
    pub(crate) fn new() -> Self {
        Self {
            concepts: "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n".to_string(),
            descriptions: "id\teffectiveTime\tactive\tmoduleId\tconceptId\tlanguageCode\ttypeId\tterm\tcaseSignificanceId\n".to_string(),
            language: "id\teffectiveTime\tactive\tmoduleId\trefsetId\treferencedComponentId\tacceptabilityId\n".to_string(),
            relationships: "id\teffectiveTime\tactive\tmoduleId\tsourceId\tdestinationId\trelationshipGroup\ttypeId\tcharacteristicTypeId\tmodifierId\n".to_string(),
            next_relationship_id: 5000001,
        }
    }

    pub(crate) fn concept(mut self, id: SctId, active: bool) -> Self {
        let _ = writeln!(
            self.concepts,
            "{id}\t{EFFECTIVE}\t{}\t{}\t{}",
            u8::from(active),
            well_known::SNOMED_CT_CORE_MODULE,
            DefinitionStatus::PRIMITIVE_ID
        );
        self
    }

    pub(crate) fn raw_concept_line(mut self, line: &str) -> Self {
        self.concepts.push_str(line);
        self.concepts.push('\n');
        self
    }

    pub(crate) fn description(mut self, id: SctId, concept_id: SctId, type_id: SctId, term: &str) -> Self {
        let _ = writeln!(
            self.descriptions,
            "{id}\t{EFFECTIVE}\t1\t{}\t{concept_id}\ten\t{type_id}\t{term}\t900000000000448009",
            well_known::SNOMED_CT_CORE_MODULE
        );
        self
    }

    pub(crate) fn lang_member(mut self, id: &str, refset_id: SctId, description_id: SctId, active: bool) -> Self {
        let _ = writeln!(
            self.language,
            "{id}\t{EFFECTIVE}\t{}\t{}\t{refset_id}\t{description_id}\t{}",
            u8::from(active),
            well_known::SNOMED_CT_CORE_MODULE,
            Acceptability::PREFERRED_ID
        );
        self
    }

    pub(crate) fn relationship(mut self, source_id: SctId, destination_id: SctId, type_id: SctId) -> Self {
        let _ = writeln!(
            self.relationships,
            "{}\t{EFFECTIVE}\t1\t{}\t{source_id}\t{destination_id}\t0\t{type_id}\t900000000000011006\t900000000000451002",
            self.next_relationship_id,
            well_known::SNOMED_CT_CORE_MODULE
        );
        self.next_relationship_id += 1;
        self
    }

    pub(crate) fn build(self) -> BuiltRelease {
        let dir = TempDir::new().expect("tempdir");
        let terminology = dir.path().join("Snapshot").join("Terminology");
        let language = dir.path().join("Snapshot").join("Refset").join("Language");
        write(&terminology, "sct2_Concept_Snapshot_INT_20260131.txt", &self.concepts);
        write(&terminology, "sct2_Description_Snapshot-en_INT_20260131.txt", &self.descriptions);
        write(&terminology, "sct2_Relationship_Snapshot_INT_20260131.txt", &self.relationships);
        write(&language, "der2_cRefset_LanguageSnapshot-en_INT_20260131.txt", &self.language);
        BuiltRelease { dir }
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).expect("create fixture dir");
    fs::write(dir.join(name), contents).expect("write fixture file");
}

pub(crate) struct BuiltRelease {
    dir: TempDir,
}

impl BuiltRelease {
    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn snapshot(&self) -> Rf2Snapshot {
        Rf2Snapshot::open(self.dir.path(), "en").expect("fixture snapshot")
    }
}
