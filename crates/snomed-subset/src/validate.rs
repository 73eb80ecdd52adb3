//! Feature-token validation.
//!
//! Cross-checks imported mappings against the release: does the concept
//! exist, is it active, and does its fully specified name match the name the
//! mapping author expected. Mappings are never corrected, only classified.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use snomed_types::{Rf2Concept, Rf2Description, SctId};
use tracing::{info, warn};

use crate::mapping::MappingRow;
use crate::release::Rf2Snapshot;
use crate::types::{Rf2Config, Rf2Result};

/// Boxed stream of description rows.
pub type DescriptionStream<'a> = Box<dyn Iterator<Item = Rf2Result<Rf2Description>> + 'a>;

/// An authoritative terminology the validator can consult.
pub trait TerminologySource {
    /// Streams every active description.
    fn active_descriptions(&self) -> Rf2Result<DescriptionStream<'_>>;

    /// Returns the active flag of each requested concept that exists.
    ///
    /// Ids absent from the result are unknown to the source.
    fn concept_status(&self, ids: &HashSet<SctId>) -> Rf2Result<HashMap<SctId, bool>>;
}

impl TerminologySource for Rf2Snapshot {
    fn active_descriptions(&self) -> Rf2Result<DescriptionStream<'_>> {
        Ok(Box::new(self.descriptions(Rf2Config::default())?))
    }

    fn concept_status(&self, ids: &HashSet<SctId>) -> Rf2Result<HashMap<SctId, bool>> {
        let mut status = HashMap::new();
        for concept in self.concepts(Rf2Config::all_rows())? {
            let concept = concept?;
            if ids.contains(&concept.id) {
                status.insert(concept.id, concept.active);
            }
        }
        Ok(status)
    }
}

/// A terminology held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    /// Concepts, active or not.
    pub concepts: Vec<Rf2Concept>,
    /// Descriptions, active or not.
    pub descriptions: Vec<Rf2Description>,
}

impl TerminologySource for InMemorySource {
    fn active_descriptions(&self) -> Rf2Result<DescriptionStream<'_>> {
        Ok(Box::new(
            self.descriptions
                .iter()
                .filter(|d| d.active)
                .cloned()
                .map(Ok),
        ))
    }

    fn concept_status(&self, ids: &HashSet<SctId>) -> Rf2Result<HashMap<SctId, bool>> {
        Ok(self
            .concepts
            .iter()
            .filter(|c| ids.contains(&c.id))
            .map(|c| (c.id, c.active))
            .collect())
    }
}

/// Canonical names and active flags for the concepts being validated.
///
/// Built once up front so each token is a lookup, not a rescan.
#[derive(Debug, Clone, Default)]
pub struct ConceptIndex {
    names: HashMap<SctId, String>,
    status: HashMap<SctId, bool>,
}

impl ConceptIndex {
    /// Indexes `ids` from `source`.
    ///
    /// The canonical name is the first active FSN in stream order.
    pub fn build<S: TerminologySource + ?Sized>(
        source: &S,
        ids: &HashSet<SctId>,
    ) -> Rf2Result<Self> {
        let status = source.concept_status(ids)?;
        let mut names = HashMap::new();
        for description in source.active_descriptions()? {
            let description = description?;
            if description.is_fsn() && ids.contains(&description.concept_id) {
                names
                    .entry(description.concept_id)
                    .or_insert(description.term);
            }
        }
        Ok(Self { names, status })
    }

    /// The canonical name of a concept.
    pub fn name(&self, id: SctId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// The active flag of a concept, if the release knows it.
    pub fn active(&self, id: SctId) -> Option<bool> {
        self.status.get(&id).copied()
    }
}

/// Outcome of checking one mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappingStatus {
    /// Names agree, or no name was expected and the concept is active.
    Ok,
    /// The expected and authoritative names differ.
    FsnMismatch,
    /// A name was expected but the release has none for the id.
    FsnNotFoundInRf2,
    /// No name was expected and the release has an active FSN for the id,
    /// but no concept row. An active concept without an expected name is
    /// [`MappingStatus::Ok`] instead. Informational.
    CsvFsnMissing,
    /// The concept exists but is inactive. Overrides every other status.
    ConceptInactive,
}

impl MappingStatus {
    /// The report spelling of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::FsnMismatch => "fsn_mismatch",
            Self::FsnNotFoundInRf2 => "fsn_not_found_in_rf2",
            Self::CsvFsnMissing => "csv_fsn_missing",
            Self::ConceptInactive => "concept_inactive",
        }
    }

    /// Classifies one mapping.
    pub fn classify(
        expected: Option<&str>,
        authoritative: Option<&str>,
        active: Option<bool>,
    ) -> Self {
        if active == Some(false) {
            return Self::ConceptInactive;
        }
        match (expected, authoritative) {
            (Some(expected), Some(authoritative)) if expected == authoritative => Self::Ok,
            (Some(_), Some(_)) => Self::FsnMismatch,
            (Some(_), None) => Self::FsnNotFoundInRf2,
            (None, _) if active == Some(true) => Self::Ok,
            (None, Some(_)) => Self::CsvFsnMissing,
            (None, None) => Self::FsnNotFoundInRf2,
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the release knows a concept and its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveStatus {
    /// Present and active.
    Active,
    /// Present and inactive.
    Inactive,
    /// Not in the concept snapshot.
    NotFound,
}

impl ActiveStatus {
    fn from_flag(active: Option<bool>) -> Self {
        match active {
            Some(true) => Self::Active,
            Some(false) => Self::Inactive,
            None => Self::NotFound,
        }
    }

    /// The report spelling of this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::NotFound => "not_found",
        }
    }
}

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRow {
    /// The mapped token.
    pub token: String,
    /// The mapped concept.
    pub concept_id: SctId,
    /// The name the author expected.
    pub expected_name: Option<String>,
    /// The release's canonical name.
    pub authoritative_name: Option<String>,
    /// The concept's state in the release.
    pub active_status: ActiveStatus,
    /// The classification.
    pub status: MappingStatus,
    /// The mapping's note.
    pub note: Option<String>,
}

/// Classification of every imported mapping.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// One row per imported mapping.
    pub rows: Vec<ValidationRow>,
    /// Mappings whose concept is not among the kept concepts.
    pub outside_subset: usize,
}

impl ValidationReport {
    /// Number of rows not classified `ok`.
    pub fn problem_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status != MappingStatus::Ok)
            .count()
    }

    /// Row counts per status.
    pub fn status_counts(&self) -> BTreeMap<MappingStatus, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.status).or_insert(0) += 1;
        }
        counts
    }

    /// Writes the report as CSV.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "token",
            "concept_id",
            "expected_name",
            "authoritative_name",
            "active_status",
            "classification",
            "note",
        ])?;
        for row in &self.rows {
            let concept_id = row.concept_id.to_string();
            writer.write_record([
                row.token.as_str(),
                concept_id.as_str(),
                row.expected_name.as_deref().unwrap_or(""),
                row.authoritative_name.as_deref().unwrap_or(""),
                row.active_status.as_str(),
                row.status.as_str(),
                row.note.as_deref().unwrap_or(""),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Classifies every mapping against `source`.
///
/// `kept_concepts` is only used to count mappings that point outside the
/// subset; those are still valid if the release knows them.
pub fn validate_mappings<S: TerminologySource + ?Sized>(
    source: &S,
    mappings: &[MappingRow],
    kept_concepts: &HashSet<SctId>,
) -> Rf2Result<ValidationReport> {
    let ids: HashSet<SctId> = mappings.iter().map(|row| row.mapping.concept_id).collect();
    let index = ConceptIndex::build(source, &ids)?;

    let mut report = ValidationReport::default();
    for row in mappings {
        let concept_id = row.mapping.concept_id;
        let authoritative = index.name(concept_id);
        let active = index.active(concept_id);
        let status = MappingStatus::classify(row.expected_name.as_deref(), authoritative, active);

        if !kept_concepts.contains(&concept_id) {
            report.outside_subset += 1;
        }

        report.rows.push(ValidationRow {
            token: row.mapping.token.clone(),
            concept_id,
            expected_name: row.expected_name.clone(),
            authoritative_name: authoritative.map(str::to_string),
            active_status: ActiveStatus::from_flag(active),
            status,
            note: row.mapping.note.clone(),
        });
    }

    let problems = report.problem_count();
    if problems > 0 {
        warn!(problems, total = report.rows.len(), "feature mappings disagree with the release");
    }
    if report.outside_subset > 0 {
        warn!(
            count = report.outside_subset,
            "feature mappings reference concepts outside the kept subset"
        );
    }
    info!(total = report.rows.len(), "feature mapping validation complete");

    Ok(report)
}
