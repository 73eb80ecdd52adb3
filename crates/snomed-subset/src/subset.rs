//! Subset extraction.
//!
//! Computes the rows to keep for a seed set in one forward pass per row
//! kind. Each pass only consults keep-sets built by earlier passes, so the
//! order is fixed: concepts, descriptions, language refset rows, then IS_A
//! relationships.

use std::collections::HashSet;

use snomed_types::{
    well_known, IsaEdge, Rf2Concept, Rf2Description, Rf2LanguageRefsetMember, SctId,
};
use tracing::{info, warn};

use crate::release::Rf2Snapshot;
use crate::seed::SeedSet;
use crate::types::{Rf2Config, Rf2Result};

/// Options controlling which rows a subset keeps.
#[derive(Debug, Clone)]
pub struct SubsetConfig {
    /// Language refsets to keep. Empty keeps every refset.
    pub lang_refset_ids: Vec<SctId>,
    /// Keep only FSN and synonym descriptions.
    pub terms_only: bool,
    /// Stop after this many descriptions. Partial builds only. A row that
    /// would exceed the cap is not kept, so `Some(0)` keeps none.
    ///
    /// The cap counts rows, not concepts: concepts late in the description
    /// stream may end up with no kept description at all.
    pub description_limit: Option<usize>,
}

impl Default for SubsetConfig {
    fn default() -> Self {
        Self {
            lang_refset_ids: well_known::DEFAULT_LANG_REFSETS.to_vec(),
            terms_only: true,
            description_limit: None,
        }
    }
}

/// Kept-row counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetCounts {
    /// Kept concepts.
    pub concepts: usize,
    /// Kept descriptions.
    pub descriptions: usize,
    /// Kept language refset rows.
    pub language_refset: usize,
    /// Kept IS_A edges.
    pub isa_edges: usize,
}

/// The rows kept for one subset build.
#[derive(Debug, Clone, Default)]
pub struct SubsetResult {
    /// Kept concepts, in release order.
    pub concepts: Vec<Rf2Concept>,
    /// Kept descriptions, in release order.
    pub descriptions: Vec<Rf2Description>,
    /// Kept language refset rows, in release order.
    pub language_refset: Vec<Rf2LanguageRefsetMember>,
    /// Distinct IS_A edges whose child is kept.
    pub isa_edges: Vec<IsaEdge>,
    /// Whether the description cap cut the description pass short.
    pub description_limit_reached: bool,
}

impl SubsetResult {
    /// Kept-row counts per kind.
    pub fn counts(&self) -> SubsetCounts {
        SubsetCounts {
            concepts: self.concepts.len(),
            descriptions: self.descriptions.len(),
            language_refset: self.language_refset.len(),
            isa_edges: self.isa_edges.len(),
        }
    }

    /// Ids of the kept concepts.
    pub fn concept_ids(&self) -> HashSet<SctId> {
        self.concepts.iter().map(|c| c.id).collect()
    }
}

/// Extracts a subset of `release` for `seeds`.
///
/// # Errors
/// Fails on the first missing file or malformed row; no partial result is
/// returned.
pub fn extract_subset(
    release: &Rf2Snapshot,
    seeds: &SeedSet,
    config: &SubsetConfig,
) -> Rf2Result<SubsetResult> {
    let active = Rf2Config::default();
    let mut result = SubsetResult::default();

    let mut kept_concepts: HashSet<SctId> = HashSet::new();
    let mut rows = release.concepts(active.clone())?;
    for concept in rows.by_ref() {
        let concept = concept?;
        if seeds.contains(concept.id) {
            kept_concepts.insert(concept.id);
            result.concepts.push(concept);
        }
    }
    info!(
        seeds = seeds.len(),
        scanned = rows.records_read(),
        kept = result.concepts.len(),
        "concept pass complete"
    );

    let mut kept_descriptions: HashSet<SctId> = HashSet::new();
    let mut rows = release.descriptions(active.clone())?;
    for description in rows.by_ref() {
        let description = description?;
        if !kept_concepts.contains(&description.concept_id) {
            continue;
        }
        if config.terms_only && !description.is_term() {
            continue;
        }
        if config
            .description_limit
            .is_some_and(|limit| result.descriptions.len() >= limit)
        {
            result.description_limit_reached = true;
            break;
        }
        kept_descriptions.insert(description.id);
        result.descriptions.push(description);
    }
    if result.description_limit_reached {
        warn!(
            limit = result.descriptions.len(),
            "description cap reached; later concepts may have no kept description"
        );
    }
    info!(
        scanned = rows.records_read(),
        kept = result.descriptions.len(),
        "description pass complete"
    );

    let mut rows = release.language_refset(active.clone())?;
    for member in rows.by_ref() {
        let member = member?;
        if !kept_descriptions.contains(&member.referenced_component_id) {
            continue;
        }
        if !config.lang_refset_ids.is_empty() && !config.lang_refset_ids.contains(&member.refset_id)
        {
            continue;
        }
        result.language_refset.push(member);
    }
    info!(
        scanned = rows.records_read(),
        kept = result.language_refset.len(),
        "language refset pass complete"
    );

    let mut seen_edges: HashSet<IsaEdge> = HashSet::new();
    let mut rows = release.relationships(active)?;
    for relationship in rows.by_ref() {
        let relationship = relationship?;
        if !relationship.is_is_a() || !kept_concepts.contains(&relationship.source_id) {
            continue;
        }
        let edge = relationship.to_isa_edge();
        if seen_edges.insert(edge) {
            result.isa_edges.push(edge);
        }
    }
    info!(
        scanned = rows.records_read(),
        kept = result.isa_edges.len(),
        "relationship pass complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ReleaseFixture;
    use snomed_types::DescriptionType;

    fn fixture() -> ReleaseFixture {
        ReleaseFixture::new()
            .concept(404684003, true)
            .concept(386661006, true)
            .concept(29857009, true)
            .concept(100005, false)
            .description(1000001, 404684003, DescriptionType::FSN_ID, "Clinical finding (finding)")
            .description(1000101, 386661006, DescriptionType::FSN_ID, "Fever (finding)")
            .description(1000102, 386661006, DescriptionType::SYNONYM_ID, "Fever")
            .description(1000103, 386661006, DescriptionType::DEFINITION_ID, "Raised body temperature")
            .description(1000201, 29857009, DescriptionType::FSN_ID, "Cough (finding)")
            .description(1000202, 29857009, DescriptionType::SYNONYM_ID, "Cough")
            .description(1000501, 100005, DescriptionType::FSN_ID, "Retired (finding)")
            .lang_member("a1", well_known::US_ENGLISH_LANG_REFSET, 1000102, true)
            .lang_member("a2", well_known::GB_ENGLISH_LANG_REFSET, 1000102, true)
            .lang_member("a3", 999000001, 1000102, true)
            .lang_member("a4", well_known::US_ENGLISH_LANG_REFSET, 1000001, true)
            .lang_member("a5", well_known::US_ENGLISH_LANG_REFSET, 1000202, false)
            .relationship(386661006, 404684003, well_known::IS_A)
            .relationship(29857009, 404684003, well_known::IS_A)
            .relationship(29857009, 404684003, well_known::IS_A)
            .relationship(386661006, 38266002, well_known::FINDING_SITE)
            .relationship(404684003, well_known::SNOMED_CT_ROOT, well_known::IS_A)
    }

    #[test]
    fn test_extract_keeps_closed_subset() {
        let release = fixture().build();
        let seeds: SeedSet = [386661006, 29857009, 100005].into_iter().collect();

        let result = extract_subset(&release.snapshot(), &seeds, &SubsetConfig::default()).unwrap();

        let concept_ids = result.concept_ids();
        assert_eq!(concept_ids, [386661006, 29857009].into_iter().collect());

        let description_ids: HashSet<SctId> = result.descriptions.iter().map(|d| d.id).collect();
        assert_eq!(
            description_ids,
            [1000101, 1000102, 1000201, 1000202].into_iter().collect()
        );
        assert!(result
            .descriptions
            .iter()
            .all(|d| concept_ids.contains(&d.concept_id)));

        let member_ids: Vec<&str> = result.language_refset.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(member_ids, vec!["a1", "a2"]);
        assert!(result
            .language_refset
            .iter()
            .all(|m| description_ids.contains(&m.referenced_component_id)));

        assert_eq!(
            result.isa_edges,
            vec![
                IsaEdge {
                    child_concept_id: 386661006,
                    parent_concept_id: 404684003
                },
                IsaEdge {
                    child_concept_id: 29857009,
                    parent_concept_id: 404684003
                },
            ]
        );
        // Parents may be external to the subset.
        assert!(!concept_ids.contains(&404684003));
        assert!(!result.description_limit_reached);
    }

    #[test]
    fn test_terms_only_off_keeps_definitions() {
        let release = fixture().build();
        let seeds: SeedSet = [386661006].into_iter().collect();
        let config = SubsetConfig {
            terms_only: false,
            ..Default::default()
        };

        let result = extract_subset(&release.snapshot(), &seeds, &config).unwrap();
        assert_eq!(result.counts().descriptions, 3);
    }

    #[test]
    fn test_empty_allow_list_keeps_every_refset() {
        let release = fixture().build();
        let seeds: SeedSet = [386661006].into_iter().collect();
        let config = SubsetConfig {
            lang_refset_ids: Vec::new(),
            ..Default::default()
        };

        let result = extract_subset(&release.snapshot(), &seeds, &config).unwrap();
        assert_eq!(result.counts().language_refset, 3);
    }

    #[test]
    fn test_description_cap_can_starve_later_concepts() {
        // The cap counts rows: with two rows allowed, both go to fever
        // and cough is left without any description. This is accepted for
        // capped builds.
        let release = fixture().build();
        let seeds: SeedSet = [386661006, 29857009].into_iter().collect();
        let config = SubsetConfig {
            description_limit: Some(2),
            ..Default::default()
        };

        let result = extract_subset(&release.snapshot(), &seeds, &config).unwrap();
        assert!(result.description_limit_reached);
        assert_eq!(result.counts().concepts, 2);
        assert_eq!(result.counts().descriptions, 2);
        assert!(result.descriptions.iter().all(|d| d.concept_id == 386661006));
    }

    #[test]
    fn test_zero_description_cap_keeps_nothing() {
        let release = fixture().build();
        let seeds: SeedSet = [386661006].into_iter().collect();
        let config = SubsetConfig {
            description_limit: Some(0),
            ..Default::default()
        };

        let result = extract_subset(&release.snapshot(), &seeds, &config).unwrap();
        assert!(result.description_limit_reached);
        assert_eq!(result.counts().descriptions, 0);
        assert_eq!(result.counts().language_refset, 0);
    }

    #[test]
    fn test_cap_equal_to_candidates_is_not_reached() {
        let release = fixture().build();
        let seeds: SeedSet = [29857009].into_iter().collect();
        let config = SubsetConfig {
            description_limit: Some(2),
            ..Default::default()
        };

        let result = extract_subset(&release.snapshot(), &seeds, &config).unwrap();
        assert!(!result.description_limit_reached);
        assert_eq!(result.counts().descriptions, 2);
    }

    #[test]
    fn test_stale_seed_list_yields_small_subset() {
        let release = fixture().build();
        let seeds: SeedSet = [111111111, 222222222, 386661006].into_iter().collect();

        let result = extract_subset(&release.snapshot(), &seeds, &SubsetConfig::default()).unwrap();
        assert_eq!(result.counts().concepts, 1);
        assert!(result.counts().concepts < seeds.len());
    }

    #[test]
    fn test_malformed_row_aborts_extraction() {
        let release = fixture().raw_concept_line("oops\t20020131\t1\t900000000000207008\t900000000000074008").build();
        let seeds: SeedSet = [386661006].into_iter().collect();

        assert!(extract_subset(&release.snapshot(), &seeds, &SubsetConfig::default()).is_err());
    }
}
