use tracing::info;

use crate::index::{AliasIndex, AliasOrigin};
use crate::models::{ProteomeEntry, UpstreamRegulator};

/// Trailing species tags used in `Protein_Names` cells (e.g. `THRB_HUMAN`);
/// stripped before alias lookup so the bare regulator name matches.
const SPECIES_SUFFIXES: [&str; 2] = ["_HUMAN", "_MOUSE"];

/// Match outcome for one proteome row. UR indices are positions in the
/// regulator table (first-seen order); both vectors are deduplicated and
/// sorted by that order, so identical inputs always produce identical
/// output. An empty outcome is a normal result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// URs hit through a declared alias, via genes or protein names.
    pub exact: Vec<usize>,
    /// URs hit only through gene group expansion, with the input gene
    /// symbols that landed in the UR's group.
    pub group: Vec<(usize, Vec<String>)>,
}

impl MatchOutcome {
    /// Exact matches take priority; group matches are the fallback.
    pub fn best_urs(&self) -> Vec<usize> {
        if self.exact.is_empty() {
            self.group.iter().map(|(ur, _)| *ur).collect()
        } else {
            self.exact.clone()
        }
    }

    pub fn best_is_group(&self) -> bool {
        self.exact.is_empty() && !self.group.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.group.is_empty()
    }
}

/// Resolve one proteome row against the alias index. Pure lookup: the row
/// and the index are read-only, rows with nothing populated simply come
/// back empty.
pub fn match_entry(
    row: usize,
    entry: &ProteomeEntry,
    index: &AliasIndex,
    regulators: &[UpstreamRegulator],
    ignore_protein_name_matches: bool,
) -> MatchOutcome {
    let mut exact: Vec<usize> = Vec::new();
    let mut group: Vec<(usize, Vec<String>)> = Vec::new();

    for gene in &entry.genes {
        for hit in index.lookup(gene) {
            match hit.origin {
                AliasOrigin::Declared => {
                    if !exact.contains(&hit.ur) {
                        info!(
                            "ROW {row} UR_EXACT_MATCH {} FOUND IN Genes: {}",
                            regulators[hit.ur].id,
                            entry.genes.join(";")
                        );
                        exact.push(hit.ur);
                    }
                }
                AliasOrigin::Group => match group.iter_mut().find(|(ur, _)| *ur == hit.ur) {
                    Some((_, genes)) => {
                        if !genes.contains(gene) {
                            genes.push(gene.clone());
                        }
                    }
                    None => {
                        info!(
                            "ROW {row} UR_GROUP_MATCH {} [{gene}] FOUND",
                            regulators[hit.ur].id
                        );
                        group.push((hit.ur, vec![gene.clone()]));
                    }
                },
            }
        }
    }

    if !ignore_protein_name_matches {
        for name in &entry.protein_names {
            // Look up the name as given and with the species tag stripped;
            // an alias may be a full protein name like THRB_HUMAN.
            let stripped = strip_species_suffix(name);
            let mut candidates = vec![name.as_str()];
            if stripped != name.as_str() {
                candidates.push(stripped);
            }
            for candidate in candidates {
                for hit in index.lookup(candidate) {
                    if hit.origin == AliasOrigin::Declared && !exact.contains(&hit.ur) {
                        info!(
                            "ROW {row} UR_EXACT_MATCH {} FOUND IN Protein_Names: {}",
                            regulators[hit.ur].id,
                            entry.protein_names.join(";")
                        );
                        exact.push(hit.ur);
                    }
                }
            }
        }
    }

    exact.sort_unstable();
    group.sort_unstable_by_key(|(ur, _)| *ur);
    let outcome = MatchOutcome { exact, group };
    if let Some(summary) = best_summary(&outcome, regulators) {
        info!("ROW {row} UR_BEST_MATCH {summary}");
    }
    outcome
}

/// Summary line for the resolved best matches: exact matches when any
/// exist, annotated group matches otherwise, `None` for no match at all.
fn best_summary(outcome: &MatchOutcome, regulators: &[UpstreamRegulator]) -> Option<String> {
    if !outcome.exact.is_empty() {
        let ids: Vec<&str> = outcome
            .exact
            .iter()
            .map(|&ur| regulators[ur].id.as_str())
            .collect();
        Some(format!("EXACT: {}", ids.join(";")))
    } else if !outcome.group.is_empty() {
        let ids: Vec<String> = outcome
            .group
            .iter()
            .map(|(ur, genes)| format!("{} [{}]", regulators[*ur].id, genes.join(",")))
            .collect();
        Some(format!("GROUP: {}", ids.join(";")))
    } else {
        None
    }
}

fn strip_species_suffix(name: &str) -> &str {
    let trimmed = name.trim();
    for suffix in SPECIES_SUFFIXES {
        let Some(cut) = trimmed.len().checked_sub(suffix.len()) else {
            continue;
        };
        if cut > 0
            && trimmed.is_char_boundary(cut)
            && trimmed[cut..].eq_ignore_ascii_case(suffix)
        {
            return &trimmed[..cut];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::groups::GeneGroups;
    use std::collections::HashMap;

    fn ur(id: &str, aliases: &[&str]) -> UpstreamRegulator {
        UpstreamRegulator {
            id: id.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            prediction: "Activated".to_string(),
        }
    }

    fn entry(genes: &[&str], protein_names: &[&str]) -> ProteomeEntry {
        ProteomeEntry {
            genes: genes.iter().map(|g| g.to_string()).collect(),
            protein_names: protein_names.iter().map(|p| p.to_string()).collect(),
            values: Vec::new(),
        }
    }

    fn index_of(regulators: &[UpstreamRegulator]) -> AliasIndex {
        AliasIndex::build(regulators, &GeneGroups::empty()).unwrap()
    }

    #[test]
    fn gene_matches_regulator_id() {
        let regulators = vec![ur("STAT3", &["Stat3"])];
        let index = index_of(&regulators);

        let outcome = match_entry(0, &entry(&["STAT3"], &[]), &index, &regulators, false);
        assert_eq!(outcome.exact, vec![0]);
        assert!(outcome.group.is_empty());
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        let regulators = vec![ur("TP53", &[])];
        let index = index_of(&regulators);

        let outcome = match_entry(0, &entry(&[" tp53 "], &[]), &index, &regulators, false);
        assert_eq!(outcome.exact, vec![0]);
    }

    #[test]
    fn empty_entry_yields_empty_outcome() {
        let regulators = vec![ur("STAT3", &[])];
        let index = index_of(&regulators);

        let outcome = match_entry(0, &entry(&[], &[]), &index, &regulators, false);
        assert!(outcome.is_empty());
        assert!(outcome.best_urs().is_empty());
    }

    #[test]
    fn protein_name_species_suffix_matches() {
        let regulators = vec![ur("THRB", &[])];
        let index = index_of(&regulators);

        // F2 is the gene for the THRB_HUMAN protein; only the protein name
        // should produce the hit.
        let outcome = match_entry(0, &entry(&["F2"], &["THRB_HUMAN"]), &index, &regulators, false);
        assert_eq!(outcome.exact, vec![0]);
    }

    #[test]
    fn suffixed_alias_matches_identical_protein_name() {
        // The declared alias is itself a full protein name; the raw cell
        // value has to match it, not just the suffix-stripped form.
        let regulators = vec![ur("TR-beta receptor", &["THRB_HUMAN"])];
        let index = index_of(&regulators);

        let outcome = match_entry(0, &entry(&[], &["THRB_HUMAN"]), &index, &regulators, false);
        assert_eq!(outcome.exact, vec![0]);
    }

    #[test]
    fn ignore_protein_name_matches_flag() {
        let regulators = vec![ur("THRB", &[])];
        let index = index_of(&regulators);

        let outcome = match_entry(0, &entry(&["F2"], &["THRB_HUMAN"]), &index, &regulators, true);
        assert!(outcome.is_empty());
    }

    #[test]
    fn ambiguous_alias_matches_every_regulator() {
        let regulators = vec![ur("X", &["FOO"]), ur("Y", &["FOO"])];
        let index = index_of(&regulators);

        let outcome = match_entry(0, &entry(&["foo"], &[]), &index, &regulators, false);
        assert_eq!(outcome.exact, vec![0, 1]);
    }

    #[test]
    fn duplicate_hits_are_deduplicated() {
        let regulators = vec![ur("DRD5", &[])];
        let index = index_of(&regulators);

        // Matched through both the gene and the protein name: one hit.
        let outcome = match_entry(
            0,
            &entry(&["HTR1F", "DRD5"], &["5HT1F_HUMAN", "DRD5_HUMAN"]),
            &index,
            &regulators,
            false,
        );
        assert_eq!(outcome.exact, vec![0]);
    }

    #[test]
    fn group_expansion_matches_co_group_gene() {
        let mut raw = HashMap::new();
        raw.insert(
            "group1".to_string(),
            vec!["STAT3".to_string(), "STAT3A".to_string()],
        );
        let groups = GeneGroups::from_map(&raw);
        let regulators = vec![ur("STAT3", &[])];
        let index = AliasIndex::build(&regulators, &groups).unwrap();

        let outcome = match_entry(0, &entry(&["STAT3A"], &[]), &index, &regulators, false);
        assert!(outcome.exact.is_empty());
        assert_eq!(outcome.group, vec![(0, vec!["STAT3A".to_string()])]);
        assert_eq!(outcome.best_urs(), vec![0]);
        assert!(outcome.best_is_group());
    }

    #[test]
    fn group_named_after_regulator_collects_member_genes() {
        let mut raw = HashMap::new();
        raw.insert(
            "TLR4 complex (LPS-binding)".to_string(),
            vec!["TLR4".to_string(), "LY96".to_string()],
        );
        let groups = GeneGroups::from_map(&raw);
        let regulators = vec![ur("TLR4 complex (LPS-binding)", &[])];
        let index = AliasIndex::build(&regulators, &groups).unwrap();

        let outcome = match_entry(0, &entry(&["TLR4", "LY96"], &[]), &index, &regulators, false);
        assert_eq!(
            outcome.group,
            vec![(0, vec!["TLR4".to_string(), "LY96".to_string()])]
        );
    }

    #[test]
    fn exact_match_outranks_group_match_for_best() {
        let mut raw = HashMap::new();
        raw.insert("g".to_string(), vec!["A".to_string(), "B".to_string()]);
        let groups = GeneGroups::from_map(&raw);
        let regulators = vec![ur("A", &[]), ur("OTHER", &["B"])];
        let index = AliasIndex::build(&regulators, &groups).unwrap();

        // Gene B: declared alias of OTHER (exact) and co-group of A (group).
        let outcome = match_entry(0, &entry(&["B"], &[]), &index, &regulators, false);
        assert_eq!(outcome.exact, vec![1]);
        assert_eq!(outcome.group, vec![(0, vec!["B".to_string()])]);
        assert_eq!(outcome.best_urs(), vec![1]);
        assert!(!outcome.best_is_group());
    }

    #[test]
    fn best_summary_reports_exact_then_group_then_nothing() {
        let regulators = vec![ur("STAT3", &[]), ur("IL-17R family", &[])];

        let exact = MatchOutcome {
            exact: vec![0],
            group: vec![(1, vec!["IL17RB".to_string()])],
        };
        assert_eq!(
            best_summary(&exact, &regulators).as_deref(),
            Some("EXACT: STAT3")
        );

        let group_only = MatchOutcome {
            exact: Vec::new(),
            group: vec![(1, vec!["IL17RB".to_string()])],
        };
        assert_eq!(
            best_summary(&group_only, &regulators).as_deref(),
            Some("GROUP: IL-17R family [IL17RB]")
        );

        assert_eq!(best_summary(&MatchOutcome::default(), &regulators), None);
    }

    #[test]
    fn strip_species_suffix_handles_both_tags() {
        assert_eq!(strip_species_suffix("THRB_HUMAN"), "THRB");
        assert_eq!(strip_species_suffix("thrb_mouse"), "thrb");
        assert_eq!(strip_species_suffix("SUFU"), "SUFU");
        // A bare suffix is not a regulator name.
        assert_eq!(strip_species_suffix("_HUMAN"), "_HUMAN");
    }
}
