use std::collections::HashMap;

use anyhow::{bail, Result};
use tracing::debug;

use crate::data_handling::groups::GeneGroups;
use crate::models::UpstreamRegulator;

/// Normalize a symbol for comparison: trim and case-fold, so every lookup
/// is case- and whitespace-insensitive.
pub fn normalize(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}

/// How an alias came to point at an upstream regulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOrigin {
    /// The UR's own id or a declared synonym.
    Declared,
    /// Added through gene group expansion.
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasHit {
    /// Position of the UR in the regulator table (first-seen order).
    pub ur: usize,
    pub origin: AliasOrigin,
}

/// Lookup table from normalized alias to the URs it identifies. Built once
/// per run, read-only afterwards.
pub struct AliasIndex {
    entries: HashMap<String, Vec<AliasHit>>,
}

impl AliasIndex {
    /// Register each UR under its own id, its declared aliases, and every
    /// co-group symbol of those. An alias shared by several URs keeps all
    /// of them; the ambiguity is resolved by nobody, a row hitting it
    /// matches every UR listed.
    pub fn build(regulators: &[UpstreamRegulator], groups: &GeneGroups) -> Result<Self> {
        let mut entries: HashMap<String, Vec<AliasHit>> = HashMap::new();

        for (ur, regulator) in regulators.iter().enumerate() {
            if regulator.id.trim().is_empty() {
                bail!("upstream regulator record {ur} has no identifier");
            }
            let mut declared: Vec<&str> = vec![regulator.id.as_str()];
            declared.extend(regulator.aliases.iter().map(String::as_str));

            for symbol in declared {
                insert(&mut entries, symbol, ur, AliasOrigin::Declared);
                for expanded in groups.co_group(symbol) {
                    if normalize(&expanded) != normalize(symbol) {
                        insert(&mut entries, &expanded, ur, AliasOrigin::Group);
                    }
                }
            }
        }

        for (alias, hits) in &entries {
            if hits.len() > 1 {
                let ids: Vec<&str> = hits
                    .iter()
                    .map(|hit| regulators[hit.ur].id.as_str())
                    .collect();
                debug!("ALIAS '{alias}' IS SHARED BY: {}", ids.join(";"));
            }
        }

        Ok(Self { entries })
    }

    /// All URs registered under a symbol, in regulator-table order. Unknown
    /// symbols return an empty slice.
    pub fn lookup(&self, symbol: &str) -> &[AliasHit] {
        self.entries
            .get(&normalize(symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert(entries: &mut HashMap<String, Vec<AliasHit>>, symbol: &str, ur: usize, origin: AliasOrigin) {
    let key = normalize(symbol);
    if key.is_empty() {
        return;
    }
    let bucket = entries.entry(key).or_default();
    match bucket.iter_mut().find(|hit| hit.ur == ur) {
        // A declared alias wins over a group-expanded one for the same UR.
        Some(hit) => {
            if origin == AliasOrigin::Declared {
                hit.origin = AliasOrigin::Declared;
            }
        }
        None => bucket.push(AliasHit { ur, origin }),
    }
}
