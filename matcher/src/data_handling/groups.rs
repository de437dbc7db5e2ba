use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::index::normalize;

/// On-disk shape of the group file, e.g.
///
/// ```json
/// {
///     "TLR4 complex (LPS-binding)": ["TLR4", "LY96"],
///     "IL-17R family": ["IL17RA", "IL17RB", "IL17RC", "IL17RD"]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct GroupFile(HashMap<String, Vec<String>>);

/// Gene group definitions from the optional JSON group file.
///
/// Every member symbol maps to the union of all groups it appears in, so
/// overlapping groups merge rather than shadow each other. The group id
/// counts as a member of its own group: a group named after an upstream
/// regulator makes that UR reachable from any member gene.
pub struct GeneGroups {
    members: HashMap<String, BTreeSet<String>>,
}

impl GeneGroups {
    /// No group file: every symbol expands only to itself.
    pub fn empty() -> Self {
        Self {
            members: HashMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening group file {}", path.display()))?;
        let GroupFile(raw) = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing group file {}", path.display()))?;

        let groups = Self::from_map(&raw);
        info!(
            "LOADED GROUP DATA: {} ({} groups, {} symbols)",
            path.display(),
            raw.len(),
            groups.members.len()
        );
        Ok(groups)
    }

    pub fn from_map(raw: &HashMap<String, Vec<String>>) -> Self {
        let mut members: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (group_id, genes) in raw {
            let mut full: Vec<&str> = vec![group_id.as_str()];
            full.extend(genes.iter().map(String::as_str));
            for symbol in &full {
                let entry = members.entry(normalize(symbol)).or_default();
                for other in &full {
                    entry.insert((*other).to_string());
                }
            }
        }
        Self { members }
    }

    /// Co-group set for a symbol, itself included. A symbol outside every
    /// group expands only to itself.
    pub fn co_group(&self, symbol: &str) -> BTreeSet<String> {
        match self.members.get(&normalize(symbol)) {
            Some(set) => set.clone(),
            None => BTreeSet::from([symbol.trim().to_string()]),
        }
    }
}
