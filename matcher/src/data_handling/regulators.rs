use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{error, info, warn};

use crate::index::normalize;
use crate::models::UpstreamRegulator;

/// Prediction value for URs the analysis did not call activated or
/// inhibited; empty prediction cells are folded into this.
pub const NOT_SIGNIFICANT: &str = "n.s.";

/// Load the upstream regulator TSV. The UR id column is whichever header
/// matches `upstream.regulator` case-insensitively (there must be exactly
/// one); a `predict...` column and an `alias`/`synonym` column are picked
/// up the same way when present. Alias cells are `;`-separated.
///
/// Duplicate ids are merged into the first-seen record. URs whose
/// prediction is `n.s.` are dropped from matching, unless that would drop
/// every UR, in which case all of them are kept.
pub fn load_regulators(path: &Path) -> Result<Vec<UpstreamRegulator>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening upstream regulator data {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading upstream regulator header row")?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let id_idx = single_column(&headers, r"upstream.regulator")?.ok_or_else(|| {
        anyhow::anyhow!(
            "upstream regulator column not identified in {}; expected one column \
             named like 'Upstream Regulator'",
            path.display()
        )
    })?;
    let predic_idx = single_column(&headers, r"predict")?;
    let alias_idx = single_column(&headers, r"alias|synonym")?;

    let mut regulators: Vec<UpstreamRegulator> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (row_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading upstream regulator row {row_no}"))?;

        let id = record.get(id_idx).unwrap_or("").trim().to_string();
        if id.is_empty() {
            bail!("upstream regulator row {row_no} has an empty identifier");
        }

        let prediction = predic_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(NOT_SIGNIFICANT)
            .to_string();

        let aliases: Vec<String> = alias_idx
            .and_then(|i| record.get(i))
            .map(split_aliases)
            .unwrap_or_default();

        match seen.entry(normalize(&id)) {
            Entry::Occupied(slot) => {
                warn!("DUPLICATE UPSTREAM REGULATOR '{id}', MERGING ALIASES INTO FIRST RECORD");
                let existing = &mut regulators[*slot.get()];
                for alias in aliases {
                    if !existing
                        .aliases
                        .iter()
                        .any(|a| normalize(a) == normalize(&alias))
                    {
                        existing.aliases.push(alias);
                    }
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(regulators.len());
                regulators.push(UpstreamRegulator {
                    id,
                    aliases,
                    prediction,
                });
            }
        }
    }

    let not_significant: Vec<String> = regulators
        .iter()
        .filter(|r| r.prediction == NOT_SIGNIFICANT)
        .map(|r| r.id.clone())
        .collect();
    if !not_significant.is_empty() {
        if not_significant.len() < regulators.len() {
            regulators.retain(|r| r.prediction != NOT_SIGNIFICANT);
            info!(
                "THE FOLLOWING UPSTREAM REGULATORS WERE REMOVED (NOT ACTIVATED OR INHIBITED)\n - {}",
                not_significant.join("\n - ")
            );
        } else {
            error!("NO UPSTREAM REGULATORS RECOGNIZED AS SIGNIFICANT, SO ALL HAVE BEEN INCLUDED");
        }
    }

    info!(
        "LOADED UPSTREAM REGULATORS: {} ({} kept)",
        path.display(),
        regulators.len()
    );
    Ok(regulators)
}

/// Exactly-one semantics: zero matches is `None`, more than one is an
/// error the caller cannot recover from.
fn single_column(headers: &[String], pattern: &str) -> Result<Option<usize>> {
    let re = Regex::new(pattern).expect("header pattern is a valid regex");
    let hits: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| re.is_match(h))
        .map(|(i, _)| i)
        .collect();
    match hits.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        _ => bail!("more than one upstream regulator column matches '{pattern}'"),
    }
}

fn split_aliases(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
