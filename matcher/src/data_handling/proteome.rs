use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use crate::assemble;
use crate::models::{ProteomeEntry, ProteomeTable};

/// Load the proteome CSV, e.g.
///
/// ```text
/// Accession,Protein_Names,Genes,Mean_Intensity
/// Q9NRM6,I17RB_HUMAN,IL17RB,693300
/// P30939;P21918,5HT1F_HUMAN;DRD5_HUMAN,HTR1F;DRD5,418100
/// ```
///
/// `Genes` is always required; `Protein_Names` only when protein-name
/// matching is enabled. Both are located case-insensitively and their cells
/// split on `;`. Result columns left over from a previous run are dropped
/// so the tool can be re-fed its own output.
pub fn load_proteome(path: &Path, require_protein_names: bool) -> Result<ProteomeTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening proteome data {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading proteome header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let stale = assemble::result_columns().any(|c| c.eq_ignore_ascii_case(h));
            if stale {
                info!("DROPPED COLUMN: {h}");
            }
            !stale
        })
        .map(|(i, _)| i)
        .collect();
    let columns: Vec<String> = keep.iter().map(|&i| headers[i].clone()).collect();

    let gene_idx = find_column(&columns, "Genes")
        .ok_or_else(|| anyhow!("proteome data {} has no Genes column", path.display()))?;
    let protein_idx = find_column(&columns, "Protein_Names");
    if require_protein_names && protein_idx.is_none() {
        bail!(
            "proteome data {} has no Protein_Names column \
             (use --ignore-protein-name-matches to match on Genes only)",
            path.display()
        );
    }

    let mut entries = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading proteome row {row_no}"))?;
        let values: Vec<String> = keep
            .iter()
            .map(|&i| scrub(record.get(i).unwrap_or("")))
            .collect();

        let genes = split_cell(&values[gene_idx]);
        let protein_names = protein_idx
            .map(|i| split_cell(&values[i]))
            .unwrap_or_default();

        entries.push(ProteomeEntry {
            genes,
            protein_names,
            values,
        });
    }

    info!("LOADED PROTEOME: {} ({} rows)", path.display(), entries.len());
    debug!("PROTEOME COLUMNS: {}", columns.join(","));
    Ok(ProteomeTable { columns, entries })
}

fn find_column(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|h| h.eq_ignore_ascii_case(name))
}

/// Proteomics exports occasionally carry non-breaking spaces; strip them
/// along with the surrounding whitespace.
fn scrub(cell: &str) -> String {
    cell.replace('\u{a0}', "").trim().to_string()
}

fn split_cell(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
