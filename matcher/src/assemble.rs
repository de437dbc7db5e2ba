use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::matching::MatchOutcome;
use crate::models::{ProteomeTable, UpstreamRegulator};

pub const MATCH_COLUMNS: [&str; 3] = ["UR_EXACT_MATCH", "UR_GROUP_MATCH", "UR_BEST_MATCH"];
pub const PREDIC_COLUMNS: [&str; 2] = ["EXACT_MATCH_PREDIC", "BEST_MATCH_PREDIC"];

/// Every column this tool appends. The proteome loader drops these from
/// the input when present, so a previous output can be re-fed as input.
pub fn result_columns() -> impl Iterator<Item = &'static str> {
    MATCH_COLUMNS.into_iter().chain(PREDIC_COLUMNS)
}

/// The output table: the proteome's passthrough columns followed by the
/// match and prediction columns, one row per input row.
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Combine the proteome table with its per-row outcomes. Strictly 1:1 and
/// order-preserving; unmatched rows keep their passthrough values and get
/// empty result cells.
///
/// Multi-valued cells are `;`-joined; group matches are annotated with the
/// genes that produced them, e.g. `IL-17R family [IL17RB]`.
pub fn assemble(
    table: &ProteomeTable,
    outcomes: &[MatchOutcome],
    regulators: &[UpstreamRegulator],
) -> ResultTable {
    debug_assert_eq!(table.entries.len(), outcomes.len());

    let mut columns = table.columns.clone();
    columns.extend(result_columns().map(str::to_string));

    let mut rows = Vec::with_capacity(table.entries.len());
    for (entry, outcome) in table.entries.iter().zip(outcomes) {
        let exact = join_ids(&outcome.exact, regulators);
        let group = outcome
            .group
            .iter()
            .map(|(ur, genes)| format!("{} [{}]", regulators[*ur].id, genes.join(",")))
            .collect::<Vec<_>>()
            .join(";");
        let best = if outcome.best_is_group() {
            group.clone()
        } else {
            exact.clone()
        };

        let exact_predic = join_predictions(&outcome.exact, regulators);
        let best_predic = join_predictions(&outcome.best_urs(), regulators);

        let mut row = entry.values.clone();
        row.extend([exact, group, best, exact_predic, best_predic]);
        rows.push(row);
    }

    info!("UPDATED PROTEOME WITH URS");
    ResultTable { columns, rows }
}

pub fn write_result(result: &ResultTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    info!("WROTE FILE TO: {}", path.display());
    Ok(())
}

fn join_ids(urs: &[usize], regulators: &[UpstreamRegulator]) -> String {
    urs.iter()
        .map(|&ur| regulators[ur].id.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

fn join_predictions(urs: &[usize], regulators: &[UpstreamRegulator]) -> String {
    urs.iter()
        .map(|&ur| regulators[ur].prediction.as_str())
        .collect::<Vec<_>>()
        .join(";")
}
