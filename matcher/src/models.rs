/// One detected-protein row from the proteome CSV.
///
/// `genes` and `protein_names` hold the `;`-split tokens of the two match
/// columns; `values` keeps every cell of the source row, in header order,
/// so unrelated columns pass through to the output untouched.
#[derive(Debug, Clone)]
pub struct ProteomeEntry {
    pub genes: Vec<String>,
    pub protein_names: Vec<String>,
    pub values: Vec<String>,
}

/// The full proteome table, in source row order. Row position is the only
/// identity an entry has; duplicate rows are allowed and matched
/// independently.
#[derive(Debug, Clone)]
pub struct ProteomeTable {
    pub columns: Vec<String>,
    pub entries: Vec<ProteomeEntry>,
}

/// One upstream regulator record. `id` is the canonical name, `aliases`
/// any declared synonyms, and `prediction` the predicted activation state
/// from the source table (`n.s.` when absent or empty).
#[derive(Debug, Clone)]
pub struct UpstreamRegulator {
    pub id: String,
    pub aliases: Vec<String>,
    pub prediction: String,
}
