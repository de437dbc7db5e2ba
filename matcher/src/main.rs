use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::data_handling::groups::GeneGroups;
use crate::data_handling::proteome;
use crate::data_handling::regulators;
use crate::index::AliasIndex;
use crate::matching::MatchOutcome;

mod assemble;
mod data_handling;
mod index;
mod matching;
mod models;

/// Annotates a proteome dataset with matching upstream regulators.
#[derive(Parser, Debug)]
#[command(name = "ura-matcher", version, about)]
struct Args {
    /// Local file path to proteome data (CSV)
    #[arg(short = 'p', long)]
    proteome_data_file: PathBuf,

    /// Local file path to upstream regulator data (TSV)
    #[arg(short = 'u', long)]
    upstream_regulator_file: PathBuf,

    /// Local file path to a JSON gene group file
    #[arg(short = 'g', long)]
    upstream_regulator_group_file: Option<PathBuf>,

    /// Only match Genes, ignore Protein_Names matches
    #[arg(long)]
    ignore_protein_name_matches: bool,

    /// Log level (RUST_LOG overrides)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log to a timestamped file instead of stderr
    #[arg(long)]
    log_to_file: bool,

    /// Local file to output results to
    #[arg(short = 'o', long)]
    out_file: Option<PathBuf>,
}

fn init_logging(args: &Args, timestamp: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.to_lowercase()));

    if args.log_to_file {
        let path = format!("URAProteomeMatcher_LOG_{timestamp}.log");
        let file =
            File::create(&path).with_context(|| format!("creating log file {path}"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let timestamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S").to_string();
    init_logging(&args, &timestamp)?;

    info!("Starting UR/proteome matching");

    // Load everything up front; any structural problem aborts the run
    // before matching starts and before any output exists.
    let proteome = proteome::load_proteome(
        &args.proteome_data_file,
        !args.ignore_protein_name_matches,
    )?;
    let regulators = regulators::load_regulators(&args.upstream_regulator_file)?;
    let groups = match &args.upstream_regulator_group_file {
        Some(path) => GeneGroups::load(path)?,
        None => {
            warn!("NO GROUP FILE PROVIDED");
            GeneGroups::empty()
        }
    };

    let index = AliasIndex::build(&regulators, &groups)?;
    info!("BUILT ALIAS INDEX: {} aliases", index.len());

    let outcomes: Vec<MatchOutcome> = proteome
        .entries
        .iter()
        .enumerate()
        .map(|(row, entry)| {
            matching::match_entry(
                row,
                entry,
                &index,
                &regulators,
                args.ignore_protein_name_matches,
            )
        })
        .collect();

    let result = assemble::assemble(&proteome, &outcomes, &regulators);

    let out_file = args
        .out_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("URAProteomeMatcher_OUT_{timestamp}.csv")));
    assemble::write_result(&result, &out_file)?;

    let matched = outcomes.iter().filter(|o| !o.is_empty()).count();
    info!(
        "{matched} of {} rows matched at least one upstream regulator",
        outcomes.len()
    );
    Ok(())
}
