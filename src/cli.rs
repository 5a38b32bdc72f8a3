use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ranker_metrics::{DCG_COLUMN, NDCG_COLUMN};

#[derive(Parser, Debug)]
#[command(
    name = "ranker-metrics",
    version,
    about = "Read DCG/NDCG vectors from ranking evaluation results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub db_path: PathBuf,

    #[arg(long, default_value = "overall_results")]
    pub table: String,

    /// Zero-based row ordinal in rowid order.
    #[arg(long, default_value_t = 0)]
    pub row: u64,

    #[arg(long, default_value = DCG_COLUMN)]
    pub dcg_column: String,

    #[arg(long, default_value = NDCG_COLUMN)]
    pub ndcg_column: String,
}
