use std::path::PathBuf;

use clap::{Parser, Subcommand};
use posting_core::{CategoricalField, NumericField};

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "posting_app")]
#[command(about = "Harvest job postings and summarize salaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level
    #[arg(long, global = true)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    pub log: LogDestination,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every search in a batch config and save the postings
    Harvest {
        #[arg(long)]
        config: PathBuf,
    },
    /// Normalize a saved raw dataset
    Normalize {
        #[arg(long)]
        raw: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print percentile buckets and group summaries of a normalized dataset
    Summarize {
        #[arg(long)]
        dataset: PathBuf,
        /// Numeric column to bucket (num_applicants or annual_salary)
        #[arg(long)]
        dimension: Option<NumericField>,
        #[arg(long, default_value_t = 4)]
        buckets: usize,
        /// Text column to group by (province, country, city or employer)
        #[arg(long)]
        group_by: Option<CategoricalField>,
    },
}
