//! CLI commands and argument parsing

use crate::sink::SinkKind;
use crate::types::{FailurePolicy, LoadMode, ResourceKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Football competition ETL
#[derive(Parser, Debug)]
#[command(name = "football-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline file (YAML) overriding environment settings
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for run logs [env: ETL_LOG_DIR, default: logs]
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline over one or more competitions
    Run {
        /// Competition codes, processed in order (default: configured list)
        competitions: Vec<String>,

        /// What to do when a competition fails
        #[arg(long)]
        policy: Option<FailurePolicy>,

        /// How batches are written
        #[arg(long)]
        load_mode: Option<LoadMode>,

        /// Where batches are written
        #[arg(long, value_enum, default_value_t = SinkKind::Warehouse)]
        sink: SinkKind,

        /// Output directory for the parquet sink
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Season start year
        #[arg(long)]
        season: Option<u32>,
    },

    /// Validate configuration and reach the provider and the warehouse
    Check {
        /// Skip the warehouse connection check
        #[arg(long)]
        skip_warehouse: bool,
    },

    /// Fetch and normalize one resource, printing records as JSON lines
    Preview {
        /// Competition code
        competition: String,

        /// Resource to fetch
        #[arg(value_enum)]
        resource: ResourceKind,

        /// Season start year
        #[arg(long)]
        season: Option<u32>,
    },

    /// Print the DDL of every target table
    Schema,
}

impl Commands {
    /// Whether this command writes the run log file
    pub fn logs_to_file(&self) -> bool {
        matches!(self, Commands::Run { .. } | Commands::Check { .. })
    }
}
