// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # football-etl
//!
//! Batch ETL for football competition data. For each configured competition
//! the pipeline fetches teams, matches, standings and scorers from a REST
//! provider, reshapes them into a dimensional model and loads them into a
//! PostgreSQL warehouse (or Parquet files).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use football_etl::{HttpSourceClient, Pipeline, PipelineConfig, PipelineOptions, WarehouseSink};
//!
//! #[tokio::main]
//! async fn main() -> football_etl::Result<()> {
//!     let config = PipelineConfig::from_env()?;
//!     config.validate()?;
//!     let source = HttpSourceClient::new(&config.source)?;
//!     let sink = WarehouseSink::connect(&config.warehouse)?;
//!
//!     let mut pipeline = Pipeline::new(source, sink, PipelineOptions::from(&config))?;
//!     let report = pipeline.run().await;
//!     std::process::exit(report.exit_code());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   JSON    ┌───────────┐  records  ┌────────────┐  batches  ┌──────────┐
//! │  source  │ ────────► │ normalize │ ────────► │ derivation │ ────────► │   sink   │
//! └──────────┘           └───────────┘           └────────────┘           └──────────┘
//!       ▲                        └──── session (run clock, stats) ───┘          ▲
//!       └──────────────────────────── pipeline ─────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Common types and type aliases
pub mod types;

/// Environment and pipeline-file configuration
pub mod config;

/// Provider client
pub mod source;

/// Raw document to typed record conversion
pub mod normalize;

/// Calendar fields and the date dimension
pub mod derivation;

/// Typed records, columns and load batches
pub mod records;

/// Run-scoped transform context
pub mod session;

/// Warehouse, Parquet and in-memory sinks
pub mod sink;

/// Extract-transform-load orchestration
pub mod pipeline;

/// Console and file logging
pub mod logging;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{PipelineConfig, SourceConfig, WarehouseConfig};
pub use error::{Error, ErrorCategory, Result};
pub use pipeline::{
    CompetitionOutcome, LoadCounts, Phase, Pipeline, PipelineOptions, RunReport, RunState,
};
pub use records::{LoadBatch, Record};
pub use session::{Extracted, TransformSession, Transformed};
pub use sink::{LoadSink, MemorySink, ParquetSink, WarehouseSink};
pub use source::{HttpSourceClient, SourceClient};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
