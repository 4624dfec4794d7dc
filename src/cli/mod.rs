//! CLI module
//!
//! # Commands
//!
//! - `run` - Run the pipeline over the configured competitions
//! - `check` - Validate configuration and reach provider and warehouse
//! - `preview` - Print one normalized resource as JSON lines
//! - `schema` - Print the target table DDL

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{preview_rows, Runner};
