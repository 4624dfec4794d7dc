// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! football-etl CLI
//!
//! Command-line interface for running the pipeline

use clap::Parser;
use football_etl::cli::{Cli, Runner};
use football_etl::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let runner = Runner::new(cli);

    match logging::init(&runner.log_options()) {
        Ok(Some(path)) => tracing::info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: failed to initialise logging: {e}");
            std::process::exit(1);
        }
    }

    match runner.run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{} [{}]", e, e.category());
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
