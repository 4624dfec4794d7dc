//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{self, load_pipeline_file, parse_competitions, PipelineConfig, PipelineFile};
use crate::derivation::derive_calendar_fields;
use crate::error::Result;
use crate::logging::{Console, LogOptions};
use crate::normalize::{normalize_matches, normalize_scorers, normalize_standings, normalize_teams};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::records::LoadBatch;
use crate::sink::{create_table_sql, open_sink, SinkKind, WarehouseSink};
use crate::source::{HttpSourceClient, SourceClient};
use crate::types::{FailurePolicy, JsonValue, LoadMode, ResourceKind, Table};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Flag overrides applied on top of environment and pipeline file
#[derive(Debug, Default)]
struct Overrides<'a> {
    competitions: &'a [String],
    policy: Option<FailurePolicy>,
    load_mode: Option<LoadMode>,
    season: Option<u32>,
}

impl Overrides<'_> {
    /// Variables a later layer replaces; they are not read at all
    fn shadowed_vars(&self, file: Option<&PipelineFile>) -> Vec<&'static str> {
        let file = file.cloned().unwrap_or_default();
        let port = file.warehouse.as_ref().and_then(|w| w.port);

        [
            ("ETL_COMPETITIONS", !self.competitions.is_empty() || file.competitions.is_some()),
            ("ETL_FAILURE_POLICY", self.policy.is_some() || file.failure_policy.is_some()),
            ("ETL_LOAD_MODE", self.load_mode.is_some() || file.load_mode.is_some()),
            ("ETL_SEASON", self.season.is_some() || file.season.is_some()),
            ("POSTGRES_PORT", port.is_some()),
        ]
        .into_iter()
        .filter_map(|(var, shadowed)| shadowed.then_some(var))
        .collect()
    }
}

/// Environment, then pipeline file, then flags; validated once at the end
fn layered_config<F>(
    lookup: F,
    file: Option<PipelineFile>,
    overrides: &Overrides<'_>,
) -> Result<PipelineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let shadowed = overrides.shadowed_vars(file.as_ref());
    let mut config = PipelineConfig::from_lookup(|key| {
        if shadowed.iter().any(|var| *var == key) {
            None
        } else {
            lookup(key)
        }
    })?;

    if let Some(file) = file {
        config.apply_file(file);
    }

    if !overrides.competitions.is_empty() {
        config.competitions = parse_competitions(&overrides.competitions.join(","));
    }
    if let Some(policy) = overrides.policy {
        config.failure_policy = policy;
    }
    if let Some(mode) = overrides.load_mode {
        config.load_mode = mode;
    }
    if overrides.season.is_some() {
        config.source.season = overrides.season;
    }

    config.validate()?;
    Ok(config)
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Logging setup for the selected command
    pub fn log_options(&self) -> LogOptions {
        let options = LogOptions::new(self.cli.verbose);
        if self.cli.command.logs_to_file() {
            options.with_log_dir(self.log_dir())
        } else {
            options.with_console(Console::Stderr)
        }
    }

    fn log_dir(&self) -> PathBuf {
        self.cli
            .log_dir
            .clone()
            .unwrap_or_else(|| config::log_dir_from(|key| std::env::var(key).ok()))
    }

    /// Run the CLI command, returning the process exit code
    pub async fn run(&self) -> Result<i32> {
        match &self.cli.command {
            Commands::Run {
                competitions,
                policy,
                load_mode,
                sink,
                output,
                season,
            } => {
                let overrides = Overrides {
                    competitions,
                    policy: *policy,
                    load_mode: *load_mode,
                    season: *season,
                };
                self.run_pipeline(&overrides, *sink, output.as_deref()).await
            }
            Commands::Check { skip_warehouse } => self.check(*skip_warehouse).await,
            Commands::Preview {
                competition,
                resource,
                season,
            } => self.preview(competition, *resource, *season).await,
            Commands::Schema => self.schema(),
        }
    }

    fn load_config(&self, overrides: &Overrides<'_>) -> Result<PipelineConfig> {
        let file = match &self.cli.config {
            Some(path) => {
                info!("Loading pipeline file {}", path.display());
                Some(load_pipeline_file(path)?)
            }
            None => None,
        };
        layered_config(|key| std::env::var(key).ok(), file, overrides)
    }

    async fn run_pipeline(
        &self,
        overrides: &Overrides<'_>,
        sink: SinkKind,
        output: Option<&Path>,
    ) -> Result<i32> {
        let config = self.load_config(overrides)?;

        let source = HttpSourceClient::new(&config.source)?;
        let sink = open_sink(sink, &config.warehouse, output.map(Path::to_path_buf))?;
        let mut pipeline = Pipeline::new(source, sink, PipelineOptions::from(&config))?;

        let report = pipeline.run().await;
        if let Some(err) = report.first_error() {
            error!("ETL pipeline failed: {err}");
        } else {
            info!("ETL pipeline completed successfully");
        }
        Ok(report.exit_code())
    }

    async fn check(&self, skip_warehouse: bool) -> Result<i32> {
        let config = self.load_config(&Overrides::default())?;
        info!("Configuration OK: competitions {:?}", config.competitions);

        let source = HttpSourceClient::new(&config.source)?;
        let competition = &config.competitions[0];
        let teams = source.fetch(ResourceKind::Teams, competition).await?;
        let count = normalize_teams(&teams)?.len();
        info!("Provider reachable: {count} teams in {competition}");

        if skip_warehouse {
            info!("Warehouse check skipped");
        } else {
            let sink = WarehouseSink::connect(&config.warehouse)?;
            sink.check_connection()?;
            info!("Warehouse reachable: {}", sink.target());
        }

        Ok(0)
    }

    async fn preview(
        &self,
        competition: &str,
        resource: ResourceKind,
        season: Option<u32>,
    ) -> Result<i32> {
        let competitions = [competition.to_string()];
        let config = self.load_config(&Overrides {
            competitions: &competitions,
            season,
            ..Overrides::default()
        })?;
        let competition = &config.competitions[0];

        let source = HttpSourceClient::new(&config.source)?;
        let document = source.fetch(resource, competition).await?;

        for row in preview_rows(competition, resource, &document)? {
            println!("{}", serde_json::to_string(&row)?);
        }
        Ok(0)
    }

    fn schema(&self) -> Result<i32> {
        for table in Table::LOAD_ORDER {
            println!("{}\n", create_table_sql(table, None));
        }
        Ok(0)
    }
}

/// Normalized rows of one resource as JSON objects, without `loaded_at`
pub fn preview_rows(
    competition: &str,
    resource: ResourceKind,
    document: &JsonValue,
) -> Result<Vec<JsonValue>> {
    let mode = LoadMode::Append;
    let batch = match resource {
        ResourceKind::Teams => {
            LoadBatch::from_records(competition, &normalize_teams(document)?, mode)
        }
        ResourceKind::Matches => LoadBatch::from_records(
            competition,
            &derive_calendar_fields(normalize_matches(document)?),
            mode,
        ),
        ResourceKind::Standings => {
            LoadBatch::from_records(competition, &normalize_standings(document)?, mode)
        }
        ResourceKind::Scorers => {
            LoadBatch::from_records(competition, &normalize_scorers(document)?, mode)
        }
    };

    let mut rows = batch.to_json_rows();
    for row in &mut rows {
        if let Some(obj) = row.as_object_mut() {
            obj.remove("loaded_at");
        }
    }
    Ok(rows)
}
