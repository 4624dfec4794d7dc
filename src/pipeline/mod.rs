//! Pipeline orchestrator
//!
//! Drives extract, transform and load for each configured competition in
//! order, strictly sequentially:
//!
//! ```text
//! INIT -> { EXTRACT -> TRANSFORM -> LOAD } x N -> DONE | FAILED
//! ```
//!
//! One [`TransformSession`] is opened per run and closed exactly once, on
//! every exit path. What happens after a competition fails is decided by the
//! [`FailurePolicy`]. Competitions already loaded are never rolled back.

mod types;

pub use types::{CompetitionOutcome, CompetitionReport, LoadCounts, Phase, RunReport, RunState};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::session::TransformSession;
use crate::sink::{ensure_supported, LoadSink};
use crate::source::{extract_competition, SourceClient};
use crate::types::{FailurePolicy, LoadMode};
use std::time::Instant;
use tracing::{error, info, warn};

const BANNER_WIDTH: usize = 50;

/// What to run and how to react to failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub competitions: Vec<String>,
    pub failure_policy: FailurePolicy,
    pub load_mode: LoadMode,
}

impl PipelineOptions {
    pub fn new(competitions: Vec<String>) -> Self {
        Self {
            competitions,
            failure_policy: FailurePolicy::default(),
            load_mode: LoadMode::default(),
        }
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            competitions: config.competitions.clone(),
            failure_policy: config.failure_policy,
            load_mode: config.load_mode,
        }
    }
}

/// Extract-transform-load orchestrator over a source and a sink
pub struct Pipeline<S, K> {
    source: S,
    sink: K,
    options: PipelineOptions,
}

impl<S, K> Pipeline<S, K>
where
    S: SourceClient,
    K: LoadSink,
{
    /// Build a pipeline, rejecting options the sink can't honour
    pub fn new(source: S, sink: K, options: PipelineOptions) -> Result<Self> {
        if options.competitions.is_empty() {
            return Err(Error::invalid_value(
                "competitions",
                "at least one competition code is required",
            ));
        }
        ensure_supported(&sink, options.load_mode)?;

        Ok(Self {
            source,
            sink,
            options,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Run every competition with a freshly opened session
    pub async fn run(&mut self) -> RunReport {
        self.run_with(TransformSession::open()).await
    }

    /// Run every competition inside the given session, then close it
    pub async fn run_with(&mut self, mut session: TransformSession) -> RunReport {
        let started = Instant::now();
        let run_id = session.run_id().to_string();

        banner(&format!("Starting ETL pipeline run {run_id}"));
        info!(
            competitions = ?self.options.competitions,
            policy = %self.options.failure_policy,
            load_mode = %self.options.load_mode,
            sink = self.sink.name(),
            "Run configuration"
        );

        let mut reports = Vec::with_capacity(self.options.competitions.len());
        let mut aborted = false;

        let competitions = self.options.competitions.clone();
        for competition in competitions {
            if aborted {
                reports.push(CompetitionReport {
                    competition,
                    outcome: CompetitionOutcome::NotAttempted,
                });
                continue;
            }

            banner(&format!("Processing competition: {competition}"));
            let outcome = match self.process(&mut session, &competition).await {
                Ok(counts) => {
                    info!("Competition {competition} loaded: {counts}");
                    CompetitionOutcome::Loaded(counts)
                }
                Err((phase, err)) => {
                    error!("{phase} failed for {competition}: {err}");
                    if self.options.failure_policy == FailurePolicy::FailFast {
                        warn!("Fail-fast policy: aborting remaining competitions");
                        aborted = true;
                    }
                    CompetitionOutcome::Failed { phase, error: err }
                }
            };
            reports.push(CompetitionReport {
                competition,
                outcome,
            });
        }

        let summary = session.close();
        let state = if reports.iter().any(|r| r.outcome.is_failed()) {
            RunState::Failed
        } else {
            RunState::Done
        };

        let report = RunReport {
            run_id,
            state,
            competitions: reports,
            session: summary,
            elapsed: started.elapsed(),
        };
        log_summary(&report);
        report
    }

    async fn process(
        &mut self,
        session: &mut TransformSession,
        competition: &str,
    ) -> std::result::Result<LoadCounts, (Phase, Error)> {
        info!("{} PHASE", Phase::Extract);
        let extracted = extract_competition(&self.source, competition)
            .await
            .map_err(|e| (Phase::Extract, e))?;

        info!("{} PHASE", Phase::Transform);
        let transformed = session
            .transform(&extracted)
            .map_err(|e| (Phase::Transform, e))?;
        let counts = LoadCounts::of(&transformed);

        info!("{} PHASE", Phase::Load);
        for batch in transformed.into_batches(competition, self.options.load_mode) {
            self.sink.write(&batch).map_err(|e| (Phase::Load, e))?;
            info!("Loaded {} rows into {}", batch.len(), batch.table());
        }

        Ok(counts)
    }
}

impl<S, K> std::fmt::Debug for Pipeline<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn banner(title: &str) {
    info!("{}", "=".repeat(BANNER_WIDTH));
    info!("{title}");
    info!("{}", "=".repeat(BANNER_WIDTH));
}

fn log_summary(report: &RunReport) {
    banner(&format!("Run {} finished: {}", report.run_id, report.state));
    for entry in &report.competitions {
        match &entry.outcome {
            CompetitionOutcome::Loaded(counts) => {
                info!("  {}: loaded ({counts})", entry.competition);
            }
            CompetitionOutcome::Failed { phase, error } => {
                error!(
                    "  {}: failed during {phase} [{}]: {error}",
                    entry.competition,
                    error.category()
                );
            }
            CompetitionOutcome::NotAttempted => {
                warn!("  {}: not attempted", entry.competition);
            }
        }
    }
    info!(
        "{} loaded, {} failed, {} rows written in {:.2?}",
        report.loaded(),
        report.failed(),
        report.total_rows(),
        report.elapsed
    );
}
