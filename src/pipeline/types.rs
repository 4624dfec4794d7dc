//! Run report types

use crate::error::Error;
use crate::session::{SessionSummary, Transformed};
use crate::types::Table;
use std::time::Duration;

/// Final state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Every competition loaded
    Done,
    /// At least one competition failed
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Done => f.write_str("DONE"),
            RunState::Failed => f.write_str("FAILED"),
        }
    }
}

/// Step of the per-competition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Load,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Extract => f.write_str("EXTRACT"),
            Phase::Transform => f.write_str("TRANSFORM"),
            Phase::Load => f.write_str("LOAD"),
        }
    }
}

/// Rows written per table for one competition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadCounts {
    pub teams: usize,
    pub dates: usize,
    pub matches: usize,
    pub standings: usize,
    pub scorers: usize,
}

impl LoadCounts {
    pub fn of(transformed: &Transformed) -> Self {
        Self {
            teams: transformed.teams.len(),
            dates: transformed.dates.len(),
            matches: transformed.matches.len(),
            standings: transformed.standings.len(),
            scorers: transformed.scorers.len(),
        }
    }

    pub fn get(&self, table: Table) -> usize {
        match table {
            Table::DimTeams => self.teams,
            Table::DimDates => self.dates,
            Table::FactMatches => self.matches,
            Table::StandingsSnapshot => self.standings,
            Table::DimScorers => self.scorers,
        }
    }

    pub fn total(&self) -> usize {
        self.teams + self.dates + self.matches + self.standings + self.scorers
    }
}

impl std::fmt::Display for LoadCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} teams, {} dates, {} matches, {} standings, {} scorers",
            self.teams, self.dates, self.matches, self.standings, self.scorers
        )
    }
}

/// What happened to one competition
#[derive(Debug)]
pub enum CompetitionOutcome {
    Loaded(LoadCounts),
    Failed { phase: Phase, error: Error },
    /// Skipped because an earlier competition failed under fail-fast
    NotAttempted,
}

impl CompetitionOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one configured competition, in run order
#[derive(Debug)]
pub struct CompetitionReport {
    pub competition: String,
    pub outcome: CompetitionOutcome,
}

/// Result of a pipeline run
#[derive(Debug)]
pub struct RunReport {
    pub run_id: String,
    pub state: RunState,
    pub competitions: Vec<CompetitionReport>,
    pub session: SessionSummary,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.state == RunState::Done
    }

    /// Process exit code: 0 when done, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self.state {
            RunState::Done => 0,
            RunState::Failed => 1,
        }
    }

    /// The error of the first failed competition
    pub fn first_error(&self) -> Option<&Error> {
        self.competitions.iter().find_map(|c| match &c.outcome {
            CompetitionOutcome::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    pub fn loaded(&self) -> usize {
        self.competitions
            .iter()
            .filter(|c| c.outcome.is_loaded())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.competitions
            .iter()
            .filter(|c| c.outcome.is_failed())
            .count()
    }

    /// Rows written across all loaded competitions
    pub fn total_rows(&self) -> usize {
        self.competitions
            .iter()
            .filter_map(|c| match &c.outcome {
                CompetitionOutcome::Loaded(counts) => Some(counts.total()),
                _ => None,
            })
            .sum()
    }
}
