//! Common types used throughout the pipeline
//!
//! Resource kinds, warehouse tables and the two run policies that are
//! configurable from the environment, the pipeline file and the CLI.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Resource Kind
// ============================================================================

/// A resource fetched from the data provider for one competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Teams,
    Matches,
    Standings,
    Scorers,
}

impl ResourceKind {
    /// Extraction order within one competition
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Teams,
        ResourceKind::Matches,
        ResourceKind::Standings,
        ResourceKind::Scorers,
    ];

    /// Path segment under `competitions/{code}/`, also the top-level container key
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Teams => "teams",
            ResourceKind::Matches => "matches",
            ResourceKind::Standings => "standings",
            ResourceKind::Scorers => "scorers",
        }
    }

    /// Top-level key holding the row list in the provider's document
    pub fn container_key(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Warehouse Tables
// ============================================================================

/// Target table in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    DimTeams,
    DimDates,
    FactMatches,
    StandingsSnapshot,
    DimScorers,
}

impl Table {
    /// Load order within one competition: dimensions before facts
    pub const LOAD_ORDER: [Table; 5] = [
        Table::DimTeams,
        Table::DimDates,
        Table::FactMatches,
        Table::StandingsSnapshot,
        Table::DimScorers,
    ];

    /// Table name in the warehouse
    pub fn name(self) -> &'static str {
        match self {
            Table::DimTeams => "dim_teams",
            Table::DimDates => "dim_dates",
            Table::FactMatches => "fact_matches",
            Table::StandingsSnapshot => "standings_snapshot",
            Table::DimScorers => "dim_scorers",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Run Policies
// ============================================================================

/// What the orchestrator does when a competition fails
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure; nothing is rolled back
    #[default]
    FailFast,
    /// Record the failure and move on to the next competition
    ContinueOnError,
}

/// How a batch is written to its table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LoadMode {
    /// Append rows; re-running duplicates previously loaded rows
    #[default]
    Append,
    /// Delete rows sharing the batch's natural keys, then insert
    Upsert,
}

/// Parse a kebab-case policy value the way the CLI does, case-insensitively
pub fn parse_value_enum<T: clap::ValueEnum>(value: &str) -> Option<T> {
    T::from_str(value.trim(), true).ok()
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail-fast"),
            FailurePolicy::ContinueOnError => f.write_str("continue-on-error"),
        }
    }
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadMode::Append => f.write_str("append"),
            LoadMode::Upsert => f.write_str("upsert"),
        }
    }
}
