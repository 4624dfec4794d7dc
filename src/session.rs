//! Transform session
//!
//! The run-scoped transform context. One session is opened per pipeline run,
//! passed explicitly to every transform, and released exactly once when the
//! run ends: `close` consumes the session, and `Drop` releases it if the run
//! unwinds before reaching `close`.

use crate::derivation::{build_date_dimension, derive_calendar_fields};
use crate::error::Result;
use crate::normalize::{normalize_matches, normalize_scorers, normalize_standings, normalize_teams};
use crate::records::{
    DateRecord, LoadBatch, MatchRecord, ScorerRecord, StandingRecord, TeamRecord,
};
use crate::types::{JsonValue, LoadMode};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

/// Raw documents fetched for one competition
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub teams: JsonValue,
    pub matches: JsonValue,
    pub standings: JsonValue,
    pub scorers: JsonValue,
}

/// Records produced for one competition, ready to load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    pub teams: Vec<TeamRecord>,
    pub dates: Vec<DateRecord>,
    pub matches: Vec<MatchRecord>,
    pub standings: Vec<StandingRecord>,
    pub scorers: Vec<ScorerRecord>,
}

impl Transformed {
    /// Batches in load order: teams, dates, matches, standings, scorers
    pub fn into_batches(self, competition: &str, mode: LoadMode) -> Vec<LoadBatch> {
        vec![
            LoadBatch::from_records(competition, &self.teams, mode),
            LoadBatch::from_records(competition, &self.dates, mode),
            LoadBatch::from_records(competition, &self.matches, mode),
            LoadBatch::from_records(competition, &self.standings, mode),
            LoadBatch::from_records(competition, &self.scorers, mode),
        ]
    }

    pub fn record_count(&self) -> usize {
        self.teams.len()
            + self.dates.len()
            + self.matches.len()
            + self.standings.len()
            + self.scorers.len()
    }
}

/// Counters accumulated over a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Competitions transformed
    pub competitions: usize,
    /// Records produced, date rows included
    pub records: usize,
    /// Matches whose kickoff couldn't be parsed
    pub undated_matches: usize,
}

/// What a session reports once released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub run_id: String,
    pub opened_at: DateTime<Utc>,
    pub stats: TransformStats,
}

/// Run-scoped transform context
#[derive(Debug)]
pub struct TransformSession {
    run_id: String,
    opened_at: DateTime<Utc>,
    stats: TransformStats,
    released: bool,
}

impl TransformSession {
    /// Open a session stamped with the current time
    pub fn open() -> Self {
        Self::open_at(Utc::now())
    }

    /// Open a session with a fixed clock
    pub fn open_at(opened_at: DateTime<Utc>) -> Self {
        let run_id = opened_at.format("%Y%m%d_%H%M%S").to_string();
        info!(run_id = %run_id, "Transform session opened");
        Self {
            run_id,
            opened_at,
            stats: TransformStats::default(),
            released: false,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// `loaded_at` value stamped on every record of this run
    pub fn loaded_at(&self) -> NaiveDateTime {
        self.opened_at.naive_utc()
    }

    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Normalize all four documents and derive calendar fields and dates
    pub fn transform(&mut self, extracted: &Extracted) -> Result<Transformed> {
        let loaded_at = self.loaded_at();

        let mut teams = normalize_teams(&extracted.teams)?;
        info!("Transformed {} team records", teams.len());

        let mut matches = derive_calendar_fields(normalize_matches(&extracted.matches)?);
        info!("Transformed {} match records", matches.len());

        let mut standings = normalize_standings(&extracted.standings)?;
        info!("Transformed {} standing records", standings.len());

        let mut scorers = normalize_scorers(&extracted.scorers)?;
        info!("Transformed {} scorer records", scorers.len());

        let dates = build_date_dimension(&matches);
        info!("Created date dimension with {} records", dates.len());

        let undated = matches.iter().filter(|m| m.calendar.is_none()).count();
        if undated > 0 {
            warn!("{undated} matches have no parseable kickoff date");
        }

        teams.iter_mut().for_each(|r| r.loaded_at = loaded_at);
        matches.iter_mut().for_each(|r| r.loaded_at = loaded_at);
        standings.iter_mut().for_each(|r| r.loaded_at = loaded_at);
        scorers.iter_mut().for_each(|r| r.loaded_at = loaded_at);

        let transformed = Transformed {
            teams,
            dates,
            matches,
            standings,
            scorers,
        };

        self.stats.competitions += 1;
        self.stats.records += transformed.record_count();
        self.stats.undated_matches += undated;

        Ok(transformed)
    }

    /// Release the session and report what it did
    pub fn close(mut self) -> SessionSummary {
        self.release();
        SessionSummary {
            run_id: self.run_id.clone(),
            opened_at: self.opened_at,
            stats: self.stats,
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        info!(
            run_id = %self.run_id,
            competitions = self.stats.competitions,
            records = self.stats.records,
            "Transform session stopped"
        );
    }
}

impl Drop for TransformSession {
    fn drop(&mut self) {
        if !self.released {
            debug!(run_id = %self.run_id, "Transform session dropped without close");
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 6, 30, 0).unwrap()
    }

    fn extracted() -> Extracted {
        Extracted {
            teams: json!({"teams": [{"id": 1, "name": "FC Test"}, {"id": 2, "name": "AFC Other"}]}),
            matches: json!({
                "competition": {"id": 9, "name": "Test League"},
                "matches": [
                    {"id": 10, "utcDate": "2024-08-16T19:00:00Z", "matchday": 1},
                    {"id": 11, "utcDate": "2024-08-16T21:00:00Z", "matchday": 1},
                    {"id": 12, "utcDate": "", "status": "POSTPONED"}
                ]
            }),
            standings: json!({"standings": [{"type": "TOTAL", "table": [{"team": {"id": 1}}, {"team": {"id": 2}}]}]}),
            scorers: json!({}),
        }
    }

    #[test]
    fn test_transform_stamps_loaded_at() {
        let mut session = TransformSession::open_at(clock());
        let out = session.transform(&extracted()).unwrap();

        let expected = clock().naive_utc();
        assert!(out.teams.iter().all(|r| r.loaded_at == expected));
        assert!(out.matches.iter().all(|r| r.loaded_at == expected));
        assert!(out.standings.iter().all(|r| r.loaded_at == expected));
        assert_eq!(session.run_id(), "20240901_063000");
    }

    #[test]
    fn test_transform_derives_dates() {
        let mut session = TransformSession::open_at(clock());
        let out = session.transform(&extracted()).unwrap();

        assert_eq!(out.matches.len(), 3);
        assert_eq!(out.dates.len(), 1);
        assert_eq!(out.dates[0].date_id, 20_240_816);
        assert!(out.matches[2].calendar.is_none());
    }

    #[test]
    fn test_stats_and_close() {
        let mut session = TransformSession::open_at(clock());
        session.transform(&extracted()).unwrap();
        session.transform(&extracted()).unwrap();

        let summary = session.close();
        assert_eq!(summary.stats.competitions, 2);
        assert_eq!(summary.stats.undated_matches, 2);
        // 2 teams + 1 date + 3 matches + 2 standings, twice
        assert_eq!(summary.stats.records, 16);
        assert_eq!(summary.opened_at, clock());
    }

    #[test]
    fn test_schema_mismatch_leaves_stats_untouched() {
        let mut session = TransformSession::open_at(clock());
        let mut bad = extracted();
        bad.scorers = json!({"scorers": "nope"});

        assert!(session.transform(&bad).is_err());
        assert_eq!(session.stats(), TransformStats::default());
    }

    #[test]
    fn test_batches_follow_load_order() {
        let mut session = TransformSession::open_at(clock());
        let out = session.transform(&extracted()).unwrap();
        let tables: Vec<_> = out
            .into_batches("PL", LoadMode::Append)
            .iter()
            .map(LoadBatch::table)
            .collect();
        assert_eq!(tables, crate::types::Table::LOAD_ORDER.to_vec());
    }
}
