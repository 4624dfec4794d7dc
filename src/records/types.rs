//! Record structs for the five warehouse tables

use super::{Cell, Column, Record};
use crate::types::Table;
use chrono::{NaiveDate, NaiveDateTime};

/// Fallback `loaded_at` for records built outside a transform session
fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

// ============================================================================
// Teams
// ============================================================================

/// One row of `dim_teams`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    pub team_id: Option<i64>,
    pub team_name: String,
    pub short_name: String,
    /// Three-letter acronym
    pub tla: String,
    pub country: String,
    pub founded: Option<i64>,
    pub stadium: String,
    pub club_colors: String,
    pub website: String,
    pub loaded_at: NaiveDateTime,
}

impl Default for TeamRecord {
    fn default() -> Self {
        Self {
            team_id: None,
            team_name: String::new(),
            short_name: String::new(),
            tla: String::new(),
            country: String::new(),
            founded: None,
            stadium: String::new(),
            club_colors: String::new(),
            website: String::new(),
            loaded_at: epoch(),
        }
    }
}

impl Record for TeamRecord {
    const TABLE: Table = Table::DimTeams;
    const COLUMNS: &'static [Column] = &[
        Column::int("team_id"),
        Column::text("team_name").required(),
        Column::text("short_name").required(),
        Column::text("tla").required(),
        Column::text("country").required(),
        Column::int("founded"),
        Column::text("stadium").required(),
        Column::text("club_colors").required(),
        Column::text("website").required(),
        Column::timestamp("loaded_at").required(),
    ];
    const KEY: &'static [&'static str] = &["team_id"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team_id.into(),
            self.team_name.clone().into(),
            self.short_name.clone().into(),
            self.tla.clone().into(),
            self.country.clone().into(),
            self.founded.into(),
            self.stadium.clone().into(),
            self.club_colors.clone().into(),
            self.website.clone().into(),
            self.loaded_at.into(),
        ]
    }
}

// ============================================================================
// Matches
// ============================================================================

/// Calendar attributes derived from a match's kickoff instant.
///
/// Kept as one group so the six fields are either all present or all null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub match_date: NaiveDate,
    pub match_timestamp: NaiveDateTime,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    /// 1 = Sunday ... 7 = Saturday
    pub day_of_week: u32,
}

impl Calendar {
    /// Deterministic date-dimension key, `year*10000 + month*100 + day`
    pub fn date_id(&self) -> i64 {
        i64::from(self.year) * 10_000 + i64::from(self.month) * 100 + i64::from(self.day)
    }
}

/// One row of `fact_matches`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub match_id: Option<i64>,
    pub competition_id: Option<i64>,
    pub competition_name: String,
    pub season_id: Option<i64>,
    pub matchday: Option<i64>,
    pub stage: String,
    /// Kickoff instant exactly as the provider sent it
    pub utc_date: Option<String>,
    pub status: Option<String>,
    pub home_team_id: Option<i64>,
    pub home_team_name: String,
    pub away_team_id: Option<i64>,
    pub away_team_name: String,
    pub home_score_fulltime: Option<i64>,
    pub away_score_fulltime: Option<i64>,
    pub home_score_halftime: Option<i64>,
    pub away_score_halftime: Option<i64>,
    pub winner: Option<String>,
    pub duration: String,
    pub referees: String,
    /// Filled by [`crate::derivation::derive_calendar_fields`]
    pub calendar: Option<Calendar>,
    pub loaded_at: NaiveDateTime,
}

impl Default for MatchRecord {
    fn default() -> Self {
        Self {
            match_id: None,
            competition_id: None,
            competition_name: String::new(),
            season_id: None,
            matchday: None,
            stage: String::new(),
            utc_date: None,
            status: None,
            home_team_id: None,
            home_team_name: String::new(),
            away_team_id: None,
            away_team_name: String::new(),
            home_score_fulltime: None,
            away_score_fulltime: None,
            home_score_halftime: None,
            away_score_halftime: None,
            winner: None,
            duration: "REGULAR".to_string(),
            referees: String::new(),
            calendar: None,
            loaded_at: epoch(),
        }
    }
}

impl Record for MatchRecord {
    const TABLE: Table = Table::FactMatches;
    const COLUMNS: &'static [Column] = &[
        Column::int("match_id"),
        Column::int("competition_id"),
        Column::text("competition_name").required(),
        Column::int("season_id"),
        Column::int("matchday"),
        Column::text("stage").required(),
        Column::text("utc_date"),
        Column::text("status"),
        Column::int("home_team_id"),
        Column::text("home_team_name").required(),
        Column::int("away_team_id"),
        Column::text("away_team_name").required(),
        Column::int("home_score_fulltime"),
        Column::int("away_score_fulltime"),
        Column::int("home_score_halftime"),
        Column::int("away_score_halftime"),
        Column::text("winner"),
        Column::text("duration").required(),
        Column::text("referees").required(),
        Column::date("match_date"),
        Column::timestamp("match_timestamp"),
        Column::int("day"),
        Column::int("month"),
        Column::int("year"),
        Column::int("day_of_week"),
        Column::timestamp("loaded_at").required(),
    ];
    const KEY: &'static [&'static str] = &["match_id"];

    fn cells(&self) -> Vec<Cell> {
        let cal = self.calendar.as_ref();
        vec![
            self.match_id.into(),
            self.competition_id.into(),
            self.competition_name.clone().into(),
            self.season_id.into(),
            self.matchday.into(),
            self.stage.clone().into(),
            self.utc_date.clone().into(),
            self.status.clone().into(),
            self.home_team_id.into(),
            self.home_team_name.clone().into(),
            self.away_team_id.into(),
            self.away_team_name.clone().into(),
            self.home_score_fulltime.into(),
            self.away_score_fulltime.into(),
            self.home_score_halftime.into(),
            self.away_score_halftime.into(),
            self.winner.clone().into(),
            self.duration.clone().into(),
            self.referees.clone().into(),
            cal.map(|c| c.match_date).into(),
            cal.map(|c| c.match_timestamp).into(),
            cal.map(|c| c.day).into(),
            cal.map(|c| c.month).into(),
            cal.map(|c| i64::from(c.year)).into(),
            cal.map(|c| c.day_of_week).into(),
            self.loaded_at.into(),
        ]
    }
}

// ============================================================================
// Standings
// ============================================================================

/// One row of `standings_snapshot`: a team's line in one standing type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRecord {
    pub competition_id: i64,
    pub competition_name: String,
    pub season_id: i64,
    pub season_start: String,
    pub season_end: String,
    /// `TOTAL`, `HOME` or `AWAY`
    pub standing_type: String,
    pub position: i64,
    pub team_id: i64,
    pub team_name: String,
    pub played_games: i64,
    pub won: i64,
    pub draw: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub points: i64,
    pub form: String,
    pub loaded_at: NaiveDateTime,
}

impl Default for StandingRecord {
    fn default() -> Self {
        Self {
            competition_id: 0,
            competition_name: String::new(),
            season_id: 0,
            season_start: String::new(),
            season_end: String::new(),
            standing_type: "TOTAL".to_string(),
            position: 0,
            team_id: 0,
            team_name: String::new(),
            played_games: 0,
            won: 0,
            draw: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            form: String::new(),
            loaded_at: epoch(),
        }
    }
}

impl Record for StandingRecord {
    const TABLE: Table = Table::StandingsSnapshot;
    const COLUMNS: &'static [Column] = &[
        Column::int("competition_id").required(),
        Column::text("competition_name").required(),
        Column::int("season_id").required(),
        Column::text("season_start").required(),
        Column::text("season_end").required(),
        Column::text("standing_type").required(),
        Column::int("position").required(),
        Column::int("team_id").required(),
        Column::text("team_name").required(),
        Column::int("played_games").required(),
        Column::int("won").required(),
        Column::int("draw").required(),
        Column::int("lost").required(),
        Column::int("goals_for").required(),
        Column::int("goals_against").required(),
        Column::int("goal_difference").required(),
        Column::int("points").required(),
        Column::text("form").required(),
        Column::timestamp("loaded_at").required(),
    ];
    const KEY: &'static [&'static str] =
        &["competition_id", "season_id", "standing_type", "team_id"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.competition_id.into(),
            self.competition_name.clone().into(),
            self.season_id.into(),
            self.season_start.clone().into(),
            self.season_end.clone().into(),
            self.standing_type.clone().into(),
            self.position.into(),
            self.team_id.into(),
            self.team_name.clone().into(),
            self.played_games.into(),
            self.won.into(),
            self.draw.into(),
            self.lost.into(),
            self.goals_for.into(),
            self.goals_against.into(),
            self.goal_difference.into(),
            self.points.into(),
            self.form.clone().into(),
            self.loaded_at.into(),
        ]
    }
}

// ============================================================================
// Scorers
// ============================================================================

/// One row of `dim_scorers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerRecord {
    pub competition_id: Option<i64>,
    pub competition_name: String,
    pub season_id: Option<i64>,
    pub player_id: Option<i64>,
    pub player_name: String,
    pub nationality: String,
    pub team_id: Option<i64>,
    pub team_name: String,
    pub goals: i64,
    pub assists: Option<i64>,
    pub penalties: Option<i64>,
    pub played_matches: Option<i64>,
    pub loaded_at: NaiveDateTime,
}

impl Default for ScorerRecord {
    fn default() -> Self {
        Self {
            competition_id: None,
            competition_name: String::new(),
            season_id: None,
            player_id: None,
            player_name: String::new(),
            nationality: String::new(),
            team_id: None,
            team_name: String::new(),
            goals: 0,
            assists: None,
            penalties: None,
            played_matches: None,
            loaded_at: epoch(),
        }
    }
}

impl Record for ScorerRecord {
    const TABLE: Table = Table::DimScorers;
    const COLUMNS: &'static [Column] = &[
        Column::int("competition_id"),
        Column::text("competition_name").required(),
        Column::int("season_id"),
        Column::int("player_id"),
        Column::text("player_name").required(),
        Column::text("nationality").required(),
        Column::int("team_id"),
        Column::text("team_name").required(),
        Column::int("goals").required(),
        Column::int("assists"),
        Column::int("penalties"),
        Column::int("played_matches"),
        Column::timestamp("loaded_at").required(),
    ];
    const KEY: &'static [&'static str] = &["competition_id", "season_id", "player_id"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.competition_id.into(),
            self.competition_name.clone().into(),
            self.season_id.into(),
            self.player_id.into(),
            self.player_name.clone().into(),
            self.nationality.clone().into(),
            self.team_id.into(),
            self.team_name.clone().into(),
            self.goals.into(),
            self.assists.into(),
            self.penalties.into(),
            self.played_matches.into(),
            self.loaded_at.into(),
        ]
    }
}

// ============================================================================
// Dates
// ============================================================================

/// One row of `dim_dates`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRecord {
    pub date_id: i64,
    pub full_date: NaiveDate,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub day_of_week: u32,
    pub matchday: Option<i64>,
}

impl Record for DateRecord {
    const TABLE: Table = Table::DimDates;
    const COLUMNS: &'static [Column] = &[
        Column::int("date_id").required(),
        Column::date("full_date").required(),
        Column::int("day").required(),
        Column::int("month").required(),
        Column::int("year").required(),
        Column::int("day_of_week").required(),
        Column::int("matchday"),
    ];
    const KEY: &'static [&'static str] = &["date_id"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.date_id.into(),
            self.full_date.into(),
            self.day.into(),
            self.month.into(),
            i64::from(self.year).into(),
            self.day_of_week.into(),
            self.matchday.into(),
        ]
    }
}
