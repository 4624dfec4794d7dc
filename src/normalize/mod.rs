//! Schema normalizer
//!
//! Converts raw provider documents into typed warehouse records. Normalizing
//! is pure: no I/O, no clock. Every field is read through the default-producing
//! helpers in [`lookup`], so an incomplete document yields fully populated
//! records instead of an error.
//!
//! The only failure is a top-level container (`teams`, `matches`, `standings`,
//! `scorers`) that is present but not a list.

pub mod lookup;

use crate::error::{Error, Result};
use crate::records::{MatchRecord, ScorerRecord, StandingRecord, TeamRecord};
use crate::types::{JsonValue, ResourceKind};
use lookup::{field, int, int_or_zero, list, opt_text, text, text_or};

/// Records produced from one resource document
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRecords {
    Teams(Vec<TeamRecord>),
    Matches(Vec<MatchRecord>),
    Standings(Vec<StandingRecord>),
    Scorers(Vec<ScorerRecord>),
}

impl NormalizedRecords {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Teams(_) => ResourceKind::Teams,
            Self::Matches(_) => ResourceKind::Matches,
            Self::Standings(_) => ResourceKind::Standings,
            Self::Scorers(_) => ResourceKind::Scorers,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Teams(r) => r.len(),
            Self::Matches(r) => r.len(),
            Self::Standings(r) => r.len(),
            Self::Scorers(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize a document of the given kind
pub fn normalize(document: &JsonValue, kind: ResourceKind) -> Result<NormalizedRecords> {
    Ok(match kind {
        ResourceKind::Teams => NormalizedRecords::Teams(normalize_teams(document)?),
        ResourceKind::Matches => NormalizedRecords::Matches(normalize_matches(document)?),
        ResourceKind::Standings => NormalizedRecords::Standings(normalize_standings(document)?),
        ResourceKind::Scorers => NormalizedRecords::Scorers(normalize_scorers(document)?),
    })
}

/// Rows under the document's top-level container.
///
/// Absent or `null` means no rows; anything other than a list is a contract
/// violation.
fn container(document: &JsonValue, kind: ResourceKind) -> Result<&[JsonValue]> {
    match field(document, kind.container_key()) {
        JsonValue::Null => Ok(&[][..]),
        JsonValue::Array(rows) => Ok(rows.as_slice()),
        other => Err(Error::schema_mismatch(
            kind,
            format!(
                "expected '{}' to be a list, found {}",
                kind.container_key(),
                json_type_name(other)
            ),
        )),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// `competitions/{code}/teams`
pub fn normalize_teams(document: &JsonValue) -> Result<Vec<TeamRecord>> {
    let teams = container(document, ResourceKind::Teams)?;

    Ok(teams
        .iter()
        .map(|team| TeamRecord {
            team_id: int(team, "id"),
            team_name: text(team, "name"),
            short_name: text(team, "shortName"),
            tla: text(team, "tla"),
            country: text(field(team, "area"), "name"),
            founded: int(team, "founded"),
            stadium: text(team, "venue"),
            club_colors: text(team, "clubColors"),
            website: text(team, "website"),
            ..TeamRecord::default()
        })
        .collect())
}

/// `competitions/{code}/matches`
///
/// Calendar fields are left empty here; see [`crate::derivation`].
pub fn normalize_matches(document: &JsonValue) -> Result<Vec<MatchRecord>> {
    let matches = container(document, ResourceKind::Matches)?;
    let competition = field(document, "competition");
    let competition_id = int(competition, "id");
    let competition_name = text(competition, "name");

    Ok(matches
        .iter()
        .map(|m| {
            let score = field(m, "score");
            let full_time = field(score, "fullTime");
            let half_time = field(score, "halfTime");
            let home = field(m, "homeTeam");
            let away = field(m, "awayTeam");

            MatchRecord {
                match_id: int(m, "id"),
                competition_id,
                competition_name: competition_name.clone(),
                season_id: int(field(m, "season"), "id"),
                matchday: int(m, "matchday"),
                stage: text(m, "stage"),
                utc_date: opt_text(m, "utcDate"),
                status: opt_text(m, "status"),
                home_team_id: int(home, "id"),
                home_team_name: text(home, "name"),
                away_team_id: int(away, "id"),
                away_team_name: text(away, "name"),
                home_score_fulltime: int(full_time, "home"),
                away_score_fulltime: int(full_time, "away"),
                home_score_halftime: int(half_time, "home"),
                away_score_halftime: int(half_time, "away"),
                winner: opt_text(score, "winner"),
                duration: text_or(score, "duration", "REGULAR"),
                referees: join_referees(list(m, "referees")),
                ..MatchRecord::default()
            }
        })
        .collect())
}

/// Referee names in source order, `", "`-joined
fn join_referees(referees: &[JsonValue]) -> String {
    referees
        .iter()
        .map(|r| text(r, "name"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `competitions/{code}/standings`
///
/// One record per (standing type, table row).
pub fn normalize_standings(document: &JsonValue) -> Result<Vec<StandingRecord>> {
    let standings = container(document, ResourceKind::Standings)?;
    let competition = field(document, "competition");
    let season = field(document, "season");

    let competition_id = int_or_zero(competition, "id");
    let competition_name = text(competition, "name");
    let season_id = int_or_zero(season, "id");
    let season_start = text(season, "startDate");
    let season_end = text(season, "endDate");

    let mut records = Vec::new();
    for standing in standings {
        let standing_type = text_or(standing, "type", "TOTAL");
        for row in list(standing, "table") {
            let team = field(row, "team");
            records.push(StandingRecord {
                competition_id,
                competition_name: competition_name.clone(),
                season_id,
                season_start: season_start.clone(),
                season_end: season_end.clone(),
                standing_type: standing_type.clone(),
                position: int_or_zero(row, "position"),
                team_id: int_or_zero(team, "id"),
                team_name: text(team, "name"),
                played_games: int_or_zero(row, "playedGames"),
                won: int_or_zero(row, "won"),
                draw: int_or_zero(row, "draw"),
                lost: int_or_zero(row, "lost"),
                goals_for: int_or_zero(row, "goalsFor"),
                goals_against: int_or_zero(row, "goalsAgainst"),
                goal_difference: int_or_zero(row, "goalDifference"),
                points: int_or_zero(row, "points"),
                form: text(row, "form"),
                ..StandingRecord::default()
            });
        }
    }

    Ok(records)
}

/// `competitions/{code}/scorers`
pub fn normalize_scorers(document: &JsonValue) -> Result<Vec<ScorerRecord>> {
    let scorers = container(document, ResourceKind::Scorers)?;
    let competition = field(document, "competition");
    let season = field(document, "season");
    let competition_id = int(competition, "id");
    let competition_name = text(competition, "name");
    let season_id = int(season, "id");

    Ok(scorers
        .iter()
        .map(|scorer| {
            let player = field(scorer, "player");
            let team = field(scorer, "team");

            ScorerRecord {
                competition_id,
                competition_name: competition_name.clone(),
                season_id,
                player_id: int(player, "id"),
                player_name: text(player, "name"),
                nationality: text(player, "nationality"),
                team_id: int(team, "id"),
                team_name: text(team, "name"),
                goals: int_or_zero(scorer, "goals"),
                assists: int(scorer, "assists"),
                penalties: int(scorer, "penalties"),
                played_matches: int(scorer, "playedMatches"),
                ..ScorerRecord::default()
            }
        })
        .collect())
}
