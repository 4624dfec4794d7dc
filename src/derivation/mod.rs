//! Derivation engine
//!
//! Computes attributes that are not present in the provider's documents:
//!
//! - calendar fields of a match, parsed from its kickoff instant
//! - the date dimension, built from the distinct match dates of one run
//!
//! Kickoff instants are read as written (no timezone conversion). Day of week
//! follows the warehouse convention: 1 = Sunday through 7 = Saturday.

use crate::records::{Calendar, DateRecord, MatchRecord};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Day-of-week number, 1 = Sunday ... 7 = Saturday
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().number_from_sunday()
}

/// Parse a kickoff instant into its wall-clock date and time.
///
/// Accepts RFC 3339 (`2024-08-16T19:00:00Z`, any offset), a naive ISO
/// date-time with optional fractional seconds, or a bare date (midnight).
pub fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Calendar fields for a kickoff instant, `None` when unparseable
pub fn calendar_for(utc_date: Option<&str>) -> Option<Calendar> {
    let timestamp = parse_kickoff(utc_date?)?;
    let date = timestamp.date();

    Some(Calendar {
        match_date: date,
        match_timestamp: timestamp,
        day: date.day(),
        month: date.month(),
        year: date.year(),
        day_of_week: day_of_week(date),
    })
}

/// Recompute calendar fields for every match.
///
/// Any calendar already on a record is discarded. Matches whose kickoff can't
/// be parsed keep all their other fields and get no calendar.
pub fn derive_calendar_fields(matches: Vec<MatchRecord>) -> Vec<MatchRecord> {
    matches
        .into_iter()
        .map(|mut m| {
            m.calendar = calendar_for(m.utc_date.as_deref());
            m
        })
        .collect()
}

/// Build the date dimension from calendar-derived matches.
///
/// One row per distinct match date, ordered by date. Matches without a
/// calendar are skipped. When several matchdays fall on the same date the
/// smallest one is kept.
pub fn build_date_dimension(matches: &[MatchRecord]) -> Vec<DateRecord> {
    let mut by_date: BTreeMap<NaiveDate, (Calendar, Option<i64>)> = BTreeMap::new();

    for m in matches {
        let Some(calendar) = m.calendar else {
            continue;
        };
        by_date
            .entry(calendar.match_date)
            .and_modify(|(_, matchday)| {
                *matchday = match (*matchday, m.matchday) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            })
            .or_insert((calendar, m.matchday));
    }

    by_date
        .into_values()
        .map(|(calendar, matchday)| DateRecord {
            date_id: calendar.date_id(),
            full_date: calendar.match_date,
            day: calendar.day,
            month: calendar.month,
            year: calendar.year,
            day_of_week: calendar.day_of_week,
            matchday,
        })
        .collect()
}
