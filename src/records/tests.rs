//! Tests for the record model

use super::*;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 16).unwrap()
}

#[test]
fn test_every_record_has_one_cell_per_column() {
    assert_eq!(
        TeamRecord::default().cells().len(),
        TeamRecord::COLUMNS.len()
    );
    assert_eq!(
        MatchRecord::default().cells().len(),
        MatchRecord::COLUMNS.len()
    );
    assert_eq!(
        StandingRecord::default().cells().len(),
        StandingRecord::COLUMNS.len()
    );
    assert_eq!(
        ScorerRecord::default().cells().len(),
        ScorerRecord::COLUMNS.len()
    );

    let date = DateRecord {
        date_id: 20_240_816,
        full_date: sample_date(),
        day: 16,
        month: 8,
        year: 2024,
        day_of_week: 6,
        matchday: Some(1),
    };
    assert_eq!(date.cells().len(), DateRecord::COLUMNS.len());
}

#[test]
fn test_key_columns_exist() {
    for table in Table::LOAD_ORDER {
        let columns = columns_for(table);
        for key in key_for(table) {
            assert!(
                columns.iter().any(|c| c.name == *key),
                "{table} key column {key} missing"
            );
        }
    }
}

#[test]
fn test_match_without_calendar_has_null_calendar_cells() {
    let record = MatchRecord {
        match_id: Some(7),
        status: Some("SCHEDULED".to_string()),
        ..MatchRecord::default()
    };
    let batch = LoadBatch::from_records("PL", &[record], LoadMode::Append);

    for name in ["match_date", "match_timestamp", "day", "month", "year", "day_of_week"] {
        let values = batch.column_values(name).unwrap();
        assert!(values[0].is_null(), "{name} should be null");
    }
    assert_eq!(batch.column_values("match_id").unwrap(), vec![&Cell::Int(7)]);
    assert_eq!(
        batch.column_values("duration").unwrap(),
        vec![&Cell::Text("REGULAR".to_string())]
    );
}

#[test]
fn test_calendar_date_id() {
    let calendar = Calendar {
        match_date: sample_date(),
        match_timestamp: sample_date().and_hms_opt(19, 0, 0).unwrap(),
        day: 16,
        month: 8,
        year: 2024,
        day_of_week: 6,
    };
    assert_eq!(calendar.date_id(), 20_240_816);
}

#[test]
fn test_batch_metadata() {
    let records = vec![TeamRecord::default(), TeamRecord::default()];
    let batch = LoadBatch::from_records("BL1", &records, LoadMode::Upsert);

    assert_eq!(batch.table(), Table::DimTeams);
    assert_eq!(batch.competition(), "BL1");
    assert_eq!(batch.mode(), LoadMode::Upsert);
    assert_eq!(batch.len(), 2);
    assert!(!batch.is_empty());
    assert_eq!(batch.key(), &["team_id"]);
    assert!(batch.column_values("nope").is_none());
}

#[test]
fn test_to_json_rows() {
    let record = TeamRecord {
        team_id: Some(1),
        team_name: "FC Test".to_string(),
        ..TeamRecord::default()
    };
    let batch = LoadBatch::from_records("PL", &[record], LoadMode::Append);
    let rows = batch.to_json_rows();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["team_id"], json!(1));
    assert_eq!(rows[0]["team_name"], json!("FC Test"));
    assert_eq!(rows[0]["founded"], json!(null));
    assert_eq!(rows[0]["website"], json!(""));
    assert_eq!(rows[0]["loaded_at"], json!("1970-01-01T00:00:00"));
}

#[test]
fn test_cell_conversions() {
    assert_eq!(Cell::from(Some(3_i64)), Cell::Int(3));
    assert_eq!(Cell::from(None::<i64>), Cell::Null);
    assert_eq!(Cell::from(5_u32), Cell::Int(5));
    assert_eq!(Cell::from("x"), Cell::Text("x".to_string()));
    assert_eq!(Cell::from(sample_date()).to_json(), json!("2024-08-16"));
}

#[test]
fn test_sql_types() {
    assert_eq!(ColumnType::Int.sql_type(), "BIGINT");
    assert_eq!(ColumnType::Date.sql_type(), "DATE");
    assert!(!Column::int("id").required().nullable);
    assert!(Column::text("name").nullable);
}
