//! Tests for the load sinks

use super::*;
use crate::error::ErrorCategory;
use crate::records::{DateRecord, LoadBatch, TeamRecord};
use crate::types::Table;
use arrow::array::{Array, Date32Array, Int64Array, StringArray};
use chrono::{NaiveDate, TimeZone, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use std::fs::File;

fn team(id: i64, name: &str) -> TeamRecord {
    TeamRecord {
        team_id: Some(id),
        team_name: name.to_string(),
        ..TeamRecord::default()
    }
}

fn date(y: i32, m: u32, d: u32, matchday: Option<i64>) -> DateRecord {
    let full_date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    DateRecord {
        date_id: i64::from(y) * 10_000 + i64::from(m) * 100 + i64::from(d),
        full_date,
        day: d,
        month: m,
        year: y,
        day_of_week: crate::derivation::day_of_week(full_date),
        matchday,
    }
}

fn teams_batch(mode: LoadMode, teams: &[TeamRecord]) -> LoadBatch {
    LoadBatch::from_records("PL", teams, mode)
}

// ============================================================================
// SQL generation
// ============================================================================

#[test]
fn test_create_table_sql() {
    let ddl = create_table_sql(Table::DimDates, None);
    assert_eq!(
        ddl,
        "CREATE TABLE IF NOT EXISTS dim_dates (\n    date_id BIGINT NOT NULL,\n    full_date DATE NOT NULL,\n    day BIGINT NOT NULL,\n    month BIGINT NOT NULL,\n    year BIGINT NOT NULL,\n    day_of_week BIGINT NOT NULL,\n    matchday BIGINT\n);"
    );

    let ddl = create_table_sql(Table::FactMatches, Some("warehouse"));
    assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS warehouse.fact_matches ("));
    assert!(ddl.contains("match_timestamp TIMESTAMP"));
    assert!(ddl.contains("loaded_at TIMESTAMP NOT NULL"));
}

#[test]
fn test_insert_sql_casts_temporal_columns() {
    let sql = insert_sql(Table::DimDates, None);
    assert_eq!(
        sql,
        "INSERT INTO dim_dates (date_id, full_date, day, month, year, day_of_week, matchday) \
         VALUES (?, CAST(? AS DATE), ?, ?, ?, ?, ?)"
    );
}

#[test]
fn test_delete_sql_uses_natural_key() {
    assert_eq!(
        delete_sql(Table::StandingsSnapshot, Some("warehouse")),
        "DELETE FROM warehouse.standings_snapshot WHERE competition_id IS NOT DISTINCT FROM ? \
         AND season_id IS NOT DISTINCT FROM ? AND standing_type IS NOT DISTINCT FROM ? \
         AND team_id IS NOT DISTINCT FROM ?"
    );
}

// ============================================================================
// Warehouse sink (local DuckDB)
// ============================================================================

#[test]
fn test_warehouse_append_creates_and_inserts() {
    let mut sink = WarehouseSink::in_memory().unwrap();
    sink.check_connection().unwrap();

    let batch = teams_batch(LoadMode::Append, &[team(1, "FC Test"), team(2, "AFC Other")]);
    sink.write(&batch).unwrap();
    assert_eq!(sink.count_rows(Table::DimTeams).unwrap(), 2);

    // Append never deduplicates
    sink.write(&batch).unwrap();
    assert_eq!(sink.count_rows(Table::DimTeams).unwrap(), 4);
}

#[test]
fn test_warehouse_upsert_replaces_by_key() {
    let mut sink = WarehouseSink::in_memory().unwrap();

    sink.write(&teams_batch(LoadMode::Append, &[team(1, "Old"), team(2, "Keep")]))
        .unwrap();
    sink.write(&teams_batch(LoadMode::Append, &[team(1, "Old")]))
        .unwrap();
    assert_eq!(sink.count_rows(Table::DimTeams).unwrap(), 3);

    sink.write(&teams_batch(LoadMode::Upsert, &[team(1, "New")]))
        .unwrap();
    assert_eq!(sink.count_rows(Table::DimTeams).unwrap(), 2);
}

#[test]
fn test_warehouse_writes_dates() {
    let mut sink = WarehouseSink::in_memory().unwrap();
    let dates = [date(2024, 8, 16, Some(1)), date(2024, 8, 17, None)];

    sink.write(&LoadBatch::from_records("PL", &dates, LoadMode::Upsert))
        .unwrap();
    sink.write(&LoadBatch::from_records("PL", &dates, LoadMode::Upsert))
        .unwrap();

    assert_eq!(sink.count_rows(Table::DimDates).unwrap(), 2);
}

#[test]
fn test_warehouse_empty_batch_creates_table_only() {
    let mut sink = WarehouseSink::in_memory().unwrap();
    sink.write(&teams_batch(LoadMode::Append, &[])).unwrap();
    assert_eq!(sink.count_rows(Table::DimTeams).unwrap(), 0);
}

#[test]
fn test_warehouse_missing_table_is_sink_unavailable() {
    let sink = WarehouseSink::in_memory().unwrap();
    let err = sink.count_rows(Table::DimScorers).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::SinkUnavailable);
    assert!(err.to_string().contains("dim_scorers"));
}

// ============================================================================
// Parquet sink
// ============================================================================

#[test]
fn test_parquet_sink_writes_readable_files() {
    let dir = tempfile::tempdir().unwrap();
    let stamp = Utc.with_ymd_and_hms(2024, 9, 1, 6, 30, 0).unwrap();
    let mut sink = ParquetSink::with_stamp(dir.path(), stamp).unwrap();

    sink.write(&teams_batch(LoadMode::Append, &[team(1, "FC Test"), team(2, "AFC Other")]))
        .unwrap();
    sink.write(&LoadBatch::from_records(
        "PL",
        &[date(2024, 8, 16, Some(1))],
        LoadMode::Append,
    ))
    .unwrap();

    let written = sink.written().to_vec();
    assert_eq!(written.len(), 2);
    assert_eq!(
        written[0],
        dir.path()
            .join("dim_teams")
            .join("dim_teams-pl-20240901_063000-0001.parquet")
    );

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&written[0]).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema().fields(), arrow_schema(Table::DimTeams).fields());

    let ids = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(ids.value(1), 2);
    let names = batch
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(names.value(0), "FC Test");
    let founded = batch.column(5);
    assert!(founded.is_null(0));
}

#[test]
fn test_batch_to_arrow_dates() {
    let batch = LoadBatch::from_records("PD", &[date(1970, 1, 2, None)], LoadMode::Append);
    let record_batch = batch_to_arrow(&batch).unwrap();
    let full_date = record_batch
        .column(1)
        .as_any()
        .downcast_ref::<Date32Array>()
        .unwrap();
    assert_eq!(full_date.value(0), 1);
}

#[test]
fn test_parquet_sink_skips_empty_batches() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = ParquetSink::new(dir.path().join("out")).unwrap();
    sink.write(&teams_batch(LoadMode::Append, &[])).unwrap();
    assert!(sink.written().is_empty());
    assert!(sink.dir().exists());
}

#[test]
fn test_parquet_sinks_with_same_stamp_keep_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let stamp = Utc.with_ymd_and_hms(2024, 9, 1, 6, 30, 0).unwrap();

    let mut first = ParquetSink::with_stamp(dir.path(), stamp).unwrap();
    first
        .write(&teams_batch(LoadMode::Append, &[team(1, "FC Test")]))
        .unwrap();
    let mut second = ParquetSink::with_stamp(dir.path(), stamp).unwrap();
    second
        .write(&teams_batch(LoadMode::Append, &[team(2, "AFC Other")]))
        .unwrap();

    let table_dir = dir.path().join("dim_teams");
    assert_eq!(
        first.written()[0],
        table_dir.join("dim_teams-pl-20240901_063000-0001.parquet")
    );
    assert_eq!(
        second.written()[0],
        table_dir.join("dim_teams-pl-20240901_063000-0002.parquet")
    );
    assert_eq!(std::fs::read_dir(&table_dir).unwrap().count(), 2);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&first.written()[0]).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(rows, 1);
}

#[test]
fn test_parquet_sink_rejects_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ParquetSink::new(dir.path()).unwrap();

    assert!(ensure_supported(&sink, LoadMode::Append).is_ok());
    let err = ensure_supported(&sink, LoadMode::Upsert).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("parquet sink does not support 'upsert'"));
}

// ============================================================================
// Memory sink
// ============================================================================

#[test]
fn test_memory_sink_keeps_batches_in_order() {
    let mut sink = MemorySink::new();
    sink.write(&teams_batch(LoadMode::Append, &[team(1, "A")])).unwrap();
    sink.write(&LoadBatch::from_records("PD", &[date(2024, 8, 16, None)], LoadMode::Append))
        .unwrap();

    assert_eq!(sink.tables(), vec![Table::DimTeams, Table::DimDates]);
    assert_eq!(sink.row_count(Table::DimTeams), 1);
    assert_eq!(sink.for_competition("PD").count(), 1);
    assert!(sink.supports(LoadMode::Upsert));
}

#[test]
fn test_memory_sink_upsert_replaces_keyed_rows() {
    let mut sink = MemorySink::new();
    sink.write(&teams_batch(LoadMode::Append, &[team(1, "Old"), team(2, "Kept")]))
        .unwrap();
    sink.write(&teams_batch(LoadMode::Upsert, &[team(1, "New")]))
        .unwrap();

    assert_eq!(sink.row_count(Table::DimTeams), 2);
    let names: Vec<String> = sink
        .batches()
        .iter()
        .flat_map(LoadBatch::to_json_rows)
        .map(|row| row["team_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Kept", "New"]);
}

#[test]
fn test_memory_sink_append_keeps_duplicates() {
    let mut sink = MemorySink::new();
    sink.write(&teams_batch(LoadMode::Append, &[team(1, "A")])).unwrap();
    sink.write(&teams_batch(LoadMode::Append, &[team(1, "A")])).unwrap();
    assert_eq!(sink.row_count(Table::DimTeams), 2);
}

#[test]
fn test_boxed_sink_delegates() {
    let mut sink: Box<dyn LoadSink> = Box::new(MemorySink::new());
    assert_eq!(sink.name(), "memory");
    sink.write(&teams_batch(LoadMode::Append, &[])).unwrap();
}

#[test]
fn test_open_parquet_sink_requires_output_dir() {
    let err = open_sink(SinkKind::Parquet, &WarehouseConfig::default(), None)
        .err()
        .unwrap();
    assert!(err.is_configuration());
}
