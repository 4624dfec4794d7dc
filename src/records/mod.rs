//! Typed warehouse records
//!
//! Each target table has one record struct. A record knows its table, its
//! column catalogue and natural key, and how to flatten itself into cells.
//! Sinks only ever see [`LoadBatch`]es: rows of [`Cell`]s plus the column
//! catalogue, so every sink writes the same shape regardless of entity.

mod types;

pub use types::{Calendar, DateRecord, MatchRecord, ScorerRecord, StandingRecord, TeamRecord};

use crate::types::{JsonObject, JsonValue, LoadMode, Table};
use chrono::{NaiveDate, NaiveDateTime};

// ============================================================================
// Columns
// ============================================================================

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer
    Int,
    /// UTF-8 text
    Text,
    /// Calendar date
    Date,
    /// Date and time without timezone
    Timestamp,
}

impl ColumnType {
    /// SQL type name shared by DuckDB and PostgreSQL
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Int => "BIGINT",
            ColumnType::Text => "TEXT",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

/// A column in a target table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Int,
            nullable: true,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Text,
            nullable: true,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Date,
            nullable: true,
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Timestamp,
            nullable: true,
        }
    }

    /// Mark the column as never null
    pub const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

// ============================================================================
// Cells
// ============================================================================

/// A single value in a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Int(i64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Cell {
    /// Check if this cell is null
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Render the cell as JSON (dates and timestamps as ISO strings)
    pub fn to_json(&self) -> JsonValue {
        match self {
            Cell::Null => JsonValue::Null,
            Cell::Int(i) => JsonValue::from(*i),
            Cell::Text(s) => JsonValue::String(s.clone()),
            Cell::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            Cell::Timestamp(ts) => JsonValue::String(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(i64::from(value))
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::Timestamp(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

// ============================================================================
// Record trait
// ============================================================================

/// A row type bound to one warehouse table
pub trait Record {
    /// Target table
    const TABLE: Table;
    /// Columns, in write order
    const COLUMNS: &'static [Column];
    /// Natural key columns, used by [`LoadMode::Upsert`]
    const KEY: &'static [&'static str];

    /// Flatten into cells, one per entry of [`Record::COLUMNS`]
    fn cells(&self) -> Vec<Cell>;
}

/// Column catalogue for a table
pub fn columns_for(table: Table) -> &'static [Column] {
    match table {
        Table::DimTeams => TeamRecord::COLUMNS,
        Table::DimDates => DateRecord::COLUMNS,
        Table::FactMatches => MatchRecord::COLUMNS,
        Table::StandingsSnapshot => StandingRecord::COLUMNS,
        Table::DimScorers => ScorerRecord::COLUMNS,
    }
}

/// Natural key for a table
pub fn key_for(table: Table) -> &'static [&'static str] {
    match table {
        Table::DimTeams => TeamRecord::KEY,
        Table::DimDates => DateRecord::KEY,
        Table::FactMatches => MatchRecord::KEY,
        Table::StandingsSnapshot => StandingRecord::KEY,
        Table::DimScorers => ScorerRecord::KEY,
    }
}

/// Column positions of a table's natural key
pub fn key_positions(table: Table) -> Vec<usize> {
    let columns = columns_for(table);
    key_for(table)
        .iter()
        .filter_map(|name| columns.iter().position(|c| c.name == *name))
        .collect()
}

// ============================================================================
// Load batch
// ============================================================================

/// An immutable record set bound for one table, produced for one competition
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBatch {
    table: Table,
    competition: String,
    mode: LoadMode,
    rows: Vec<Vec<Cell>>,
}

impl LoadBatch {
    /// Build a batch from typed records
    pub fn from_records<R: Record>(
        competition: impl Into<String>,
        records: &[R],
        mode: LoadMode,
    ) -> Self {
        Self {
            table: R::TABLE,
            competition: competition.into(),
            mode,
            rows: records.iter().map(Record::cells).collect(),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn competition(&self) -> &str {
        &self.competition
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn columns(&self) -> &'static [Column] {
        columns_for(self.table)
    }

    pub fn key(&self) -> &'static [&'static str] {
        key_for(self.table)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Natural-key cells of one row, in key order
    pub fn key_cells<'a>(&self, row: &'a [Cell]) -> Vec<&'a Cell> {
        key_positions(self.table).into_iter().map(|i| &row[i]).collect()
    }

    /// Keep only the rows matching `keep`
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[Cell]) -> bool) {
        self.rows.retain(|row| keep(row));
    }

    /// Values of one column across all rows
    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.columns().iter().position(|c| c.name == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Render every row as a JSON object keyed by column name
    pub fn to_json_rows(&self) -> Vec<JsonValue> {
        let columns = self.columns();
        self.rows
            .iter()
            .map(|row| {
                let obj: JsonObject = columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.name.to_string(), cell.to_json()))
                    .collect();
                JsonValue::Object(obj)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
