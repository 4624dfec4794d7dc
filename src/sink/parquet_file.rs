//! Parquet file sink
//!
//! Writes each batch to its own file:
//! `<dir>/<table>/<table>-<competition>-<stamp>-<seq>.parquet`.
//! Files are never rewritten, so only append mode is supported.

use super::LoadSink;
use crate::error::{sink_err, Error, Result};
use crate::records::{columns_for, Cell, ColumnType, LoadBatch};
use crate::types::{LoadMode, Table};
use arrow::array::{ArrayRef, Date32Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Sink writing one Parquet file per batch
#[derive(Debug)]
pub struct ParquetSink {
    dir: PathBuf,
    stamp: String,
    sequence: usize,
    written: Vec<PathBuf>,
}

impl ParquetSink {
    /// Create the sink, making `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_stamp(dir, Utc::now())
    }

    /// Create the sink with a fixed file-name timestamp
    pub fn with_stamp(dir: impl Into<PathBuf>, at: DateTime<Utc>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::sink_setup(format!("Failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self {
            dir,
            stamp: at.format("%Y%m%d_%H%M%S").to_string(),
            sequence: 0,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, batch: &LoadBatch) -> PathBuf {
        let table = batch.table();
        self.dir.join(table.name()).join(format!(
            "{table}-{}-{}-{:04}.parquet",
            batch.competition().to_lowercase(),
            self.stamp,
            self.sequence
        ))
    }

    /// Open the next free file for `batch`; existing files are never truncated
    fn create_next(&mut self, batch: &LoadBatch) -> Result<(PathBuf, File)> {
        let table = batch.table();
        loop {
            self.sequence += 1;
            let path = self.path_for(batch);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(sink_err(table))?;
            }
            match File::options().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next sequence", path.display());
                }
                Err(e) => return Err(Error::sink(table, e.to_string())),
            }
        }
    }
}

impl LoadSink for ParquetSink {
    fn name(&self) -> &str {
        "parquet"
    }

    fn supports(&self, mode: LoadMode) -> bool {
        mode == LoadMode::Append
    }

    fn write(&mut self, batch: &LoadBatch) -> Result<()> {
        let table = batch.table();
        if batch.is_empty() {
            debug!("No {table} rows for {}, no file written", batch.competition());
            return Ok(());
        }

        let record_batch = batch_to_arrow(batch)?;

        let (path, file) = self.create_next(batch)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, record_batch.schema(), Some(props))
            .map_err(sink_err(table))?;
        writer.write(&record_batch).map_err(sink_err(table))?;
        writer.close().map_err(sink_err(table))?;

        debug!("Wrote {} rows to {}", batch.len(), path.display());
        self.written.push(path);
        Ok(())
    }
}

// ============================================================================
// Arrow conversion
// ============================================================================

/// Arrow schema of a target table
pub fn arrow_schema(table: Table) -> Schema {
    let fields: Vec<Field> = columns_for(table)
        .iter()
        .map(|c| {
            let dtype = match c.ty {
                ColumnType::Int => DataType::Int64,
                ColumnType::Text => DataType::Utf8,
                ColumnType::Date => DataType::Date32,
                ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            };
            Field::new(c.name, dtype, c.nullable)
        })
        .collect();
    Schema::new(fields)
}

/// Convert a batch into an Arrow record batch
pub fn batch_to_arrow(batch: &LoadBatch) -> Result<RecordBatch> {
    let table = batch.table();
    let columns = batch.columns();
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for (index, column) in columns.iter().enumerate() {
        let cells = batch.rows().iter().map(|row| &row[index]);
        let mismatch = |cell: &Cell| {
            Error::sink(
                table,
                format!("column '{}' expects {:?}, got {cell:?}", column.name, column.ty),
            )
        };

        let array: ArrayRef = match column.ty {
            ColumnType::Int => Arc::new(
                cells
                    .map(|cell| match cell {
                        Cell::Null => Ok(None),
                        Cell::Int(i) => Ok(Some(*i)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<Int64Array>>()?,
            ),
            ColumnType::Text => Arc::new(
                cells
                    .map(|cell| match cell {
                        Cell::Null => Ok(None),
                        Cell::Text(s) => Ok(Some(s.as_str())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<StringArray>>()?,
            ),
            ColumnType::Date => Arc::new(
                cells
                    .map(|cell| match cell {
                        Cell::Null => Ok(None),
                        Cell::Date(d) => Ok(Some(days_since_epoch(*d))),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<Date32Array>>()?,
            ),
            ColumnType::Timestamp => Arc::new(
                cells
                    .map(|cell| match cell {
                        Cell::Null => Ok(None),
                        Cell::Timestamp(ts) => Ok(Some(ts.and_utc().timestamp_micros())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<TimestampMicrosecondArray>>()?,
            ),
        };
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(arrow_schema(table)), arrays).map_err(sink_err(table))
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - DateTime::<Utc>::UNIX_EPOCH.date_naive()).num_days() as i32
}
