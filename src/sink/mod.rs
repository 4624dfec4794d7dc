//! Load sinks
//!
//! A sink receives one [`LoadBatch`] per (table, competition) and writes it to
//! its destination. Three destinations exist:
//!
//! - [`WarehouseSink`]: PostgreSQL, attached through DuckDB's postgres extension
//! - [`ParquetSink`]: one Parquet file per batch on local disk
//! - [`MemorySink`]: keeps batches in memory, for dry runs and tests

mod memory;
mod parquet_file;
mod warehouse;

pub use self::memory::MemorySink;
pub use self::parquet_file::{arrow_schema, batch_to_arrow, ParquetSink};
pub use self::warehouse::{create_table_sql, delete_sql, insert_sql, WarehouseSink};

use crate::config::WarehouseConfig;
use crate::error::{Error, Result};
use crate::records::LoadBatch;
use crate::types::LoadMode;
use std::path::PathBuf;

/// A destination for load batches
pub trait LoadSink: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether this sink can honour the given load mode
    fn supports(&self, mode: LoadMode) -> bool {
        let _ = mode;
        true
    }

    /// Write one batch. An empty batch is not an error.
    fn write(&mut self, batch: &LoadBatch) -> Result<()>;
}

impl<T: LoadSink + ?Sized> LoadSink for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supports(&self, mode: LoadMode) -> bool {
        (**self).supports(mode)
    }

    fn write(&mut self, batch: &LoadBatch) -> Result<()> {
        (**self).write(batch)
    }
}

/// Reject a load mode the sink can't honour
pub fn ensure_supported<K: LoadSink + ?Sized>(sink: &K, mode: LoadMode) -> Result<()> {
    if sink.supports(mode) {
        Ok(())
    } else {
        Err(Error::invalid_value(
            "load_mode",
            format!("the {} sink does not support '{mode}'", sink.name()),
        ))
    }
}

/// Sink selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SinkKind {
    #[default]
    Warehouse,
    Parquet,
    Memory,
}

/// Open the selected sink
pub fn open_sink(
    kind: SinkKind,
    warehouse: &WarehouseConfig,
    output_dir: Option<PathBuf>,
) -> Result<Box<dyn LoadSink>> {
    match kind {
        SinkKind::Warehouse => Ok(Box::new(WarehouseSink::connect(warehouse)?)),
        SinkKind::Parquet => {
            let dir = output_dir.ok_or_else(|| Error::missing_field("--output"))?;
            Ok(Box::new(ParquetSink::new(dir)?))
        }
        SinkKind::Memory => Ok(Box::new(MemorySink::new())),
    }
}

#[cfg(test)]
mod tests;
