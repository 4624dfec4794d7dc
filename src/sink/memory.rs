//! In-memory sink

use super::LoadSink;
use crate::error::Result;
use crate::records::{key_positions, Cell, LoadBatch};
use crate::types::{LoadMode, Table};

/// Keeps every batch it receives, in arrival order
///
/// In upsert mode, rows already held for the same table are dropped when
/// their natural key matches a row of the incoming batch, as the warehouse
/// sink does with its keyed delete.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Vec<LoadBatch>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[LoadBatch] {
        &self.batches
    }

    /// Tables in the order they were written
    pub fn tables(&self) -> Vec<Table> {
        self.batches.iter().map(LoadBatch::table).collect()
    }

    /// Rows held for one table, across all competitions
    pub fn row_count(&self, table: Table) -> usize {
        self.batches
            .iter()
            .filter(|b| b.table() == table)
            .map(LoadBatch::len)
            .sum()
    }

    /// Batches written for one competition
    pub fn for_competition<'a>(
        &'a self,
        competition: &'a str,
    ) -> impl Iterator<Item = &'a LoadBatch> + 'a {
        self.batches
            .iter()
            .filter(move |b| b.competition() == competition)
    }

    pub fn into_batches(self) -> Vec<LoadBatch> {
        self.batches
    }

    fn replace_keys(&mut self, batch: &LoadBatch) {
        let incoming: Vec<Vec<&Cell>> =
            batch.rows().iter().map(|row| batch.key_cells(row)).collect();
        for held in self.batches.iter_mut().filter(|b| b.table() == batch.table()) {
            let positions = key_positions(held.table());
            held.retain_rows(|row| {
                let key: Vec<&Cell> = positions.iter().map(|&i| &row[i]).collect();
                !incoming.iter().any(|k| *k == key)
            });
        }
    }
}

impl LoadSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&mut self, batch: &LoadBatch) -> Result<()> {
        if batch.mode() == LoadMode::Upsert {
            self.replace_keys(batch);
        }
        self.batches.push(batch.clone());
        Ok(())
    }
}
