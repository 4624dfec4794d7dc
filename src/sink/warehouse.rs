//! PostgreSQL warehouse sink
//!
//! Runs an in-memory DuckDB engine and attaches the warehouse through the
//! `postgres` extension. Tables are created when missing and never altered.
//! Each batch is written inside one transaction.

use super::LoadSink;
use crate::config::WarehouseConfig;
use crate::error::{sink_err, Error, Result};
use crate::records::{columns_for, key_for, key_positions, Cell, ColumnType, LoadBatch};
use crate::types::{LoadMode, Table};
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use std::collections::HashSet;
use tracing::{debug, info};

/// Catalog alias the warehouse is attached under
const WAREHOUSE_ALIAS: &str = "warehouse";

/// Sink writing to PostgreSQL through DuckDB
pub struct WarehouseSink {
    conn: Connection,
    /// Catalog prefix for table names; `None` writes to DuckDB's own catalog
    catalog: Option<String>,
    /// Target description for logging (never contains the password)
    target: String,
    created: HashSet<Table>,
}

impl WarehouseSink {
    /// Attach the configured PostgreSQL database
    pub fn connect(config: &WarehouseConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::sink_setup(format!("Failed to create DuckDB connection: {e}")))?;

        conn.execute_batch("INSTALL postgres; LOAD postgres;")
            .map_err(|e| Error::sink_setup(format!("Failed to load postgres extension: {e}")))?;

        let attach_sql = format!(
            "ATTACH '{}' AS {WAREHOUSE_ALIAS} (TYPE POSTGRES);",
            config.connection_string().replace('\'', "''")
        );
        conn.execute_batch(&attach_sql).map_err(|e| {
            Error::sink_setup(format!(
                "Failed to attach PostgreSQL at {}: {e}",
                config.connection_info()
            ))
        })?;

        info!("Connected to warehouse {}", config.connection_info());

        Ok(Self {
            conn,
            catalog: Some(WAREHOUSE_ALIAS.to_string()),
            target: config.connection_info(),
            created: HashSet::new(),
        })
    }

    /// A sink over a private in-memory DuckDB database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::sink_setup(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self {
            conn,
            catalog: None,
            target: ":memory:".to_string(),
            created: HashSet::new(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Run a trivial query against the warehouse
    pub fn check_connection(&self) -> Result<()> {
        let query = match &self.catalog {
            Some(catalog) => format!("SELECT 1 FROM {catalog}.pg_catalog.pg_tables LIMIT 1"),
            None => "SELECT 1".to_string(),
        };
        self.conn
            .execute(&query, [])
            .map_err(|e| Error::sink_setup(format!("Connection check failed: {e}")))?;
        Ok(())
    }

    /// Number of rows currently in a table
    pub fn count_rows(&self, table: Table) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            qualified(self.catalog.as_deref(), table)
        );
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(sink_err(table))?;
        Ok(count as usize)
    }

    fn ensure_table(&mut self, table: Table) -> Result<()> {
        if self.created.contains(&table) {
            return Ok(());
        }
        let ddl = create_table_sql(table, self.catalog.as_deref());
        debug!("Executing DDL: {ddl}");
        self.conn.execute_batch(&ddl).map_err(sink_err(table))?;
        self.created.insert(table);
        Ok(())
    }
}

impl LoadSink for WarehouseSink {
    fn name(&self) -> &str {
        "warehouse"
    }

    fn write(&mut self, batch: &LoadBatch) -> Result<()> {
        let table = batch.table();
        self.ensure_table(table)?;

        if batch.is_empty() {
            debug!("No {table} rows for {}, nothing to write", batch.competition());
            return Ok(());
        }

        let catalog = self.catalog.clone();
        let tx = self.conn.transaction().map_err(sink_err(table))?;

        if batch.mode() == LoadMode::Upsert {
            let positions = key_positions(table);
            let mut delete = tx
                .prepare(&delete_sql(table, catalog.as_deref()))
                .map_err(sink_err(table))?;
            for row in batch.rows() {
                let key: Vec<Value> = positions
                    .iter()
                    .map(|&i| cell_value(&row[i]))
                    .collect();
                delete
                    .execute(params_from_iter(key))
                    .map_err(sink_err(table))?;
            }
        }

        {
            let mut insert = tx
                .prepare(&insert_sql(table, catalog.as_deref()))
                .map_err(sink_err(table))?;
            for row in batch.rows() {
                insert
                    .execute(params_from_iter(row.iter().map(cell_value)))
                    .map_err(sink_err(table))?;
            }
        }

        tx.commit().map_err(sink_err(table))?;
        Ok(())
    }
}

impl std::fmt::Debug for WarehouseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseSink")
            .field("target", &self.target)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SQL generation
// ============================================================================

fn qualified(catalog: Option<&str>, table: Table) -> String {
    match catalog {
        Some(catalog) => format!("{catalog}.{table}"),
        None => table.to_string(),
    }
}

/// `CREATE TABLE IF NOT EXISTS` for a target table
pub fn create_table_sql(table: Table, catalog: Option<&str>) -> String {
    let columns: Vec<String> = columns_for(table)
        .iter()
        .map(|c| {
            let null = if c.nullable { "" } else { " NOT NULL" };
            format!("    {} {}{null}", c.name, c.ty.sql_type())
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        qualified(catalog, table),
        columns.join(",\n")
    )
}

/// Parameterised insert of one row
pub fn insert_sql(table: Table, catalog: Option<&str>) -> String {
    let columns = columns_for(table);
    let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
    let placeholders: Vec<&str> = columns.iter().map(|c| placeholder(c.ty)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified(catalog, table),
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Parameterised delete of the rows sharing one natural key
pub fn delete_sql(table: Table, catalog: Option<&str>) -> String {
    let columns = columns_for(table);
    let predicates: Vec<String> = key_for(table)
        .iter()
        .map(|name| {
            let ty = columns
                .iter()
                .find(|c| c.name == *name)
                .map_or(ColumnType::Text, |c| c.ty);
            format!("{name} IS NOT DISTINCT FROM {}", placeholder(ty))
        })
        .collect();
    format!(
        "DELETE FROM {} WHERE {}",
        qualified(catalog, table),
        predicates.join(" AND ")
    )
}

fn placeholder(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Int | ColumnType::Text => "?",
        ColumnType::Date => "CAST(? AS DATE)",
        ColumnType::Timestamp => "CAST(? AS TIMESTAMP)",
    }
}

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Int(i) => Value::BigInt(*i),
        Cell::Text(s) => Value::Text(s.clone()),
        Cell::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        Cell::Timestamp(ts) => Value::Text(ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
    }
}
