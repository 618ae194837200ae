use anyhow::{Context, Result};
use polars::prelude::*;
use rusqlite::Connection;
use rusqlite::types::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Full-replace loader into one table of a local embedded SQLite store.
/// Each run drops and recreates the table; there is no upsert path.
pub struct SqliteSink {
    db_path: PathBuf,
    table_name: String,
}

impl SqliteSink {
    pub fn new(db_path: &Path, table_name: &str) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
            table_name: table_name.to_string(),
        }
    }

    /// Drop, recreate and fill the sink table inside one transaction, so
    /// readers only ever observe the previous or the new table, never a
    /// partial load. Returns the number of rows loaded.
    pub fn load_dataframe(&self, df: &DataFrame) -> Result<usize> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(&self.db_path).with_context(|| {
            format!("failed to open sqlite database at {}", self.db_path.display())
        })?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let column_defs: Vec<String> = columns
            .iter()
            .zip(df.dtypes().iter())
            .map(|(name, dtype)| format!("\"{}\" {}", name, sql_type(dtype)))
            .collect();

        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{table}\"; CREATE TABLE \"{table}\" ({defs});",
            table = self.table_name,
            defs = column_defs.join(", ")
        ))?;

        let insert_sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table_name,
            columns
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row_idx in 0..df.height() {
                let mut params: Vec<Value> = Vec::with_capacity(columns.len());
                for column in df.get_columns() {
                    params.push(sql_value(column.get(row_idx)?));
                }
                stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }
        tx.commit()?;

        info!(
            "data loaded into the local database: {}",
            self.db_path.display()
        );
        Ok(df.height())
    }

    /// Read back a small row sample right after a load, as a smoke check
    /// that the table is actually queryable.
    pub fn read_sample(&self, limit: usize) -> Result<Vec<String>> {
        let conn = Connection::open(&self.db_path)?;
        let sql = format!(
            "SELECT * FROM \"{}\" LIMIT {}",
            self.table_name, limit
        );
        let mut stmt = conn.prepare(&sql)?;
        let column_count = stmt.column_count();

        let rows = stmt.query_map([], |row| {
            let mut rendered = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let cell: Value = row.get(idx)?;
                rendered.push(render_cell(cell));
            }
            Ok(rendered.join(" | "))
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Float32 | DataType::Float64 => "REAL",
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Boolean => "INTEGER",
        _ => "TEXT",
    }
}

fn sql_value(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Float64(v) => Value::Real(v),
        AnyValue::Float32(v) => Value::Real(v as f64),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::Int32(v) => Value::Integer(v as i64),
        AnyValue::Boolean(v) => Value::Integer(v as i64),
        AnyValue::String(v) => Value::Text(v.to_string()),
        AnyValue::StringOwned(v) => Value::Text(v.to_string()),
        other => Value::Text(other.to_string()),
    }
}

fn render_cell(cell: Value) -> String {
    match cell {
        Value::Null => "null".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => format!("{:.2}", v),
        Value::Text(v) => v,
        Value::Blob(_) => "<blob>".to_string(),
    }
}
