//! DuckDB-backed record source
//!
//! Each fetch is a single bounded query: the range predicate, the full
//! ordering, and `LIMIT` set to the required record count. Rows are read
//! column by column and turned into JSON objects, so the JSON accessors
//! read them directly and no DuckDB extension is needed.

use super::query::{build_page_query, is_temporal_type, Relation};
use crate::accessor::ValueAccessor;
use crate::error::{Error, Result};
use crate::ordering::OrderingSpec;
use crate::pager::{FetchRequest, RecordSource};
use duckdb::types::{TimeUnit, Value as SqlValue};
use duckdb::Connection;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Record source over a DuckDB table or query
pub struct DuckDbSource {
    /// DuckDB connection
    conn: Connection,
    /// Table or query paged over
    relation: Relation,
    /// Columns of the relation, in select order
    columns: Vec<String>,
    /// Fields compared as timestamps
    temporal_fields: HashSet<String>,
}

impl DuckDbSource {
    /// Create a source on a fresh in-memory database
    pub fn open_in_memory(relation: Relation) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self::from_connection(conn, relation))
    }

    /// Create a source on an existing database file
    pub fn open(path: impl AsRef<Path>, relation: Relation) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::database(format!("Failed to open '{}': {e}", path.display()))
        })?;
        Ok(Self::from_connection(conn, relation))
    }

    /// Wrap an open connection
    pub fn from_connection(conn: Connection, relation: Relation) -> Self {
        Self {
            conn,
            relation,
            columns: Vec::new(),
            temporal_fields: HashSet::new(),
        }
    }

    /// Compare these fields as timestamps, in addition to detected ones
    pub fn with_temporal_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.temporal_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Relation paged over
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Columns read from each row, known once an ordering is applied
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fields compared as timestamps
    pub fn temporal_fields(&self) -> &HashSet<String> {
        &self.temporal_fields
    }

    /// Run one or more statements on the connection
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::database(format!("Failed to execute batch: {e}")))
    }

    /// Column names and types of the relation
    fn describe(&self) -> Result<Vec<(String, String)>> {
        let sql = format!("DESCRIBE SELECT * FROM {}", self.relation.from_clause());
        debug!(sql = %sql, "Describing relation");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::database(format!("Failed to describe relation: {e}")))?;

        let columns = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| Error::database(format!("Failed to describe relation: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::database(format!("Failed to read relation column: {e}")))?;

        Ok(columns)
    }
}

impl RecordSource for DuckDbSource {
    type Record = Value;

    /// Learn the relation's columns and mark date or timestamp ordering
    /// fields as temporal
    fn apply_ordering(
        &mut self,
        ordering: &OrderingSpec,
        _accessor: &dyn ValueAccessor<Value>,
    ) -> Result<()> {
        let described = self.describe()?;
        for (name, column_type) in &described {
            if is_temporal_type(column_type) && ordering.iter().any(|entry| &entry.field == name) {
                self.temporal_fields.insert(name.clone());
            }
        }
        self.columns = described.into_iter().map(|(name, _)| name).collect();
        Ok(())
    }

    fn fetch_range(
        &self,
        request: &FetchRequest<'_>,
        _accessor: &dyn ValueAccessor<Value>,
    ) -> Result<Vec<Value>> {
        let described;
        let columns: &[String] = if self.columns.is_empty() {
            described = self
                .describe()?
                .into_iter()
                .map(|(name, _)| name)
                .collect::<Vec<_>>();
            &described
        } else {
            &self.columns
        };

        let query = build_page_query(&self.relation, columns, request, &self.temporal_fields);
        debug!(sql = %query.sql, params = query.params.len(), "Executing page query");

        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .map_err(|e| Error::database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(duckdb::params_from_iter(query.params.iter()), |row| {
                let mut object = Map::with_capacity(columns.len());
                for (index, name) in columns.iter().enumerate() {
                    let value: SqlValue = row.get(index)?;
                    object.insert(name.clone(), sql_value_to_json(value));
                }
                Ok(Value::Object(object))
            })
            .map_err(|e| Error::database(format!("Failed to run query: {e}")))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::database(format!("Failed to read row: {e}")))
    }
}

impl std::fmt::Debug for DuckDbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSource")
            .field("relation", &self.relation)
            .field("columns", &self.columns)
            .field("temporal_fields", &self.temporal_fields)
            .finish()
    }
}

/// Microseconds since the epoch for a timestamp in `unit`
fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Convert a DuckDB value to JSON.
///
/// Timestamps become RFC 3339 strings and dates `YYYY-MM-DD`, both of which
/// the date-time accessor normalizes to epoch seconds.
pub(crate) fn sql_value_to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Boolean(b) => Value::Bool(b),
        SqlValue::TinyInt(i) => Value::Number(i.into()),
        SqlValue::SmallInt(i) => Value::Number(i.into()),
        SqlValue::Int(i) => Value::Number(i.into()),
        SqlValue::BigInt(i) => Value::Number(i.into()),
        SqlValue::HugeInt(i) => Value::String(i.to_string()),
        SqlValue::UTinyInt(i) => Value::Number(i.into()),
        SqlValue::USmallInt(i) => Value::Number(i.into()),
        SqlValue::UInt(i) => Value::Number(i.into()),
        SqlValue::UBigInt(i) => Value::Number(i.into()),
        SqlValue::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number)
        }
        SqlValue::Double(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        SqlValue::Timestamp(unit, raw) => {
            let micros = to_micros(unit, raw);
            let secs = micros.div_euclid(1_000_000);
            let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
            chrono::DateTime::from_timestamp(secs, nanos)
                .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()))
                .unwrap_or(Value::Number(raw.into()))
        }
        SqlValue::Date32(days) => {
            // Days since 1970-01-01; 719 163 days separate it from 0001-01-01
            chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163)
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Number(days.into()))
        }
        other => Value::String(format!("{other:?}")),
    }
}
