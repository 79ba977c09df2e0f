//! SQL generation for ranged page fetches

use crate::accessor::Scalar;
use crate::ordering::{Direction, OrderingSpec};
use crate::pager::{FetchRange, FetchRequest};
use duckdb::types::Value as SqlValue;
use std::collections::HashSet;

/// Alias the relation is selected through
const ROW_ALIAS: &str = "q";

/// Quote an identifier, one part per `.`-separated segment
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// What records are paged over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// A table or view, optionally schema-qualified
    Table(String),
    /// An arbitrary SELECT statement
    Query(String),
}

impl Relation {
    /// Page over a table
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table(name.into())
    }

    /// Page over the rows of a query
    pub fn query(sql: impl Into<String>) -> Self {
        Self::Query(sql.into())
    }

    /// SQL fragment usable after `FROM`
    pub fn from_clause(&self) -> String {
        match self {
            Self::Table(name) => quote_identifier(name),
            Self::Query(sql) => format!("({})", sql.trim().trim_end_matches(';')),
        }
    }
}

/// A page query and its bound parameters
#[derive(Debug, Clone)]
pub(crate) struct PageQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

fn column(field: &str) -> String {
    format!("{ROW_ALIAS}.{}", quote_identifier(field))
}

fn to_sql_value(value: &Scalar) -> SqlValue {
    match value {
        Scalar::Null => SqlValue::Null,
        Scalar::Bool(b) => SqlValue::Boolean(*b),
        Scalar::Int(i) => SqlValue::BigInt(*i),
        Scalar::Float(f) => SqlValue::Double(*f),
        Scalar::Text(s) => SqlValue::Text(s.clone()),
        Scalar::DateTime(dt) => SqlValue::BigInt(dt.timestamp()),
    }
}

fn order_clause(ordering: &OrderingSpec) -> Option<String> {
    if ordering.is_empty() {
        return None;
    }

    let entries: Vec<String> = ordering
        .iter()
        .map(|entry| {
            format!(
                "{} {} NULLS LAST",
                column(&entry.field),
                entry.direction.as_sql()
            )
        })
        .collect();
    Some(format!("ORDER BY {}", entries.join(", ")))
}

/// Build the query for one fetch.
///
/// `columns` are selected in order; the caller reads them back by index.
/// NULLs sort last in both directions, so a range starting at a non-null
/// value also takes every NULL row, and a NULL boundary takes only NULLs.
/// Temporal fields compare against an integer token value through
/// `make_timestamp`.
pub(crate) fn build_page_query(
    relation: &Relation,
    columns: &[String],
    request: &FetchRequest<'_>,
    temporal_fields: &HashSet<String>,
) -> PageQuery {
    let select_list = if columns.is_empty() {
        format!("{ROW_ALIAS}.*")
    } else {
        columns
            .iter()
            .map(|name| column(name))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut sql = format!(
        "SELECT {select_list} FROM {} AS {ROW_ALIAS}",
        relation.from_clause()
    );
    let mut params = Vec::new();

    if let FetchRange::From { primary, value } = request.range {
        let field = column(&primary.field);
        if value.is_null() {
            sql.push_str(&format!(" WHERE {field} IS NULL"));
        } else {
            let operator = match primary.direction {
                Direction::Asc => ">=",
                Direction::Desc => "<=",
            };
            let placeholder = if temporal_fields.contains(&primary.field) && value.is_integer() {
                "make_timestamp(CAST(? AS BIGINT) * 1000000)"
            } else {
                "?"
            };
            sql.push_str(&format!(
                " WHERE ({field} {operator} {placeholder} OR {field} IS NULL)"
            ));
            params.push(to_sql_value(value));
        }
    }

    if let Some(order) = order_clause(request.ordering) {
        sql.push(' ');
        sql.push_str(&order);
    }

    sql.push_str(&format!(" LIMIT {}", request.limit));
    if let FetchRange::Offset(offset) = request.range {
        sql.push_str(&format!(" OFFSET {offset}"));
    }

    PageQuery { sql, params }
}

/// DuckDB column types holding points in time
pub(crate) fn is_temporal_type(column_type: &str) -> bool {
    let upper = column_type.to_ascii_uppercase();
    upper == "DATE" || upper.starts_with("TIMESTAMP")
}
