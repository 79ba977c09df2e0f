//! Database record source via DuckDB
//!
//! Pages over a DuckDB table, view or query. Any database DuckDB can read
//! works the same way once it is visible to the connection.

mod engine;
mod query;

pub use engine::DuckDbSource;
pub use query::{quote_identifier, Relation};
