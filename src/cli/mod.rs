//! CLI module
//!
//! Command-line interface for paging over record files and DuckDB tables.
//!
//! # Commands
//!
//! - `page` - Compute one page (first, token, page number or offset)
//! - `walk` - Follow continuation tokens to the last page
//! - `token` - Decode or encode continuation tokens
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat, SelectorArgs, SourceArgs, TokenCommands};
pub use runner::{load_records, page_response, parse_records, PageResponse, Runner};
pub use server::{router, serve, ServerConfig};
