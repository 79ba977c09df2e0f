//! CLI commands and argument parsing

use crate::ordering::OrderBy;
use crate::types::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Keyset pagination over JSON record files and DuckDB tables
#[derive(Parser, Debug)]
#[command(name = "keyset-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute one page
    Page {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Follow continuation tokens from the first page to the last
    Walk {
        #[command(flatten)]
        source: SourceArgs,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Inspect or build continuation tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Start HTTP server mode
    Serve {
        /// Records file (JSON array or JSON Lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Pager configuration file (YAML or JSON)
        #[arg(short = 'C', long)]
        config: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Where records come from and how they are ordered
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Records file (JSON array or JSON Lines)
    #[arg(short, long, conflicts_with = "database")]
    pub input: Option<PathBuf>,

    /// DuckDB database file
    #[arg(long, requires = "table")]
    pub database: Option<PathBuf>,

    /// Table or view to page over (with --database)
    #[arg(long)]
    pub table: Option<String>,

    /// Field compared as a timestamp (with --database), repeatable
    #[arg(long = "temporal")]
    pub temporal: Vec<String>,

    /// Pager configuration file (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Ordering entry as `field[:asc|desc]`, repeatable; replaces the
    /// configured ordering
    #[arg(short, long = "order")]
    pub order: Vec<OrderBy>,

    /// Records per page (defaults to the configured page size)
    #[arg(short = 'n', long)]
    pub page_size: Option<usize>,
}

/// Which page to compute
#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    /// Continuation token from a previous page
    #[arg(long = "continue", conflicts_with_all = ["page", "offset"])]
    pub continue_token: Option<String>,

    /// 1-based page number
    #[arg(long, conflicts_with = "offset", allow_negative_numbers = true)]
    pub page: Option<i64>,

    /// 0-based record offset
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<i64>,
}

/// Token subcommands
#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// Decode a token into its parts
    Decode {
        /// Wire token
        token: String,
    },

    /// Build a token from its parts
    Encode {
        /// Order value; integers use the compact form unless --text is given
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Records sharing the order value already delivered
        #[arg(long)]
        offset: usize,

        /// Checksum of those records' tie-break values
        #[arg(long)]
        checksum: u32,

        /// Treat the value as text
        #[arg(long)]
        text: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}
