//! CLI runner - executes commands

use crate::accessor::{DateTimeAccessor, JsonAccessor, Scalar};
use crate::cli::commands::{Cli, Commands, OutputFormat, SelectorArgs, SourceArgs, TokenCommands};
use crate::cli::server::{serve, ServerConfig};
use crate::config::PagerConfig;
use crate::database::{DuckDbSource, Relation};
use crate::error::{Error, Result, ResultExt};
use crate::ordering::OrderingSpec;
use crate::pager::{InMemorySource, Pager, RecordSource, Resolution};
use crate::selector::{PageNumber, PageOffset, PageSelector};
use crate::token::{encode_base36, ContinuationToken};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// Page Output
// ============================================================================

/// One computed page as printed and served
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    /// Records of the page
    pub records: Vec<Value>,
    /// Token for the next page
    pub next: Option<ContinuationToken>,
    /// How the page was derived
    pub resolution: Resolution,
}

/// Compute the pager's current page and its successor token.
///
/// Orderings without a tie-break field never produce a token.
pub fn page_response<S>(pager: &mut Pager<S, DateTimeAccessor<JsonAccessor>>) -> Result<PageResponse>
where
    S: RecordSource<Record = Value>,
{
    let next = if pager.ordering().supports_tokens() {
        pager.next_page_token()?
    } else {
        None
    };
    let page = pager.compute_page()?;

    Ok(PageResponse {
        records: page.records().to_vec(),
        next,
        resolution: page.resolution(),
    })
}

// ============================================================================
// Record Loading
// ============================================================================

/// Load records from a JSON array or JSON Lines file
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    parse_records(&content)
}

/// Parse a JSON array, or one JSON document per line
pub fn parse_records(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<Value>(line)
                .with_context(|| format!("Invalid JSON on line {}", index + 1))
        })
        .collect()
}

// ============================================================================
// Runner
// ============================================================================

/// Pager settings after merging the config file and flags
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    ordering: OrderingSpec,
    page_size: usize,
}

impl Settings {
    fn resolve(args: &SourceArgs, config: &PagerConfig) -> Self {
        let ordering = if args.order.is_empty() {
            config.ordering.clone()
        } else {
            OrderingSpec::new(args.order.clone())
        };
        let page_size = args
            .page_size
            .map_or(config.page_size, |size| config.clamp_page_size(size));

        Self {
            ordering,
            page_size,
        }
    }
}

enum Source {
    Memory(InMemorySource<Value>),
    Database(DuckDbSource),
}

fn load_config(path: Option<&Path>) -> Result<PagerConfig> {
    path.map_or_else(|| Ok(PagerConfig::default()), PagerConfig::from_file)
}

fn open_source(args: &SourceArgs) -> Result<Source> {
    if let Some(path) = &args.input {
        let records = load_records(path)?;
        debug!(records = records.len(), path = %path.display(), "Loaded records");
        return Ok(Source::Memory(InMemorySource::new(records)));
    }

    if let Some(path) = &args.database {
        let table = args
            .table
            .as_ref()
            .ok_or_else(|| Error::config("--database requires --table"))?;
        let source = DuckDbSource::open(path, Relation::table(table.as_str()))?
            .with_temporal_fields(args.temporal.iter().cloned());
        return Ok(Source::Database(source));
    }

    Err(Error::config(
        "No records given (use --input FILE or --database FILE --table NAME)",
    ))
}

fn selector_from_args(args: &SelectorArgs) -> Result<PageSelector> {
    if let Some(token) = &args.continue_token {
        return ContinuationToken::parse(token).map(PageSelector::Token);
    }
    if let Some(number) = args.page {
        return PageNumber::new(number).map(PageSelector::PageNumber);
    }
    if let Some(offset) = args.offset {
        return PageOffset::new(offset).map(PageSelector::PageOffset);
    }
    Ok(PageSelector::None)
}

fn build_pager<S>(
    source: S,
    settings: &Settings,
) -> Result<Pager<S, DateTimeAccessor<JsonAccessor>>>
where
    S: RecordSource<Record = Value>,
{
    Ok(Pager::new(
        source,
        settings.ordering.clone(),
        DateTimeAccessor::new(JsonAccessor),
    )?
    .with_page_size(settings.page_size))
}

fn compute_one<S>(source: S, settings: &Settings, selector: PageSelector) -> Result<PageResponse>
where
    S: RecordSource<Record = Value>,
{
    let mut pager = build_pager(source, settings)?;
    pager.set_current_page(selector);
    page_response(&mut pager)
}

fn compute_all<S>(source: S, settings: &Settings, max_pages: Option<usize>) -> Result<Vec<PageResponse>>
where
    S: RecordSource<Record = Value>,
{
    if !settings.ordering.supports_tokens() {
        return Err(Error::config(
            "Walking requires an ordering with at least two fields",
        ));
    }

    let mut pager = build_pager(source, settings)?;
    let mut pages = Vec::new();
    loop {
        let response = page_response(&mut pager)?;
        let next = response.next.clone();
        let empty = response.records.is_empty();
        if !empty {
            pages.push(response);
        }

        match next {
            Some(token) if max_pages.map_or(true, |max| pages.len() < max) => {
                pager.set_current_page(token);
            }
            _ => break,
        }
    }

    info!(pages = pages.len(), "Walk finished");
    Ok(pages)
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Page { source, selector } => {
                let response = self.page(source, selector)?;
                self.emit(&response)
            }
            Commands::Walk { source, max_pages } => {
                for page in self.walk(source, *max_pages)? {
                    self.emit(&page)?;
                }
                Ok(())
            }
            Commands::Token { command } => {
                let output = self.token(command)?;
                self.emit(&output)
            }
            Commands::Serve {
                input,
                config,
                port,
            } => {
                let config = ServerConfig {
                    pager: load_config(config.as_deref())?,
                    records: Arc::new(load_records(input)?),
                };
                serve(config, *port).await
            }
        }
    }

    /// Compute the selected page
    pub fn page(&self, args: &SourceArgs, selector: &SelectorArgs) -> Result<PageResponse> {
        let config = load_config(args.config.as_deref())?;
        let settings = Settings::resolve(args, &config);
        let selector = selector_from_args(selector)?;

        match open_source(args)? {
            Source::Memory(source) => compute_one(source, &settings, selector),
            Source::Database(source) => compute_one(source, &settings, selector),
        }
    }

    /// Compute every page by following continuation tokens
    pub fn walk(&self, args: &SourceArgs, max_pages: Option<usize>) -> Result<Vec<PageResponse>> {
        let config = load_config(args.config.as_deref())?;
        let settings = Settings::resolve(args, &config);

        match open_source(args)? {
            Source::Memory(source) => compute_all(source, &settings, max_pages),
            Source::Database(source) => compute_all(source, &settings, max_pages),
        }
    }

    /// Decode or encode a token
    pub fn token(&self, command: &TokenCommands) -> Result<Value> {
        match command {
            TokenCommands::Decode { token } => {
                let token = ContinuationToken::parse(token)?;
                Ok(json!({
                    "order_value": token.order_value(),
                    "offset": token.offset(),
                    "checksum": token.checksum(),
                    "checksum_base36": encode_base36(u64::from(token.checksum())),
                }))
            }
            TokenCommands::Encode {
                value,
                offset,
                checksum,
                text,
            } => {
                let order_value = match value.parse::<i64>() {
                    Ok(number) if !text => Scalar::Int(number),
                    _ => Scalar::Text(value.clone()),
                };
                let token = ContinuationToken::new(order_value, *offset, *checksum)?;
                Ok(json!({ "token": token }))
            }
        }
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    const RECORDS: &str = r#"[
        {"id": "b4902bde-28d2-4ff9-8971-8bfeb3e943c1", "timestamp": "1991-11-24T00:00:00Z"},
        {"id": "191a54d8-990c-4ea7-9a23-0aed29d1fffe", "timestamp": "1991-11-24T01:00:00Z"},
        {"id": "9c5f6ff7-b28f-48fb-ba47-8bcc3b235bed", "timestamp": "1991-11-24T02:00:00Z"},
        {"id": "af6394a4-7344-4fe8-9748-e6c67eba5ade", "timestamp": "1991-11-24T03:00:00Z"},
        {"id": "84810e2e-448f-4f58-acb8-4db1381f5de3", "timestamp": "1991-11-24T04:00:00Z"},
        {"id": "eadd7470-95f5-47e8-8e74-083d45c307f6", "timestamp": "1991-11-24T05:00:00Z"}
    ]"#;

    fn cli_runner(args: &[&str]) -> Runner {
        let mut argv = vec!["keyset-pager"];
        argv.extend_from_slice(args);
        Runner::new(Cli::try_parse_from(argv).unwrap())
    }

    fn write_records(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("records.json");
        fs::write(&path, RECORDS).unwrap();
        path.display().to_string()
    }

    fn page_args(runner: &Runner) -> (&SourceArgs, &SelectorArgs) {
        match &runner.cli.command {
            Commands::Page { source, selector } => (source, selector),
            other => panic!("Expected page command, got {other:?}"),
        }
    }

    fn first_ids(response: &PageResponse) -> Vec<&str> {
        response
            .records
            .iter()
            .map(|r| &r["id"].as_str().unwrap()[..4])
            .collect()
    }

    #[test]
    fn test_parse_records_array_and_lines() {
        assert_eq!(parse_records("[{\"a\": 1}, {\"a\": 2}]").unwrap().len(), 2);
        assert_eq!(
            parse_records("{\"a\": 1}\n\n{\"a\": 2}\n").unwrap(),
            vec![json!({"a": 1}), json!({"a": 2})]
        );

        let err = parse_records("{\"a\": 1}\nnope\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_load_missing_records() {
        let err = load_records(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_page_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_records(&dir);
        let runner = cli_runner(&[
            "page", "--input", &input, "--order", "timestamp", "--order", "id", "-n", "3",
        ]);
        let (source, selector) = page_args(&runner);

        let response = runner.page(source, selector).unwrap();
        assert_eq!(first_ids(&response), vec!["b490", "191a", "9c5f"]);
        assert_eq!(
            response.next.as_ref().map(ToString::to_string).as_deref(),
            Some("bfdew0_1_1jvdwz4")
        );
        assert_eq!(response.resolution, Resolution::First);
    }

    #[test]
    fn test_page_command_with_token() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_records(&dir);
        let runner = cli_runner(&[
            "page",
            "-i",
            &input,
            "-o",
            "timestamp:asc",
            "-o",
            "id",
            "-n",
            "3",
            "--continue",
            "bfdew0_1_1jvdwz4",
        ]);
        let (source, selector) = page_args(&runner);

        let response = runner.page(source, selector).unwrap();
        assert_eq!(first_ids(&response), vec!["af63", "8481", "eadd"]);
        assert_eq!(response.resolution, Resolution::Resumed);
    }

    #[test]
    fn test_page_command_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_records(&dir);
        let config = dir.path().join("pager.yaml");
        fs::write(&config, "page_size: 4\nordering:\n  - timestamp: desc\n  - id: asc\n").unwrap();

        let runner = cli_runner(&["page", "-i", &input, "-C", config.to_str().unwrap(), "--page", "2"]);
        let (source, selector) = page_args(&runner);

        let response = runner.page(source, selector).unwrap();
        assert_eq!(first_ids(&response), vec!["191a", "b490"]);
        assert_eq!(response.next, None);
        assert_eq!(response.resolution, Resolution::Positional);
    }

    #[test]
    fn test_walk_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_records(&dir);
        let runner = cli_runner(&["walk", "-i", &input, "-o", "timestamp", "-o", "id", "-n", "4"]);
        let Commands::Walk { source, max_pages } = &runner.cli.command else {
            panic!("Expected walk command");
        };

        let pages = runner.walk(source, *max_pages).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].records.len(), 4);
        assert_eq!(first_ids(&pages[1]), vec!["8481", "eadd"]);
    }

    #[test]
    fn test_walk_requires_tie_break() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_records(&dir);
        let runner = cli_runner(&["walk", "-i", &input, "-o", "timestamp"]);
        let Commands::Walk { source, max_pages } = &runner.cli.command else {
            panic!("Expected walk command");
        };

        assert!(matches!(
            runner.walk(source, *max_pages),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_token_commands() {
        let runner = cli_runner(&["token", "decode", "bfdew0_1_1jvdwz4"]);
        let Commands::Token { command } = &runner.cli.command else {
            panic!("Expected token command");
        };
        assert_eq!(
            runner.token(command).unwrap(),
            json!({
                "order_value": 690_948_000,
                "offset": 1,
                "checksum": 3_378_357_040_u32,
                "checksum_base36": "1jvdwz4",
            })
        );

        let runner = cli_runner(&[
            "token", "encode", "--value", "690948000", "--offset", "1", "--checksum", "3378357040",
        ]);
        let Commands::Token { command } = &runner.cli.command else {
            panic!("Expected token command");
        };
        assert_eq!(
            runner.token(command).unwrap(),
            json!({ "token": "bfdew0_1_1jvdwz4" })
        );
    }

    #[test]
    fn test_encode_text_value() {
        let runner = cli_runner(&[
            "token", "encode", "--value", "-36", "--offset", "2", "--checksum", "0", "--text",
        ]);
        let Commands::Token { command } = &runner.cli.command else {
            panic!("Expected token command");
        };
        assert_eq!(runner.token(command).unwrap(), json!({ "token": "=LTM2_2_0" }));
    }

    #[test]
    fn test_missing_source() {
        let runner = cli_runner(&["page", "-o", "id"]);
        let (source, selector) = page_args(&runner);
        assert!(matches!(
            runner.page(source, selector),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_cli_rejects_conflicting_selectors() {
        let result = Cli::try_parse_from([
            "keyset-pager",
            "page",
            "-i",
            "x.json",
            "--page",
            "2",
            "--offset",
            "4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_clamp_page_size() {
        let args = SourceArgs {
            page_size: Some(1_000),
            ..SourceArgs::default()
        };
        let settings = Settings::resolve(&args, &PagerConfig::default());
        assert_eq!(settings.page_size, 100);
        assert!(settings.ordering.is_empty());
    }
}
