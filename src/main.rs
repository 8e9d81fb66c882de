//! tabkit - Stateless transformations for tabular data

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use tabkit::api::{self, CsvToSqlRequest, HandleNullsRequest, SqlSplitRequest};
use tabkit::config::Config;
use tabkit::error::{Outcome, TransformError};
use tabkit::parser::parse_rows;
use tabkit::server::start_server;

/// Inspect, normalize, impute, and type-check CSV data, and turn it into SQL
#[derive(Parser, Debug)]
#[command(name = "tabkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Rows included in previews
    #[arg(long, global = true, default_value_t = 5)]
    preview_rows: usize,

    /// Fraction of malformed values a numeric or datetime column may contain
    #[arg(long, global = true, default_value_t = 0.1)]
    null_threshold: f64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Row/column counts and a preview of a CSV file
    Inspect { file: PathBuf },

    /// Min-max normalize the numeric columns of a CSV file
    Normalize { file: PathBuf },

    /// Detect the type of each column of a CSV file
    Types { file: PathBuf },

    /// Fill or drop nulls in a CSV or JSON file
    Nulls {
        file: PathBuf,

        /// One of drop, mean, median, mode, zero, value
        #[arg(short, long)]
        strategy: String,

        /// Column(s) to process (comma-separated); all columns when omitted
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Literal for the `value` strategy, read as JSON when it parses
        #[arg(long)]
        fill_value: Option<String>,
    },

    /// Generate CREATE TABLE and INSERT statements from a CSV or JSON file
    Sql {
        file: PathBuf,

        /// Target table name
        #[arg(short, long)]
        table: String,

        /// Rows per INSERT statement
        #[arg(short, long)]
        batch_size: Option<i64>,
    },

    /// Split a SQL script into statement-aligned chunks
    Split {
        file: PathBuf,

        /// Maximum lines per chunk
        #[arg(short, long)]
        max_lines: Option<usize>,
    },

    /// Serve the operations over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = 5000)]
        port: u16,

        /// Largest accepted request body, in MiB
        #[arg(long, default_value_t = 64)]
        max_upload_mb: usize,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<TransformError>().map(TransformError::outcome) {
                Some(Outcome::ClientError) => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}

fn init_logging(verbose: bool, serving: bool) {
    let default = if verbose {
        "tabkit=debug,info"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Rows of a CSV or JSON file as JSON objects
fn read_records(path: &Path) -> Result<Vec<Value>> {
    let bytes = read_file(path)?;
    let (table, warning) = parse_rows(&bytes)?;
    if let Some(warning) = warning {
        tracing::warn!(file = %path.display(), "{}", warning);
    }
    Ok(api::records_json(&table)?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Command::Serve { .. }));

    let config = Config::new()
        .with_preview_rows(cli.preview_rows)
        .with_numeric_null_threshold(cli.null_threshold);
    let pretty = cli.pretty;

    match cli.command {
        Command::Inspect { file } => {
            let response = api::inspect(&read_file(&file)?, &config)?;
            print_json(&response, pretty)
        }
        Command::Normalize { file } => {
            let response = api::normalize_csv(&read_file(&file)?, &config)?;
            print_json(&response, pretty)
        }
        Command::Types { file } => {
            let response = api::determine_types(&read_file(&file)?, &config)?;
            print_json(&response, pretty)
        }
        Command::Nulls {
            file,
            strategy,
            columns,
            fill_value,
        } => {
            let request = HandleNullsRequest {
                csv_data: read_records(&file)?,
                strategy,
                columns: (!columns.is_empty()).then_some(columns),
                fill_value: fill_value.map(|raw| {
                    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
                }),
            };
            let response = api::process_nulls(&request, &config)?;
            print_json(&response, pretty)
        }
        Command::Sql {
            file,
            table,
            batch_size,
        } => {
            let request = CsvToSqlRequest {
                csv_data: read_records(&file)?,
                table_name: table,
                batch_size,
            };
            let response = api::csv_to_sql(&request, &config)?;
            print_json(&response, pretty)
        }
        Command::Split { file, max_lines } => {
            let sql_content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let request = SqlSplitRequest {
                sql_content,
                max_chunk_size: max_lines,
            };
            let response = api::sql_splitter(&request, &config)?;
            print_json(&response, pretty)
        }
        Command::Serve {
            host,
            port,
            max_upload_mb,
        } => {
            let config = config
                .with_host(host)
                .with_port(port)
                .with_max_upload_bytes(max_upload_mb * 1024 * 1024);
            actix_web::rt::System::new()
                .block_on(async move { start_server(config)?.await })
                .context("HTTP server failed")
        }
    }
}
