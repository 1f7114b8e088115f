//! rowcast: result and timestamp inspection CLI
//!
//! # Usage
//!
//! ```bash
//! # Decode a timestamp under a session timezone
//! rowcast timestamp "2012-06-15 14:30:00" --tz Europe/Berlin
//!
//! # Materialize a JSON result fixture
//! rowcast decode result.json --format json
//!
//! # Show the column types of a fixture
//! rowcast types result.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use rowcast::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowcast")]
#[command(version)]
#[command(about = "Decode driver results and timestamps the way rowcast does", long_about = None)]
#[command(after_help = "EXAMPLES:
    rowcast timestamp '2012-06-15 14:30:00+02:00'
    rowcast date '2012-06-15 23:30:00' --tz UTC --client Asia/Tokyo
    rowcast decode orders.json --format json --tz America/New_York")]
struct Cli {
    /// Config file (default: ./rowcast.toml, then the user config dir)
    #[arg(short, long, global = true, env = "ROWCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Zones {
    /// Session timezone context, e.g. UTC, +02:00, Europe/Berlin
    #[arg(long)]
    tz: Option<String>,

    /// Client zone ("local" or any zone)
    #[arg(long)]
    client: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode timestamp text into a UTC instant
    Timestamp {
        text: String,
        #[command(flatten)]
        zones: Zones,
    },
    /// Decode timestamp text into a client-zone date
    Date {
        text: String,
        #[command(flatten)]
        zones: Zones,
    },
    /// Materialize a JSON result fixture
    Decode {
        fixture: PathBuf,
        #[command(flatten)]
        zones: Zones,
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show the column types of a JSON result fixture
    Types { fixture: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(&settings, cli.verbose);

    match cli.command {
        Commands::Timestamp { text, zones } => {
            let decoder = decoder_for(&settings, &zones);
            show_decoder(&decoder, cli.verbose);
            match decoder.decode_timestamp(&text) {
                Ok(instant) => println!("{}", Value::Timestamp(instant).to_string().green()),
                Err(warning) => println!("{} {}", "⚠".yellow(), warning),
            }
        }
        Commands::Date { text, zones } => {
            let decoder = decoder_for(&settings, &zones);
            show_decoder(&decoder, cli.verbose);
            match decoder.decode_date(&text) {
                Ok(date) => println!("{}", date.to_string().green()),
                Err(warning) => println!("{} {}", "⚠".yellow(), warning),
            }
        }
        Commands::Decode {
            fixture,
            zones,
            format,
        } => {
            let decoder = decoder_for(&settings, &zones);
            show_decoder(&decoder, cli.verbose);
            decode_fixture(&fixture, decoder, &format).await?;
        }
        Commands::Types { fixture } => {
            let cursor = load_fixture(&fixture)?;
            let types = field_types(&cursor);
            for (name, ty) in cursor.fields().iter().zip(types) {
                println!("{:20} {}", name.white().bold(), ty.cyan());
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured filter; `--verbose` forces debug.
fn init_tracing(settings: &Settings, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rowcast=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn decoder_for(settings: &Settings, zones: &Zones) -> TemporalDecoder {
    let mut settings = settings.clone();
    if let Some(tz) = &zones.tz {
        settings = settings.with_server(tz.as_str());
    }
    if let Some(client) = &zones.client {
        settings = settings.with_client(client.as_str());
    }
    settings.decoder()
}

fn show_decoder(decoder: &TemporalDecoder, verbose: bool) {
    if !verbose {
        return;
    }
    let server = decoder
        .server()
        .map(|z| z.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!("{} {}", "Client zone:".dimmed(), decoder.client().to_string().yellow());
    println!("{} {}", "Session zone:".dimmed(), server.yellow());
}

fn load_fixture(path: &Path) -> Result<MemoryCursor> {
    MemoryCursor::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

async fn decode_fixture(path: &Path, decoder: TemporalDecoder, format: &OutputFormat) -> Result<()> {
    let cursor = load_fixture(path)?;
    let mut adapter = Adapter::new(MemoryHandle::new().with_result(cursor)).with_decoder(decoder);

    adapter.execute(path.display().to_string(), vec![]).await?;
    let mut results = adapter.results()?;
    let records = results.load::<Record>()?;
    format_output(&records, format);

    if let Some(id) = results.insert_id() {
        println!("{} {}", "Last insert id:".dimmed(), id.to_string().cyan());
    }
    drop(results);

    adapter.close()?;
    Ok(())
}

fn format_output(records: &[Record], format: &OutputFormat) {
    if records.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records).unwrap_or_default());
        }
        OutputFormat::Table => {
            let columns = records[0].columns().names();

            // Column widths
            let mut widths: Vec<usize> = columns.iter().map(String::len).collect();
            for record in records {
                for (width, value) in widths.iter_mut().zip(record.values()) {
                    *width = (*width).max(value.to_string().len());
                }
            }

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = *w))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for record in records {
                let cells: Vec<String> = record
                    .values()
                    .iter()
                    .zip(&widths)
                    .map(|(v, w)| {
                        let cell = format!("{:width$}", v.to_string(), width = *w);
                        if v.is_null() { cell.dimmed().to_string() } else { cell }
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", records.len().to_string().cyan());
        }
    }
}
