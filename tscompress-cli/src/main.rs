//! tscompress - evaluate lossless time-series compression methods

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tscompress_core::compression::CompressionConfig;
use tscompress_core::{Evaluation, Method, Options, Report, Series};

/// Measure how well a series of timestamped samples compresses.
///
/// Every result is decoded again and compared against the input before it
/// is reported.
#[derive(Parser, Debug)]
#[command(name = "tscompress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress a sample file and print the report
    Evaluate {
        /// Method name, or "all" to run every method
        #[arg(short = 'm', long, short_alias = 'a', alias = "algorithm", value_parser = parse_selection)]
        method: Selection,

        /// Sample file: a header line, then `timestamp_ms,value` rows
        #[arg(short, long)]
        path: PathBuf,

        /// Interleave time and value deltas instead of splitting them.
        ///
        /// Usually compresses worse. Does not apply to gorilla.
        #[arg(short, long)]
        interleave: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Override the codec level for gzip, zlib, zstd or brotli methods
        #[arg(long, allow_negative_numbers = true)]
        level: Option<i32>,
    },

    /// List the supported methods
    Methods,
}

/// Methods chosen on the command line
#[derive(Debug, Clone, PartialEq)]
enum Selection {
    All,
    One(Method),
}

impl Selection {
    fn methods(&self) -> Vec<Method> {
        match self {
            Selection::All => Method::ALL.to_vec(),
            Selection::One(method) => vec![*method],
        }
    }
}

fn parse_selection(s: &str) -> std::result::Result<Selection, String> {
    if s == "all" {
        return Ok(Selection::All);
    }
    s.parse().map(Selection::One).map_err(|e| e.to_string())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Options for one method, applying `level` where the method has one
fn options_for(
    method: Method,
    interleave: bool,
    level: Option<i32>,
    selection: &Selection,
) -> Result<Options> {
    let mut levels = CompressionConfig::default();
    if let Some(level) = level {
        match method.with_level(levels, level) {
            Ok(adjusted) => levels = adjusted,
            // With "all" the level only applies where it can
            Err(e) if *selection == Selection::All => {
                warn!(%method, "ignoring --level: {e}");
            }
            Err(e) => return Err(e).context("invalid --level"),
        }
    }

    Ok(Options {
        method,
        interleave,
        levels,
    })
}

fn evaluate(
    selection: Selection,
    path: PathBuf,
    interleave: bool,
    json: bool,
    level: Option<i32>,
) -> Result<bool> {
    let series = Series::from_path(&path)
        .with_context(|| format!("failed to load samples from {}", path.display()))?;
    info!(path = %path.display(), points = series.len(), "loaded samples");

    let mut reports: Vec<Report> = Vec::new();
    for method in selection.methods() {
        let options = options_for(method, interleave, level, &selection)?;
        let report = Evaluation::from_series(options, series.clone())
            .run()
            .with_context(|| format!("{method} failed"))?;
        reports.push(report);
    }

    if json {
        let summaries: Vec<_> = reports.iter().map(Report::summary).collect();
        let out = match summaries.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            all => serde_json::to_string_pretty(all)?,
        };
        println!("{out}");
    } else {
        let text: Vec<String> = reports.iter().map(Report::to_string).collect();
        println!("{}", text.join("\n\n"));
    }

    let failed: Vec<_> = reports
        .iter()
        .filter(|r| !r.is_verified())
        .map(|r| r.method.as_str())
        .collect();
    if !failed.is_empty() {
        eprintln!("verification failed for: {}", failed.join(", "));
    }
    Ok(failed.is_empty())
}

fn main() -> Result<ExitCode> {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Evaluate {
            method,
            path,
            interleave,
            json,
            level,
        } => {
            let verified = evaluate(method, path, interleave, json, level)?;
            Ok(if verified {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Methods => {
            for method in Method::ALL {
                let note = if method.uses_layout() {
                    ""
                } else {
                    " (ignores --interleave)"
                };
                println!("{method}{note}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
