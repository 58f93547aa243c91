//! Import command implementation
//!
//! Reads the input file, runs the import on a worker thread while driving
//! the progress bar, then writes the records to stdout and a summary to
//! stderr.

use crate::app::models::{FieldSequence, ImportOutcome, ImportStats};
use crate::app::services::importer::{ImportHandle, spawn_import};
use crate::app::services::record_assembler::RecordMode;
use crate::cli::args::{Args, OutputFormat};
use crate::cli::progress::ProgressReporter;
use crate::constants::MAX_REPORTED_WARNINGS;
use anyhow::Context;
use colored::*;
use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What one command run did, for the caller's exit handling
#[derive(Debug, Clone)]
pub struct CommandSummary {
    pub stats: ImportStats,
    pub bytes_read: usize,
    pub elapsed: Duration,
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> crate::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("delimited_import={}", log_level)));

    let initialised = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    // A subscriber may already be installed when run is called more than once
    if initialised.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
    Ok(())
}

/// Run the import command
pub async fn run(
    args: Args,
    cancellation_token: CancellationToken,
) -> anyhow::Result<CommandSummary> {
    setup_logging(&args)?;
    let start = Instant::now();

    let config = args.to_config()?;
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;
    let bytes_read = bytes.len();
    info!("Read {} bytes from {}", bytes_read, args.input.display());

    let reporter = ProgressReporter::new(args.show_progress(), bytes_read);

    let stdout = io::stdout();
    let stats = if args.header {
        let handle = spawn_import(config, bytes, RecordMode::keyed(), (), cancellation_token)?;
        let outcome = drive(handle, &reporter).await?;
        let header = outcome.header.clone().unwrap_or_default();
        let rows = outcome.records.iter().map(|record| {
            header
                .iter()
                .map(|name| record.get(name).cloned().unwrap_or_default())
                .collect::<FieldSequence>()
        });
        emit(&mut BufWriter::new(stdout.lock()), args.format, Some(header.as_slice()), rows)?;
        outcome.stats
    } else {
        let handle = spawn_import(config, bytes, RecordMode::fields(), (), cancellation_token)?;
        let outcome = drive(handle, &reporter).await?;
        emit(
            &mut BufWriter::new(stdout.lock()),
            args.format,
            None,
            outcome.records.into_iter(),
        )?;
        outcome.stats
    };

    let summary = CommandSummary {
        stats,
        bytes_read,
        elapsed: start.elapsed(),
    };
    if !args.quiet {
        print_summary(&summary);
    }
    Ok(summary)
}

/// Forward worker progress to the bar until the run finishes
async fn drive<R>(
    mut handle: ImportHandle<R>,
    reporter: &ProgressReporter,
) -> crate::Result<ImportOutcome<R>> {
    while let Some(progress) = handle.next_progress().await {
        reporter.update(&progress);
    }

    let result = handle.outcome().await;
    match &result {
        Ok(outcome) => reporter.finish(outcome.records.len()),
        Err(e) => reporter.finish_with_error(&e.to_string()),
    }
    result
}

/// Write records, treating a closed pipe as the reader having seen enough
fn emit<W: Write>(
    out: &mut W,
    format: OutputFormat,
    header: Option<&[String]>,
    rows: impl Iterator<Item = FieldSequence>,
) -> anyhow::Result<()> {
    match write_records(out, format, header, rows).and_then(|_| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed early: {}", e);
            Ok(())
        }
        other => other.context("Failed to write records to stdout"),
    }
}

/// Write records in the requested format
///
/// JSON output is one value per line: an array of fields, or an object keyed
/// by the header in header order. Table output is tab-separated, header first.
pub fn write_records<W: Write>(
    out: &mut W,
    format: OutputFormat,
    header: Option<&[String]>,
    rows: impl Iterator<Item = FieldSequence>,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            for row in rows {
                match header {
                    Some(names) => {
                        let mut object = serde_json::Map::with_capacity(names.len());
                        for (name, value) in names.iter().zip(row) {
                            object.insert(name.clone(), serde_json::Value::String(value));
                        }
                        serde_json::to_writer(&mut *out, &object)?;
                    }
                    None => serde_json::to_writer(&mut *out, &row)?,
                }
                writeln!(out)?;
            }
        }
        OutputFormat::Table => {
            if let Some(names) = header {
                writeln!(out, "{}", table_row(names))?;
            }
            for row in rows {
                writeln!(out, "{}", table_row(&row))?;
            }
        }
    }
    Ok(())
}

fn table_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| f.replace('\t', "\\t"))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Print a colored run summary to stderr
fn print_summary(summary: &CommandSummary) {
    let stats = &summary.stats;

    eprintln!("\n{}", "Import Summary".bright_green().bold());
    eprintln!(
        "  Records: {}",
        stats.records_produced.to_string().bright_white().bold()
    );
    eprintln!("  Lines read: {}", stats.lines_read);
    if stats.lines_skipped > 0 {
        eprintln!(
            "  Lines skipped: {}",
            stats.lines_skipped.to_string().yellow().bold()
        );
    }
    eprintln!("  Bytes: {}", summary.bytes_read);
    eprintln!("  Time: {:.2?}", summary.elapsed);

    if !stats.warnings.is_empty() {
        eprintln!(
            "\n{} {}",
            "Warnings:".yellow().bold(),
            stats.warnings.len()
        );
        for warning in stats.warnings.iter().take(MAX_REPORTED_WARNINGS) {
            eprintln!("  {} {}", "!".yellow(), warning);
        }
        if stats.warnings.len() > MAX_REPORTED_WARNINGS {
            eprintln!(
                "  ... and {} more",
                stats.warnings.len() - MAX_REPORTED_WARNINGS
            );
        }
    }
}
