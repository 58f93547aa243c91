//! Synchronous import pipeline
//!
//! Drives the line reader, hands every line to the field splitter and every
//! field sequence to the record assembler, applying the configured policies
//! to recoverable problems along the way.

use std::io::Read;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::models::{
    FieldSequence, ImportOutcome, ImportProgress, ImportStats, IssueKind, LineIssue,
};
use crate::app::services::field_splitter::{FieldSplitter, MalformedQuote};
use crate::app::services::line_reader::LineReader;
use crate::app::services::record_assembler::{Assembled, RecordAssembler, RecordMode};
use crate::config::{DecodePolicy, ImportConfig, QuotePolicy};
use crate::{Error, Result};

use super::progress::ProgressThrottle;

/// Receives notifications while an import runs
///
/// Every method defaults to doing nothing, so observers implement only what
/// they need. `()` is the no-op observer.
pub trait ImportObserver {
    /// Called once per successfully split line, header included
    fn on_fields(&mut self, _line: usize, _fields: &[String]) {}

    /// Called at most once per progress interval
    fn on_progress(&mut self, _progress: ImportProgress) {}

    /// Called for every recoverable problem that is reported as a warning
    fn on_issue(&mut self, _issue: &LineIssue) {}
}

impl ImportObserver for () {}

/// Runs one configured import over an in-memory buffer or any reader
#[derive(Debug, Clone)]
pub struct Importer {
    config: ImportConfig,
    splitter: FieldSplitter,
}

impl Importer {
    /// Create an importer from a configuration, validating it first
    pub fn new(config: ImportConfig) -> Result<Self> {
        config.validate()?;
        let splitter = FieldSplitter::from_config(&config)?;
        Ok(Self { config, splitter })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import an in-memory byte buffer
    pub fn import<R>(
        &self,
        bytes: &[u8],
        mode: RecordMode<'_, R>,
        observer: &mut dyn ImportObserver,
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome<R>> {
        self.import_reader(bytes, Some(bytes.len()), mode, observer, cancel)
    }

    /// Import from any byte source read exactly once
    ///
    /// `total_bytes` is only used to fill in progress notifications.
    pub fn import_reader<S: Read, R>(
        &self,
        source: S,
        total_bytes: Option<usize>,
        mode: RecordMode<'_, R>,
        observer: &mut dyn ImportObserver,
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome<R>> {
        info!(
            "Starting import: {} mode, field delimiter {:?}, {} bytes",
            if mode.is_header() { "header" } else { "plain" },
            self.config.field_delimiter,
            total_bytes.map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );

        let mut reader = LineReader::new(source)
            .with_delimiter(self.config.line_delimiter.as_bytes())
            .with_encoding(self.config.encoding)
            .with_chunk_size(self.config.chunk_size);
        let mut assembler = RecordAssembler::new(mode, self.config.schema_policy);
        let mut throttle = ProgressThrottle::new(self.config.progress_interval());
        let mut stats = ImportStats::new();
        let mut records = Vec::new();

        loop {
            if cancel.is_cancelled() {
                info!("Import cancelled after {} lines", stats.lines_read);
                return Err(Error::Cancelled {
                    lines_processed: stats.lines_read,
                });
            }

            let next = match reader.next() {
                Some(next) => next,
                None => break,
            };

            match next {
                Ok(line) => {
                    stats.lines_read += 1;
                    let split = self.splitter.split(&line.text);
                    if let Some(malformed) = split.malformed {
                        self.handle_malformed_quote(line.number, malformed, &mut stats, observer)?;
                    }
                    observer.on_fields(line.number, &split.fields);

                    match assembler.assemble(line.number, split.fields)? {
                        Assembled::Header => {}
                        Assembled::Record(record) => {
                            records.push(record);
                            stats.records_produced += 1;
                        }
                        Assembled::Skipped(issue) => {
                            stats.lines_skipped += 1;
                            observer.on_issue(&issue);
                            stats.warnings.push(issue);
                        }
                    }
                }
                Err(error @ Error::Decode { .. }) => {
                    stats.lines_read += 1;
                    stats.lines_skipped += 1;
                    self.handle_decode_failure(error, &mut stats, observer)?;
                }
                Err(error) => return Err(error),
            }

            // Undecodable lines count as progress too
            if throttle.ready() {
                observer.on_progress(ImportProgress {
                    lines_processed: reader.lines_emitted(),
                    bytes_consumed: reader.bytes_consumed(),
                    total_bytes,
                });
            }
        }

        let header: Option<FieldSequence> = assembler.into_header();
        info!(
            "Imported {} records from {} lines ({} skipped, {} warnings)",
            stats.records_produced,
            stats.lines_read,
            stats.lines_skipped,
            stats.warnings.len()
        );

        Ok(ImportOutcome {
            header,
            records,
            stats,
        })
    }

    fn handle_decode_failure(
        &self,
        error: Error,
        stats: &mut ImportStats,
        observer: &mut dyn ImportObserver,
    ) -> Result<()> {
        let line = error.line().unwrap_or(stats.lines_read);
        let detail = match &error {
            Error::Decode {
                encoding, message, ..
            } => format!("invalid {} text: {}", encoding, message),
            other => other.to_string(),
        };

        match self.config.decode_policy {
            DecodePolicy::Drop => {
                debug!("Dropping undecodable line: {}", error);
                Ok(())
            }
            DecodePolicy::Report => {
                warn!("Skipping undecodable line: {}", error);
                let issue = LineIssue::new(line, IssueKind::Decode, detail);
                observer.on_issue(&issue);
                stats.warnings.push(issue);
                Ok(())
            }
            DecodePolicy::Abort => Err(error),
        }
    }

    fn handle_malformed_quote(
        &self,
        line: usize,
        malformed: MalformedQuote,
        stats: &mut ImportStats,
        observer: &mut dyn ImportObserver,
    ) -> Result<()> {
        match self.config.quote_policy {
            QuotePolicy::Tolerate => {
                debug!(
                    "Line {}: quoted field {} never closes, keeping best-effort split",
                    line, malformed.field
                );
                Ok(())
            }
            QuotePolicy::Warn => {
                let issue = LineIssue::new(
                    line,
                    IssueKind::MalformedQuote,
                    format!(
                        "quoted field {} never closes; {} components left unmerged",
                        malformed.field, malformed.components
                    ),
                );
                warn!("{}", issue);
                observer.on_issue(&issue);
                stats.warnings.push(issue);
                Ok(())
            }
            QuotePolicy::Reject => Err(Error::MalformedQuote {
                line,
                field: malformed.field,
            }),
        }
    }
}
