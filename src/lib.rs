//! Delimited Import Library
//!
//! A Rust library for importing delimited text (CSV-like) data from an
//! in-memory byte buffer into caller-defined record structures without
//! materialising the whole input as a single string.
//!
//! This library provides tools for:
//! - Reading an arbitrary byte source in fixed-size chunks and emitting logical lines
//! - Splitting each line into fields with quote-aware delimiter handling
//! - Assembling field sequences into records, optionally keyed by a header line
//! - Running the pipeline on a worker thread with throttled progress and cancellation
//!
//! ## Usage
//!
//! ```rust
//! use delimited_import::{ImportConfig, Importer, RecordMode};
//! use tokio_util::sync::CancellationToken;
//!
//! # fn example() -> delimited_import::Result<()> {
//! let importer = Importer::new(ImportConfig::default())?;
//! let outcome = importer.import(
//!     b"a,b\n1,2\n".as_slice(),
//!     RecordMode::header(|row| row["a"].clone()),
//!     &mut (),
//!     &CancellationToken::new(),
//! )?;
//! assert_eq!(outcome.records, vec!["1".to_string()]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;

// Core parsing and orchestration modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod field_splitter;
        pub mod importer;
        pub mod line_reader;
        pub mod record_assembler;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod progress;
}

// Re-export commonly used types
pub use app::models::{
    FieldSequence, ImportOutcome, ImportProgress, ImportStats, IssueKind, LineIssue, LogicalLine,
};
pub use app::services::field_splitter::{FieldSplitter, MalformedQuote, SplitOutcome};
pub use app::services::importer::{ImportHandle, ImportObserver, Importer, spawn_import};
pub use app::services::line_reader::LineReader;
pub use app::services::record_assembler::{HeaderRecord, RecordMode};
pub use config::{DecodePolicy, Encoding, ImportConfig, QuotePolicy, SchemaPolicy};

/// Result type alias for the importer
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for delimited import operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid import configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The byte source failed before end-of-input
    #[error("Source read failed after {bytes_consumed} bytes")]
    SourceRead {
        bytes_consumed: usize,
        #[source]
        source: std::io::Error,
    },

    /// A logical line could not be decoded with the configured encoding
    #[error("Line {line}: invalid {encoding} text: {message}")]
    Decode {
        line: usize,
        encoding: Encoding,
        message: String,
    },

    /// A quoted field was opened but never closed before the line ended
    #[error("Line {line}: quoted field {field} is never closed")]
    MalformedQuote { line: usize, field: usize },

    /// Header mode: a data line's field count differs from the header's
    #[error("Line {line}: expected {expected} fields from header, found {found}")]
    SchemaMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Import stopped by the caller's cancellation token
    #[error("Import cancelled after {lines_processed} lines")]
    Cancelled { lines_processed: usize },

    /// The background worker did not complete
    #[error("Import worker failed: {message}")]
    Worker { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a source read error
    pub fn source_read(bytes_consumed: usize, source: std::io::Error) -> Self {
        Self::SourceRead {
            bytes_consumed,
            source,
        }
    }

    /// Create a decode error for one line
    pub fn decode(line: usize, encoding: Encoding, message: impl Into<String>) -> Self {
        Self::Decode {
            line,
            encoding,
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(line: usize, expected: usize, found: usize) -> Self {
        Self::SchemaMismatch {
            line,
            expected,
            found,
        }
    }

    /// Create a worker failure error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Decode { line, .. }
            | Self::MalformedQuote { line, .. }
            | Self::SchemaMismatch { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether processing may continue with the next line after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::MalformedQuote { .. } | Self::SchemaMismatch { .. }
        )
    }
}
