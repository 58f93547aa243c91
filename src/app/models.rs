//! Core data structures shared by the reader, splitter and importer
//!
//! Defines logical lines, field sequences, recoverable line issues,
//! progress snapshots and the final import outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered field values parsed from one logical line
pub type FieldSequence = Vec<String>;

/// One delimiter-terminated (or final unterminated) slice of the input, decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based position of the line in the source
    pub number: usize,

    /// Decoded text, without the line delimiter
    pub text: String,
}

impl LogicalLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Category of a recoverable per-line problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Line bytes were not valid text
    Decode,
    /// A quoted field was opened and never closed
    MalformedQuote,
    /// Field count differs from the header's
    SchemaMismatch,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IssueKind::Decode => "decode",
            IssueKind::MalformedQuote => "malformed quote",
            IssueKind::SchemaMismatch => "schema mismatch",
        };
        f.write_str(label)
    }
}

/// A recoverable problem recorded against one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIssue {
    /// 1-based line number
    pub line: usize,

    /// Problem category
    pub kind: IssueKind,

    /// Human readable detail
    pub message: String,
}

impl LineIssue {
    pub fn new(line: usize, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.message, self.kind)
    }
}

/// Snapshot delivered with each progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    /// Logical lines read so far, header included
    pub lines_processed: usize,

    /// Bytes pulled from the source so far
    pub bytes_consumed: usize,

    /// Size of the source when known up front
    pub total_bytes: Option<usize>,
}

impl ImportProgress {
    /// Fraction of the source consumed, when the total is known
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_consumed as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Import statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Logical lines produced by the reader, dropped lines included
    pub lines_read: usize,

    /// Records handed back to the caller
    pub records_produced: usize,

    /// Lines that did not become records (header excluded)
    pub lines_skipped: usize,

    /// Recoverable problems reported during the run
    pub warnings: Vec<LineIssue>,
}

impl ImportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of warnings of one kind
    pub fn count(&self, kind: IssueKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    /// True when no warnings were recorded
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportOutcome<R> {
    /// Header fields in header mode
    pub header: Option<FieldSequence>,

    /// Mapped records in input order
    pub records: Vec<R>,

    /// Run statistics
    pub stats: ImportStats,
}
