//! Configuration management and validation.
//!
//! Provides the immutable [`ImportConfig`] value handed to a single import run,
//! together with the policies that decide how recoverable line problems
//! (decode failures, malformed quoting, header mismatches) are treated.

use crate::constants::{
    CARRIAGE_RETURN, DEFAULT_CHUNK_SIZE, DEFAULT_FIELD_DELIMITER, DEFAULT_LINE_DELIMITER,
    DEFAULT_PROGRESS_INTERVAL_MS, QUOTE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Text encoding used to decode logical lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8; invalid sequences are decode failures
    #[default]
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value
    Latin1,
}

impl Encoding {
    /// Decode one line's bytes into text
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, String> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| e.to_string()),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => f.write_str("UTF-8"),
            Encoding::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

/// What to do with a line whose bytes are not valid text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Skip the line and log at debug level only
    Drop,
    /// Skip the line, record a warning and continue
    #[default]
    Report,
    /// Fail the import
    Abort,
}

/// What to do with a quoted field that is never closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotePolicy {
    /// Keep the best-effort split and log at debug level only
    Tolerate,
    /// Keep the best-effort split and record a warning
    #[default]
    Warn,
    /// Fail the import
    Reject,
}

/// What to do when a data line's field count differs from the header's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Drop that record, record a warning and continue
    SkipRecord,
    /// Fail the import
    #[default]
    Abort,
}

/// Configuration for a single import run
///
/// Built up front with the `with_*` methods and never mutated once a run
/// has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Field separator; may be longer than one character
    pub field_delimiter: String,

    /// Logical line terminator, matched as a byte sequence
    pub line_delimiter: String,

    /// Encoding used to decode each line
    pub encoding: Encoding,

    /// Bytes requested from the source per read
    pub chunk_size: usize,

    /// Handling of undecodable lines
    pub decode_policy: DecodePolicy,

    /// Handling of unterminated quoted fields
    pub quote_policy: QuotePolicy,

    /// Handling of header/data field count mismatches
    pub schema_policy: SchemaPolicy,

    /// Minimum spacing between progress notifications in milliseconds
    pub progress_interval_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            line_delimiter: DEFAULT_LINE_DELIMITER.to_string(),
            encoding: Encoding::Utf8,
            chunk_size: DEFAULT_CHUNK_SIZE,
            decode_policy: DecodePolicy::default(),
            quote_policy: QuotePolicy::default(),
            schema_policy: SchemaPolicy::default(),
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl ImportConfig {
    /// Set the field delimiter
    pub fn with_field_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.field_delimiter = delimiter.into();
        self
    }

    /// Set the line delimiter
    pub fn with_line_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.line_delimiter = delimiter.into();
        self
    }

    /// Set the text encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the read chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the decode failure policy
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Set the malformed quote policy
    pub fn with_quote_policy(mut self, policy: QuotePolicy) -> Self {
        self.quote_policy = policy;
        self
    }

    /// Set the header mismatch policy
    pub fn with_schema_policy(mut self, policy: SchemaPolicy) -> Self {
        self.schema_policy = policy;
        self
    }

    /// Set the progress notification spacing
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Fail on every recoverable problem instead of continuing
    pub fn strict(self) -> Self {
        self.with_decode_policy(DecodePolicy::Abort)
            .with_quote_policy(QuotePolicy::Reject)
            .with_schema_policy(SchemaPolicy::Abort)
    }

    /// Progress notification spacing as a [`Duration`]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Check the configuration before a run starts
    pub fn validate(&self) -> Result<()> {
        if self.field_delimiter.is_empty() {
            return Err(Error::configuration("field delimiter must not be empty"));
        }
        if self.field_delimiter.contains(QUOTE) {
            return Err(Error::configuration(format!(
                "field delimiter {:?} must not contain the quote character",
                self.field_delimiter
            )));
        }
        if self.field_delimiter.contains(CARRIAGE_RETURN) {
            return Err(Error::configuration(format!(
                "field delimiter {:?} must not contain a carriage return",
                self.field_delimiter
            )));
        }
        if self.line_delimiter.is_empty() {
            return Err(Error::configuration("line delimiter must not be empty"));
        }
        if self.field_delimiter == self.line_delimiter {
            return Err(Error::configuration(
                "field and line delimiters must differ",
            ));
        }
        if self.chunk_size == 0 {
            return Err(Error::configuration("chunk size must be greater than zero"));
        }

        debug!(
            "Validated import config: field delimiter {:?}, line delimiter {:?}, {} encoding, {} byte chunks",
            self.field_delimiter, self.line_delimiter, self.encoding, self.chunk_size
        );
        Ok(())
    }
}
