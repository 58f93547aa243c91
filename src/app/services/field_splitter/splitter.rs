//! Core field splitter implementation
//!
//! Normalises line endings, cuts the line on the field delimiter and merges
//! components that belong to one quoted field back together with the
//! delimiter reinserted.

use std::borrow::Cow;
use tracing::debug;

use super::quote_state::{QuoteState, push_unquoted};
use crate::app::models::FieldSequence;
use crate::config::ImportConfig;
use crate::constants::{CARRIAGE_RETURN, DEFAULT_FIELD_DELIMITER, QUOTE};
use crate::{Error, Result};

/// A quoted field that was opened but never closed before the line ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedQuote {
    /// 1-based index of the field whose opening quote is unmatched
    pub field: usize,

    /// Raw components left unmerged because of it
    pub components: usize,
}

/// Fields of one line plus any quoting problem found while splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub fields: FieldSequence,
    pub malformed: Option<MalformedQuote>,
}

impl SplitOutcome {
    /// True when every quoted field was closed
    pub fn is_clean(&self) -> bool {
        self.malformed.is_none()
    }
}

/// Splits logical lines into fields on a configured delimiter
///
/// Splitting holds no state between lines, so the same splitter can be
/// reused for every line and gives identical results for identical input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSplitter {
    delimiter: String,
}

impl Default for FieldSplitter {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
        }
    }
}

impl FieldSplitter {
    /// Create a splitter for a non-empty delimiter that does not contain a quote
    pub fn new(delimiter: impl Into<String>) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(Error::configuration("field delimiter must not be empty"));
        }
        if delimiter.contains(QUOTE) {
            return Err(Error::configuration(format!(
                "field delimiter {:?} must not contain the quote character",
                delimiter
            )));
        }
        if delimiter.contains(CARRIAGE_RETURN) {
            return Err(Error::configuration(format!(
                "field delimiter {:?} must not contain a carriage return",
                delimiter
            )));
        }
        Ok(Self { delimiter })
    }

    /// Create a splitter from a configuration's field delimiter
    pub fn from_config(config: &ImportConfig) -> Result<Self> {
        Self::new(config.field_delimiter.clone())
    }

    /// The field delimiter
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Split one line into fields, reporting an unterminated quoted field
    ///
    /// When a quoted field never closes, its components are returned unmerged
    /// with quote characters stripped.
    pub fn split(&self, line: &str) -> SplitOutcome {
        let line = normalize_line_endings(line);

        let mut fields = Vec::new();
        let mut current = String::new();
        // Raw components of the field being assembled, kept for the unmerged fallback
        let mut pending: Vec<&str> = Vec::new();
        let mut state = QuoteState::Outside;

        for component in line.split(self.delimiter.as_str()) {
            if state.is_open() {
                current.push_str(&self.delimiter);
                state = state.advance(component, &mut current);
            } else {
                pending.clear();
                state = QuoteState::open(component, &mut current);
            }
            pending.push(component);

            if !state.is_open() {
                fields.push(std::mem::take(&mut current));
                state = QuoteState::Outside;
            }
        }

        let malformed = if state.is_open() {
            let malformed = MalformedQuote {
                field: fields.len() + 1,
                components: pending.len(),
            };
            debug!(
                "Quoted field {} never closes, leaving {} components unmerged",
                malformed.field, malformed.components
            );
            for (i, &raw) in pending.iter().enumerate() {
                let raw = if i == 0 {
                    raw.strip_prefix(QUOTE).unwrap_or(raw)
                } else {
                    raw
                };
                let mut field = String::with_capacity(raw.len());
                push_unquoted(raw, &mut field);
                fields.push(field);
            }
            Some(malformed)
        } else {
            None
        };

        SplitOutcome { fields, malformed }
    }

    /// Split one line into fields, discarding any quoting report
    pub fn split_fields(&self, line: &str) -> FieldSequence {
        self.split(line).fields
    }
}

/// Turn `"\r\n"` into `"\n"` and drop a trailing `'\r'` left by a CRLF terminator
fn normalize_line_endings(line: &str) -> Cow<'_, str> {
    if !line.contains(CARRIAGE_RETURN) {
        return Cow::Borrowed(line);
    }
    let mut normalized = line.replace("\r\n", "\n");
    if normalized.ends_with(CARRIAGE_RETURN) {
        normalized.pop();
    }
    Cow::Owned(normalized)
}
