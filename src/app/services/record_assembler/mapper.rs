//! Caller supplied record mappers

use std::collections::HashMap;
use std::fmt;

use crate::app::models::FieldSequence;

/// Column name to field value for one data line in header mode
pub type HeaderRecord = HashMap<String, String>;

type PlainMapper<'a, R> = Box<dyn FnMut(FieldSequence) -> R + Send + 'a>;
type HeaderMapper<'a, R> = Box<dyn FnMut(HeaderRecord) -> R + Send + 'a>;

/// How field sequences become records
pub enum RecordMode<'a, R> {
    /// Mapper receives each line's fields in order
    Plain(PlainMapper<'a, R>),
    /// First line is the header; mapper receives a column-keyed record
    Header(HeaderMapper<'a, R>),
}

impl<'a, R> RecordMode<'a, R> {
    /// Map every line's field sequence directly
    pub fn plain(mapper: impl FnMut(FieldSequence) -> R + Send + 'a) -> Self {
        RecordMode::Plain(Box::new(mapper))
    }

    /// Use the first line as header and map column-keyed records
    pub fn header(mapper: impl FnMut(HeaderRecord) -> R + Send + 'a) -> Self {
        RecordMode::Header(Box::new(mapper))
    }

    pub fn is_header(&self) -> bool {
        matches!(self, RecordMode::Header(_))
    }
}

impl RecordMode<'static, FieldSequence> {
    /// Keep each line's fields as the record
    pub fn fields() -> Self {
        Self::plain(|fields| fields)
    }
}

impl RecordMode<'static, HeaderRecord> {
    /// Keep each column-keyed record as is
    pub fn keyed() -> Self {
        Self::header(|record| record)
    }
}

impl<R> fmt::Debug for RecordMode<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordMode::Plain(_) => f.write_str("RecordMode::Plain"),
            RecordMode::Header(_) => f.write_str("RecordMode::Header"),
        }
    }
}
