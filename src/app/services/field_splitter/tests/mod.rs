//! Test utilities for the quote-aware field splitter

use crate::app::services::field_splitter::FieldSplitter;


/// Split with a comma splitter
pub fn comma(line: &str) -> Vec<String> {
    FieldSplitter::default().split_fields(line)
}

/// Split with a splitter for `delimiter`
pub fn with(delimiter: &str, line: &str) -> Vec<String> {
    FieldSplitter::new(delimiter).unwrap().split_fields(line)
}
