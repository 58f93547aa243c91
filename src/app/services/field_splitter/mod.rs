//! Quote-aware field splitter for logical lines
//!
//! This module turns one logical line into its ordered field values. Fields
//! wrapped in double quotes may contain the field delimiter and doubled
//! (escaped) quote characters; both survive as literal text in the result.
//!
//! ## Architecture
//!
//! - [`quote_state`] - The per-component quote state machine
//! - [`splitter`] - Line normalisation, component splitting and merging
//!
//! ## Usage
//!
//! ```rust
//! use delimited_import::FieldSplitter;
//!
//! let splitter = FieldSplitter::new(";").unwrap();
//! let fields = splitter.split_fields(r#"1;"Text, with ""comma""; and 'semicolon'.""#);
//! assert_eq!(fields, ["1", r#"Text, with "comma"; and 'semicolon'."#]);
//! ```

pub mod quote_state;
pub mod splitter;

#[cfg(test)]
pub mod tests;

pub use quote_state::QuoteState;
pub use splitter::{FieldSplitter, MalformedQuote, SplitOutcome};
