//! Chunked line reader for delimited text sources
//!
//! This module turns an arbitrary byte source into a lazy sequence of logical
//! lines without buffering the whole source. Bytes are pulled in fixed-size
//! chunks and a line is emitted as soon as its delimiter has been seen.
//!
//! ## Architecture
//!
//! - [`reader`] - The [`LineReader`] iterator: buffering, delimiter search and decoding
//!
//! ## Usage
//!
//! ```rust
//! use delimited_import::LineReader;
//!
//! let lines: Vec<String> = LineReader::new(b"one\ntwo\nthree".as_slice())
//!     .map(|line| line.map(|l| l.text))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(lines, ["one", "two", "three"]);
//! ```
//!
//! A quoted field that contains the line delimiter is not reassembled: the
//! reader has no notion of quoting, so such a field is split across two lines.

pub mod reader;

#[cfg(test)]
pub mod tests;

pub use reader::LineReader;
