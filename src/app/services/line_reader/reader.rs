//! Core chunked line reader implementation
//!
//! Holds the read buffer, searches it for the line delimiter and refills it
//! from the source one chunk at a time.

use std::io::{ErrorKind, Read};
use tracing::{debug, warn};

use crate::app::models::LogicalLine;
use crate::config::{Encoding, ImportConfig};
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_LINE_DELIMITER};
use crate::{Error, Result};

/// Lazy, finite, non-restartable sequence of logical lines read from a byte source
///
/// Each item is either a decoded [`LogicalLine`] or an error:
/// - [`Error::Decode`] affects one line only; the next call continues with the following line
/// - [`Error::SourceRead`] is final; the iterator returns `None` afterwards
///
/// A delimiter at the very end of the source does not produce a trailing empty line.
#[derive(Debug)]
pub struct LineReader<R> {
    source: R,
    delimiter: Vec<u8>,
    encoding: Encoding,
    chunk_size: usize,

    /// Bytes read but not yet emitted start at `start`
    buffer: Vec<u8>,
    start: usize,
    /// Everything in `start..search_from` is known not to begin a delimiter
    search_from: usize,

    source_exhausted: bool,
    finished: bool,
    bytes_consumed: usize,
    lines_emitted: usize,
}

impl<R: Read> LineReader<R> {
    /// Create a reader with the default `"\n"` delimiter, UTF-8 and 4096 byte chunks
    pub fn new(source: R) -> Self {
        Self {
            source,
            delimiter: DEFAULT_LINE_DELIMITER.as_bytes().to_vec(),
            encoding: Encoding::Utf8,
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer: Vec::new(),
            start: 0,
            search_from: 0,
            source_exhausted: false,
            finished: false,
            bytes_consumed: 0,
            lines_emitted: 0,
        }
    }

    /// Create a reader using the line settings of a validated configuration
    pub fn from_config(source: R, config: &ImportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(source)
            .with_delimiter(config.line_delimiter.as_bytes())
            .with_encoding(config.encoding)
            .with_chunk_size(config.chunk_size))
    }

    /// Set the line delimiter; an empty delimiter is ignored
    pub fn with_delimiter(mut self, delimiter: impl AsRef<[u8]>) -> Self {
        let delimiter = delimiter.as_ref();
        if delimiter.is_empty() {
            warn!("Ignoring empty line delimiter, keeping {:?}", self.delimiter);
        } else {
            self.delimiter = delimiter.to_vec();
        }
        self
    }

    /// Set the encoding used to decode lines
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the number of bytes requested per read; zero is ignored
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        if chunk_size > 0 {
            self.chunk_size = chunk_size;
        }
        self
    }

    /// Bytes pulled from the source so far
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Lines produced so far, undecodable ones included
    pub fn lines_emitted(&self) -> usize {
        self.lines_emitted
    }

    /// Find the next delimiter at or after `search_from`
    fn find_delimiter(&mut self) -> Option<usize> {
        let haystack = &self.buffer[self.search_from..];
        let found = match self.delimiter.as_slice() {
            [byte] => haystack.iter().position(|b| b == byte),
            delimiter => haystack
                .windows(delimiter.len())
                .position(|window| window == delimiter),
        };

        match found {
            Some(offset) => Some(self.search_from + offset),
            None => {
                // A delimiter may straddle the end of the buffer
                let tail = self.delimiter.len() - 1;
                self.search_from = self.buffer.len().saturating_sub(tail).max(self.start);
                None
            }
        }
    }

    /// Drop emitted bytes and append one chunk from the source
    fn fill(&mut self) -> std::io::Result<()> {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.search_from -= self.start;
            self.start = 0;
        }

        let filled = self.buffer.len();
        self.buffer.resize(filled + self.chunk_size, 0);
        loop {
            match self.source.read(&mut self.buffer[filled..]) {
                Ok(read) => {
                    self.buffer.truncate(filled + read);
                    self.bytes_consumed += read;
                    if read == 0 {
                        self.source_exhausted = true;
                        debug!("Source exhausted after {} bytes", self.bytes_consumed);
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buffer.truncate(filled);
                    return Err(e);
                }
            }
        }
    }

    /// Decode `buffer[from..to]` as the next line
    fn emit(&mut self, from: usize, to: usize) -> Result<LogicalLine> {
        self.lines_emitted += 1;
        let number = self.lines_emitted;
        self.encoding
            .decode(&self.buffer[from..to])
            .map(|text| LogicalLine::new(number, text))
            .map_err(|message| Error::decode(number, self.encoding, message))
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(end) = self.find_delimiter() {
                let from = self.start;
                self.start = end + self.delimiter.len();
                self.search_from = self.start;
                return Some(self.emit(from, end));
            }

            if self.source_exhausted {
                self.finished = true;
                if self.start < self.buffer.len() {
                    let (from, to) = (self.start, self.buffer.len());
                    self.start = to;
                    return Some(self.emit(from, to));
                }
                return None;
            }

            if let Err(e) = self.fill() {
                self.finished = true;
                warn!("Source read failed after {} bytes: {}", self.bytes_consumed, e);
                return Some(Err(Error::source_read(self.bytes_consumed, e)));
            }
        }
    }
}
