//! Test utilities for the chunked line reader
//!
//! Provides byte sources that misbehave in controlled ways and a helper that
//! collects every successfully decoded line.

use std::io::{self, Read};

use crate::Result;
use crate::app::models::LogicalLine;


/// Source that yields `data` and then fails with the given error kind
pub struct FailingSource {
    data: Vec<u8>,
    pos: usize,
    kind: io::ErrorKind,
}

impl FailingSource {
    pub fn new(data: &[u8], kind: io::ErrorKind) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            kind,
        }
    }
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Err(io::Error::new(self.kind, "simulated read failure"));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Source that is interrupted before every successful read and never returns more than 2 bytes
pub struct StutteringSource {
    data: Vec<u8>,
    pos: usize,
    interrupt_next: bool,
}

impl StutteringSource {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            interrupt_next: true,
        }
    }
}

impl Read for StutteringSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt_next {
            self.interrupt_next = false;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        self.interrupt_next = true;
        let n = buf.len().min(2).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Collect line texts, panicking on any error
pub fn texts<I: Iterator<Item = Result<LogicalLine>>>(lines: I) -> Vec<String> {
    lines.map(|line| line.unwrap().text).collect()
}
