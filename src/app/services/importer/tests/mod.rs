//! Test utilities for import orchestration
//!
//! Provides a recording observer and helpers that build delimited sources.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::app::models::{ImportProgress, LineIssue};
use crate::app::services::importer::ImportObserver;

mod importer_tests;

/// Observer that keeps everything it is told
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub lines: Vec<(usize, Vec<String>)>,
    pub progress: Vec<(Instant, ImportProgress)>,
    pub issues: Vec<LineIssue>,
    /// Cancel this token once the given line has been split
    pub cancel_after: Option<(usize, CancellationToken)>,
}

impl ImportObserver for RecordingObserver {
    fn on_fields(&mut self, line: usize, fields: &[String]) {
        self.lines.push((line, fields.to_vec()));
        if let Some((after, token)) = &self.cancel_after {
            if line >= *after {
                token.cancel();
            }
        }
    }

    fn on_progress(&mut self, progress: ImportProgress) {
        self.progress.push((Instant::now(), progress));
    }

    fn on_issue(&mut self, issue: &LineIssue) {
        self.issues.push(issue.clone());
    }
}

/// `rows` lines of three numbered fields, newline terminated
pub fn numbered_rows(rows: usize) -> String {
    (0..rows)
        .map(|i| format!("{},{},{}\n", i * 3, i * 3 + 1, i * 3 + 2))
        .collect()
}

/// In-memory log sink for asserting on emitted tracing events
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Run `f` with a subscriber that writes every event into this sink
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut bytes) = self.0.lock() {
            bytes.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
