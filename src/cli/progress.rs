//! Progress bar for the import command
//!
//! Renders [`ImportProgress`] notifications as an indicatif bar measured in
//! bytes. A disabled reporter accepts every call and draws nothing.

use crate::app::models::ImportProgress;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Progress reporter driven by the worker's progress channel
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a reporter for an input of `total_bytes`
    pub fn new(enabled: bool, total_bytes: usize) -> Self {
        if !enabled {
            return Self { progress_bar: None };
        }

        let pb = ProgressBar::new(total_bytes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message("Importing");

        debug!("Progress bar initialized for {} bytes", total_bytes);
        Self {
            progress_bar: Some(pb),
        }
    }

    /// Create a reporter that draws nothing
    pub fn disabled() -> Self {
        Self { progress_bar: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.progress_bar.is_some()
    }

    /// Move the bar to the position described by `progress`
    pub fn update(&self, progress: &ImportProgress) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(progress.bytes_consumed as u64);
            pb.set_message(format!("{} lines", progress.lines_processed));
        }
    }

    /// Finish with a completion message
    pub fn finish(&self, records: usize) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!("Completed: {} records", records));
        }
    }

    /// Abandon the bar, leaving the failure message visible
    pub fn finish_with_error(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.abandon_with_message(format!("Failed: {}", message));
        }
    }
}
