//! Import orchestration around the parsing core
//!
//! This module wires the line reader, field splitter and record assembler
//! into one run and adds the plumbing a caller needs around it: per-line and
//! progress notifications, policy handling for recoverable line problems,
//! cancellation and an optional background worker.
//!
//! ## Architecture
//!
//! - [`importer`] - [`Importer`]: synchronous reader -> splitter -> mapper pipeline
//! - [`progress`] - [`ProgressThrottle`]: bounds notification volume
//! - [`worker`] - [`spawn_import`]: runs the pipeline on a blocking worker thread
//!
//! ## Usage
//!
//! ```rust
//! use delimited_import::{ImportConfig, RecordMode, spawn_import};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> delimited_import::Result<()> {
//! let mut handle = spawn_import(
//!     ImportConfig::default(),
//!     b"1,2\n3,4\n".to_vec(),
//!     RecordMode::fields(),
//!     (),
//!     CancellationToken::new(),
//! )?;
//! while let Some(progress) = handle.next_progress().await {
//!     println!("{} lines", progress.lines_processed);
//! }
//! let outcome = handle.outcome().await?;
//! assert_eq!(outcome.records.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod importer;
pub mod progress;
pub mod worker;

#[cfg(test)]
pub mod tests;

pub use importer::{ImportObserver, Importer};
pub use progress::ProgressThrottle;
pub use worker::{ImportHandle, spawn_import};
