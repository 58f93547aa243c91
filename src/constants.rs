//! Application constants for the delimited importer
//!
//! This module contains default values and fixed characters used throughout
//! the reader, splitter and orchestration layers.

use std::time::Duration;

// =============================================================================
// Line Reader Defaults
// =============================================================================

/// Number of bytes requested from the source per read
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default logical line terminator
pub const DEFAULT_LINE_DELIMITER: &str = "\n";

// =============================================================================
// Field Splitter Defaults
// =============================================================================

/// Default field separator
pub const DEFAULT_FIELD_DELIMITER: &str = ",";

/// Character that opens and closes a quoted field
pub const QUOTE: char = '"';

/// Carriage return left behind by CRLF line endings
pub const CARRIAGE_RETURN: char = '\r';

// =============================================================================
// Orchestration Defaults
// =============================================================================

/// Minimum spacing between two progress notifications, in milliseconds
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;

/// Minimum spacing between two progress notifications
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS);

/// Capacity of the progress channel used by the background worker
pub const PROGRESS_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// CLI Defaults
// =============================================================================

/// Log level when neither `--verbose` nor `--quiet` is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Warnings listed individually in the CLI summary
pub const MAX_REPORTED_WARNINGS: usize = 10;

/// Process exit code after Ctrl+C
pub const EXIT_CODE_CANCELLED: i32 = 130;
