//! Record assembly from field sequences
//!
//! This module is the boundary between the parsing core and caller-defined
//! record types. A [`RecordMode`] carries the caller's mapper; the
//! [`RecordAssembler`] feeds it one field sequence per line.
//!
//! ## Modes
//!
//! - [`RecordMode::plain`] - every line's fields go straight to the mapper
//! - [`RecordMode::header`] - the first line names the columns; every later line
//!   is zipped with it into a [`HeaderRecord`]. A line whose field count differs
//!   from the header's is handled by the configured [`SchemaPolicy`](crate::SchemaPolicy).

pub mod assembler;
pub mod mapper;

pub use assembler::{Assembled, RecordAssembler};
pub use mapper::{HeaderRecord, RecordMode};
