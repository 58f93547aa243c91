//! Header tracking and field-count enforcement

use tracing::{debug, warn};

use super::mapper::{HeaderRecord, RecordMode};
use crate::app::models::{FieldSequence, IssueKind, LineIssue};
use crate::config::SchemaPolicy;
use crate::{Error, Result};

/// What one line turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled<R> {
    /// The line was consumed as the header
    Header,
    /// The line produced a record
    Record(R),
    /// The line was dropped under [`SchemaPolicy::SkipRecord`]
    Skipped(LineIssue),
}

/// Turns field sequences into records according to a [`RecordMode`]
#[derive(Debug)]
pub struct RecordAssembler<'a, R> {
    mode: RecordMode<'a, R>,
    header: Option<FieldSequence>,
    schema_policy: SchemaPolicy,
}

impl<'a, R> RecordAssembler<'a, R> {
    pub fn new(mode: RecordMode<'a, R>, schema_policy: SchemaPolicy) -> Self {
        Self {
            mode,
            header: None,
            schema_policy,
        }
    }

    /// Header fields once the first line has been seen in header mode
    pub fn header(&self) -> Option<&FieldSequence> {
        self.header.as_ref()
    }

    pub fn into_header(self) -> Option<FieldSequence> {
        self.header
    }

    /// Assemble the fields of line `line`
    pub fn assemble(&mut self, line: usize, fields: FieldSequence) -> Result<Assembled<R>> {
        let mapper = match &mut self.mode {
            RecordMode::Plain(mapper) => return Ok(Assembled::Record(mapper(fields))),
            RecordMode::Header(mapper) => mapper,
        };

        let Some(header) = &self.header else {
            if line > 1 {
                warn!(
                    "Header taken from line {} because earlier lines were dropped",
                    line
                );
            }
            debug!("Line {} is the header with {} columns", line, fields.len());
            self.header = Some(fields);
            return Ok(Assembled::Header);
        };

        if fields.len() != header.len() {
            return match self.schema_policy {
                SchemaPolicy::Abort => Err(Error::schema_mismatch(line, header.len(), fields.len())),
                SchemaPolicy::SkipRecord => {
                    let issue = LineIssue::new(
                        line,
                        IssueKind::SchemaMismatch,
                        format!(
                            "expected {} fields from header, found {}",
                            header.len(),
                            fields.len()
                        ),
                    );
                    warn!("Skipping record: {}", issue);
                    Ok(Assembled::Skipped(issue))
                }
            };
        }

        let record: HeaderRecord = header.iter().cloned().zip(fields).collect();
        Ok(Assembled::Record(mapper(record)))
    }
}
