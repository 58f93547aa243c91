//! Background import worker
//!
//! Runs the synchronous pipeline on tokio's blocking pool so the caller's
//! async context stays responsive, forwarding throttled progress over a
//! bounded channel. The outcome is delivered exactly once through
//! [`ImportHandle::outcome`].

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::importer::{ImportObserver, Importer};
use crate::app::models::{ImportOutcome, ImportProgress, LineIssue};
use crate::app::services::record_assembler::RecordMode;
use crate::config::ImportConfig;
use crate::constants::PROGRESS_CHANNEL_CAPACITY;
use crate::{Error, Result};

/// Handle to an import running on a worker thread
#[derive(Debug)]
pub struct ImportHandle<R> {
    progress: mpsc::Receiver<ImportProgress>,
    task: JoinHandle<Result<ImportOutcome<R>>>,
    cancel: CancellationToken,
}

impl<R> ImportHandle<R> {
    /// Next progress notification; `None` once the worker has finished
    pub async fn next_progress(&mut self) -> Option<ImportProgress> {
        self.progress.recv().await
    }

    /// Ask the worker to stop at the next line boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the run to finish
    pub async fn outcome(self) -> Result<ImportOutcome<R>> {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) => {
                error!("Import worker did not complete: {}", join_error);
                Err(Error::worker(join_error.to_string()))
            }
        }
    }
}

/// Forwards progress to the handle and everything to the caller's observer
struct Forwarding<O> {
    inner: O,
    sender: mpsc::Sender<ImportProgress>,
}

impl<O: ImportObserver> ImportObserver for Forwarding<O> {
    fn on_fields(&mut self, line: usize, fields: &[String]) {
        self.inner.on_fields(line, fields);
    }

    fn on_progress(&mut self, progress: ImportProgress) {
        self.inner.on_progress(progress);
        if let Err(e) = self.sender.try_send(progress) {
            debug!("Progress notification not delivered: {}", e);
        }
    }

    fn on_issue(&mut self, issue: &LineIssue) {
        self.inner.on_issue(issue);
    }
}

/// Start importing `bytes` on tokio's blocking pool
///
/// Must be called from within a tokio runtime. The configuration is validated
/// before anything is spawned.
pub fn spawn_import<R, O>(
    config: ImportConfig,
    bytes: Vec<u8>,
    mode: RecordMode<'static, R>,
    observer: O,
    cancel: CancellationToken,
) -> Result<ImportHandle<R>>
where
    R: Send + 'static,
    O: ImportObserver + Send + 'static,
{
    let importer = Importer::new(config)?;
    let (sender, progress) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
    let token = cancel.clone();

    debug!("Spawning import worker for {} bytes", bytes.len());
    let task = tokio::task::spawn_blocking(move || {
        let mut forwarding = Forwarding {
            inner: observer,
            sender,
        };
        importer.import(&bytes, mode, &mut forwarding, &token)
    });

    Ok(ImportHandle {
        progress,
        task,
        cancel,
    })
}
