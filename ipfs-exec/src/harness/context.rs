//! Per-invocation context handed to a handler, and the completion channel behind it.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::{Backend, Cleanup};
use crate::error::{BackendError, CommandError};
use crate::sink::OutputSink;

/// Message on an invocation's completion channel. Only the first one counts.
#[derive(Debug)]
pub(crate) enum Signal {
    /// The handler finished successfully.
    Done,
    /// The handler finished with an error.
    Failed(CommandError),
    /// A long-running handler is serving (explicit notification or the ready line).
    Ready,
    /// The handler returned an error without signalling.
    Fault(CommandError),
}

/// Completion handle for one invocation. Cloning shares the channel.
#[derive(Clone, Debug)]
pub struct Completion {
    tx: mpsc::UnboundedSender<Signal>,
}

impl Completion {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { tx }
    }

    /// Reports the handler's outcome.
    pub fn done(&self, result: Result<(), CommandError>) {
        let signal = match result {
            Ok(()) => Signal::Done,
            Err(e) => Signal::Failed(e),
        };
        let _ = self.tx.send(signal);
    }

    /// Reports that a long-running command is up. Completes the invocation
    /// like `done(Ok(()))` while the handler keeps running.
    pub fn ready(&self) {
        let _ = self.tx.send(Signal::Ready);
    }
}

/// Everything a handler gets for one run: the backend node, a completion
/// handle, and the output sink.
///
/// Owned by exactly one in-flight invocation.
#[derive(Clone)]
pub struct ExecutionContext {
    node: Arc<dyn Backend>,
    completion: Completion,
    sink: OutputSink,
}

impl ExecutionContext {
    pub fn new(node: Arc<dyn Backend>, completion: Completion, sink: OutputSink) -> Self {
        Self {
            node,
            completion,
            sink,
        }
    }

    pub fn node(&self) -> &Arc<dyn Backend> {
        &self.node
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    /// Writes one line of output.
    pub fn print(&self, line: impl AsRef<str>) {
        self.sink.print(line);
    }

    pub fn complete(&self) {
        self.completion.done(Ok(()));
    }

    pub fn fail(&self, err: impl Into<CommandError>) {
        self.completion.done(Err(err.into()));
    }

    pub fn ready(&self) {
        self.completion.ready();
    }
}

/// Holds the cleanup for the acquired node. Empty until acquisition succeeds.
#[derive(Debug, Default)]
pub(crate) struct CleanupSlot {
    cleanup: Option<Cleanup>,
}

impl CleanupSlot {
    pub(crate) fn fill(&mut self, cleanup: Cleanup) {
        debug_assert!(self.cleanup.is_none(), "cleanup slot filled twice");
        self.cleanup = Some(cleanup);
    }

    /// Runs the cleanup. An empty slot only logs a warning.
    pub(crate) async fn release(self) -> Result<(), BackendError> {
        debug_assert!(self.cleanup.is_some(), "cleanup released before acquisition");
        match self.cleanup {
            Some(cleanup) => cleanup.run().await,
            None => {
                tracing::warn!("placeholder cleanup called; no backend was acquired");
                Ok(())
            }
        }
    }

    /// Drops the cleanup without running it.
    pub(crate) fn abandon(self) {
        if self.cleanup.is_some() {
            tracing::warn!("backend cleanup skipped after failed completion");
        }
    }
}
