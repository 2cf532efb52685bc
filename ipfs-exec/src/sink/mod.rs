//! Output capture for running commands.
//!
//! Handlers write through an [`OutputSink`]; every write lands in the shared
//! [`OutputBuffer`] before the call returns. The sink also watches for the
//! daemon's readiness line and turns it into a completion signal.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::harness::Signal;

/// Exact chunk the `daemon` command writes once it is serving.
pub const READY_LINE: &str = "Daemon is ready\n";

/// Append-only list of output chunks in arrival order.
#[derive(Clone, Debug, Default)]
pub struct OutputBuffer {
    chunks: Arc<Mutex<Vec<String>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.chunks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, chunk: String) {
        self.lock().push(chunk);
    }

    /// Snapshot of the chunks written so far.
    pub fn chunks(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// All chunks joined with no separator.
    pub fn contents(&self) -> String {
        self.lock().concat()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Write side handed to a handler through its execution context.
///
/// Cloning shares the buffer and the completion channel.
#[derive(Clone, Debug)]
pub struct OutputSink {
    buffer: OutputBuffer,
    signals: Option<mpsc::UnboundedSender<Signal>>,
    detect_sentinel: bool,
}

impl OutputSink {
    pub(crate) fn new(
        buffer: OutputBuffer,
        signals: mpsc::UnboundedSender<Signal>,
        detect_sentinel: bool,
    ) -> Self {
        Self {
            buffer,
            signals: Some(signals),
            detect_sentinel,
        }
    }

    /// Sink that only collects output; the ready line is stored but signals nothing.
    pub fn detached(buffer: OutputBuffer) -> Self {
        Self {
            buffer,
            signals: None,
            detect_sentinel: false,
        }
    }

    /// Records one chunk. A chunk equal to [`READY_LINE`] also completes the
    /// invocation when sentinel detection is on.
    pub fn accept(&self, chunk: impl AsRef<[u8]>) {
        let text = String::from_utf8_lossy(chunk.as_ref()).into_owned();
        tracing::trace!(chunk = %text, "received output chunk");
        let is_ready = self.detect_sentinel && text == READY_LINE;
        self.buffer.push(text);
        if is_ready {
            if let Some(tx) = &self.signals {
                tracing::debug!("ready line seen in output");
                let _ = tx.send(Signal::Ready);
            }
        }
    }

    /// Writes `line` followed by a newline as a single chunk.
    pub fn print(&self, line: impl AsRef<str>) {
        self.accept(format!("{}\n", line.as_ref()));
    }

    pub fn buffer(&self) -> &OutputBuffer {
        &self.buffer
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.accept(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
