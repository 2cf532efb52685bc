//! Mock accessor for tests.
//!
//! Hands out real [`MemoryNode`](super::MemoryNode)s but records every acquisition
//! and cleanup, and can be told to fail either step.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AcquireOptions, Acquired, BackendAccessor, Cleanup, MemoryAccessor};
use crate::error::BackendError;

/// Counting accessor with optional injected failures.
///
/// Clones share counters, so a test can keep one handle and give another to the harness.
#[derive(Clone, Default)]
pub struct MockAccessor {
    inner: MemoryAccessor,
    acquisitions: Arc<AtomicUsize>,
    cleanups: Arc<AtomicUsize>,
    options: Arc<Mutex<Vec<AcquireOptions>>>,
    acquire_error: Option<String>,
    cleanup_error: Option<String>,
}

impl MockAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every acquisition fails with `message`.
    pub fn with_acquire_error(mut self, message: impl Into<String>) -> Self {
        self.acquire_error = Some(message.into());
        self
    }

    /// Every cleanup runs, is counted, then fails with `message`.
    pub fn with_cleanup_error(mut self, message: impl Into<String>) -> Self {
        self.cleanup_error = Some(message.into());
        self
    }

    pub fn acquire_count(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn cleanup_count(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }

    /// Options passed to each acquire call, in call order.
    pub fn acquired_with(&self) -> Vec<AcquireOptions> {
        self.options
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl BackendAccessor for MockAccessor {
    async fn acquire(&self, options: AcquireOptions) -> Result<Acquired, BackendError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.options
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(options.clone());
        if let Some(message) = &self.acquire_error {
            return Err(BackendError::Injected(message.clone()));
        }

        let Acquired { node, cleanup } = self.inner.acquire(options).await?;
        let cleanups = self.cleanups.clone();
        let cleanup_error = self.cleanup_error.clone();
        let cleanup = Cleanup::new(move || async move {
            cleanups.fetch_add(1, Ordering::SeqCst);
            cleanup.run().await?;
            match cleanup_error {
                Some(message) => Err(BackendError::Injected(message)),
                None => Ok(()),
            }
        });
        Ok(Acquired { node, cleanup })
    }
}
