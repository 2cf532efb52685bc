//! Harness: runs command handlers in-process and resolves their output.
//!
//! [`Harness::execute`] takes a whitespace-delimited request, resolves it
//! through the registry, acquires a backend node, runs the handler with an
//! [`ExecutionContext`], and resolves with the concatenated output once the
//! handler signals completion and the node has been released.
//!
//! Construction binds `IPFS_PATH` for the whole process; every acquisition made
//! through any harness reads it. Concurrent harnesses with different repo
//! paths race on that variable.

mod context;
mod execute;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendAccessor, MemoryAccessor, DAEMON_API_ADDR, REPO_PATH_ENV};
use crate::command::CommandRegistry;

pub(crate) use context::{CleanupSlot, Signal};
pub use context::{Completion, ExecutionContext};

/// Wait between cleanup and resolution for `shutdown`; teardown lags behind the handler.
pub const SHUTDOWN_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Tunables for a harness.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Delay applied after cleanup for `shutdown` only.
    pub shutdown_delay: Duration,
    /// API address the `daemon` command's node is acquired with.
    pub daemon_api_addr: String,
    /// Treat the daemon's ready line in output as completion.
    pub sentinel_detection: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            shutdown_delay: SHUTDOWN_SETTLE_DELAY,
            daemon_api_addr: DAEMON_API_ADDR.to_string(),
            sentinel_detection: true,
        }
    }
}

/// In-process command executor bound to one repository path.
///
/// Defaults to the built-in commands over a [`MemoryAccessor`].
#[derive(Clone)]
pub struct Harness {
    repo_path: PathBuf,
    registry: Arc<CommandRegistry>,
    accessor: Arc<dyn BackendAccessor>,
    config: HarnessConfig,
}

impl Harness {
    /// Creates a harness and sets `IPFS_PATH` to `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        let repo_path = repo_path.into();
        std::env::set_var(REPO_PATH_ENV, &repo_path);
        tracing::debug!(repo = %repo_path.display(), "harness bound to repo");
        Self {
            repo_path,
            registry: Arc::new(CommandRegistry::builtin()),
            accessor: Arc::new(MemoryAccessor::new()),
            config: HarnessConfig::default(),
        }
    }

    pub fn with_registry(self, registry: CommandRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            ..self
        }
    }

    pub fn with_accessor(self, accessor: Arc<dyn BackendAccessor>) -> Self {
        Self { accessor, ..self }
    }

    pub fn with_config(self, config: HarnessConfig) -> Self {
        Self { config, ..self }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }
}
