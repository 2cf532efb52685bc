//! Backend nodes and the accessor that hands them out.
//!
//! A command runs against one [`Backend`] obtained from a [`BackendAccessor`].
//! Acquisition also yields a one-shot [`Cleanup`] that releases the node; the
//! harness runs it once the command is judged complete.
//!
//! - [`MemoryAccessor`] / [`MemoryNode`]: in-process content-addressed store.
//! - [`MockAccessor`]: wraps the memory accessor, counts acquisitions and
//!   cleanups, and can inject failures.

mod memory;
mod mock;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::BackendError;

pub use memory::{content_id, MemoryAccessor, MemoryNode};
pub use mock::MockAccessor;

/// Environment variable holding the repository location read on every acquisition.
pub const REPO_PATH_ENV: &str = "IPFS_PATH";

/// Repository location used when `IPFS_PATH` is unset.
pub const DEFAULT_REPO_PATH: &str = ".ipfs-exec";

/// Loopback API address the `daemon` command is acquired with.
pub const DAEMON_API_ADDR: &str = "/ip4/127.0.0.1/tcp/5002";

/// Reads the process-wide repository location.
pub fn repo_path_from_env() -> PathBuf {
    std::env::var_os(REPO_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPO_PATH))
}

/// Whether the acquired node exposes its network API.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ApiSetting {
    #[default]
    Disabled,
    /// Serve the API on this multiaddr.
    Listen(String),
}

/// Options for one acquisition.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AcquireOptions {
    pub api: ApiSetting,
}

impl AcquireOptions {
    /// Node without a network API (`{api: false}`).
    pub fn offline() -> Self {
        Self {
            api: ApiSetting::Disabled,
        }
    }

    /// Node serving its API on `addr`.
    pub fn with_api(addr: impl Into<String>) -> Self {
        Self {
            api: ApiSetting::Listen(addr.into()),
        }
    }
}

/// Lifecycle events a node broadcasts to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    /// Repository initialization finished. Emitted at most once per node.
    Init,
    /// The node stopped.
    Stopped,
}

/// Identity summary printed by the `id` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeIdentity {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Addresses")]
    pub addresses: Vec<String>,
    #[serde(rename = "AgentVersion")]
    pub agent_version: String,
}

/// One running node of the content-addressed store.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Repository this node was opened on.
    fn repo_path(&self) -> &Path;

    /// API multiaddr when the node was acquired with the API enabled.
    fn api_addr(&self) -> Option<&str>;

    /// Subscribes to lifecycle events. Subscribe before triggering the action
    /// whose event you wait for.
    fn subscribe(&self) -> broadcast::Receiver<NodeEvent>;

    /// Initializes the repository and emits [`NodeEvent::Init`].
    async fn init(&self) -> Result<(), BackendError>;

    /// Stores `data` and returns its content id.
    async fn add(&self, data: Vec<u8>) -> Result<String, BackendError>;

    /// Returns the bytes stored under `cid`.
    async fn cat(&self, cid: &str) -> Result<Vec<u8>, BackendError>;

    fn identity(&self) -> NodeIdentity;

    /// Stops the node. Stopping twice is not an error.
    async fn stop(&self) -> Result<(), BackendError>;

    /// Resolves once the node has stopped.
    async fn stopped(&self);
}

/// One-shot release action for an acquired node.
///
/// `run` consumes the value, so a cleanup cannot run twice.
pub struct Cleanup {
    release: Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BackendError>> + Send>,
}

impl Cleanup {
    pub fn new<F, Fut>(release: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BackendError>> + Send + 'static,
    {
        Self {
            release: Box::new(move || release().boxed()),
        }
    }

    /// Cleanup that does nothing.
    pub fn noop() -> Self {
        Self::new(|| async { Ok(()) })
    }

    pub async fn run(self) -> Result<(), BackendError> {
        (self.release)().await
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup")
    }
}

/// Result of a successful acquisition.
pub struct Acquired {
    pub node: std::sync::Arc<dyn Backend>,
    pub cleanup: Cleanup,
}

/// Hands out backend nodes. Implementations must report exactly one outcome per call.
#[async_trait]
pub trait BackendAccessor: Send + Sync {
    async fn acquire(&self, options: AcquireOptions) -> Result<Acquired, BackendError>;
}
