//! In-memory backend: nodes over a shared content-addressed block map.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, watch};

use super::{
    repo_path_from_env, AcquireOptions, Acquired, ApiSetting, Backend, BackendAccessor, Cleanup,
    NodeEvent, NodeIdentity,
};
use crate::error::BackendError;

/// Content id for `data`: `Qm` followed by the first 44 hex chars of its SHA-256.
pub fn content_id(data: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(data));
    format!("Qm{}", &digest[..44])
}

/// Blocks and init state shared by every node handed out by one accessor.
#[derive(Default)]
struct MemoryRepo {
    blocks: DashMap<String, Vec<u8>>,
    initialized: AtomicBool,
}

/// In-process node over a shared block map.
///
/// **In-Memory**: blocks live as long as the accessor that created the node.
pub struct MemoryNode {
    repo: Arc<MemoryRepo>,
    repo_path: PathBuf,
    api: ApiSetting,
    events: broadcast::Sender<NodeEvent>,
    stopped: watch::Sender<bool>,
}

impl MemoryNode {
    fn new(repo: Arc<MemoryRepo>, repo_path: PathBuf, api: ApiSetting) -> Self {
        let (events, _) = broadcast::channel(16);
        let (stopped, _) = watch::channel(false);
        Self {
            repo,
            repo_path,
            api,
            events,
            stopped,
        }
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }

    fn ensure_running(&self) -> Result<(), BackendError> {
        if self.is_stopped() {
            return Err(BackendError::Stopped);
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryNode {
    fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn api_addr(&self) -> Option<&str> {
        match &self.api {
            ApiSetting::Listen(addr) => Some(addr.as_str()),
            ApiSetting::Disabled => None,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    async fn init(&self) -> Result<(), BackendError> {
        self.ensure_running()?;
        if self.repo.initialized.swap(true, Ordering::SeqCst) {
            return Err(BackendError::AlreadyInitialized(
                self.repo_path.display().to_string(),
            ));
        }
        tracing::debug!(repo = %self.repo_path.display(), "repo initialized");
        let _ = self.events.send(NodeEvent::Init);
        Ok(())
    }

    async fn add(&self, data: Vec<u8>) -> Result<String, BackendError> {
        self.ensure_running()?;
        let cid = content_id(&data);
        self.repo.blocks.insert(cid.clone(), data);
        Ok(cid)
    }

    async fn cat(&self, cid: &str) -> Result<Vec<u8>, BackendError> {
        self.ensure_running()?;
        self.repo
            .blocks
            .get(cid)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::NotFound(cid.to_string()))
    }

    fn identity(&self) -> NodeIdentity {
        NodeIdentity {
            id: content_id(self.repo_path.to_string_lossy().as_bytes()),
            addresses: self.api_addr().map(String::from).into_iter().collect(),
            agent_version: format!("ipfs-exec/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    async fn stop(&self) -> Result<(), BackendError> {
        if !self.stopped.send_replace(true) {
            tracing::debug!(repo = %self.repo_path.display(), "node stopped");
            let _ = self.events.send(NodeEvent::Stopped);
        }
        Ok(())
    }

    async fn stopped(&self) {
        let mut rx = self.stopped.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

/// Accessor producing [`MemoryNode`]s that share one block store.
///
/// Each acquisition reads `IPFS_PATH` for the node's repo path. The cleanup stops the node.
#[derive(Clone, Default)]
pub struct MemoryAccessor {
    repo: Arc<MemoryRepo>,
}

impl MemoryAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks stored so far.
    pub fn block_count(&self) -> usize {
        self.repo.blocks.len()
    }
}

#[async_trait]
impl BackendAccessor for MemoryAccessor {
    async fn acquire(&self, options: AcquireOptions) -> Result<Acquired, BackendError> {
        let repo_path = repo_path_from_env();
        tracing::debug!(repo = %repo_path.display(), api = ?options.api, "acquiring memory node");
        let node = Arc::new(MemoryNode::new(self.repo.clone(), repo_path, options.api));
        let handle = node.clone();
        let cleanup = Cleanup::new(move || async move { handle.stop().await });
        Ok(Acquired { node, cleanup })
    }
}
