//! `init`: waits for the node's init event; harnesses do not cross-signal.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ipfs_exec::{
    AcquireOptions, Acquired, Backend, BackendAccessor, BackendError, Cleanup, ExecError,
    Harness, MemoryAccessor, MockAccessor, NodeEvent, NodeIdentity,
};
use tokio::sync::broadcast;

use crate::common::repo;

/// **Scenario**: init resolves with empty output, offline, one cleanup.
#[tokio::test]
async fn init_resolves_after_event() {
    let mock = MockAccessor::new();
    let harness = Harness::new(repo()).with_accessor(Arc::new(mock.clone()));
    let out = harness.execute("init").await.unwrap();
    assert_eq!(out, "");
    assert_eq!(mock.acquired_with(), vec![AcquireOptions::offline()]);
    assert_eq!(mock.cleanup_count(), 1);
}

/// **Scenario**: Two independent harnesses initialize concurrently without interference.
#[tokio::test]
async fn independent_harnesses_do_not_cross_signal() {
    let a = Harness::new(repo()).with_accessor(Arc::new(MemoryAccessor::new()));
    let b = Harness::new(repo()).with_accessor(Arc::new(MemoryAccessor::new()));
    let (ra, rb) = tokio::join!(a.execute("init"), b.execute("init"));
    assert_eq!(ra.unwrap(), "");
    assert_eq!(rb.unwrap(), "");
}

/// **Scenario**: Second init on the same repo is rejected; cleanup still runs each time.
#[tokio::test]
async fn second_init_is_rejected() {
    let mock = MockAccessor::new();
    let harness = Harness::new(repo()).with_accessor(Arc::new(mock.clone()));
    harness.execute("init").await.unwrap();
    let err = harness.execute("init").await.unwrap_err();
    assert!(
        matches!(err, ExecError::Init(BackendError::AlreadyInitialized(_))),
        "{:?}",
        err
    );
    assert_eq!(mock.cleanup_count(), 2);
}

/// **Scenario**: init with a failing acquisition rejects and never cleans up.
#[tokio::test]
async fn init_acquisition_failure() {
    let mock = MockAccessor::new().with_acquire_error("repo locked");
    let harness = Harness::new(repo()).with_accessor(Arc::new(mock.clone()));
    let err = harness.execute("init").await.unwrap_err();
    assert!(matches!(err, ExecError::BackendAcquisition(_)), "{:?}", err);
    assert_eq!(mock.acquire_count(), 1);
    assert_eq!(mock.cleanup_count(), 0);
}

/// **Scenario**: init succeeds but its cleanup fails ⇒ Cleanup error, cleanup ran once.
#[tokio::test]
async fn init_cleanup_failure() {
    let mock = MockAccessor::new().with_cleanup_error("still busy");
    let harness = Harness::new(repo()).with_accessor(Arc::new(mock.clone()));
    let err = harness.execute("init").await.unwrap_err();
    assert!(matches!(err, ExecError::Cleanup(_)), "{:?}", err);
    assert_eq!(err.to_string(), "cleanup failed: still busy");
    assert_eq!(mock.cleanup_count(), 1);
}

/// Node whose init event arrives later, from another task.
struct SlowInitNode {
    repo_path: PathBuf,
    events: broadcast::Sender<NodeEvent>,
    initialized: Arc<AtomicBool>,
}

#[async_trait]
impl Backend for SlowInitNode {
    fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn api_addr(&self) -> Option<&str> {
        None
    }

    fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    async fn init(&self) -> Result<(), BackendError> {
        let events = self.events.clone();
        let initialized = self.initialized.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            initialized.store(true, Ordering::SeqCst);
            let _ = events.send(NodeEvent::Init);
        });
        Ok(())
    }

    async fn add(&self, _data: Vec<u8>) -> Result<String, BackendError> {
        Err(BackendError::Stopped)
    }

    async fn cat(&self, cid: &str) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::NotFound(cid.to_string()))
    }

    fn identity(&self) -> NodeIdentity {
        NodeIdentity {
            id: "QmSlow".into(),
            addresses: vec![],
            agent_version: "test".into(),
        }
    }

    async fn stop(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn stopped(&self) {}
}

struct SlowInitAccessor {
    initialized: Arc<AtomicBool>,
}

#[async_trait]
impl BackendAccessor for SlowInitAccessor {
    async fn acquire(&self, _options: AcquireOptions) -> Result<Acquired, BackendError> {
        let (events, _) = broadcast::channel(4);
        let node = Arc::new(SlowInitNode {
            repo_path: repo(),
            events,
            initialized: self.initialized.clone(),
        });
        Ok(Acquired {
            node,
            cleanup: Cleanup::noop(),
        })
    }
}

/// **Scenario**: The result is only available once the delayed init event has fired.
#[tokio::test]
async fn init_waits_for_delayed_event() {
    let initialized = Arc::new(AtomicBool::new(false));
    let harness = Harness::new(repo()).with_accessor(Arc::new(SlowInitAccessor {
        initialized: initialized.clone(),
    }));
    harness.execute("init").await.unwrap();
    assert!(initialized.load(Ordering::SeqCst));
}
