//! Daemon readiness: the ready line in output and the explicit ready notification.

use std::sync::Arc;

use ipfs_exec::{
    AcquireOptions, CommandRegistry, Harness, HarnessConfig, MockAccessor, DAEMON_API_ADDR,
    READY_LINE,
};

use crate::common::{harness_with, registry_with, repo, ReadyLineOnly};

/// **Scenario**: Handler only writes the ready line ⇒ resolves with it, no explicit completion.
#[tokio::test]
async fn ready_line_completes_daemon() {
    let mock = MockAccessor::new();
    let registry = registry_with("daemon", Arc::new(ReadyLineOnly));
    let out = harness_with(registry, &mock).execute("daemon").await.unwrap();
    assert_eq!(out, format!("Starting\n{READY_LINE}"));
    assert!(out.ends_with(READY_LINE));
    assert_eq!(mock.acquired_with(), vec![AcquireOptions::with_api(DAEMON_API_ADDR)]);
    assert_eq!(mock.cleanup_count(), 1);
}

/// **Scenario**: Built-in daemon reports its API address and the ready line last.
#[tokio::test]
async fn builtin_daemon_output() {
    let mock = MockAccessor::new();
    let out = harness_with(CommandRegistry::builtin(), &mock)
        .execute("daemon")
        .await
        .unwrap();
    assert_eq!(
        out,
        "Initializing daemon...\n\
         API is listening on: /ip4/127.0.0.1/tcp/5002\n\
         Daemon is ready\n"
    );
    assert_eq!(mock.cleanup_count(), 1);
}

/// **Scenario**: With sentinel detection off the built-in daemon still resolves through ready().
#[tokio::test]
async fn explicit_ready_without_sentinel() {
    let harness = Harness::new(repo()).with_config(HarnessConfig {
        sentinel_detection: false,
        ..HarnessConfig::default()
    });
    let out = harness.execute("daemon").await.unwrap();
    assert!(out.contains(READY_LINE), "{}", out);
}

/// **Scenario**: Configured API address reaches the daemon's node.
#[tokio::test]
async fn configured_api_address_is_used() {
    let mock = MockAccessor::new();
    let harness = harness_with(CommandRegistry::builtin(), &mock).with_config(HarnessConfig {
        daemon_api_addr: "/ip4/127.0.0.1/tcp/6002".into(),
        ..HarnessConfig::default()
    });
    let out = harness.execute("daemon").await.unwrap();
    assert!(out.contains("API is listening on: /ip4/127.0.0.1/tcp/6002"), "{}", out);
    assert_eq!(
        mock.acquired_with(),
        vec![AcquireOptions::with_api("/ip4/127.0.0.1/tcp/6002")]
    );
}
