//! Built-in commands end to end over the in-memory backend.

use ipfs_exec::backend::content_id;
use ipfs_exec::{ExecError, Harness};

use crate::common::repo;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

/// **Scenario**: add then cat returns the original bytes; the alias and the full form agree.
#[tokio::test]
async fn add_then_cat() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "hello.txt", "hello world\n");
    let ipfs = Harness::new(repo());

    let added = ipfs.execute(&format!("add {path}")).await.unwrap();
    let cid = content_id(b"hello world\n");
    assert_eq!(added, format!("added {cid} hello.txt\n"));

    assert_eq!(ipfs.execute(&format!("cat {cid}")).await.unwrap(), "hello world\n");
    assert_eq!(
        ipfs.execute(&format!("files cat {cid}")).await.unwrap(),
        "hello world\n"
    );
}

/// **Scenario**: add -q prints only the content id.
#[tokio::test]
async fn add_quiet_prints_id_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "q.txt", "quiet");
    let out = Harness::new(repo())
        .execute(&format!("add -q {path}"))
        .await
        .unwrap();
    assert_eq!(out, format!("{}\n", content_id(b"quiet")));
}

/// **Scenario**: get -o writes the block into the output directory under its hash.
#[tokio::test]
async fn get_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "data.bin", "payload");
    let out_dir = dir.path().join("out");
    let ipfs = Harness::new(repo());

    let cid = ipfs.execute(&format!("add -q {path}")).await.unwrap();
    let cid = cid.trim();
    let out = ipfs
        .execute(&format!("get {cid} -o {}", out_dir.display()))
        .await
        .unwrap();
    let target = out_dir.join(cid);
    assert_eq!(out, format!("Saving file(s) to {}\n", target.display()));
    assert_eq!(std::fs::read_to_string(target).unwrap(), "payload");
}

/// **Scenario**: version prints the crate version; unknown flags are ignored.
#[tokio::test]
async fn version_output() {
    let ipfs = Harness::new(repo());
    let version = env!("CARGO_PKG_VERSION");
    assert_eq!(ipfs.execute("version -n").await.unwrap(), format!("{version}\n"));
    assert_eq!(
        ipfs.execute("version --all").await.unwrap(),
        format!("ipfs-exec version: {version}\n")
    );
}

/// **Scenario**: id prints JSON with the identity fields.
#[tokio::test]
async fn id_prints_json() {
    let out = Harness::new(repo()).execute("id").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(value["ID"].as_str().unwrap().starts_with("Qm"));
    assert!(value["Addresses"].is_array());
    assert!(value["AgentVersion"].is_string());
}

/// **Scenario**: Adding a missing file is a handler fault naming the path.
#[tokio::test]
async fn add_missing_file_faults() {
    let err = Harness::new(repo())
        .execute("add ./missing-file-for-test")
        .await
        .unwrap_err();
    match err {
        ExecError::HandlerFault(text) => {
            assert!(text.contains("./missing-file-for-test"), "{}", text)
        }
        other => panic!("expected HandlerFault, got {:?}", other),
    }
}

/// **Scenario**: Extra positionals after a command's own are ignored.
#[tokio::test]
async fn surplus_positionals_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "x.txt", "x");
    let ipfs = Harness::new(repo());
    let version = env!("CARGO_PKG_VERSION");
    assert_eq!(
        ipfs.execute("version extra").await.unwrap(),
        format!("ipfs-exec version: {version}\n")
    );

    let cid = ipfs.execute(&format!("add -q {path}")).await.unwrap();
    let cid = cid.trim();
    assert_eq!(ipfs.execute(&format!("cat {cid} other")).await.unwrap(), "x");
}
