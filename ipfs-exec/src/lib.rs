//! # ipfs-exec
//!
//! Runs CLI command handlers in-process against a backend node, captures what
//! they write, and resolves once the command signals completion. Test suites use
//! it to assert on CLI behavior without spawning a process per command.
//!
//! ## Flow
//!
//! 1. The request string is split on whitespace; `cat`, `add` and `get` expand to
//!    `files cat|add|get`.
//! 2. The [`CommandRegistry`] resolves the command and its options are parsed
//!    (undeclared flags are ignored).
//! 3. A node is acquired from the [`BackendAccessor`]; `daemon` gets the API enabled.
//! 4. The handler runs with an [`ExecutionContext`]: node, [`OutputSink`], completion handle.
//! 5. Completion (explicit, the daemon's ready line, or [`ExecutionContext::ready`])
//!    triggers the node's [`Cleanup`], then the output resolves. `shutdown` waits
//!    [`SHUTDOWN_SETTLE_DELAY`] before resolving.
//!
//! `init` skips the handler: it acquires an offline node, initializes it, and waits
//! for the node's init event.
//!
//! ## Main Modules
//!
//! - [`harness`]: [`Harness`], [`HarnessConfig`], [`ExecutionContext`].
//! - [`command`]: [`Handler`], [`CommandDescriptor`], [`CommandRegistry`], routing, built-ins.
//! - [`sink`]: [`OutputSink`], [`OutputBuffer`], [`READY_LINE`].
//! - [`backend`]: [`Backend`], [`BackendAccessor`], [`MemoryAccessor`], [`MockAccessor`].
//! - [`error`]: [`ExecError`], [`CommandError`], [`BackendError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ipfs_exec::Harness;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ipfs_exec::ExecError> {
//! let ipfs = Harness::new("/tmp/ipfs-exec-repo");
//! let out = ipfs.execute("version").await?;
//! assert!(out.starts_with("ipfs-exec version"));
//! let err = ipfs.fail("cat QmMissing").await?;
//! assert!(err.contains("not found"));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod command;
pub mod error;
pub mod harness;
pub mod logging;
pub mod sink;

pub use backend::{
    AcquireOptions, Acquired, ApiSetting, Backend, BackendAccessor, Cleanup, MemoryAccessor,
    MemoryNode, MockAccessor, NodeEvent, NodeIdentity, DAEMON_API_ADDR, REPO_PATH_ENV,
};
pub use command::{CommandDescriptor, CommandKind, CommandRegistry, Handler};
pub use error::{BackendError, CommandError, ExecError};
pub use harness::{Completion, ExecutionContext, Harness, HarnessConfig, SHUTDOWN_SETTLE_DELAY};
pub use sink::{OutputBuffer, OutputSink, READY_LINE};
