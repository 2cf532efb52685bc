//! Error types for command execution.
//!
//! Three layers: [`BackendError`] from the node and its accessor, [`CommandError`]
//! returned by handlers, and [`ExecError`] which is what callers of
//! `Harness::execute` see.

use thiserror::Error;

/// Failure reported by a backend node or the accessor that hands it out.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No block stored under this content id.
    #[error("block not found: {0}")]
    NotFound(String),

    /// The repository was already initialized.
    #[error("repo already initialized at {0}")]
    AlreadyInitialized(String),

    /// The command needs the network API but the node was acquired without it.
    #[error("API is not enabled on this node")]
    ApiDisabled,

    /// The node has been stopped and no longer serves requests.
    #[error("node is stopped")]
    Stopped,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure injected by a test double.
    #[error("{0}")]
    Injected(String),
}

/// Error returned by a command handler or passed to its completion handle.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Handler-level failure with a human readable message.
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejection of one invocation through the harness.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The request contained no tokens.
    #[error("empty command request")]
    EmptyRequest,

    /// The first token does not name a registered command.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// Declared options could not be parsed.
    #[error("invalid options: {0}")]
    OptionParse(String),

    /// The backend could not be acquired; nothing to clean up.
    #[error("failed to acquire backend: {0}")]
    BackendAcquisition(#[source] BackendError),

    /// Backend initialization failed or never reported completion.
    #[error("init failed: {0}")]
    Init(#[source] BackendError),

    /// The handler failed before signalling completion. Holds the error text.
    #[error("{0}")]
    HandlerFault(String),

    /// The handler signalled completion with an error.
    #[error("command failed: {0}")]
    Completion(#[source] CommandError),

    /// The handler finished without ever signalling completion.
    #[error("handler finished without signalling completion")]
    CompletionDropped,

    /// Releasing the backend failed.
    #[error("cleanup failed: {0}")]
    Cleanup(#[source] BackendError),

    /// `Harness::fail` ran a command that was expected to fail, but it succeeded.
    #[error("expected `{command}` to fail, but it succeeded with output {output:?}")]
    UnexpectedSuccess { command: String, output: String },
}
