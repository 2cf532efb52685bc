//! Logging helpers for command execution.
//!
//! Structured `tracing` events for the start, state changes, and outcome of
//! each invocation. Subscribers are installed by the binary, not here.

use crate::error::ExecError;

/// Log the start of an invocation with its expanded argv.
pub fn log_command_start(argv: &[String]) {
    tracing::debug!(?argv, "running command");
}

/// Log a state transition of one invocation.
pub fn log_state(command: &str, state: &'static str) {
    tracing::trace!(command = command, state = state, "invocation state");
}

/// Log a resolved invocation.
pub fn log_command_complete(command: &str, output_len: usize) {
    tracing::debug!(command = command, output_len, "command resolved");
}

/// Log a rejected invocation.
pub fn log_command_error(command: &str, error: &ExecError) {
    tracing::debug!(command = command, %error, "command rejected");
}
