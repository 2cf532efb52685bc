//! `daemon`: serve the node's API until it stops.

use std::sync::Arc;

use async_trait::async_trait;
use clap::ArgMatches;

use super::DAEMON_COMMAND;
use crate::command::{CommandDescriptor, Handler};
use crate::error::{BackendError, CommandError};
use crate::harness::ExecutionContext;
use crate::sink::READY_LINE;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::handler(DAEMON_COMMAND, Arc::new(DaemonCommand))
        .with_legacy_description("Start a long-running daemon process")
}

/// Prints the API address and the ready line, signals readiness, then stays
/// alive until the node is stopped (normally by the harness cleanup).
struct DaemonCommand;

#[async_trait]
impl Handler for DaemonCommand {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.print("Initializing daemon...");
        let addr = ctx
            .node()
            .api_addr()
            .ok_or(BackendError::ApiDisabled)?
            .to_string();
        ctx.print(format!("API is listening on: {addr}"));
        ctx.sink().accept(READY_LINE);
        ctx.ready();

        ctx.node().stopped().await;
        tracing::debug!(api = %addr, "daemon stopped");
        Ok(())
    }
}
