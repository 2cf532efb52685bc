//! `shutdown`: stop the node.

use std::sync::Arc;

use async_trait::async_trait;
use clap::ArgMatches;

use super::SHUTDOWN_COMMAND;
use crate::command::{CommandDescriptor, Handler};
use crate::error::CommandError;
use crate::harness::ExecutionContext;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::handler(SHUTDOWN_COMMAND, Arc::new(ShutdownCommand))
        .describe("Shut down the running node")
}

struct ShutdownCommand;

#[async_trait]
impl Handler for ShutdownCommand {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.node().stop().await?;
        ctx.complete();
        Ok(())
    }
}
