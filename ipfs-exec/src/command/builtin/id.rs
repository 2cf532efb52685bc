//! `id`: print the node identity as JSON.

use std::sync::Arc;

use async_trait::async_trait;
use clap::ArgMatches;

use crate::command::{CommandDescriptor, Handler};
use crate::error::CommandError;
use crate::harness::ExecutionContext;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::handler("id", Arc::new(IdCommand)).describe("Show node identity")
}

struct IdCommand;

#[async_trait]
impl Handler for IdCommand {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        let identity = ctx.node().identity();
        let json = serde_json::to_string_pretty(&identity)
            .map_err(|e| CommandError::Failed(format!("failed to encode identity: {e}")))?;
        ctx.print(json);
        ctx.complete();
        Ok(())
    }
}
