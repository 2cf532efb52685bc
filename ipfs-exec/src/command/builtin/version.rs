//! `version`.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::command::{CommandDescriptor, Handler};
use crate::error::CommandError;
use crate::harness::ExecutionContext;

pub(super) fn descriptor() -> CommandDescriptor {
    CommandDescriptor::handler("version", Arc::new(VersionCommand))
        .describe("Show version information")
        .with_options(options)
}

fn options(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("number")
            .short('n')
            .long("number")
            .action(ArgAction::SetTrue)
            .help("Print only the version number"),
    )
}

struct VersionCommand;

#[async_trait]
impl Handler for VersionCommand {
    async fn run(&self, args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        let version = env!("CARGO_PKG_VERSION");
        if args.get_flag("number") {
            ctx.print(version);
        } else {
            ctx.print(format!("ipfs-exec version: {version}"));
        }
        ctx.complete();
        Ok(())
    }
}
