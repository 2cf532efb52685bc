//! Shared test handlers and harness builders.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command};
use ipfs_exec::{
    CommandDescriptor, CommandError, CommandRegistry, ExecutionContext, Handler, Harness,
    MockAccessor, READY_LINE,
};

/// Repo path shared by every harness in this test binary, so `IPFS_PATH` stays stable.
pub fn repo() -> PathBuf {
    std::env::temp_dir().join("ipfs-exec-tests")
}

/// Declares a catch-all positional so any arguments parse.
pub fn positional_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("args").num_args(0..).action(ArgAction::Append))
}

pub fn args_of(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Registry with one command `name` running `handler`.
pub fn registry_with(command: &'static str, handler: Arc<dyn Handler>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(CommandDescriptor::handler(command, handler).with_options(positional_args));
    registry
}

/// Harness over `registry` and a counting accessor.
pub fn harness_with(registry: CommandRegistry, mock: &MockAccessor) -> Harness {
    Harness::new(repo())
        .with_registry(registry)
        .with_accessor(Arc::new(mock.clone()))
}

/// Writes each chunk in order, then completes.
pub struct WriteChunks(pub Vec<&'static str>);

#[async_trait]
impl Handler for WriteChunks {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        for chunk in &self.0 {
            ctx.sink().accept(chunk);
        }
        ctx.complete();
        Ok(())
    }
}

/// Writes its positional arguments joined by spaces, then completes.
pub struct EchoArgs;

#[async_trait]
impl Handler for EchoArgs {
    async fn run(&self, args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.sink().accept(args_of(&args).join(" "));
        ctx.complete();
        Ok(())
    }
}

/// Writes some output, then returns an error without signalling.
pub struct Throws(pub &'static str);

#[async_trait]
impl Handler for Throws {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.sink().accept("partial");
        Err(CommandError::Failed(self.0.to_string()))
    }
}

/// Signals completion with an error.
pub struct CompletesWithError(pub &'static str);

#[async_trait]
impl Handler for CompletesWithError {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.fail(CommandError::Failed(self.0.to_string()));
        Ok(())
    }
}

/// Returns Ok without ever signalling.
pub struct ForgetsToComplete;

#[async_trait]
impl Handler for ForgetsToComplete {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.sink().accept("done?");
        Ok(())
    }
}

/// Panics inside the handler.
pub struct Panics;

#[async_trait]
impl Handler for Panics {
    async fn run(&self, _args: ArgMatches, _ctx: ExecutionContext) -> Result<(), CommandError> {
        panic!("handler exploded");
    }
}

/// Writes only the ready line and then waits for the node to stop; never completes explicitly.
pub struct ReadyLineOnly;

#[async_trait]
impl Handler for ReadyLineOnly {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        ctx.sink().accept("Starting\n");
        ctx.sink().accept(READY_LINE);
        ctx.node().stopped().await;
        Ok(())
    }
}

/// Parks a context clone in a detached task, then returns Ok without signalling.
pub struct StashesContext;

#[async_trait]
impl Handler for StashesContext {
    async fn run(&self, _args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError> {
        let kept = ctx.clone();
        tokio::spawn(async move {
            kept.node().stopped().await;
        });
        Ok(())
    }
}
