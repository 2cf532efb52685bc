//! Commands: handler trait, descriptors, registry, and routing.
//!
//! A command is registered once as a [`CommandDescriptor`]: its signature, a
//! description, an option builder, and what to run. The harness resolves raw
//! tokens through the [`CommandRegistry`] (after alias expansion, see
//! [`expand_aliases`]) and parses options with [`parse_options`].

pub mod builtin;
mod registry;
mod router;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use clap::ArgMatches;

use crate::error::CommandError;
use crate::harness::ExecutionContext;

pub use registry::CommandRegistry;
pub use router::{expand_aliases, parse_options, split_request, ALIASES, ALIAS_TARGET};

/// Declares a command's options on the `clap::Command` it is given.
pub type OptionBuilder = fn(clap::Command) -> clap::Command;

/// Logic for one CLI command.
///
/// The handler writes output through `ctx` and signals completion with
/// [`ExecutionContext::complete`], [`ExecutionContext::fail`] or
/// [`ExecutionContext::ready`]. Returning `Err` before signalling is a fault:
/// the harness still releases the backend and rejects with the error text.
/// Returning `Ok` does not by itself complete the invocation: once the handler
/// task ends without a signal the run is rejected, even if clones of `ctx`
/// are still alive elsewhere.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn run(&self, args: ArgMatches, ctx: ExecutionContext) -> Result<(), CommandError>;
}

/// What the harness does with a resolved command.
#[derive(Clone)]
pub enum CommandKind {
    /// Spawn the handler with an execution context.
    Run(Arc<dyn Handler>),
    /// Acquire an offline node, initialize it, wait for its init event.
    Init,
}

impl fmt::Debug for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Run(_) => f.write_str("Run(..)"),
            CommandKind::Init => f.write_str("Init"),
        }
    }
}

fn no_options(cmd: clap::Command) -> clap::Command {
    cmd
}

/// Registered command: signature, description, option builder, and kind.
#[derive(Clone, Debug)]
pub struct CommandDescriptor {
    name: &'static str,
    command: &'static str,
    describe: Option<&'static str>,
    description: Option<&'static str>,
    builder: OptionBuilder,
    kind: CommandKind,
}

impl CommandDescriptor {
    /// Descriptor for `command` (e.g. `"cat <hash>"`); its name is the first word.
    pub fn new(command: &'static str, kind: CommandKind) -> Self {
        let name = command.split_whitespace().next().unwrap_or(command);
        Self {
            name,
            command,
            describe: None,
            description: None,
            builder: no_options,
            kind,
        }
    }

    /// Descriptor running `handler`.
    pub fn handler(command: &'static str, handler: Arc<dyn Handler>) -> Self {
        Self::new(command, CommandKind::Run(handler))
    }

    /// Descriptor for the repository-initialization path.
    pub fn init(command: &'static str) -> Self {
        Self::new(command, CommandKind::Init)
    }

    pub fn describe(mut self, text: &'static str) -> Self {
        self.describe = Some(text);
        self
    }

    /// Older spelling of the description, used when `describe` is unset.
    pub fn with_legacy_description(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }

    pub fn with_options(mut self, builder: OptionBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Command signature as registered.
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// `describe`, else the legacy description, else empty.
    pub fn description(&self) -> &'static str {
        self.describe.or(self.description).unwrap_or("")
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// The `clap::Command` with this descriptor's options declared.
    pub fn options(&self) -> clap::Command {
        let base = clap::Command::new(self.name)
            .about(self.description())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true);
        (self.builder)(base)
    }

    /// Parses `argv` (command name first), ignoring undeclared flags. See [`parse_options`].
    pub fn parse(&self, argv: &[String]) -> Result<ArgMatches, crate::error::ExecError> {
        parse_options(self, argv)
    }
}
