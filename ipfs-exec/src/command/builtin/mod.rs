//! Built-in commands over a [`Backend`](crate::backend::Backend) node.
//!
//! - `files add|cat|get` (also reachable as `add`, `cat`, `get`)
//! - `daemon`: serves the API and signals readiness
//! - `shutdown`: stops the node
//! - `version`, `id`
//! - `init`: repository initialization, driven by the harness itself

mod daemon;
mod files;
mod id;
mod shutdown;
mod version;

use super::{CommandDescriptor, CommandRegistry};

pub const INIT_COMMAND: &str = "init";
pub const DAEMON_COMMAND: &str = "daemon";
pub const SHUTDOWN_COMMAND: &str = "shutdown";

/// Registry with every built-in command.
pub fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register(CommandDescriptor::init(INIT_COMMAND).describe("Initialize a local repository"))
        .register(files::descriptor())
        .register(daemon::descriptor())
        .register(shutdown::descriptor())
        .register(version::descriptor())
        .register(id::descriptor());
    registry
}
