//! Name → descriptor mapping populated at startup.

use std::collections::HashMap;

use super::router::expand_aliases;
use super::CommandDescriptor;
use crate::error::ExecError;

/// Registered commands keyed by name.
#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDescriptor>,
}

impl CommandRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in commands.
    pub fn builtin() -> Self {
        super::builtin::registry()
    }

    /// Adds a descriptor under its name. Replaces if same name.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> &mut Self {
        self.commands.insert(descriptor.name(), descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolves raw tokens (aliases allowed) to the descriptor they name.
    pub fn resolve(&self, tokens: &[String]) -> Result<&CommandDescriptor, ExecError> {
        let argv = expand_aliases(tokens.to_vec());
        let name = argv.first().ok_or(ExecError::EmptyRequest)?;
        self.get(name)
            .ok_or_else(|| ExecError::CommandNotFound(name.clone()))
    }
}
