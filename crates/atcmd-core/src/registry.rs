//! Command registry.
//!
//! The command table is fixed once the engine is built. It is kept sorted by
//! name so lookups are a binary search over the name candidate in the input.

use crate::command::CommandDescriptor;
use crate::error::RegistryError;

/// Characters that end a command name in the input.
const NAME_TERMINATORS: &[u8] = b"=?";

/// Sorted, immutable command table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

impl Registry {
    /// Build the table, sorting by name.
    ///
    /// Names must be non-empty, unique and free of `=`, `?` and `,`.
    pub fn new(mut commands: Vec<CommandDescriptor>) -> Result<Self, RegistryError> {
        for cmd in &commands {
            if cmd.name().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if cmd.name().bytes().any(|b| b == b'=' || b == b'?' || b == b',') {
                return Err(RegistryError::InvalidName(cmd.name().to_string()));
            }
        }

        commands.sort_by(|a, b| a.name().as_bytes().cmp(b.name().as_bytes()));
        if let Some(pair) = commands.windows(2).find(|w| w[0].name() == w[1].name()) {
            return Err(RegistryError::DuplicateCommand(pair[0].name().to_string()));
        }

        Ok(Registry { commands })
    }

    /// Resolve the command named at the start of `input`.
    ///
    /// The candidate name runs up to the first `=` or `?`, or to the end of
    /// the input. An empty candidate never matches.
    pub fn lookup(&self, input: &[u8]) -> Option<&CommandDescriptor> {
        let end = input
            .iter()
            .position(|b| NAME_TERMINATORS.contains(b))
            .unwrap_or(input.len());
        let candidate = &input[..end];
        if candidate.is_empty() {
            return None;
        }

        self.commands
            .binary_search_by(|cmd| cmd.name().as_bytes().cmp(candidate))
            .ok()
            .map(|idx| &self.commands[idx])
    }

    /// Look up a command by its exact name.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands
            .binary_search_by(|cmd| cmd.name().cmp(name))
            .ok()
            .map(|idx| &self.commands[idx])
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }
}
