use super::COMMANDS;
use itertools::Itertools;

pub struct Handler;

impl Handler {
    pub fn new() -> Self {
        Self
    }

    /// One line per registered command, in registry order.
    pub fn handle(&self) -> String {
        COMMANDS
            .iter()
            .map(|cmd| format!("{} - {}", cmd.name, cmd.description))
            .join("\n")
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
