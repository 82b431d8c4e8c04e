use std::collections::HashMap;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Help-screen grouping for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Account,
    Ledger,
    Friends,
    System,
}

impl CommandGroup {
    pub const ALL: [CommandGroup; 4] = [
        CommandGroup::Account,
        CommandGroup::Ledger,
        CommandGroup::Friends,
        CommandGroup::System,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Account => "Account",
            CommandGroup::Ledger => "Ledger",
            CommandGroup::Friends => "Friends & debts",
            CommandGroup::System => "System",
        }
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub group: CommandGroup,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        group: CommandGroup,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            group,
            description,
            usage,
            handler,
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry`. A second entry under the same name replaces the
    /// first but keeps its position.
    pub fn register(&mut self, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, entry).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn list(&self) -> Vec<&CommandEntry> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    pub fn in_group(&self, group: CommandGroup) -> Vec<&CommandEntry> {
        self.list()
            .into_iter()
            .filter(|entry| entry.group == group)
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }
}
