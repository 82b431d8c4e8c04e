pub mod auth;
pub mod config;
pub mod dashboard;
pub mod debt;
pub mod friend;
pub mod profile;
pub mod system;
pub mod transaction;

use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(auth::definitions());
    commands.extend(profile::definitions());
    commands.extend(transaction::definitions());
    commands.extend(dashboard::definitions());
    commands.extend(friend::definitions());
    commands.extend(debt::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in all_entries() {
        registry.register(entry);
    }
}
