use tracker_config::Config;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::{CommandEntry, CommandGroup};

const CONFIG_USAGE: &str = "config [show|get <key>|set <key> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        CommandGroup::System,
        "View and change preferences",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "get" => {
            let key = args
                .get(1)
                .ok_or_else(|| CommandError::usage("config get <key>"))?;
            io::print_info(format!("{key} = {}", context.config.get(key)?));
            Ok(())
        }
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            set_config_value(context, key, value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{}`",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for key in Config::KEYS {
        io::print_info(format!("  {:<24} {}", key, context.config.get(key)?));
    }
    if let Some(email) = &context.config.remembered_email {
        io::print_info(format!("  {:<24} {}", "remembered_email", email));
    }
    io::print_info(format!(
        "  {:<24} {}",
        "config file",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated.set(key, value)?;
    context.config_manager.save(&updated)?;
    context.config = updated;

    output::apply_config(&context.config);
    match key {
        "recent_activity_limit" => context.reset_live_dashboard(),
        "data_root" => io::print_hint("The new data location is used from the next start."),
        _ => {}
    }
    io::print_success(format!("{key} set to {}.", context.config.get(key)?));
    Ok(())
}
