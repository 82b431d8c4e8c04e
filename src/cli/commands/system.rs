use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            CommandGroup::System,
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new(
            "version",
            CommandGroup::System,
            "Show build metadata",
            "version [--json]",
            cmd_version,
        ),
        CommandEntry::new(
            "exit",
            CommandGroup::System,
            "Exit the shell",
            "exit",
            cmd_exit,
        ),
    ]
}

fn cmd_version(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    if args.first() == Some(&"--json") {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }

    output_section(format!("Budget Tracker {}", meta.version));
    io::print_info(format!(
        "  Build hash : {} ({})",
        meta.git_hash, meta.git_status
    ));
    io::print_info(format!("  Built at   : {}", meta.timestamp));
    io::print_info(format!("  Target     : {}", meta.target));
    io::print_info(format!("  Profile    : {}", meta.profile));
    io::print_info(format!("  Rustc      : {}", meta.rustc));
    io::print_info(format!("  Data root  : {}", context.data_root().display()));
    io::print_info(format!("  Store file : {}", context.backend.path().display()));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&command) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
