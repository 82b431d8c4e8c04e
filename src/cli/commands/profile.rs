use tracker_core::ProfileService;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatting::short_date;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "profile",
            CommandGroup::Account,
            "Show the signed-in profile",
            "profile",
            cmd_profile,
        ),
        CommandEntry::new(
            "target",
            CommandGroup::Account,
            "Show or set the savings target",
            "target [amount]",
            cmd_target,
        ),
    ]
}

fn cmd_profile(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.require_session()?;
    let (profile, report) = ProfileService::profile(&context.client)?;

    output_section("Profile");
    io::print_info(format!("  Name     : {}", profile.display_name()));
    io::print_info(format!("  Email    : {}", profile.email));
    if let Some(phone) = &profile.phone_number {
        io::print_info(format!("  Phone    : {phone}"));
    }
    io::print_info(format!(
        "  Target   : {}",
        context.format_amount(profile.target_balance)
    ));
    if let Some(created) = profile.created_at {
        io::print_info(format!("  Joined   : {}", short_date(created)));
    }
    if let Some(last_login) = profile.last_login {
        io::print_info(format!(
            "  Last seen: {}",
            last_login.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    context.report_decode_warnings(&report.warnings);
    Ok(())
}

fn cmd_target(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let Some(raw) = args.first() else {
        let (profile, _) = ProfileService::profile(&context.client)?;
        io::print_info(format!(
            "Savings target: {}",
            context.format_amount(profile.target_balance)
        ));
        return Ok(());
    };
    if args.len() > 1 {
        return Err(CommandError::usage("target [amount]"));
    }

    let target = ProfileService::set_target_from_input(&context.client, raw)?;
    io::print_success(format!(
        "Savings target set to {}.",
        context.format_amount(target)
    ));
    Ok(())
}
