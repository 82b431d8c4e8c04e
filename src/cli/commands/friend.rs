use tracker_core::{
    DebtTotals, FriendFilter, FriendLedger, FriendQuery, FriendService, FriendSort, Perspective,
};

use crate::cli::core::{join_description, CommandError, CommandResult, ShellContext};
use crate::cli::formatting::{short_date, short_id, standing_label};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};

const FRIEND_USAGE: &str = "friend <add <name>|remove <friend>|list [--search <text>] \
                            [--filter all|receive|pay] [--sort name|amount|recent]|show <friend>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "friend",
        CommandGroup::Friends,
        "Manage friends and view shared ledgers",
        FRIEND_USAGE,
        cmd_friend,
    )]
}

fn cmd_friend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let Some((subcommand, rest)) = args.split_first() else {
        return list_friends(context, &[]);
    };

    match subcommand.to_lowercase().as_str() {
        "add" => add_friend(context, rest),
        "remove" | "rm" => remove_friend(context, rest),
        "list" | "ls" => list_friends(context, rest),
        "show" => show_friend(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown friend subcommand `{}`",
            other
        ))),
    }
}

fn add_friend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match join_description(args) {
        Some(name) => name,
        None if context.can_prompt() => io::prompt_text(&context.theme, "Friend's name", None)?,
        None => return Err(CommandError::usage("friend add <name>")),
    };
    let friend = FriendService::add_friend(&context.client, &name)?;
    io::print_success(format!("Added {} ({}).", friend.name, short_id(&friend.id)));
    Ok(())
}

fn remove_friend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = join_description(args).ok_or_else(|| CommandError::usage("friend remove <friend>"))?;
    let friend = FriendService::find_friend(&context.client, &key)?;

    if context.can_prompt() {
        let prompt = format!("Remove {} and every entry shared with them?", friend.name);
        if !io::confirm_action(&context.theme, &prompt, false)? {
            io::print_info("Operation cancelled.");
            return Ok(());
        }
    }

    let removed = FriendService::remove_friend(&context.client, &friend.id)?;
    io::print_success(format!(
        "Removed {} along with {} ledger entr{}.",
        friend.name,
        removed,
        if removed == 1 { "y" } else { "ies" }
    ));
    Ok(())
}

/// Reads `--search`, `--filter` and `--sort` options.
fn parse_query(args: &[&str]) -> Result<FriendQuery, CommandError> {
    let mut query = FriendQuery::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .copied()
                .ok_or_else(|| CommandError::InvalidArguments(format!("{name} needs a value")))
        };
        match *flag {
            "--search" => query.search = value("--search")?.to_string(),
            "--filter" => {
                let raw = value("--filter")?;
                query.filter = FriendFilter::parse(raw).ok_or_else(|| {
                    CommandError::InvalidArguments(format!("unknown filter `{raw}`"))
                })?;
            }
            "--sort" => {
                let raw = value("--sort")?;
                query.sort = FriendSort::parse(raw).ok_or_else(|| {
                    CommandError::InvalidArguments(format!("unknown sort order `{raw}`"))
                })?;
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{other}`"
                )))
            }
        }
    }
    Ok(query)
}

fn list_friends(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let query = parse_query(args)?;
    let (ledgers, report) = FriendService::query(&context.client, &query)?;

    output_section("Friends");
    if ledgers.is_empty() {
        if query == FriendQuery::default() {
            io::print_info("No friends yet. Use `friend add <name>` to add one.");
        } else {
            io::print_info("No friends match.");
        }
    }
    for ledger in &ledgers {
        io::print_info(format_row(context, ledger));
    }

    let totals = DebtTotals::from_ledgers(&ledgers);
    io::print_info(format!(
        "To receive: {}   To pay: {}",
        context.format_amount(totals.to_receive),
        context.format_amount(totals.to_pay)
    ));
    context.report_decode_warnings(&report.warnings);
    Ok(())
}

fn format_row(context: &ShellContext, ledger: &FriendLedger) -> String {
    let last = ledger
        .last_activity()
        .map(short_date)
        .unwrap_or_else(|| "never".to_string());
    format!(
        "  {}  {:<16} {:<22} last: {}",
        short_id(&ledger.friend.id),
        ledger.friend.name,
        standing_label(ledger.standing(), |amount| context.format_amount(amount)),
        last
    )
}

fn show_friend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = join_description(args).ok_or_else(|| CommandError::usage("friend show <friend>"))?;
    let friend = FriendService::find_friend(&context.client, &key)?;
    let entries = FriendService::ledger_for(&context.client, &friend)?;
    let ledger = FriendLedger::new(friend, entries.items);

    output_section(&ledger.friend.name);
    io::print_info(format!(
        "  {}",
        standing_label(ledger.standing(), |amount| context.format_amount(amount))
    ));
    if ledger.transactions.is_empty() {
        io::print_info("  No entries yet. Use `debt add` to record one.");
    }
    for txn in ledger.history() {
        let signed = tracker_core::ledger::signed_amount(txn, Perspective::Counterparty);
        io::print_info(format!(
            "  {}  {}  {:<8} {:>14}  {}",
            short_id(&txn.id),
            short_date(txn.date),
            txn.kind.as_str(),
            context.format_amount(signed),
            txn.description
        ));
    }
    context.report_decode_warnings(&entries.report.warnings);
    Ok(())
}
