use tracker_core::{DebtStanding, FriendLedger, FriendService, Perspective};
use tracker_domain::{Displayable, Friend};

use crate::cli::commands::transaction::parse_kind;
use crate::cli::core::{
    find_by_id_prefix, join_description, CommandError, CommandResult, ShellContext,
};
use crate::cli::formatting::{short_id, standing_label};
use crate::cli::io;
use crate::cli::registry::{CommandEntry, CommandGroup};

const DEBT_USAGE: &str = "debt <add <friend> <i-paid|they-paid> <amount> [description...]\
                          |remove <friend> <entry-id>>";
const ADD_USAGE: &str = "debt add <friend> <i-paid|they-paid> <amount> [description...]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "debt",
        CommandGroup::Friends,
        "Record or remove entries on a friend ledger",
        DEBT_USAGE,
        cmd_debt,
    )]
}

fn cmd_debt(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::usage(DEBT_USAGE));
    };

    match subcommand.to_lowercase().as_str() {
        "add" => add_entry(context, rest),
        "remove" | "rm" => remove_entry(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown debt subcommand `{}`",
            other
        ))),
    }
}

fn add_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (friend_key, kind, raw_amount, rest) = match args {
        [friend, kind, amount, rest @ ..] => (*friend, *kind, *amount, rest),
        _ => return Err(CommandError::usage(ADD_USAGE)),
    };
    let kind = parse_kind(kind)?;
    if !Perspective::Counterparty.accepts(kind) {
        return Err(CommandError::InvalidArguments(format!(
            "`{}` entries belong on your own ledger; use `add`",
            kind.as_str()
        )));
    }

    let friend = FriendService::find_friend(&context.client, friend_key)?;
    let description = join_description(rest);
    let entry = FriendService::record_from_input(
        &context.client,
        &friend,
        kind,
        raw_amount,
        description.as_deref(),
    )?;
    io::print_success(format!(
        "{}: {} of {} recorded ({}).",
        friend.name,
        entry.kind,
        context.format_amount(entry.amount),
        short_id(&entry.id)
    ));
    print_standing(context, friend)
}

fn remove_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [friend_key, entry_key] = args else {
        return Err(CommandError::usage("debt remove <friend> <entry-id>"));
    };
    let friend = FriendService::find_friend(&context.client, friend_key)?;
    let entries = FriendService::ledger_for(&context.client, &friend)?;
    match find_by_id_prefix(&entries.items, entry_key, "entries")? {
        Some(entry) => {
            FriendService::remove_entry(&context.client, &friend, &entry.id)?;
            io::print_success(format!(
                "Removed {} from {}.",
                entry.display_label(),
                friend.display_label()
            ));
        }
        None => FriendService::remove_entry(&context.client, &friend, entry_key)?,
    }
    print_standing(context, friend)
}

fn print_standing(context: &ShellContext, friend: Friend) -> CommandResult {
    let entries = FriendService::ledger_for(&context.client, &friend)?;
    let ledger = FriendLedger::new(friend, entries.items);
    let label = standing_label(ledger.standing(), |amount| context.format_amount(amount));
    match ledger.standing() {
        DebtStanding::Settled => io::print_info(format!("{} is settled.", ledger.friend.name)),
        _ => io::print_info(format!("{}: {}", ledger.friend.name, label)),
    }
    Ok(())
}
