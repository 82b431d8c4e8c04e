use tracker_core::{ledger, Perspective, TransactionService};
use tracker_domain::{Displayable, TransactionKind};

use crate::cli::core::{
    find_by_id_prefix, join_description, CommandError, CommandResult, ShellContext,
};
use crate::cli::formatting::{short_date, short_id};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};

const ADD_USAGE: &str = "add <income|expense> <amount> [description...]";
const HISTORY_USAGE: &str = "history [limit] [--json]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            CommandGroup::Ledger,
            "Record an income or expense",
            ADD_USAGE,
            cmd_add,
        ),
        CommandEntry::new(
            "remove",
            CommandGroup::Ledger,
            "Delete a transaction by id",
            "remove <id>",
            cmd_remove,
        ),
        CommandEntry::new(
            "history",
            CommandGroup::Ledger,
            "List transactions, newest first",
            HISTORY_USAGE,
            cmd_history,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let (kind, raw_amount, rest) = match args {
        [kind, amount, rest @ ..] => (*kind, *amount, rest),
        _ => return Err(CommandError::usage(ADD_USAGE)),
    };
    let kind = parse_kind(kind)?;
    if !Perspective::Personal.accepts(kind) {
        return Err(CommandError::InvalidArguments(format!(
            "`{}` entries belong on a friend ledger; use `debt add`",
            kind.as_str()
        )));
    }
    let description = join_description(rest);

    let transaction = TransactionService::add_from_input(
        &context.client,
        kind,
        raw_amount,
        description.as_deref(),
    )?;
    io::print_success(format!(
        "{} of {} recorded ({}).",
        transaction.kind,
        context.format_amount(transaction.amount),
        short_id(&transaction.id)
    ));
    Ok(())
}

pub(crate) fn parse_kind(raw: &str) -> Result<TransactionKind, CommandError> {
    raw.parse::<TransactionKind>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let [id] = args else {
        return Err(CommandError::usage("remove <id>"));
    };
    let listed = TransactionService::list(&context.client)?;
    match find_by_id_prefix(&listed.items, id, "transactions")? {
        Some(txn) => {
            TransactionService::remove(&context.client, &txn.id)?;
            io::print_success(format!("Removed {}.", txn.display_label()));
        }
        None => TransactionService::remove(&context.client, id)?,
    }
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let json = args.iter().any(|arg| *arg == "--json");
    let limit = match args.iter().find(|arg| !arg.starts_with("--")) {
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("history limit must be a number, got `{raw}`"))
        })?),
        None => None,
    };

    let listed = TransactionService::list(&context.client)?;
    let ordered = ledger::sorted_newest_first(&listed.items);
    let shown: Vec<_> = ordered
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    output_section("History");
    if shown.is_empty() {
        io::print_info("No transactions yet. Use `add` to record one.");
    }
    for txn in &shown {
        let signed = ledger::signed_amount(txn, Perspective::Personal);
        io::print_info(format!(
            "  {}  {}  {:<8} {:>14}  {}",
            short_id(&txn.id),
            short_date(txn.date),
            txn.kind.as_str(),
            context.format_amount(signed),
            txn.description
        ));
    }
    io::print_info(format!(
        "Balance: {}",
        context.format_amount(ledger::personal_balance(&listed.items))
    ));
    context.report_decode_warnings(&listed.report.warnings);
    Ok(())
}
