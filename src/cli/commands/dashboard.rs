use tracker_core::{DashboardSnapshot, DebtStanding, LiveDashboard};
use tracker_domain::Money;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatting::{progress_bar, short_date, standing_label, weekly_chart};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "dashboard",
        CommandGroup::Ledger,
        "Balance, target progress, weekly spending and debts",
        "dashboard",
        cmd_dashboard,
    )]
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let snapshot = current_snapshot(context)?;
    render(context, &snapshot);
    Ok(())
}

/// Reuses the live dashboard of the signed-in account, starting one when
/// there is none yet.
fn current_snapshot(context: &mut ShellContext) -> Result<DashboardSnapshot, CommandError> {
    let user = context.require_session()?;
    if let Some((uid, live)) = context.live_dashboard.as_mut() {
        if *uid == user.uid {
            if live.poll()? {
                tracing::debug!(recomputes = live.recomputes(), "dashboard refreshed");
            }
            return Ok(live.current().clone());
        }
    }

    let live = LiveDashboard::start(context.client.clone(), context.recent_limit())?;
    let snapshot = live.current().clone();
    context.live_dashboard = Some((user.uid, live));
    Ok(snapshot)
}

fn render(context: &ShellContext, snapshot: &DashboardSnapshot) {
    let fmt = |amount: Money| context.format_amount(amount);

    output_section(format!("Hello, {}", snapshot.user_name));
    io::print_info(format!("  Balance : {}", fmt(snapshot.balance)));
    io::print_info(format!("  Target  : {}", fmt(snapshot.target)));
    io::print_info(format!("  Progress: {}", progress_bar(snapshot.progress)));
    if snapshot.remaining_to_target().is_positive() {
        io::print_info(format!("  {} to go.", fmt(snapshot.remaining_to_target())));
    }

    output_section("Spending this month");
    for line in weekly_chart(&snapshot.weekly_spending, fmt) {
        io::print_info(format!("  {line}"));
    }
    io::print_info(format!("  Total   : {}", fmt(snapshot.monthly_expense)));

    output_section("Recent activity");
    if snapshot.recent_activity.is_empty() {
        io::print_info("  Nothing yet.");
    }
    for entry in &snapshot.recent_activity {
        let sign = if entry.is_inflow() { "+" } else { "-" };
        io::print_info(format!(
            "  {}  {:<28} {}{}",
            short_date(entry.date),
            entry.description,
            sign,
            fmt(entry.amount)
        ));
    }

    let debts = snapshot.debts();
    output_section("Debts");
    io::print_info(format!("  To receive: {}", fmt(debts.to_receive)));
    io::print_info(format!("  To pay    : {}", fmt(debts.to_pay)));
    for ledger in &snapshot.friends {
        let standing = ledger.standing();
        if standing != DebtStanding::Settled {
            io::print_info(format!(
                "  {:<16} {}",
                ledger.friend.name,
                standing_label(standing, fmt)
            ));
        }
    }

    context.report_decode_warnings(&snapshot.report.warnings);
}
