//! The dashboard summary: balance against target, weekly spending, recent
//! activity and outstanding debts.

use chrono::NaiveDate;
use tracker_domain::{Money, Transaction, UserProfile};

use crate::{
    backend::BackendClient,
    friend_service::{DebtTotals, FriendLedger, FriendService},
    ledger::{self, ActivityEntry, WeeklySpending},
    profile_service::ProfileService,
    records::DecodeReport,
    transaction_service::TransactionService,
    CoreError,
};

/// Number of entries shown in the recent-activity feed unless configured otherwise.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub user_name: String,
    pub balance: Money,
    pub target: Money,
    /// Share of the target reached, in `[0, 1]`.
    pub progress: f64,
    pub weekly_spending: WeeklySpending,
    pub monthly_expense: Money,
    pub recent_activity: Vec<ActivityEntry>,
    pub friends: Vec<FriendLedger>,
    pub report: DecodeReport,
}

impl DashboardSnapshot {
    /// Builds the snapshot from already-fetched data. Pure.
    pub fn compute(
        profile: &UserProfile,
        transactions: &[Transaction],
        friends: Vec<FriendLedger>,
        reference: NaiveDate,
        recent_limit: usize,
    ) -> Self {
        let balance = ledger::personal_balance(transactions);
        let target = profile.target_balance;
        Self {
            user_name: profile.display_name().to_string(),
            balance,
            target,
            progress: ledger::progress(balance, target),
            weekly_spending: ledger::weekly_expenses(transactions, reference),
            monthly_expense: ledger::monthly_expense_total(transactions, reference),
            recent_activity: ledger::recent_activity(transactions, recent_limit),
            friends,
            report: DecodeReport::default(),
        }
    }

    pub fn debts(&self) -> DebtTotals {
        DebtTotals::from_ledgers(&self.friends)
    }

    /// Progress as a whole percentage for display.
    pub fn progress_percent(&self) -> u8 {
        (self.progress * 100.0).round() as u8
    }

    pub fn remaining_to_target(&self) -> Money {
        let remaining = self.target - self.balance;
        if remaining.is_negative() {
            Money::ZERO
        } else {
            remaining
        }
    }
}

pub struct DashboardService;

impl DashboardService {
    /// Fetches profile, transactions and friend ledgers once and summarizes them.
    pub fn snapshot(
        client: &BackendClient,
        recent_limit: usize,
    ) -> Result<DashboardSnapshot, CoreError> {
        let (profile, mut report) = ProfileService::profile(client)?;
        let transactions = TransactionService::list(client)?;
        let friends = FriendService::friends_with_ledgers(client)?;
        report.merge(transactions.report);
        report.merge(friends.report);

        let mut snapshot = DashboardSnapshot::compute(
            &profile,
            &transactions.items,
            friends.items,
            client.clock.today(),
            recent_limit,
        );
        if !report.is_clean() {
            tracing::debug!(
                warnings = report.warnings.len(),
                "dashboard built from imperfect data"
            );
        }
        snapshot.report = report;
        Ok(snapshot)
    }
}
