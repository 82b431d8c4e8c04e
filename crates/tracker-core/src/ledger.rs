//! Pure ledger aggregation: running balances, debt standing, savings progress
//! and weekly spending buckets.
//!
//! Every function takes a snapshot of transactions and recomputes from
//! scratch. Nothing here caches a total, so removing a transaction from the
//! snapshot is all it takes to remove it from every aggregate.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracker_domain::{Money, Transaction, TransactionKind};

/// Which sign convention applies when summing a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// The user's own ledger: income adds, expenses subtract.
    Personal,
    /// A ledger shared with one friend: what I paid for them adds to what they
    /// owe me, what they paid subtracts from it.
    Counterparty,
}

impl Perspective {
    /// Returns `+1`, `-1`, or `0` for kinds that do not belong to this ledger.
    pub fn sign(self, kind: TransactionKind) -> i64 {
        match (self, kind) {
            (Perspective::Personal, TransactionKind::Income) => 1,
            (Perspective::Personal, TransactionKind::Expense) => -1,
            (Perspective::Counterparty, TransactionKind::Debt) => 1,
            (Perspective::Counterparty, TransactionKind::Payment) => -1,
            _ => 0,
        }
    }

    pub fn accepts(self, kind: TransactionKind) -> bool {
        self.sign(kind) != 0
    }

    pub fn label(self) -> &'static str {
        match self {
            Perspective::Personal => "personal",
            Perspective::Counterparty => "friend",
        }
    }
}

pub fn signed_amount(transaction: &Transaction, perspective: Perspective) -> Money {
    transaction.amount.times(perspective.sign(transaction.kind))
}

/// `Σ amount × sign(kind)` over the snapshot.
pub fn balance<'a, I>(transactions: I, perspective: Perspective) -> Money
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .map(|txn| signed_amount(txn, perspective))
        .sum()
}

pub fn personal_balance(transactions: &[Transaction]) -> Money {
    balance(transactions, Perspective::Personal)
}

pub fn counterparty_balance(transactions: &[Transaction]) -> Money {
    balance(transactions, Perspective::Counterparty)
}

/// Where the user stands with a friend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtStanding {
    /// The friend owes the user this much.
    ToReceive(Money),
    /// The user owes the friend this much.
    ToPay(Money),
    Settled,
}

impl DebtStanding {
    pub fn from_balance(balance: Money) -> Self {
        if balance.is_positive() {
            DebtStanding::ToReceive(balance)
        } else if balance.is_negative() {
            DebtStanding::ToPay(balance.abs())
        } else {
            DebtStanding::Settled
        }
    }

    /// Unsigned amount outstanding.
    pub fn amount(self) -> Money {
        match self {
            DebtStanding::ToReceive(amount) | DebtStanding::ToPay(amount) => amount,
            DebtStanding::Settled => Money::ZERO,
        }
    }
}

impl fmt::Display for DebtStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtStanding::ToReceive(amount) => write!(f, "To receive: {amount}"),
            DebtStanding::ToPay(amount) => write!(f, "To pay: {amount}"),
            DebtStanding::Settled => f.write_str("Settled"),
        }
    }
}

/// Fraction of the savings target reached, always within `[0, 1]`.
///
/// Negative balances count as zero progress; a non-positive target yields `0`.
pub fn progress(balance: Money, target: Money) -> f64 {
    if !target.is_positive() {
        return 0.0;
    }
    let reached = if balance.is_negative() {
        Money::ZERO
    } else {
        balance
    };
    reached
        .ratio_to(target)
        .map(|ratio| ratio.clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

pub const WEEK_BUCKETS: usize = 4;
pub const WEEK_LABELS: [&str; WEEK_BUCKETS] = ["Week 1", "Week 2", "Week 3", "Week 4"];

/// Bucket for a day of the month: days 1-7 -> 0, 8-14 -> 1, 15-21 -> 2, 22+ -> 3.
pub fn week_index(day_of_month: u32) -> usize {
    let index = (day_of_month.max(1) - 1) / 7;
    (index as usize).min(WEEK_BUCKETS - 1)
}

/// Expense totals for the four week buckets of one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklySpending {
    pub buckets: [Money; WEEK_BUCKETS],
}

impl WeeklySpending {
    pub fn total(&self) -> Money {
        self.buckets.iter().sum()
    }

    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, Money)> + '_ {
        WEEK_LABELS.iter().copied().zip(self.buckets.iter().copied())
    }

    /// Largest bucket, used to scale charts.
    pub fn peak(&self) -> Money {
        self.buckets.iter().copied().max().unwrap_or(Money::ZERO)
    }
}

fn in_month(date: DateTime<Utc>, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

/// Groups this month's expenses by week, summing whole cents.
pub fn weekly_expenses<'a, I>(transactions: I, reference: NaiveDate) -> WeeklySpending
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut spending = WeeklySpending::default();
    for txn in transactions {
        if txn.kind != TransactionKind::Expense || !in_month(txn.date, reference) {
            continue;
        }
        spending.buckets[week_index(txn.date.day())] += txn.amount;
    }
    spending
}

/// Total expenses in the calendar month containing `reference`.
pub fn monthly_expense_total<'a, I>(transactions: I, reference: NaiveDate) -> Money
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|txn| txn.kind == TransactionKind::Expense && in_month(txn.date, reference))
        .map(|txn| txn.amount)
        .sum()
}

/// One row of the recent-activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub id: String,
    pub description: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub date: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn is_inflow(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Amount with an explicit sign, e.g. `+100.00` or `-40.00`.
    pub fn signed_display(&self) -> String {
        let sign = if self.is_inflow() { '+' } else { '-' };
        format!("{sign}{}", self.amount)
    }
}

/// Transactions ordered newest first. Ties keep a stable id order.
pub fn sorted_newest_first(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    ordered
}

/// The `limit` most recent transactions.
pub fn recent_activity(transactions: &[Transaction], limit: usize) -> Vec<ActivityEntry> {
    sorted_newest_first(transactions)
        .into_iter()
        .take(limit)
        .map(|txn| ActivityEntry {
            id: txn.id.clone(),
            description: txn.description.clone(),
            kind: txn.kind,
            amount: txn.amount,
            date: txn.date,
        })
        .collect()
}
