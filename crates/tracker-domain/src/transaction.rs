//! Domain models for ledger transactions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{common::*, money::Money};

/// Classifies a transaction. The sign of its contribution to a balance is
/// derived from the kind, never from the stored amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    /// "I paid" on behalf of a friend; increases what the friend owes me.
    Debt,
    /// "They paid"; decreases what the friend owes me.
    Payment,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 4] = [
        TransactionKind::Income,
        TransactionKind::Expense,
        TransactionKind::Debt,
        TransactionKind::Payment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Debt => "debt",
            TransactionKind::Payment => "payment",
        }
    }

    /// Returns `true` for kinds recorded against a friend rather than the user.
    pub fn is_counterparty(self) -> bool {
        matches!(self, TransactionKind::Debt | TransactionKind::Payment)
    }

    /// Description used when the user does not supply one.
    pub fn default_description(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income Transaction",
            TransactionKind::Expense => "Expense Transaction",
            TransactionKind::Debt => "You paid",
            TransactionKind::Payment => "They paid",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::Debt => "Debt",
            TransactionKind::Payment => "Payment",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction type `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "debt" | "i-paid" => Ok(TransactionKind::Debt),
            "payment" | "they-paid" => Ok(TransactionKind::Payment),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Field set written to the document store when a transaction is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub description: String,
    pub owner_id: String,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        date: DateTime<Utc>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            kind,
            date,
            description: kind.default_description().to_string(),
            owner_id: owner_id.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.trim().is_empty() {
            self.description = description.trim().to_string();
        }
        self
    }
}

/// A stored transaction. Immutable once created; only deletion is allowed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub description: String,
    pub owner_id: String,
}

impl Transaction {
    pub fn from_new(id: impl Into<String>, new: NewTransaction) -> Self {
        Self {
            id: id.into(),
            kind: new.kind,
            amount: new.amount,
            date: new.date,
            description: new.description,
            owner_id: new.owner_id,
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} of {} ({})", self.kind, self.amount, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_transaction_serializes_with_document_field_names() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let new = NewTransaction::new(
            TransactionKind::Expense,
            Money::from_cents(4000),
            date,
            "uid-1",
        );
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["amount"], 40.0);
        assert_eq!(value["ownerId"], "uid-1");
        assert_eq!(value["description"], "Expense Transaction");
    }

    #[test]
    fn blank_description_keeps_default() {
        let new = NewTransaction::new(
            TransactionKind::Debt,
            Money::from_cents(100),
            Utc::now(),
            "uid",
        )
        .with_description("   ");
        assert_eq!(new.description, "You paid");
    }

    #[test]
    fn label_names_kind_amount_and_description() {
        let new = NewTransaction::new(
            TransactionKind::Income,
            Money::from_cents(10_050),
            Utc::now(),
            "uid",
        )
        .with_description("Salary");
        let txn = Transaction::from_new("abc123", new);
        assert_eq!(txn.id(), "abc123");
        assert_eq!(txn.display_label(), "Income of 100.50 (Salary)");
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("I-PAID".parse(), Ok(TransactionKind::Debt));
        assert_eq!("payment".parse(), Ok(TransactionKind::Payment));
        assert!("gift".parse::<TransactionKind>().is_err());
    }
}
