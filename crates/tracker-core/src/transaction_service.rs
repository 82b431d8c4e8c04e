//! Personal income and expense entries.

use tracker_domain::{Money, NewTransaction, Transaction, TransactionKind};

use crate::{
    backend::{paths, BackendClient},
    ledger::Perspective,
    records::{self, Decoded},
    validation, CoreError, ValidationError,
};

/// Rejects kinds that do not belong on the given ledger.
pub(crate) fn ensure_kind(
    kind: TransactionKind,
    perspective: Perspective,
) -> Result<(), ValidationError> {
    if perspective.accepts(kind) {
        Ok(())
    } else {
        Err(ValidationError::WrongLedger {
            kind: kind.as_str(),
            ledger: perspective.label(),
        })
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Records an income or expense entry and returns the stored transaction.
    pub fn add(
        client: &BackendClient,
        kind: TransactionKind,
        amount: Money,
        description: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        ensure_kind(kind, Perspective::Personal)?;
        let amount = validation::ensure_positive(amount)?;
        let user = client.require_user()?;

        let mut new = NewTransaction::new(kind, amount, client.clock.now(), user.uid.clone());
        if let Some(description) = description {
            new = new.with_description(description);
        }
        let id = client
            .store
            .add(&paths::transactions(&user.uid), serde_json::to_value(&new)?)?;
        tracing::info!(%id, %kind, %amount, "transaction added");
        Ok(Transaction::from_new(id, new))
    }

    /// Like [`TransactionService::add`], parsing the amount from keypad input.
    pub fn add_from_input(
        client: &BackendClient,
        kind: TransactionKind,
        raw_amount: &str,
        description: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        let amount = validation::parse_amount(raw_amount)?;
        Self::add(client, kind, amount, description)
    }

    /// Deletes a transaction. Aggregates pick up the removal on their next recompute.
    pub fn remove(client: &BackendClient, id: &str) -> Result<(), CoreError> {
        let user = client.require_user()?;
        let collection = paths::transactions(&user.uid);
        if client.store.get(&collection, id)?.is_none() {
            return Err(CoreError::NotFound(format!("transaction {id}")));
        }
        client.store.delete(&collection, id)?;
        tracing::info!(%id, "transaction removed");
        Ok(())
    }

    /// Fetches and decodes the signed-in user's transactions.
    pub fn list(client: &BackendClient) -> Result<Decoded<Transaction>, CoreError> {
        let user = client.require_user()?;
        let documents = client.store.list(&paths::transactions(&user.uid))?;
        Ok(records::decode_transactions(
            &documents,
            &user.uid,
            client.clock.now(),
        ))
    }
}
