//! Friends and the debt ledgers shared with them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracker_domain::{Friend, Money, NewFriend, NewTransaction, Transaction, TransactionKind};

use crate::{
    backend::{paths, BackendClient},
    ledger::{self, DebtStanding, Perspective},
    records::{self, DecodeReport, Decoded},
    transaction_service::ensure_kind,
    validation, CoreError, ValidationError,
};

/// A friend together with every entry on the shared ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendLedger {
    pub friend: Friend,
    pub transactions: Vec<Transaction>,
    /// Positive when the friend owes the user.
    pub balance: Money,
}

impl FriendLedger {
    pub fn new(friend: Friend, transactions: Vec<Transaction>) -> Self {
        let balance = ledger::counterparty_balance(&transactions);
        Self {
            friend,
            transactions,
            balance,
        }
    }

    pub fn standing(&self) -> DebtStanding {
        DebtStanding::from_balance(self.balance)
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.transactions.iter().map(|txn| txn.date).max()
    }

    /// Entries newest first.
    pub fn history(&self) -> Vec<&Transaction> {
        ledger::sorted_newest_first(&self.transactions)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FriendFilter {
    #[default]
    All,
    ToReceive,
    ToPay,
}

impl FriendFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(FriendFilter::All),
            "receive" | "to-receive" | "owed" => Some(FriendFilter::ToReceive),
            "pay" | "to-pay" | "owe" => Some(FriendFilter::ToPay),
            _ => None,
        }
    }

    fn admits(self, balance: Money) -> bool {
        match self {
            FriendFilter::All => true,
            FriendFilter::ToReceive => balance.is_positive(),
            FriendFilter::ToPay => balance.is_negative(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FriendSort {
    #[default]
    Name,
    /// Largest balance first.
    Amount,
    /// Most recent entry first; friends without entries go last.
    Recent,
}

impl FriendSort {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Some(FriendSort::Name),
            "amount" | "balance" => Some(FriendSort::Amount),
            "recent" | "date" => Some(FriendSort::Recent),
            _ => None,
        }
    }
}

/// Search, filter and ordering applied to the friends list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendQuery {
    pub search: String,
    pub filter: FriendFilter,
    pub sort: FriendSort,
}

impl FriendQuery {
    pub fn apply<'a>(&self, ledgers: &'a [FriendLedger]) -> Vec<&'a FriendLedger> {
        let needle = self.search.trim().to_lowercase();
        let mut matched: Vec<&FriendLedger> = ledgers
            .iter()
            .filter(|entry| {
                needle.is_empty() || entry.friend.name.to_lowercase().contains(&needle)
            })
            .filter(|entry| self.filter.admits(entry.balance))
            .collect();
        matched.sort_by(|a, b| self.compare(a, b));
        matched
    }

    fn compare(&self, a: &FriendLedger, b: &FriendLedger) -> Ordering {
        let by_name = || {
            a.friend
                .name
                .to_lowercase()
                .cmp(&b.friend.name.to_lowercase())
        };
        match self.sort {
            FriendSort::Name => by_name(),
            FriendSort::Amount => b.balance.cmp(&a.balance).then_with(by_name),
            FriendSort::Recent => match (a.last_activity(), b.last_activity()) {
                (Some(left), Some(right)) => right.cmp(&left).then_with(by_name),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => by_name(),
            },
        }
    }
}

/// Totals across every friend ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebtTotals {
    pub to_receive: Money,
    pub to_pay: Money,
}

impl DebtTotals {
    pub fn from_ledgers(ledgers: &[FriendLedger]) -> Self {
        ledgers
            .iter()
            .fold(DebtTotals::default(), |mut totals, entry| {
                match entry.standing() {
                    DebtStanding::ToReceive(amount) => totals.to_receive += amount,
                    DebtStanding::ToPay(amount) => totals.to_pay += amount,
                    DebtStanding::Settled => {}
                }
                totals
            })
    }

    pub fn net(&self) -> Money {
        self.to_receive - self.to_pay
    }
}

pub struct FriendService;

impl FriendService {
    pub fn add_friend(client: &BackendClient, name: &str) -> Result<Friend, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingFriendName.into());
        }
        let user = client.require_user()?;
        let new = NewFriend {
            name: name.to_string(),
            owner_id: user.uid.clone(),
        };
        let id = client
            .store
            .add(&paths::friends(&user.uid), serde_json::to_value(&new)?)?;
        tracing::info!(%id, name, "friend added");
        Ok(Friend::from_new(id, new))
    }

    /// Removes a friend along with every entry on the shared ledger.
    pub fn remove_friend(client: &BackendClient, friend_id: &str) -> Result<usize, CoreError> {
        let user = client.require_user()?;
        let friends = paths::friends(&user.uid);
        if client.store.get(&friends, friend_id)?.is_none() {
            return Err(CoreError::NotFound(format!("friend {friend_id}")));
        }
        let removed = client
            .store
            .delete_collection(&paths::friend_transactions(&user.uid, friend_id))?;
        client.store.delete(&friends, friend_id)?;
        tracing::info!(%friend_id, entries = removed, "friend removed");
        Ok(removed)
    }

    pub fn list_friends(client: &BackendClient) -> Result<Decoded<Friend>, CoreError> {
        let user = client.require_user()?;
        let documents = client.store.list(&paths::friends(&user.uid))?;
        Ok(records::decode_friends(&documents, &user.uid))
    }

    /// Finds a friend by id, or by case-insensitive name when no id matches.
    pub fn find_friend(client: &BackendClient, key: &str) -> Result<Friend, CoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidationError::NoFriendSelected.into());
        }
        let friends = Self::list_friends(client)?.items;
        friends
            .iter()
            .find(|friend| friend.id == key)
            .or_else(|| {
                friends
                    .iter()
                    .find(|friend| friend.name.eq_ignore_ascii_case(key))
            })
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("friend {key}")))
    }

    pub fn ledger_for(
        client: &BackendClient,
        friend: &Friend,
    ) -> Result<Decoded<Transaction>, CoreError> {
        let user = client.require_user()?;
        let documents = client
            .store
            .list(&paths::friend_transactions(&user.uid, &friend.id))?;
        Ok(records::decode_transactions(
            &documents,
            &user.uid,
            client.clock.now(),
        ))
    }

    /// Every friend with the balance of the shared ledger.
    pub fn friends_with_ledgers(
        client: &BackendClient,
    ) -> Result<Decoded<FriendLedger>, CoreError> {
        let Decoded {
            items: friends,
            mut report,
        } = Self::list_friends(client)?;
        let mut items = Vec::with_capacity(friends.len());
        for friend in friends {
            let entries = Self::ledger_for(client, &friend)?;
            report.merge(entries.report);
            items.push(FriendLedger::new(friend, entries.items));
        }
        Ok(Decoded { items, report })
    }

    /// Records an entry on the ledger shared with `friend`. Only debt and
    /// payment kinds are accepted.
    pub fn record(
        client: &BackendClient,
        friend: &Friend,
        kind: TransactionKind,
        amount: Money,
        description: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        ensure_kind(kind, Perspective::Counterparty)?;
        let amount = validation::ensure_positive(amount)?;
        let user = client.require_user()?;

        let mut new = NewTransaction::new(kind, amount, client.clock.now(), user.uid.clone());
        if let Some(description) = description {
            new = new.with_description(description);
        }
        let id = client.store.add(
            &paths::friend_transactions(&user.uid, &friend.id),
            serde_json::to_value(&new)?,
        )?;
        tracing::info!(%id, friend = %friend.id, %kind, %amount, "debt entry recorded");
        Ok(Transaction::from_new(id, new))
    }

    pub fn record_from_input(
        client: &BackendClient,
        friend: &Friend,
        kind: TransactionKind,
        raw_amount: &str,
        description: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        let amount = validation::parse_amount(raw_amount)?;
        Self::record(client, friend, kind, amount, description)
    }

    pub fn remove_entry(
        client: &BackendClient,
        friend: &Friend,
        id: &str,
    ) -> Result<(), CoreError> {
        let user = client.require_user()?;
        let collection = paths::friend_transactions(&user.uid, &friend.id);
        if client.store.get(&collection, id)?.is_none() {
            return Err(CoreError::NotFound(format!("entry {id}")));
        }
        client.store.delete(&collection, id)?;
        tracing::info!(%id, friend = %friend.id, "debt entry removed");
        Ok(())
    }

    /// Fetches every ledger and applies `query` to it.
    pub fn query(
        client: &BackendClient,
        query: &FriendQuery,
    ) -> Result<(Vec<FriendLedger>, DecodeReport), CoreError> {
        let Decoded { items, report } = Self::friends_with_ledgers(client)?;
        let selected = query.apply(&items).into_iter().cloned().collect();
        Ok((selected, report))
    }
}
