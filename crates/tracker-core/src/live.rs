use std::collections::BTreeMap;

use crate::{
    backend::{paths, BackendClient, Subscription},
    dashboard_service::{DashboardService, DashboardSnapshot},
    CoreError,
};

/// Dashboard kept current by change notifications.
///
/// Holds subscriptions on the user's transactions, friends and profile
/// document, plus one per friend ledger. [`LiveDashboard::poll`] recomputes
/// the whole snapshot whenever any of them delivered an event. Dropping the
/// value unsubscribes.
pub struct LiveDashboard {
    client: BackendClient,
    recent_limit: usize,
    subscriptions: Vec<Subscription>,
    friend_ledgers: BTreeMap<String, Subscription>,
    current: DashboardSnapshot,
    recomputes: usize,
    /// Set while notifications arrived that no snapshot has reflected yet.
    stale: bool,
}

impl LiveDashboard {
    pub fn start(client: BackendClient, recent_limit: usize) -> Result<Self, CoreError> {
        let user = client.require_user()?;
        let subscriptions = vec![
            client.store.subscribe(&paths::transactions(&user.uid))?,
            client.store.subscribe(&paths::friends(&user.uid))?,
            client.store.subscribe(&paths::user_document(&user.uid))?,
        ];
        let current = DashboardService::snapshot(&client, recent_limit)?;
        tracing::debug!(uid = %user.uid, "live dashboard started");
        let mut live = Self {
            client,
            recent_limit,
            subscriptions,
            friend_ledgers: BTreeMap::new(),
            current,
            recomputes: 0,
            stale: false,
        };
        live.follow_friend_ledgers()?;
        Ok(live)
    }

    pub fn current(&self) -> &DashboardSnapshot {
        &self.current
    }

    /// Number of recomputations triggered by notifications so far.
    pub fn recomputes(&self) -> usize {
        self.recomputes
    }

    /// Drains pending notifications and recomputes when there were any.
    ///
    /// Returns whether the snapshot was rebuilt. On a backend error the
    /// previous snapshot stays in place and the next call retries.
    pub fn poll(&mut self) -> Result<bool, CoreError> {
        let pending: usize = self
            .subscriptions
            .iter()
            .chain(self.friend_ledgers.values())
            .map(|subscription| subscription.drain().len())
            .sum();
        self.stale |= pending > 0;
        if !self.stale {
            return Ok(false);
        }
        tracing::debug!(events = pending, "recomputing dashboard");
        self.current = DashboardService::snapshot(&self.client, self.recent_limit)?;
        self.stale = false;
        self.recomputes += 1;
        self.follow_friend_ledgers()?;
        Ok(true)
    }

    /// Subscribes to the ledger of every friend in the current snapshot and
    /// drops subscriptions for friends that are gone.
    fn follow_friend_ledgers(&mut self) -> Result<(), CoreError> {
        let user = self.client.require_user()?;
        let friend_ids: Vec<String> = self
            .current
            .friends
            .iter()
            .map(|entry| entry.friend.id.clone())
            .collect();
        self.friend_ledgers
            .retain(|id, _| friend_ids.iter().any(|friend_id| friend_id == id));
        for id in friend_ids {
            if !self.friend_ledgers.contains_key(&id) {
                let subscription = self
                    .client
                    .store
                    .subscribe(&paths::friend_transactions(&user.uid, &id))?;
                self.friend_ledgers.insert(id, subscription);
            }
        }
        Ok(())
    }
}
