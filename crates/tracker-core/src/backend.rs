//! The boundary to the hosted backend: an authentication provider and a
//! schemaless document store with live-update subscriptions.

use std::sync::{
    mpsc::{Receiver, TryRecvError},
    Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{time::Clock, CoreError};

/// The account the provider considers signed in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// Authentication half of the backend.
pub trait AuthProvider: Send + Sync {
    /// Registers a new account and signs it in.
    fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;
    /// Starts a password reset for `email`. Delivery of the reset code is the provider's business.
    fn send_password_reset(&self, email: &str) -> Result<(), CoreError>;
    fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<(), CoreError>;
    fn sign_out(&self) -> Result<(), CoreError>;
    fn current_user(&self) -> Option<AuthUser>;
}

/// A stored document: backend-assigned id plus arbitrary JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// Notification pushed to subscribers after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
    pub document_id: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Returns `true` when a subscription on `path` should see this event.
    /// `path` is either a collection path or a single document path.
    pub fn matches(&self, path: &str) -> bool {
        if self.collection == path {
            return true;
        }
        path.strip_prefix(self.collection.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|id| id == self.document_id)
    }
}

/// Handle on a live-update channel. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    path: String,
    receiver: Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn new(path: impl Into<String>, receiver: Receiver<ChangeEvent>) -> Self {
        Self {
            path: path.into(),
            receiver,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns every event delivered since the last drain without blocking.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

/// Document half of the backend. Collection paths look like
/// `users/{uid}/transactions`; see [`paths`].
pub trait DocumentStore: Send + Sync {
    /// Adds a document under a generated id and returns that id.
    fn add(&self, collection: &str, data: Value) -> Result<String, CoreError>;
    /// Creates or replaces the document at `collection/id`.
    fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), CoreError>;
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoreError>;
    fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError>;
    /// Merges the top-level fields of `patch` into an existing document.
    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), CoreError>;
    /// Deletes a document. Deleting a missing document is not an error.
    fn delete(&self, collection: &str, id: &str) -> Result<(), CoreError>;
    /// Deletes every document in a collection and returns how many were removed.
    fn delete_collection(&self, collection: &str) -> Result<usize, CoreError>;
    fn subscribe(&self, path: &str) -> Result<Subscription, CoreError>;
}

/// Collection and document paths used by the tracker.
pub mod paths {
    pub const USERS: &str = "users";

    pub fn user_document(uid: &str) -> String {
        format!("{USERS}/{uid}")
    }

    pub fn transactions(uid: &str) -> String {
        format!("{USERS}/{uid}/transactions")
    }

    pub fn friends(uid: &str) -> String {
        format!("{USERS}/{uid}/friends")
    }

    pub fn friend_transactions(uid: &str, friend_id: &str) -> String {
        format!("{USERS}/{uid}/friends/{friend_id}/transactions")
    }
}

/// Shared handle every service holds onto.
#[derive(Clone)]
pub struct BackendClient {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DocumentStore>,
    pub clock: Arc<dyn Clock>,
}

impl BackendClient {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { auth, store, clock }
    }

    /// Returns the signed-in user or [`CoreError::NotAuthenticated`].
    pub fn require_user(&self) -> Result<AuthUser, CoreError> {
        self.auth.current_user().ok_or(CoreError::NotAuthenticated)
    }
}
