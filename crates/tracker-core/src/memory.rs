//! In-process backend used by tests and as the engine behind the JSON file store.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    backend::{
        AuthProvider, AuthUser, ChangeEvent, ChangeKind, Document, DocumentStore, Subscription,
    },
    validation, AuthErrorCode, CoreError,
};

const MIN_PASSWORD_LEN: usize = 6;

/// Stored credentials for one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    pub uid: String,
    pub email: String,
    pub salt: String,
    pub password_hash: String,
}

impl AccountRecord {
    fn new(email: &str, password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        Self {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            password_hash: hash_password(&salt, password),
            salt,
        }
    }

    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

/// Everything the backend knows, in a form that can be written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendState {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountRecord>,
    #[serde(default)]
    pub session: Option<AuthUser>,
    #[serde(default)]
    pub reset_codes: BTreeMap<String, String>,
    #[serde(default)]
    pub collections: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Backend holding its state in memory.
///
/// Writes notify subscribers synchronously. [`MemoryBackend::set_online`]
/// simulates losing connectivity so callers can exercise their error paths.
pub struct MemoryBackend {
    state: RwLock<BackendState>,
    listeners: Mutex<Vec<(String, mpsc::Sender<ChangeEvent>)>>,
    /// Events buffered while a transaction is open.
    held: Mutex<Option<Vec<ChangeEvent>>>,
    transaction: Mutex<()>,
    online: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::from_state(BackendState::default())
    }

    pub fn from_state(state: BackendState) -> Self {
        Self {
            state: RwLock::new(state),
            listeners: Mutex::new(Vec::new()),
            held: Mutex::new(None),
            transaction: Mutex::new(()),
            online: AtomicBool::new(true),
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> Result<BackendState, CoreError> {
        Ok(self.read()?.clone())
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of subscriptions whose receiver is still alive as of the last write.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Looks up the outstanding reset code for `email`, if any.
    pub fn pending_reset_code(&self, email: &str) -> Option<String> {
        let key = normalize_email(email);
        let state = self.read().ok()?;
        state
            .reset_codes
            .iter()
            .find(|(_, owner)| **owner == key)
            .map(|(code, _)| code.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BackendState>, CoreError> {
        self.state
            .read()
            .map_err(|_| CoreError::Backend("backend state lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BackendState>, CoreError> {
        self.state
            .write()
            .map_err(|_| CoreError::Backend("backend state lock poisoned".into()))
    }

    fn ensure_online(&self) -> Result<(), CoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::Backend("network request failed".into()))
        }
    }

    fn ensure_auth_online(&self) -> Result<(), CoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthErrorCode::NetworkRequestFailed.into())
        }
    }

    fn notify(&self, collection: &str, document_id: &str, kind: ChangeKind) {
        let event = ChangeEvent {
            collection: collection.to_string(),
            document_id: document_id.to_string(),
            kind,
        };
        if let Ok(mut held) = self.held.lock() {
            if let Some(buffer) = held.as_mut() {
                buffer.push(event);
                return;
            }
        }
        self.deliver(&event);
    }

    fn deliver(&self, event: &ChangeEvent) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(path, sender)| {
                if event.matches(path) {
                    sender.send(event.clone()).is_ok()
                } else {
                    true
                }
            });
        }
    }

    /// Runs `write`, then hands the resulting state to `commit`.
    ///
    /// Subscribers hear about the changes only once `commit` succeeds. When
    /// either step fails the state is rolled back and the events are dropped.
    /// Writes made outside a transaction while one is open are buffered with it.
    pub fn transact<T>(
        &self,
        write: impl FnOnce(&Self) -> Result<T, CoreError>,
        commit: impl FnOnce(&BackendState) -> Result<(), CoreError>,
    ) -> Result<T, CoreError> {
        let _serial = self
            .transaction
            .lock()
            .map_err(|_| CoreError::Backend("transaction lock poisoned".into()))?;
        let before = self.snapshot()?;
        if let Ok(mut held) = self.held.lock() {
            *held = Some(Vec::new());
        }

        let outcome = write(self).and_then(|value| {
            commit(&*self.read()?)?;
            Ok(value)
        });

        let events = self
            .held
            .lock()
            .ok()
            .and_then(|mut held| held.take())
            .unwrap_or_default();
        match outcome {
            Ok(value) => {
                for event in &events {
                    self.deliver(event);
                }
                Ok(value)
            }
            Err(err) => {
                if let Ok(mut state) = self.write() {
                    *state = before;
                }
                tracing::debug!(error = %err, dropped = events.len(), "transaction rolled back");
                Err(err)
            }
        }
    }
}

impl AuthProvider for MemoryBackend {
    fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.ensure_auth_online()?;
        if validation::validate_email(email).is_err() {
            return Err(AuthErrorCode::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthErrorCode::WeakPassword.into());
        }
        let key = normalize_email(email);
        let mut state = self.write()?;
        if state.accounts.contains_key(&key) {
            return Err(AuthErrorCode::EmailAlreadyInUse.into());
        }
        let record = AccountRecord::new(&key, password);
        let user = AuthUser {
            uid: record.uid.clone(),
            email: record.email.clone(),
        };
        state.accounts.insert(key, record);
        state.session = Some(user.clone());
        tracing::info!(uid = %user.uid, "account created");
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.ensure_auth_online()?;
        if validation::validate_email(email).is_err() {
            return Err(AuthErrorCode::InvalidEmail.into());
        }
        let key = normalize_email(email);
        let mut state = self.write()?;
        let record = state
            .accounts
            .get(&key)
            .ok_or(AuthErrorCode::UserNotFound)?;
        if !record.verify(password) {
            return Err(AuthErrorCode::WrongPassword.into());
        }
        let user = AuthUser {
            uid: record.uid.clone(),
            email: record.email.clone(),
        };
        state.session = Some(user.clone());
        Ok(user)
    }

    fn send_password_reset(&self, email: &str) -> Result<(), CoreError> {
        self.ensure_auth_online()?;
        if validation::validate_email(email).is_err() {
            return Err(AuthErrorCode::InvalidEmail.into());
        }
        let key = normalize_email(email);
        let mut state = self.write()?;
        if !state.accounts.contains_key(&key) {
            return Err(AuthErrorCode::UserNotFound.into());
        }
        state.reset_codes.retain(|_, owner| *owner != key);
        let code = Uuid::new_v4().simple().to_string();
        tracing::info!(email = %key, %code, "password reset code issued");
        state.reset_codes.insert(code, key);
        Ok(())
    }

    fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<(), CoreError> {
        self.ensure_auth_online()?;
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthErrorCode::WeakPassword.into());
        }
        let mut state = self.write()?;
        let email = state
            .reset_codes
            .remove(code.trim())
            .ok_or(AuthErrorCode::InvalidResetToken)?;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or(AuthErrorCode::UserNotFound)?;
        account.salt = Uuid::new_v4().simple().to_string();
        account.password_hash = hash_password(&account.salt, new_password);
        Ok(())
    }

    fn sign_out(&self) -> Result<(), CoreError> {
        self.write()?.session = None;
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.read().ok().and_then(|state| state.session.clone())
    }
}

impl DocumentStore for MemoryBackend {
    fn add(&self, collection: &str, data: Value) -> Result<String, CoreError> {
        self.ensure_online()?;
        let id = Uuid::new_v4().simple().to_string();
        self.write()?
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        self.notify(collection, &id, ChangeKind::Added);
        Ok(id)
    }

    fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), CoreError> {
        self.ensure_online()?;
        let previous = self
            .write()?
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        let kind = if previous.is_some() {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        self.notify(collection, id, kind);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoreError> {
        self.ensure_online()?;
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError> {
        self.ensure_online()?;
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), CoreError> {
        self.ensure_online()?;
        let Value::Object(fields) = patch else {
            return Err(CoreError::Backend("update patch must be an object".into()));
        };
        {
            let mut state = self.write()?;
            let document = state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| CoreError::NotFound(format!("{collection}/{id}")))?;
            match document {
                Value::Object(existing) => existing.extend(fields),
                other => *other = Value::Object(fields),
            }
        }
        self.notify(collection, id, ChangeKind::Modified);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), CoreError> {
        self.ensure_online()?;
        let removed = self
            .write()?
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_some() {
            self.notify(collection, id, ChangeKind::Removed);
        }
        Ok(())
    }

    fn delete_collection(&self, collection: &str) -> Result<usize, CoreError> {
        self.ensure_online()?;
        let removed = self
            .write()?
            .collections
            .remove(collection)
            .unwrap_or_default();
        for id in removed.keys() {
            self.notify(collection, id, ChangeKind::Removed);
        }
        Ok(removed.len())
    }

    fn subscribe(&self, path: &str) -> Result<Subscription, CoreError> {
        self.ensure_online()?;
        let (sender, receiver) = mpsc::channel();
        self.listeners
            .lock()
            .map_err(|_| CoreError::Backend("listener lock poisoned".into()))?
            .push((path.to_string(), sender));
        Ok(Subscription::new(path, receiver))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_codes_follow_provider_rules() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.create_user("not-an-email", "secret1"),
            Err(CoreError::Auth(AuthErrorCode::InvalidEmail))
        ));
        assert!(matches!(
            backend.create_user("ada@example.com", "abc"),
            Err(CoreError::Auth(AuthErrorCode::WeakPassword))
        ));
        backend
            .create_user("ada@example.com", "secret1")
            .expect("create account");
        assert!(matches!(
            backend.create_user("ADA@example.com", "secret2"),
            Err(CoreError::Auth(AuthErrorCode::EmailAlreadyInUse))
        ));
        assert!(matches!(
            backend.sign_in("ada@example.com", "wrong!!"),
            Err(CoreError::Auth(AuthErrorCode::WrongPassword))
        ));
        assert!(matches!(
            backend.sign_in("bob@example.com", "secret1"),
            Err(CoreError::Auth(AuthErrorCode::UserNotFound))
        ));
    }

    #[test]
    fn offline_backend_reports_network_failures() {
        let backend = MemoryBackend::new();
        backend.set_online(false);
        assert!(matches!(
            backend.sign_in("ada@example.com", "secret1"),
            Err(CoreError::Auth(AuthErrorCode::NetworkRequestFailed))
        ));
        assert!(matches!(backend.list("users"), Err(CoreError::Backend(_))));
    }

    #[test]
    fn password_reset_replaces_credentials() {
        let backend = MemoryBackend::new();
        backend.create_user("ada@example.com", "secret1").unwrap();
        backend.send_password_reset("ada@example.com").unwrap();
        let code = backend
            .pending_reset_code("ada@example.com")
            .expect("code issued");
        backend.confirm_password_reset(&code, "newpass1").unwrap();
        assert!(backend.sign_in("ada@example.com", "secret1").is_err());
        assert!(backend.sign_in("ada@example.com", "newpass1").is_ok());
        assert!(matches!(
            backend.confirm_password_reset(&code, "another1"),
            Err(CoreError::Auth(AuthErrorCode::InvalidResetToken))
        ));
    }

    #[test]
    fn update_merges_fields_and_requires_document() {
        let backend = MemoryBackend::new();
        backend
            .set("users", "u1", json!({"name": "Ada", "targetBalance": 100.0}))
            .unwrap();
        backend
            .update("users", "u1", json!({"targetBalance": 250.0}))
            .unwrap();
        let doc = backend.get("users", "u1").unwrap().unwrap();
        assert_eq!(doc.data["name"], "Ada");
        assert_eq!(doc.data["targetBalance"], 250.0);
        assert!(matches!(
            backend.update("users", "missing", json!({})),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let backend = MemoryBackend::new();
        let subscription = backend.subscribe("users/u1/transactions").unwrap();
        backend
            .add("users/u1/transactions", json!({"amount": 1}))
            .unwrap();
        assert_eq!(subscription.drain().len(), 1);
        drop(subscription);
        backend
            .add("users/u1/transactions", json!({"amount": 2}))
            .unwrap();
        assert_eq!(backend.listener_count(), 0);
    }

    #[test]
    fn failed_commit_rolls_back_and_stays_silent() {
        let backend = MemoryBackend::new();
        let subscription = backend.subscribe("users/u1/friends").unwrap();
        let result = backend.transact(
            |inner| inner.add("users/u1/friends", json!({"name": "Bob"})),
            |_| Err(CoreError::Backend("disk full".into())),
        );
        assert!(result.is_err());
        assert!(backend.list("users/u1/friends").unwrap().is_empty());
        assert!(subscription.drain().is_empty());

        let committed = backend.transact(
            |inner| inner.add("users/u1/friends", json!({"name": "Bob"})),
            |state| {
                assert_eq!(state.collections["users/u1/friends"].len(), 1);
                Ok(())
            },
        );
        assert!(committed.is_ok());
        assert_eq!(subscription.drain().len(), 1);
    }
}
