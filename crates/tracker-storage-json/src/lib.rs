//! File-backed backend: the in-memory engine plus a single `store.json`
//! rewritten after every write. A write the disk refuses is rolled back.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracker_core::{
    backend::{AuthProvider, AuthUser, Document, DocumentStore, Subscription},
    BackendState, CoreError, MemoryBackend,
};

pub const STORE_FILE: &str = "store.json";
const TMP_SUFFIX: &str = "tmp";

/// Backend persisting accounts, session and documents under one directory.
pub struct JsonBackend {
    path: PathBuf,
    inner: MemoryBackend,
}

impl JsonBackend {
    /// Opens (or creates) the store in `root`.
    pub fn open(root: &Path) -> Result<Self, CoreError> {
        fs::create_dir_all(root)?;
        let path = root.join(STORE_FILE);
        let state = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str::<BackendState>(&data)?
        } else {
            BackendState::default()
        };
        tracing::debug!(path = %path.display(), accounts = state.accounts.len(), "store opened");
        Ok(Self {
            path,
            inner: MemoryBackend::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Outstanding password-reset code for `email`, as the local stand-in
    /// for the email a hosted provider would send.
    pub fn pending_reset_code(&self, email: &str) -> Option<String> {
        self.inner.pending_reset_code(email)
    }

    /// Applies `write` to the in-memory state and commits it to disk.
    fn persisting<T>(
        &self,
        write: impl FnOnce(&MemoryBackend) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        self.inner
            .transact(write, |state| write_store(&self.path, state))
    }
}

impl AuthProvider for JsonBackend {
    fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.persisting(|inner| inner.create_user(email, password))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.persisting(|inner| inner.sign_in(email, password))
    }

    fn send_password_reset(&self, email: &str) -> Result<(), CoreError> {
        self.persisting(|inner| inner.send_password_reset(email))
    }

    fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<(), CoreError> {
        self.persisting(|inner| inner.confirm_password_reset(code, new_password))
    }

    fn sign_out(&self) -> Result<(), CoreError> {
        self.persisting(|inner| inner.sign_out())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.inner.current_user()
    }
}

impl DocumentStore for JsonBackend {
    fn add(&self, collection: &str, data: Value) -> Result<String, CoreError> {
        self.persisting(|inner| inner.add(collection, data))
    }

    fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), CoreError> {
        self.persisting(|inner| inner.set(collection, id, data))
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoreError> {
        self.inner.get(collection, id)
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError> {
        self.inner.list(collection)
    }

    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), CoreError> {
        self.persisting(|inner| inner.update(collection, id, patch))
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), CoreError> {
        self.persisting(|inner| inner.delete(collection, id))
    }

    fn delete_collection(&self, collection: &str) -> Result<usize, CoreError> {
        self.persisting(|inner| inner.delete_collection(collection))
    }

    fn subscribe(&self, path: &str) -> Result<Subscription, CoreError> {
        self.inner.subscribe(path)
    }
}

fn write_store(path: &Path, state: &BackendState) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
