//! # Browser localStorage store: web persistence
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] implementation used on the
//! **web platform**. It writes straight into `window.localStorage` through
//! [`web_sys::Storage`], which is synchronous, so every record-store operation
//! completes inside the event handler that triggered it.
//!
//! ## Keys
//!
//! Every key is prefixed with the store's namespace so several apps (or several
//! test profiles) can share one origin:
//!
//! | Namespace | Logical key | localStorage key |
//! |-----------|-------------|------------------|
//! | `"accounts"` | `users` | `accounts_users` |
//! | `"accounts"` | `current_user` | `accounts_current_user` |
//!
//! ## Error handling
//!
//! A missing `window` or a disabled `localStorage` (private browsing, sandboxed
//! iframes) surfaces as [`StoreError::Unavailable`]. Quota failures on write
//! surface as [`StoreError::Write`].

use web_sys::Storage;

use crate::error::StoreError;
use crate::repo::KeyValueStore;

const DEFAULT_NAMESPACE: &str = "accounts";

/// localStorage-backed KeyValueStore for the web platform.
#[derive(Clone, Debug)]
pub struct LocalStorageStore {
    namespace: String,
}

impl LocalStorageStore {
    /// Store using the default `"accounts"` namespace.
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    fn storage(&self) -> Result<Storage, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(&self.key(key))
            .map_err(|e| StoreError::read(key, format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(&self.key(key), value)
            .map_err(|e| StoreError::write(key, format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(&self.key(key))
            .map_err(|e| StoreError::write(key, format!("{e:?}")))
    }
}
