//! # Record store: account persistence over an abstract key-value medium
//!
//! This module is the core of the storage layer. [`RecordStore`] keeps the user
//! collection and the session pointer in two values of a [`KeyValueStore`], so
//! the same logic runs against an in-memory map (tests), files (desktop) or the
//! browser's `localStorage` (web).
//!
//! ## [`KeyValueStore`] trait
//!
//! A synchronous interface with three methods: `get`, `set` and `remove` on
//! string keys and string values. Implementations live in sibling modules
//! ([`crate::memory`], `crate::file_store`, `crate::local_storage`).
//!
//! ## Persisted values
//!
//! | Key (configurable) | Value |
//! |--------------------|-------|
//! | `users` | JSON array of [`User`] records, in insertion order. |
//! | `current_user` | `"null"` when signed out, otherwise the user id in decimal. |
//!
//! ## Write path
//!
//! Every mutation reads the full collection, modifies it in memory and writes
//! the full collection back. There is no locking: the medium is assumed to have
//! a single writer, and concurrent writers would lose updates.
//!
//! ## Failure semantics
//!
//! | Situation | Result |
//! |-----------|--------|
//! | User, address or payment method not found | `Ok(None)` / `Ok(false)` |
//! | Stored JSON is corrupt | logged, treated as an empty collection |
//! | Medium fails a read during a lookup | logged, treated as an empty collection |
//! | Medium fails a read during a mutation | `Err(StoreError)`, nothing is written |
//! | Medium rejects a write | `Err(StoreError)` |
//!
//! ## Identifiers
//!
//! Ids are millisecond timestamps bumped past both the last id this store
//! issued and the largest id already in the target collection, so they are
//! unique and increasing even when several records are created within one
//! millisecond. Creation fails rather than reuse an id once `i64::MAX` is taken.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::models::*;

const NO_SESSION: &str = "null";

/// Synchronous string key-value medium.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Users, their nested collections, and the session pointer.
pub struct RecordStore<S: KeyValueStore> {
    store: S,
    config: StorageConfig,
    last_id: AtomicI64,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Open a record store, initialising missing values and purging reserved
    /// accounts.
    pub fn open(store: S, config: StorageConfig) -> Result<Self, StoreError> {
        let records = Self {
            store,
            config,
            last_id: AtomicI64::new(0),
        };
        records.initialize()?;
        Ok(records)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn initialize(&self) -> Result<(), StoreError> {
        if self.store.get(&self.config.users_key)?.is_none() {
            self.store.set(&self.config.users_key, "[]")?;
        }
        if self.store.get(&self.config.current_user_key)?.is_none() {
            self.store.set(&self.config.current_user_key, NO_SESSION)?;
        }
        self.purge_reserved_accounts()?;
        Ok(())
    }

    /// Remove users whose username is exactly one of the purged names, signing
    /// out if the session pointed at one of them. Returns how many were removed.
    pub fn purge_reserved_accounts(&self) -> Result<usize, StoreError> {
        let mut users = self.load_users_for_write()?;
        let before = users.len();
        let session = self.current_user_id();
        let mut session_purged = false;

        users.retain(|user| {
            let purge = self.config.purged_usernames.contains(&user.username);
            if purge && session == Some(user.id) {
                session_purged = true;
            }
            !purge
        });

        let removed = before - users.len();
        if removed > 0 {
            tracing::warn!("Removed {} reserved account(s) from storage", removed);
            self.write_users(&users)?;
        }
        if session_purged {
            self.clear_current_user()?;
        }
        Ok(removed)
    }


    /// Users for lookups. Medium failures degrade to an empty collection.
    fn read_users(&self) -> Vec<User> {
        self.load_users_for_write().unwrap_or_else(|e| {
            tracing::warn!("Failed to read users, treating as empty: {}", e);
            Vec::new()
        })
    }

    /// Users for a read-modify-write. Medium failures propagate so a mutation
    /// never writes back over a collection it could not read; corrupt JSON
    /// still counts as empty.
    fn load_users_for_write(&self) -> Result<Vec<User>, StoreError> {
        let key = &self.config.users_key;
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(e) => {
                tracing::warn!("Corrupt data under `{}`, treating as empty: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_users(&self, users: &[User]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(users)?;
        self.store.set(&self.config.users_key, &raw)?;
        tracing::debug!("Persisted {} user(s)", users.len());
        Ok(())
    }

    /// Next id strictly greater than `floor` and than every id issued before.
    fn next_id(&self, floor: RecordId) -> Result<RecordId, StoreError> {
        let exhausted = || StoreError::write(&self.config.users_key, "record ids exhausted");
        let candidate = current_millis().max(floor.checked_add(1).ok_or_else(exhausted)?);
        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(last.checked_add(1).ok_or_else(exhausted)?);
            match self
                .last_id
                .compare_exchange(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Ok(next),
                Err(actual) => last = actual,
            }
        }
    }


    /// All users in storage order.
    pub fn get_all_users(&self) -> Vec<User> {
        self.read_users()
    }

    pub fn get_user_by_id(&self, id: RecordId) -> Option<User> {
        self.read_users().into_iter().find(|u| u.id == id)
    }

    /// Case-insensitive match on the trimmed username.
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        let wanted = username.trim().to_lowercase();
        self.read_users()
            .into_iter()
            .find(|u| u.username.trim().to_lowercase() == wanted)
    }

    /// Exact, case-sensitive match.
    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.read_users().into_iter().find(|u| u.email == email)
    }

    /// Append a new user. Uniqueness of username and email is the caller's job.
    pub fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.load_users_for_write()?;
        let floor = users.iter().map(|u| u.id).max().unwrap_or(0);

        let user = User {
            id: self.next_id(floor)?,
            username: new_user.username,
            password: new_user.password,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            avatar: new_user.avatar,
            addresses: Vec::new(),
            payment_methods: Vec::new(),
            created_at: now(),
        };
        users.push(user.clone());
        self.write_users(&users)?;
        Ok(user)
    }

    /// Merge `patch` into the user. `Ok(None)` if there is no such user.
    pub fn update_user(&self, id: RecordId, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let mut users = self.load_users_for_write()?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        patch.apply(user);
        let updated = user.clone();
        self.write_users(&users)?;
        Ok(Some(updated))
    }

    /// Remove a user, signing out if they held the session.
    pub fn delete_user(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut users = self.load_users_for_write()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }
        self.write_users(&users)?;
        if self.current_user_id() == Some(id) {
            self.clear_current_user()?;
        }
        Ok(true)
    }


    /// The id the session points at, if any. Unparseable values count as none.
    pub fn current_user_id(&self) -> Option<RecordId> {
        match self.store.get(&self.config.current_user_key) {
            Ok(Some(raw)) => raw.trim().parse().ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read session pointer: {}", e);
                None
            }
        }
    }

    pub fn set_current_user(&self, id: RecordId) -> Result<(), StoreError> {
        self.store
            .set(&self.config.current_user_key, &id.to_string())
    }

    /// Resolve the session pointer to a user.
    pub fn get_current_user(&self) -> Option<User> {
        self.current_user_id().and_then(|id| self.get_user_by_id(id))
    }

    pub fn clear_current_user(&self) -> Result<(), StoreError> {
        self.store.set(&self.config.current_user_key, NO_SESSION)
    }


    /// Append an address. The first address of a user becomes the default.
    pub fn add_address(
        &self,
        user_id: RecordId,
        address: NewAddress,
    ) -> Result<Option<Address>, StoreError> {
        self.add_entry(user_id, address)
    }

    pub fn update_address(
        &self,
        user_id: RecordId,
        address_id: RecordId,
        patch: AddressPatch,
    ) -> Result<Option<Address>, StoreError> {
        self.update_entry(user_id, address_id, patch)
    }

    /// Remove an address. Returns whether the user exists.
    ///
    /// Deleting the default address leaves the user without a default; no
    /// other address is promoted.
    pub fn delete_address(&self, user_id: RecordId, address_id: RecordId) -> Result<bool, StoreError> {
        self.delete_entry::<Address>(user_id, address_id)
    }

    pub fn set_default_address(
        &self,
        user_id: RecordId,
        address_id: RecordId,
    ) -> Result<bool, StoreError> {
        self.set_default_entry::<Address>(user_id, address_id)
    }


    /// Append a payment method. `last4` must already be derived by the caller.
    pub fn add_payment_method(
        &self,
        user_id: RecordId,
        payment: NewPaymentMethod,
    ) -> Result<Option<PaymentMethod>, StoreError> {
        self.add_entry(user_id, payment)
    }

    pub fn update_payment_method(
        &self,
        user_id: RecordId,
        payment_id: RecordId,
        patch: PaymentPatch,
    ) -> Result<Option<PaymentMethod>, StoreError> {
        self.update_entry(user_id, payment_id, patch)
    }

    /// Same semantics as [`delete_address`](Self::delete_address).
    pub fn delete_payment_method(
        &self,
        user_id: RecordId,
        payment_id: RecordId,
    ) -> Result<bool, StoreError> {
        self.delete_entry::<PaymentMethod>(user_id, payment_id)
    }

    pub fn set_default_payment_method(
        &self,
        user_id: RecordId,
        payment_id: RecordId,
    ) -> Result<bool, StoreError> {
        self.set_default_entry::<PaymentMethod>(user_id, payment_id)
    }


    fn add_entry<T: Entry>(&self, user_id: RecordId, draft: T::Draft) -> Result<Option<T>, StoreError> {
        let mut users = self.load_users_for_write()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        let entries = T::collection(user);
        let floor = entries.iter().map(T::id).max().unwrap_or(0);
        let entry = T::new(self.next_id(floor)?, draft, entries.is_empty());
        entries.push(entry.clone());
        self.write_users(&users)?;
        tracing::debug!("Added {} {} for user {}", T::KIND, entry.id(), user_id);
        Ok(Some(entry))
    }

    fn update_entry<T: Entry>(
        &self,
        user_id: RecordId,
        entry_id: RecordId,
        patch: T::Patch,
    ) -> Result<Option<T>, StoreError> {
        let mut users = self.load_users_for_write()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        let Some(entry) = T::collection(user).iter_mut().find(|e| e.id() == entry_id) else {
            return Ok(None);
        };
        entry.apply(patch);
        let updated = entry.clone();
        self.write_users(&users)?;
        Ok(Some(updated))
    }

    fn delete_entry<T: Entry>(&self, user_id: RecordId, entry_id: RecordId) -> Result<bool, StoreError> {
        let mut users = self.load_users_for_write()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        T::collection(user).retain(|e| e.id() != entry_id);
        self.write_users(&users)?;
        Ok(true)
    }

    fn set_default_entry<T: Entry>(&self, user_id: RecordId, entry_id: RecordId) -> Result<bool, StoreError> {
        let mut users = self.load_users_for_write()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        let entries = T::collection(user);
        if !entries.iter().any(|e| e.id() == entry_id) {
            return Ok(false);
        }
        for entry in entries.iter_mut() {
            let is_target = entry.id() == entry_id;
            entry.set_default(is_target);
        }
        self.write_users(&users)?;
        Ok(true)
    }


    /// Wipe both values and reinitialise to the empty, signed-out state.
    pub fn clear_all_data(&self) -> Result<(), StoreError> {
        self.store.remove(&self.config.users_key)?;
        self.store.remove(&self.config.current_user_key)?;
        tracing::info!("Cleared all account data");
        self.initialize()
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            version: Snapshot::VERSION,
            exported_at: now(),
            users: self.read_users(),
            current_user: self.current_user_id(),
        }
    }

    /// Replace all persisted state with `snapshot`.
    pub fn import_snapshot(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        if snapshot.version > Snapshot::VERSION {
            tracing::warn!(
                "Importing snapshot version {} into store version {}",
                snapshot.version,
                Snapshot::VERSION
            );
        }
        self.write_users(&snapshot.users)?;
        match snapshot.current_user {
            Some(id) => self.set_current_user(id),
            None => self.clear_current_user(),
        }
    }
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(current_millis()).unwrap_or_default()
}

fn current_millis() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}
