// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of AppSpace.
//
// AppSpace is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// AppSpace is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with AppSpace. If not, see <https://www.gnu.org/licenses/>.

//! Namespaced accessor.
//!
//! ## Purpose
//! [`AppSpace`] rewrites every logical key `name` into `"{app}:{name}"` and
//! forwards the call to the backend. It owns no state besides the app name,
//! so any number of accessors (even for the same app) can share one
//! [`Connection`](crate::Connection).
//!
//! ## Operations Grouped by Purpose
//!
//! ### Simple values
//! - `save()`, `save_keep_ttl()`, `load()`, `delete()`, `exists()`
//!
//! ### Dictionaries
//! - `save_dict()` (merge, never replace), `load_dict()`
//!
//! ### Lists
//! - `add_to_list()`, `get_list()`, `clear_list()`
//!
//! ### Expiration
//! - `get_ttl()`, `set_expire()`, `remove_expire()`
//!
//! ### Namespace maintenance
//! - `list_all()`, `delete_all()`

use crate::{KVError, KVResult, KeyValueBackend, Ttl, MAX_TTL_SECS};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Your app's own corner of the store.
///
/// All keys are automatically prefixed with the app name and a colon.
///
/// ## Expiration policy
/// `expire_seconds` is applied only when given. A `save` without it writes
/// the value with no expiration directive, which makes the key permanent
/// even if it previously had a ttl. Use [`AppSpace::save_keep_ttl`] to
/// overwrite a value while keeping its ttl. Dictionary and list writes never
/// touch an existing ttl unless `expire_seconds` is given.
#[derive(Clone)]
pub struct AppSpace {
    backend: Arc<dyn KeyValueBackend>,
    app_name: String,
    prefix: String,
}

impl AppSpace {
    pub(crate) fn new(backend: Arc<dyn KeyValueBackend>, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        let prefix = format!("{}:", app_name);
        Self {
            backend,
            app_name,
            prefix,
        }
    }

    /// Application name this accessor is scoped to.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Build the namespaced key for `name`.
    ///
    /// ## Examples
    /// ```rust
    /// use appspace::Connection;
    ///
    /// let app = Connection::in_memory().namespace("test_app");
    /// assert_eq!(app.namespaced_key("mykey"), "test_app:mykey");
    /// ```
    pub fn namespaced_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn validate_ttl(&self, name: &str, seconds: u64) -> KVResult<()> {
        if seconds == 0 {
            warn!(app = %self.app_name, key = name, "Rejected zero expiration");
            return Err(KVError::TTLError(format!(
                "expiration for {} must be greater than zero seconds",
                name
            )));
        }
        if seconds > MAX_TTL_SECS {
            warn!(app = %self.app_name, key = name, seconds, "Rejected oversized expiration");
            return Err(KVError::TTLError(format!(
                "expiration for {} must be at most {} seconds, got {}",
                name, MAX_TTL_SECS, seconds
            )));
        }
        Ok(())
    }

    /// Apply `expire_seconds` after a write, if one was requested.
    async fn apply_expire(&self, key: &str, expire_seconds: Option<u64>) -> KVResult<()> {
        if let Some(seconds) = expire_seconds {
            self.backend.expire(key, seconds).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Simple values
    // =========================================================================

    /// Save a value, optionally expiring after `expire_seconds`.
    ///
    /// Overwrites any previous value (of any kind). Without
    /// `expire_seconds` the key becomes permanent.
    pub async fn save(
        &self,
        name: &str,
        value: impl ToString,
        expire_seconds: Option<u64>,
    ) -> KVResult<()> {
        let value = value.to_string();
        if let Some(seconds) = expire_seconds {
            self.validate_ttl(name, seconds)?;
        }
        debug!(app = %self.app_name, key = name, ttl = ?expire_seconds, "save");
        self.backend
            .set(&self.namespaced_key(name), value, expire_seconds)
            .await
    }

    /// Overwrite a value while keeping whatever ttl the key already has.
    ///
    /// Useful for counters inside a fixed window: the first write sets the
    /// window with [`AppSpace::save`], later writes must not extend or clear it.
    pub async fn save_keep_ttl(&self, name: &str, value: impl ToString) -> KVResult<()> {
        let value = value.to_string();
        debug!(app = %self.app_name, key = name, "save_keep_ttl");
        self.backend
            .set_keep_ttl(&self.namespaced_key(name), value)
            .await
    }

    /// Load a value. Returns `None` if not found.
    pub async fn load(&self, name: &str) -> KVResult<Option<String>> {
        debug!(app = %self.app_name, key = name, "load");
        self.backend.get(&self.namespaced_key(name)).await
    }

    /// Delete a key of any kind. Deleting a missing key is not an error.
    pub async fn delete(&self, name: &str) -> KVResult<()> {
        debug!(app = %self.app_name, key = name, "delete");
        self.backend.delete(&[self.namespaced_key(name)]).await?;
        Ok(())
    }

    /// Check if a key exists.
    pub async fn exists(&self, name: &str) -> KVResult<bool> {
        self.backend.exists(&self.namespaced_key(name)).await
    }

    // =========================================================================
    // Dictionaries
    // =========================================================================

    /// Save a dictionary (user info, settings, ...).
    ///
    /// Fields are **merged** into the stored hash: fields missing from
    /// `data` keep their previous values. The expiration, if given, is
    /// applied as a separate step after the write.
    ///
    /// ## Errors
    /// - [`KVError::InvalidValue`]: `data` is empty
    /// - [`KVError::TTLError`]: `expire_seconds` is zero or above [`MAX_TTL_SECS`]
    ///
    /// ## Examples
    /// ```rust
    /// # use appspace::Connection;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let app = Connection::in_memory().namespace("shop");
    /// app.save_dict("user_42", [("name", "Bob"), ("age", "30")], Some(3600)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_dict<I, K, V>(
        &self,
        name: &str,
        data: I,
        expire_seconds: Option<u64>,
    ) -> KVResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let fields: Vec<(String, String)> = data
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if fields.is_empty() {
            warn!(app = %self.app_name, key = name, "Rejected empty dictionary");
            return Err(KVError::InvalidValue(format!(
                "dictionary for {} must contain at least one field",
                name
            )));
        }
        if let Some(seconds) = expire_seconds {
            self.validate_ttl(name, seconds)?;
        }

        debug!(app = %self.app_name, key = name, fields = fields.len(), ttl = ?expire_seconds, "save_dict");
        let key = self.namespaced_key(name);
        self.backend.hash_merge(&key, &fields).await?;
        self.apply_expire(&key, expire_seconds).await
    }

    /// Load a dictionary. Returns an empty map if not found.
    pub async fn load_dict(&self, name: &str) -> KVResult<HashMap<String, String>> {
        debug!(app = %self.app_name, key = name, "load_dict");
        self.backend.hash_get_all(&self.namespaced_key(name)).await
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Append items to the end of a list, in order.
    ///
    /// `expire_seconds` applies to the entire list.
    ///
    /// ## Errors
    /// - [`KVError::InvalidValue`]: `values` is empty
    /// - [`KVError::TTLError`]: `expire_seconds` is zero or above [`MAX_TTL_SECS`]
    ///
    /// ## Examples
    /// ```rust
    /// # use appspace::Connection;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let app = Connection::in_memory().namespace("todo");
    /// app.add_to_list("todos", ["Buy milk", "Walk dog"], Some(7200)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add_to_list<I>(
        &self,
        name: &str,
        values: I,
        expire_seconds: Option<u64>,
    ) -> KVResult<()>
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if values.is_empty() {
            warn!(app = %self.app_name, key = name, "Rejected empty list append");
            return Err(KVError::InvalidValue(format!(
                "at least one value is required to append to {}",
                name
            )));
        }
        if let Some(seconds) = expire_seconds {
            self.validate_ttl(name, seconds)?;
        }

        let key = self.namespaced_key(name);
        let len = self.backend.list_push(&key, &values).await?;
        debug!(app = %self.app_name, key = name, added = values.len(), len, "add_to_list");
        self.apply_expire(&key, expire_seconds).await
    }

    /// Get all items from a list. Returns an empty vector if not found.
    pub async fn get_list(&self, name: &str) -> KVResult<Vec<String>> {
        debug!(app = %self.app_name, key = name, "get_list");
        self.backend.list_range(&self.namespaced_key(name)).await
    }

    /// Remove a list entirely.
    pub async fn clear_list(&self, name: &str) -> KVResult<()> {
        self.delete(name).await
    }

    // =========================================================================
    // Expiration
    // =========================================================================

    /// Remaining time until the key expires.
    ///
    /// [`Ttl::as_seconds`] gives the classic integer form: seconds remaining,
    /// `-1` if the key has no expiration, `-2` if it does not exist.
    pub async fn get_ttl(&self, name: &str) -> KVResult<Ttl> {
        self.backend.ttl(&self.namespaced_key(name)).await
    }

    /// Set or update expiration on an existing key.
    ///
    /// ## Returns
    /// - `Ok(true)` if the expiration was set
    /// - `Ok(false)` if the key does not exist
    ///
    /// ## Errors
    /// - [`KVError::TTLError`]: `seconds` is zero or above [`MAX_TTL_SECS`]
    pub async fn set_expire(&self, name: &str, seconds: u64) -> KVResult<bool> {
        self.validate_ttl(name, seconds)?;
        debug!(app = %self.app_name, key = name, seconds, "set_expire");
        self.backend.expire(&self.namespaced_key(name), seconds).await
    }

    /// Remove expiration from a key, making it permanent.
    ///
    /// ## Returns
    /// - `Ok(true)` if an expiration was removed
    /// - `Ok(false)` if the key does not exist or had no expiration
    pub async fn remove_expire(&self, name: &str) -> KVResult<bool> {
        debug!(app = %self.app_name, key = name, "remove_expire");
        self.backend.persist(&self.namespaced_key(name)).await
    }

    // =========================================================================
    // Namespace maintenance
    // =========================================================================

    /// List every key of this app, without the `"{app}:"` prefix.
    ///
    /// Scans the whole keyspace for `"{app}:*"`, so cost grows with the size
    /// of the store rather than the size of the app. Keys come back sorted.
    pub async fn list_all(&self) -> KVResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .backend
            .scan_prefix(&self.prefix)
            .await?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .collect();
        keys.sort();
        debug!(app = %self.app_name, count = keys.len(), "list_all");
        Ok(keys)
    }

    /// Delete every key of this app.
    ///
    /// ## Returns
    /// Number of keys deleted. Other apps' keys are never touched.
    pub async fn delete_all(&self) -> KVResult<usize> {
        let keys = self.backend.scan_prefix(&self.prefix).await?;
        let deleted = self.backend.delete(&keys).await?;
        info!(app = %self.app_name, deleted, "Deleted all keys in namespace");
        Ok(deleted)
    }
}

impl fmt::Debug for AppSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSpace")
            .field("app_name", &self.app_name)
            .field("backend", &self.backend.backend_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackend;

    fn test_space(name: &str) -> (Arc<InMemoryBackend>, AppSpace) {
        let backend = Arc::new(InMemoryBackend::new());
        let space = AppSpace::new(backend.clone(), name);
        (backend, space)
    }

    #[test]
    fn test_key_generation() {
        let (_, app) = test_space("test_app");
        assert_eq!(app.namespaced_key("mykey"), "test_app:mykey");
        assert_eq!(app.namespaced_key("key:with:colons"), "test_app:key:with:colons");
        assert_eq!(app.app_name(), "test_app");
    }

    #[tokio::test]
    async fn test_writes_land_under_prefix() {
        let (backend, app) = test_space("shop");

        app.save("total", 42, None).await.unwrap();
        app.save_dict("cart", [("sku", "A1")], None).await.unwrap();
        app.add_to_list("log", ["opened"], None).await.unwrap();

        let mut raw = backend.scan_prefix("").await.unwrap();
        raw.sort();
        assert_eq!(raw, vec!["shop:cart", "shop:log", "shop:total"]);
    }

    #[tokio::test]
    async fn test_invalid_input_does_not_write() {
        let (backend, app) = test_space("strict");

        let err = app.save("k", "v", Some(0)).await.unwrap_err();
        assert!(matches!(err, KVError::TTLError(_)));

        let empty: [(&str, &str); 0] = [];
        let err = app.save_dict("d", empty, None).await.unwrap_err();
        assert!(matches!(err, KVError::InvalidValue(_)));

        let err = app.add_to_list("l", Vec::<String>::new(), None).await.unwrap_err();
        assert!(matches!(err, KVError::InvalidValue(_)));

        let err = app.add_to_list("l", ["x"], Some(0)).await.unwrap_err();
        assert!(matches!(err, KVError::TTLError(_)));

        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_expire_rejects_zero() {
        let (_, app) = test_space("strict");
        app.save("k", "v", None).await.unwrap();

        assert!(matches!(app.set_expire("k", 0).await, Err(KVError::TTLError(_))));
        assert_eq!(app.get_ttl("k").await.unwrap(), Ttl::Persistent);
    }

    #[test]
    fn test_debug() {
        let (_, app) = test_space("dbg");
        assert_eq!(
            format!("{:?}", app),
            "AppSpace { app_name: \"dbg\", backend: \"InMemory\" }"
        );
    }
}
