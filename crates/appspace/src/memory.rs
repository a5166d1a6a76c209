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

//! In-memory backend implementation.
//!
//! ## Purpose
//! Provides a HashMap-based backend for tests, demos and single-process use,
//! mirroring the Redis semantics of the commands AppSpace relies on.
//!
//! ## Features
//! - Strings, hashes and lists with Redis-style type checking
//! - TTL support with lazy expiry on access
//! - `TTL` rounding identical to Redis (nearest second)
//!
//! ## Limitations
//! - Not persistent (data lost on restart)
//! - Not distributed (single process only)

use crate::{KVError, KVResult, KeyValueBackend, Ttl};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Value stored under a key.
#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Hash(HashMap<String, String>),
    List(Vec<String>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "string",
            Value::Hash(_) => "hash",
            Value::List(_) => "list",
        }
    }
}

/// Entry in the in-memory store with optional TTL.
#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }

    fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|exp| exp.saturating_duration_since(Instant::now()))
    }
}

/// In-memory backend implementation.
///
/// ## Example
/// ```rust
/// use appspace::{InMemoryBackend, KeyValueBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = InMemoryBackend::new();
///
/// backend.set("app:key", "value".to_string(), None).await?;
/// let value = backend.get("app:key").await?;
/// assert_eq!(value, Some("value".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    data: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys across all namespaces.
    pub async fn len(&self) -> usize {
        let data = self.data.read().await;
        data.values().filter(|e| !e.is_expired()).count()
    }

    /// Returns `true` if no live keys are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Look up a live entry, purging it first if it has expired.
    fn live_entry<'a>(
        data: &'a mut HashMap<String, Entry>,
        key: &str,
    ) -> Option<&'a mut Entry> {
        if data.get(key).is_some_and(Entry::is_expired) {
            data.remove(key);
        }
        data.get_mut(key)
    }

    /// Instant at which a key written now with `seconds` of ttl expires.
    fn deadline(seconds: u64) -> KVResult<Instant> {
        Instant::now()
            .checked_add(Duration::from_secs(seconds))
            .ok_or_else(|| KVError::TTLError(format!("expiration too large: {}", seconds)))
    }

    fn wrong_type(key: &str, expected: &'static str, actual: &Value) -> KVError {
        KVError::WrongType {
            key: key.to_string(),
            expected,
            actual: actual.kind(),
        }
    }
}

#[async_trait]
impl KeyValueBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> KVResult<Option<String>> {
        let data = self.data.read().await;
        match data.get(key) {
            Some(entry) if !entry.is_expired() => match &entry.value {
                Value::Scalar(s) => Ok(Some(s.clone())),
                other => Err(Self::wrong_type(key, "string", other)),
            },
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> KVResult<()> {
        let mut entry = Entry::new(Value::Scalar(value));
        entry.expires_at = ttl_secs.map(Self::deadline).transpose()?;

        let mut data = self.data.write().await;
        data.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_keep_ttl(&self, key: &str, value: String) -> KVResult<()> {
        let mut data = self.data.write().await;
        let expires_at = Self::live_entry(&mut data, key).and_then(|e| e.expires_at);
        data.insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(value),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> KVResult<usize> {
        let mut data = self.data.write().await;
        let deleted = keys
            .iter()
            .filter_map(|key| data.remove(key))
            .filter(|entry| !entry.is_expired())
            .count();
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> KVResult<bool> {
        let data = self.data.read().await;
        Ok(data.get(key).is_some_and(|e| !e.is_expired()))
    }

    async fn hash_merge(&self, key: &str, fields: &[(String, String)]) -> KVResult<()> {
        let mut data = self.data.write().await;
        match Self::live_entry(&mut data, key) {
            Some(entry) => match &mut entry.value {
                Value::Hash(map) => {
                    map.extend(fields.iter().cloned());
                    Ok(())
                }
                other => Err(Self::wrong_type(key, "hash", other)),
            },
            None => {
                let map = fields.iter().cloned().collect();
                data.insert(key.to_string(), Entry::new(Value::Hash(map)));
                Ok(())
            }
        }
    }

    async fn hash_get_all(&self, key: &str) -> KVResult<HashMap<String, String>> {
        let data = self.data.read().await;
        match data.get(key) {
            Some(entry) if !entry.is_expired() => match &entry.value {
                Value::Hash(map) => Ok(map.clone()),
                other => Err(Self::wrong_type(key, "hash", other)),
            },
            _ => Ok(HashMap::new()),
        }
    }

    async fn list_push(&self, key: &str, values: &[String]) -> KVResult<usize> {
        let mut data = self.data.write().await;
        match Self::live_entry(&mut data, key) {
            Some(entry) => match &mut entry.value {
                Value::List(items) => {
                    items.extend(values.iter().cloned());
                    Ok(items.len())
                }
                other => Err(Self::wrong_type(key, "list", other)),
            },
            None => {
                data.insert(key.to_string(), Entry::new(Value::List(values.to_vec())));
                Ok(values.len())
            }
        }
    }

    async fn list_range(&self, key: &str) -> KVResult<Vec<String>> {
        let data = self.data.read().await;
        match data.get(key) {
            Some(entry) if !entry.is_expired() => match &entry.value {
                Value::List(items) => Ok(items.clone()),
                other => Err(Self::wrong_type(key, "list", other)),
            },
            _ => Ok(Vec::new()),
        }
    }

    async fn expire(&self, key: &str, seconds: u64) -> KVResult<bool> {
        let deadline = Self::deadline(seconds)?;
        let mut data = self.data.write().await;
        match Self::live_entry(&mut data, key) {
            Some(entry) => {
                entry.expires_at = Some(deadline);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn persist(&self, key: &str) -> KVResult<bool> {
        let mut data = self.data.write().await;
        Ok(Self::live_entry(&mut data, key)
            .and_then(|entry| entry.expires_at.take())
            .is_some())
    }

    async fn ttl(&self, key: &str) -> KVResult<Ttl> {
        let data = self.data.read().await;
        let ttl = match data.get(key).filter(|e| !e.is_expired()) {
            None => Ttl::Missing,
            Some(entry) => match entry.ttl_remaining() {
                // Redis rounds the remaining milliseconds to the nearest second
                Some(remaining) => Ttl::Expires(((remaining.as_millis() + 500) / 1000) as u64),
                None => Ttl::Persistent,
            },
        };
        Ok(ttl)
    }

    async fn scan_prefix(&self, prefix: &str) -> KVResult<Vec<String>> {
        let data = self.data.read().await;
        let keys = data
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        Ok(keys)
    }

    fn backend_type(&self) -> &'static str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[tokio::test]
    async fn test_basic_operations() {
        let kv = InMemoryBackend::new();

        kv.set("app:key1", s("value1"), None).await.unwrap();
        assert_eq!(kv.get("app:key1").await.unwrap(), Some(s("value1")));

        assert!(kv.exists("app:key1").await.unwrap());
        assert!(!kv.exists("app:nonexistent").await.unwrap());

        let deleted = kv.delete(&[s("app:key1"), s("app:nonexistent")]).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(!kv.exists("app:key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_merge_keeps_existing_fields() {
        let kv = InMemoryBackend::new();

        kv.hash_merge("app:settings", &[(s("theme"), s("dark")), (s("lang"), s("en"))])
            .await
            .unwrap();
        kv.hash_merge("app:settings", &[(s("theme"), s("light"))])
            .await
            .unwrap();

        let settings = kv.hash_get_all("app:settings").await.unwrap();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings["theme"], "light");
        assert_eq!(settings["lang"], "en");
    }

    #[tokio::test]
    async fn test_list_push_appends_in_order() {
        let kv = InMemoryBackend::new();

        assert_eq!(kv.list_push("app:items", &[s("a")]).await.unwrap(), 1);
        assert_eq!(kv.list_push("app:items", &[s("b"), s("c")]).await.unwrap(), 3);
        assert_eq!(kv.list_range("app:items").await.unwrap(), vec!["a", "b", "c"]);
        assert!(kv.list_range("app:missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let kv = InMemoryBackend::new();
        kv.set("app:scalar", s("v"), None).await.unwrap();

        let err = kv.hash_merge("app:scalar", &[(s("f"), s("v"))]).await.unwrap_err();
        assert!(matches!(err, KVError::WrongType { expected: "hash", actual: "string", .. }));

        let err = kv.list_range("app:scalar").await.unwrap_err();
        assert!(matches!(err, KVError::WrongType { expected: "list", .. }));

        kv.list_push("app:list", &[s("x")]).await.unwrap();
        assert!(kv.get("app:list").await.is_err());

        // SET overwrites regardless of the previous kind
        kv.set("app:list", s("now a string"), None).await.unwrap();
        assert_eq!(kv.get("app:list").await.unwrap(), Some(s("now a string")));
    }

    #[tokio::test]
    async fn test_ttl_lifecycle() {
        let kv = InMemoryBackend::new();

        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Missing);

        kv.set("app:key", s("value"), Some(10)).await.unwrap();
        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Expires(10));

        assert!(kv.persist("app:key").await.unwrap());
        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Persistent);

        // Nothing left to remove
        assert!(!kv.persist("app:key").await.unwrap());
        assert!(!kv.persist("app:missing").await.unwrap());

        assert!(kv.expire("app:key", 20).await.unwrap());
        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Expires(20));
        assert!(!kv.expire("app:missing", 20).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_clears_ttl_and_keep_ttl_retains_it() {
        let kv = InMemoryBackend::new();

        kv.set("app:key", s("1"), Some(30)).await.unwrap();
        kv.set_keep_ttl("app:key", s("2")).await.unwrap();
        assert_eq!(kv.get("app:key").await.unwrap(), Some(s("2")));
        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Expires(30));

        kv.set("app:key", s("3"), None).await.unwrap();
        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Persistent);

        // KEEPTTL on a new key writes it without expiration
        kv.set_keep_ttl("app:fresh", s("v")).await.unwrap();
        assert_eq!(kv.ttl("app:fresh").await.unwrap(), Ttl::Persistent);
    }

    #[tokio::test]
    async fn test_hash_and_list_writes_keep_ttl() {
        let kv = InMemoryBackend::new();

        kv.hash_merge("app:h", &[(s("a"), s("1"))]).await.unwrap();
        kv.expire("app:h", 30).await.unwrap();
        kv.hash_merge("app:h", &[(s("b"), s("2"))]).await.unwrap();
        assert_eq!(kv.ttl("app:h").await.unwrap(), Ttl::Expires(30));

        kv.list_push("app:l", &[s("a")]).await.unwrap();
        kv.expire("app:l", 30).await.unwrap();
        kv.list_push("app:l", &[s("b")]).await.unwrap();
        assert_eq!(kv.ttl("app:l").await.unwrap(), Ttl::Expires(30));
    }

    #[tokio::test]
    async fn test_expiry() {
        let kv = InMemoryBackend::new();

        kv.set("app:key", s("value"), Some(1)).await.unwrap();
        kv.list_push("app:list", &[s("a")]).await.unwrap();
        kv.expire("app:list", 1).await.unwrap();
        assert!(kv.exists("app:key").await.unwrap());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(!kv.exists("app:key").await.unwrap());
        assert_eq!(kv.get("app:key").await.unwrap(), None);
        assert_eq!(kv.ttl("app:key").await.unwrap(), Ttl::Missing);
        assert!(!kv.expire("app:key", 5).await.unwrap());

        // An expired list starts over instead of growing
        kv.list_push("app:list", &[s("b")]).await.unwrap();
        assert_eq!(kv.list_range("app:list").await.unwrap(), vec!["b"]);
        assert_eq!(kv.ttl("app:list").await.unwrap(), Ttl::Persistent);
    }

    #[tokio::test]
    async fn test_scan_prefix() {
        let kv = InMemoryBackend::new();

        kv.set("app1:a", s("1"), None).await.unwrap();
        kv.set("app1:b", s("2"), None).await.unwrap();
        kv.set("app10:c", s("3"), None).await.unwrap();

        let mut keys = kv.scan_prefix("app1:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["app1:a", "app1:b"]);
        assert_eq!(kv.len().await, 3);
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_rejected() {
        let kv = InMemoryBackend::new();

        let result = kv.set("app:k", s("v"), Some(u64::MAX)).await;
        assert!(matches!(result, Err(KVError::TTLError(_))));
        assert!(kv.is_empty().await);

        kv.set("app:k", s("v"), None).await.unwrap();
        let result = kv.expire("app:k", u64::MAX).await;
        assert!(matches!(result, Err(KVError::TTLError(_))));
        assert_eq!(kv.ttl("app:k").await.unwrap(), Ttl::Persistent);
    }
}
