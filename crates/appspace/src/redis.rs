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

//! Redis backend implementation
//!
//! ## Purpose
//! Talks to a Redis server for every AppSpace operation. Each trait method
//! maps to exactly one Redis command.
//!
//! ## Features
//! - **Native TTL**: `SET EX`, `EXPIRE`, `PERSIST`, `TTL`
//! - **Hashes and lists**: `HSET`/`HGETALL`, `RPUSH`/`LRANGE`
//! - **Incremental enumeration**: `SCAN MATCH` instead of blocking `KEYS`
//! - **Reconnection**: handled by the async `ConnectionManager`
//!
//! ## Usage
//! ```rust,no_run
//! use appspace::{KeyValueBackend, RedisBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RedisBackend::connect("localhost", 6379, None).await?;
//! backend.set("myapp:key", "value".to_string(), None).await?;
//! let value = backend.get("myapp:key").await?;
//! assert_eq!(value, Some("value".to_string()));
//! # Ok(())
//! # }
//! ```

use crate::{KVError, KVResult, KeyValueBackend, Ttl};
use async_trait::async_trait;
use ::redis::{aio::ConnectionManager, AsyncCommands, Client, IntoConnectionInfo};
use std::collections::HashMap;
use tracing::debug;

/// Redis-backed implementation of [`KeyValueBackend`]
///
/// ## Architecture
/// - Uses `redis` crate with async ConnectionManager
/// - The manager multiplexes one connection; it is cloned per call
/// - Responses are decoded as UTF-8 strings
pub struct RedisBackend {
    /// Redis connection manager (async, multiplexed)
    manager: ConnectionManager,
}

impl RedisBackend {
    /// Connect to a Redis server.
    ///
    /// ## Arguments
    /// * `host` - Server host name or address
    /// * `port` - Server port (usually 6379)
    /// * `password` - Optional `AUTH` password
    ///
    /// ## Errors
    /// - [`KVError::BackendError`]: the parameters are rejected or the server
    ///   cannot be reached. The connection is opened here, not on first use.
    pub async fn connect(host: &str, port: u16, password: Option<&str>) -> KVResult<Self> {
        let mut info = (host, port).into_connection_info()?;
        info.redis.password = password.map(str::to_string);

        let client = Client::open(info)?;
        let manager = ConnectionManager::new(client).await?;
        debug!(host, port, "Connected to Redis");

        Ok(Self { manager })
    }

    /// Build a `SCAN MATCH` pattern matching keys that start with `prefix`.
    ///
    /// Glob metacharacters in the prefix are escaped so an app named
    /// `"a*"` only sees its own keys.
    pub(crate) fn prefix_pattern(prefix: &str) -> String {
        let mut pattern = String::with_capacity(prefix.len() + 2);
        for c in prefix.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('*');
        pattern
    }
}

fn command_failed(command: &str, err: ::redis::RedisError) -> KVError {
    KVError::BackendError(format!("Redis {} failed: {}", command, err))
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> KVResult<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(|e| command_failed("GET", e))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> KVResult<()> {
        let mut conn = self.manager.clone();
        match ttl_secs {
            Some(secs) => conn
                .set_ex::<_, _, ()>(key, value, secs)
                .await
                .map_err(|e| command_failed("SETEX", e)),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| command_failed("SET", e)),
        }
    }

    async fn set_keep_ttl(&self, key: &str, value: String) -> KVResult<()> {
        let mut conn = self.manager.clone();
        ::redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("KEEPTTL")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| command_failed("SET KEEPTTL", e))
    }

    async fn delete(&self, keys: &[String]) -> KVResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.manager.clone();
        conn.del(keys).await.map_err(|e| command_failed("DEL", e))
    }

    async fn exists(&self, key: &str) -> KVResult<bool> {
        let mut conn = self.manager.clone();
        conn.exists(key).await.map_err(|e| command_failed("EXISTS", e))
    }

    async fn hash_merge(&self, key: &str, fields: &[(String, String)]) -> KVResult<()> {
        let mut conn = self.manager.clone();
        conn.hset_multiple::<_, _, _, ()>(key, fields)
            .await
            .map_err(|e| command_failed("HSET", e))
    }

    async fn hash_get_all(&self, key: &str) -> KVResult<HashMap<String, String>> {
        let mut conn = self.manager.clone();
        conn.hgetall(key).await.map_err(|e| command_failed("HGETALL", e))
    }

    async fn list_push(&self, key: &str, values: &[String]) -> KVResult<usize> {
        let mut conn = self.manager.clone();
        conn.rpush(key, values).await.map_err(|e| command_failed("RPUSH", e))
    }

    async fn list_range(&self, key: &str) -> KVResult<Vec<String>> {
        let mut conn = self.manager.clone();
        conn.lrange(key, 0, -1).await.map_err(|e| command_failed("LRANGE", e))
    }

    async fn expire(&self, key: &str, seconds: u64) -> KVResult<bool> {
        let mut conn = self.manager.clone();
        let secs = i64::try_from(seconds)
            .map_err(|_| KVError::TTLError(format!("expiration too large: {}", seconds)))?;
        conn.expire(key, secs).await.map_err(|e| command_failed("EXPIRE", e))
    }

    async fn persist(&self, key: &str) -> KVResult<bool> {
        let mut conn = self.manager.clone();
        conn.persist(key).await.map_err(|e| command_failed("PERSIST", e))
    }

    async fn ttl(&self, key: &str) -> KVResult<Ttl> {
        let mut conn = self.manager.clone();
        let secs: i64 = conn.ttl(key).await.map_err(|e| command_failed("TTL", e))?;
        Ok(Ttl::from_seconds(secs))
    }

    async fn scan_prefix(&self, prefix: &str) -> KVResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let pattern = Self::prefix_pattern(prefix);

        let mut keys = Vec::new();
        let mut iter: ::redis::AsyncIter<String> = conn
            .scan_match(&pattern)
            .await
            .map_err(|e| command_failed("SCAN", e))?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }

        // SCAN may return a key more than once while the keyspace is rehashing
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    fn backend_type(&self) -> &'static str {
        "Redis"
    }
}

// ============================================================================
// TESTS
// ============================================================================
