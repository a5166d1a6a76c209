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

//! # AppSpace
//!
//! ## Purpose
//! A small convenience layer over Redis for quick applications: pick an app
//! name and every key you touch is automatically prefixed with `"{app}:"`.
//! On top of that it offers save/load helpers for plain values, dictionaries
//! (hashes) and append-only lists, plus expiration management.
//!
//! ## Architecture Context
//! ```text
//! caller -> AppSpace -> "{app}:{key}" -> Connection -> KeyValueBackend -> Redis
//! ```
//! Nothing is cached locally. Durability, atomicity of single commands and
//! networking all belong to the store.
//!
//! ## Key Components
//!
//! - [`Connection`]: shared handle to a backend, built from host/port/password
//! - [`AppSpace`]: namespaced accessor returned by [`Connection::namespace`]
//! - [`KeyValueBackend`]: the primitives the accessor delegates to
//! - [`InMemoryBackend`]: HashMap-based backend for tests and offline demos
//! - [`KVError`]: error type for all operations
//! - [`Ttl`]: remaining time-to-live of a key
//!
//! ## Backend Support
//!
//! - **InMemory**: HashMap-based (always available)
//! - **Redis**: native TTL and hashes/lists (feature: `redis-backend`, default)
//!
//! ## Examples
//!
//! ### Basic Usage
//! ```rust
//! use appspace::{Connection, Ttl};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Connection::in_memory();
//! let app = conn.namespace("my_app");
//!
//! app.save("username", "alice", None).await?;
//! assert_eq!(app.load("username").await?, Some("alice".to_string()));
//! assert_eq!(app.get_ttl("username").await?, Ttl::Persistent);
//! # Ok(())
//! # }
//! ```
//!
//! ### Dictionaries and Lists
//! ```rust
//! use appspace::Connection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = Connection::in_memory().namespace("my_app");
//!
//! // Dictionaries merge: existing fields survive partial updates
//! app.save_dict("user_42", [("name", "Bob"), ("age", "30")], Some(3600)).await?;
//! app.save_dict("user_42", [("age", "31")], None).await?;
//! assert_eq!(app.load_dict("user_42").await?["name"], "Bob");
//!
//! // Lists append in call order
//! app.add_to_list("todos", ["Buy milk", "Walk dog"], None).await?;
//! assert_eq!(app.get_list("todos").await?, vec!["Buy milk", "Walk dog"]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Redis
//! ```rust,no_run
//! use appspace::Connection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Connection::connect("localhost", 6379, None).await?;
//! let app = conn.namespace("demo_app");
//! app.save("temp_token", "TOKEN_XYZ", Some(5)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub mod config;
pub mod connection;
pub mod error;
pub mod memory;
pub mod space;

#[cfg(feature = "redis-backend")]
pub mod redis;

pub use config::{BackendType, ConnectionConfig};
pub use connection::Connection;
pub use error::{KVError, KVResult};
pub use memory::InMemoryBackend;
pub use space::AppSpace;

#[cfg(feature = "redis-backend")]
pub use crate::redis::RedisBackend;

/// Store primitives an [`AppSpace`] delegates to.
///
/// ## Purpose
/// Keeps the accessor independent of the driver so tests and demos can run
/// against [`InMemoryBackend`] while production code talks to Redis.
///
/// ## Contract
/// Keys passed here are already namespaced. Implementations follow Redis
/// command semantics:
/// - `set` replaces the value and clears any ttl unless one is supplied
/// - `set_keep_ttl` replaces the value and keeps the existing ttl
/// - `hash_merge` and `list_push` create the key if needed and keep its ttl
/// - writing a hash or list over a key of another kind is an error
/// - expired keys behave exactly like missing keys
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Read a string value (`GET`).
    async fn get(&self, key: &str) -> KVResult<Option<String>>;

    /// Write a string value, optionally with a ttl in seconds (`SET [EX]`).
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> KVResult<()>;

    /// Write a string value, retaining the current ttl (`SET KEEPTTL`).
    async fn set_keep_ttl(&self, key: &str, value: String) -> KVResult<()>;

    /// Delete keys, returning how many existed (`DEL`).
    async fn delete(&self, keys: &[String]) -> KVResult<usize>;

    /// Check whether a key exists (`EXISTS`).
    async fn exists(&self, key: &str) -> KVResult<bool>;

    /// Merge fields into a hash (`HSET key f1 v1 f2 v2 ...`).
    async fn hash_merge(&self, key: &str, fields: &[(String, String)]) -> KVResult<()>;

    /// Read every field of a hash (`HGETALL`).
    async fn hash_get_all(&self, key: &str) -> KVResult<HashMap<String, String>>;

    /// Append values to the tail of a list, returning the new length (`RPUSH`).
    async fn list_push(&self, key: &str, values: &[String]) -> KVResult<usize>;

    /// Read a whole list (`LRANGE key 0 -1`).
    async fn list_range(&self, key: &str) -> KVResult<Vec<String>>;

    /// Set a ttl; `false` if the key does not exist (`EXPIRE`).
    async fn expire(&self, key: &str, seconds: u64) -> KVResult<bool>;

    /// Remove a ttl; `true` only if one was removed (`PERSIST`).
    async fn persist(&self, key: &str) -> KVResult<bool>;

    /// Remaining ttl of a key (`TTL`).
    async fn ttl(&self, key: &str) -> KVResult<Ttl>;

    /// Every key starting with `prefix` (`SCAN MATCH prefix*`).
    async fn scan_prefix(&self, prefix: &str) -> KVResult<Vec<String>>;

    /// Backend name for logging (e.g. "InMemory", "Redis").
    fn backend_type(&self) -> &'static str;
}

/// Longest expiration accepted, in seconds.
///
/// Redis stores expirations as milliseconds in an `i64` and rejects anything
/// that would overflow it.
pub const MAX_TTL_SECS: u64 = i64::MAX as u64 / 1000;

/// Remaining time-to-live of a key.
///
/// Converts to and from the store's integer convention with
/// [`Ttl::from_seconds`] and [`Ttl::as_seconds`]: `-1` means the key exists
/// without expiration and `-2` means the key does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Key expires after this many seconds
    Expires(u64),
    /// Key exists and never expires
    Persistent,
    /// Key does not exist
    Missing,
}

impl Ttl {
    /// Decode the store's `TTL` reply.
    pub fn from_seconds(raw: i64) -> Self {
        match raw {
            -1 => Ttl::Persistent,
            secs if secs >= 0 => Ttl::Expires(secs as u64),
            _ => Ttl::Missing,
        }
    }

    /// Encode as seconds remaining, `-1` (no expiration) or `-2` (missing).
    pub fn as_seconds(&self) -> i64 {
        match self {
            Ttl::Expires(secs) => *secs as i64,
            Ttl::Persistent => -1,
            Ttl::Missing => -2,
        }
    }

    /// Remaining time, if the key has an expiration.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Ttl::Expires(secs) => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// Returns `true` if the key does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self, Ttl::Missing)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_seconds())
    }
}
