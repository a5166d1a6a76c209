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

//! Connection configuration.
//!
//! ## Purpose
//! Describes where the store lives (host, port, password) and which backend
//! to use, either explicitly or from environment variables.
//!
//! ## Environment Variables
//!
//! ### Backend Selection
//! - `APPSPACE_BACKEND`: Backend type (default: "redis")
//!   - "redis" → RedisBackend
//!   - "in-memory" | "memory" → InMemoryBackend
//!
//! ### Redis Configuration
//! - `APPSPACE_REDIS_HOST`: Server host (default: "localhost")
//! - `APPSPACE_REDIS_PORT`: Server port (default: 6379)
//! - `APPSPACE_REDIS_PASSWORD`: `AUTH` password (default: none)
//!
//! ## Examples
//!
//! ### Local Redis (Default)
//! ```bash
//! # No environment variables needed
//! cargo run -p appspace-cli -- --app demo_app keys
//! ```
//!
//! ### Remote Redis
//! ```bash
//! export APPSPACE_REDIS_HOST=cache.internal
//! export APPSPACE_REDIS_PORT=6380
//! export APPSPACE_REDIS_PASSWORD=secret
//! cargo run -p appspace-cli -- --app demo_app keys
//! ```
//!
//! ### In-Memory
//! ```bash
//! export APPSPACE_BACKEND=in-memory
//! cargo run -p appspace-cli -- demo tour
//! ```

use crate::{KVError, KVResult};
use std::fmt;

/// Default Redis host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Redis port.
pub const DEFAULT_PORT: u16 = 6379;

/// Backend type configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendType {
    /// Redis server (default; requires redis-backend feature)
    #[default]
    Redis,
    /// In-memory HashMap backend (always available)
    InMemory,
}

impl BackendType {
    /// Parse a backend name as accepted by `APPSPACE_BACKEND`.
    pub fn parse(name: &str) -> KVResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "redis" => Ok(BackendType::Redis),
            "in-memory" | "memory" => Ok(BackendType::InMemory),
            other => Err(KVError::ConfigError(format!(
                "Unknown backend type: {}. Valid options: redis, in-memory",
                other
            ))),
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendType::Redis => write!(f, "redis"),
            BackendType::InMemory => write!(f, "in-memory"),
        }
    }
}

/// Store connection configuration.
///
/// Only host, port and password are configurable; timeouts and reconnection
/// follow the driver defaults.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Backend type
    pub backend: BackendType,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Optional password
    pub password: Option<String>,
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Redis,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a Redis configuration for the given host, port and password.
    ///
    /// ## Examples
    /// ```rust
    /// use appspace::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::redis("localhost", 6379, None);
    /// assert_eq!(config.port, 6379);
    /// ```
    pub fn redis(host: impl Into<String>, port: u16, password: Option<String>) -> Self {
        Self {
            backend: BackendType::Redis,
            host: host.into(),
            port,
            password,
        }
    }

    /// Create an in-memory configuration.
    pub fn in_memory() -> Self {
        Self {
            backend: BackendType::InMemory,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// ## Environment Variables
    /// See module documentation for complete list.
    ///
    /// ## Errors
    /// - [`KVError::ConfigError`]: unknown backend or port that is not a `u16`
    pub fn from_env() -> KVResult<Self> {
        let backend = match std::env::var("APPSPACE_BACKEND") {
            Ok(name) => BackendType::parse(&name)?,
            Err(_) => BackendType::Redis,
        };

        let host =
            std::env::var("APPSPACE_REDIS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match std::env::var("APPSPACE_REDIS_PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| {
                KVError::ConfigError(format!("Invalid APPSPACE_REDIS_PORT: {}", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let password = std::env::var("APPSPACE_REDIS_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty());

        Ok(Self {
            backend,
            host,
            port,
            password,
        })
    }
}
