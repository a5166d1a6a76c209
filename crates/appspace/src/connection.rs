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

//! Connection handle shared by every [`AppSpace`].

use crate::{AppSpace, BackendType, ConnectionConfig, InMemoryBackend, KVResult, KeyValueBackend};
use std::sync::Arc;

#[cfg(feature = "redis-backend")]
use tracing::info;

#[cfg(not(feature = "redis-backend"))]
use crate::KVError;

/// Handle to a key-value store.
///
/// Created once at startup and passed to whoever needs an [`AppSpace`].
/// Cloning is cheap: clones share the same backend and its connection.
///
/// ## Examples
/// ```rust,no_run
/// use appspace::Connection;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Connection::connect("localhost", 6379, None).await?;
/// let app1 = conn.namespace("app_one");
/// let app2 = conn.namespace("app_two");
///
/// app1.save("counter", 100, None).await?;
/// app2.save("counter", 200, None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    backend: Arc<dyn KeyValueBackend>,
}

impl Connection {
    /// Connect to Redis at `host:port`, authenticating with `password` if given.
    ///
    /// ## Errors
    /// - [`KVError::BackendError`](crate::KVError::BackendError): the driver
    ///   rejected the parameters or the server is unreachable
    #[cfg(feature = "redis-backend")]
    pub async fn connect(host: &str, port: u16, password: Option<&str>) -> KVResult<Self> {
        let backend = crate::RedisBackend::connect(host, port, password).await?;
        info!(host, port, "Connected to key-value store");
        Ok(Self::from_backend(Arc::new(backend)))
    }

    /// Build a connection from configuration.
    ///
    /// ## Examples
    /// ```rust
    /// use appspace::{Connection, ConnectionConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let conn = Connection::from_config(&ConnectionConfig::in_memory()).await?;
    /// assert_eq!(conn.backend_type(), "InMemory");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from_config(config: &ConnectionConfig) -> KVResult<Self> {
        match config.backend {
            BackendType::InMemory => Ok(Self::in_memory()),

            #[cfg(feature = "redis-backend")]
            BackendType::Redis => {
                Self::connect(&config.host, config.port, config.password.as_deref()).await
            }

            #[cfg(not(feature = "redis-backend"))]
            BackendType::Redis => Err(KVError::ConfigError(
                "Redis backend requires 'redis-backend' feature".to_string(),
            )),
        }
    }

    /// Connection backed by a fresh [`InMemoryBackend`].
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryBackend::new()))
    }

    /// Wrap an existing backend (for fakes or a shared in-memory store).
    pub fn from_backend(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Get the namespaced accessor for `app_name`.
    ///
    /// No I/O happens here and it cannot fail.
    pub fn namespace(&self, app_name: impl Into<String>) -> AppSpace {
        AppSpace::new(Arc::clone(&self.backend), app_name)
    }

    /// Name of the backend in use.
    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.backend.backend_type())
            .finish()
    }
}
