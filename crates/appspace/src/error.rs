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

//! Error types for AppSpace operations.

use thiserror::Error;

/// Result type for AppSpace operations.
pub type KVResult<T> = Result<T, KVError>;

/// Errors that can occur during AppSpace operations.
///
/// A missing key is never an error: reads return `None`, empty containers
/// or [`Ttl::Missing`](crate::Ttl::Missing) instead.
#[derive(Error, Debug)]
pub enum KVError {
    /// Invalid value (e.g. empty mapping or empty list append)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Backend error (connection refused, auth rejected, protocol error, ...)
    #[error("Backend error: {0}")]
    BackendError(String),

    /// TTL error
    #[error("TTL error: {0}")]
    TTLError(String),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type for key {key}: holds {actual}, expected {expected}")]
    WrongType {
        /// Namespaced key that was accessed
        key: String,
        /// Kind of value the operation needed
        expected: &'static str,
        /// Kind of value the key holds
        actual: &'static str,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl KVError {
    /// Returns `true` if the store could not be reached or rejected the command.
    pub fn is_backend(&self) -> bool {
        matches!(self, KVError::BackendError(_))
    }
}

#[cfg(feature = "redis-backend")]
impl From<redis::RedisError> for KVError {
    fn from(err: redis::RedisError) -> Self {
        KVError::BackendError(format!("Redis error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KVError::WrongType {
            key: "app:k".to_string(),
            expected: "list",
            actual: "hash",
        };
        assert_eq!(err.to_string(), "Wrong type for key app:k: holds hash, expected list");
        assert!(!err.is_backend());
        assert!(KVError::BackendError("down".to_string()).is_backend());
    }
}
