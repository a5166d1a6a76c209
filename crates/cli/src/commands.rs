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

//! Store commands operating on one app namespace

use anyhow::{Context, Result};
use appspace::AppSpace;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    /// Save a value
    Save {
        key: String,
        value: String,

        /// Expire after this many seconds
        #[arg(long, conflicts_with = "keep_ttl")]
        ttl: Option<u64>,

        /// Keep the key's current expiration
        #[arg(long)]
        keep_ttl: bool,
    },

    /// Print a value
    Load { key: String },

    /// Delete a key
    Delete { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// Merge fields into a dictionary
    SaveDict {
        key: String,

        /// FIELD=VALUE pairs
        #[arg(required = true, value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Expire after this many seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Print a dictionary
    LoadDict { key: String },

    /// Append values to a list
    Push {
        key: String,

        #[arg(required = true)]
        values: Vec<String>,

        /// Expire after this many seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Print a list
    List { key: String },

    /// Remove a list
    ClearList { key: String },

    /// Print remaining ttl (-1 permanent, -2 missing)
    Ttl { key: String },

    /// Set expiration on an existing key
    Expire { key: String, seconds: u64 },

    /// Remove expiration from a key
    Persist { key: String },

    /// List every key in the app
    Keys,

    /// Delete every key in the app
    DeleteAll,
}

/// Parse a `FIELD=VALUE` argument. Only the first `=` separates.
fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

pub async fn execute(app: &AppSpace, command: StoreCommand) -> Result<()> {
    for line in run(app, command).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Run a command and return the lines to print.
async fn run(app: &AppSpace, command: StoreCommand) -> Result<Vec<String>> {
    let lines = match command {
        StoreCommand::Save {
            key,
            value,
            ttl,
            keep_ttl,
        } => {
            let saved = if keep_ttl {
                app.save_keep_ttl(&key, value).await
            } else {
                app.save(&key, value, ttl).await
            };
            saved.with_context(|| format!("Failed to save {}", key))?;
            vec!["OK".to_string()]
        }

        StoreCommand::Load { key } => {
            let value = app.load(&key).await.context("Failed to load value")?;
            vec![value.unwrap_or_else(|| "(nil)".to_string())]
        }

        StoreCommand::Delete { key } => {
            app.delete(&key).await.context("Failed to delete key")?;
            vec!["OK".to_string()]
        }

        StoreCommand::Exists { key } => {
            vec![app.exists(&key).await.context("Failed to check key")?.to_string()]
        }

        StoreCommand::SaveDict { key, fields, ttl } => {
            app.save_dict(&key, fields, ttl)
                .await
                .with_context(|| format!("Failed to save dictionary {}", key))?;
            vec!["OK".to_string()]
        }

        StoreCommand::LoadDict { key } => {
            let mut fields: Vec<_> = app
                .load_dict(&key)
                .await
                .context("Failed to load dictionary")?
                .into_iter()
                .collect();
            fields.sort();
            fields.into_iter().map(|(f, v)| format!("{}={}", f, v)).collect()
        }

        StoreCommand::Push { key, values, ttl } => {
            app.add_to_list(&key, values, ttl)
                .await
                .with_context(|| format!("Failed to append to {}", key))?;
            vec!["OK".to_string()]
        }

        StoreCommand::List { key } => app
            .get_list(&key)
            .await
            .context("Failed to read list")?
            .into_iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect(),

        StoreCommand::ClearList { key } => {
            app.clear_list(&key).await.context("Failed to clear list")?;
            vec!["OK".to_string()]
        }

        StoreCommand::Ttl { key } => {
            vec![app.get_ttl(&key).await.context("Failed to read ttl")?.to_string()]
        }

        StoreCommand::Expire { key, seconds } => {
            let set = app
                .set_expire(&key, seconds)
                .await
                .context("Failed to set expiration")?;
            vec![set.to_string()]
        }

        StoreCommand::Persist { key } => {
            let removed = app
                .remove_expire(&key)
                .await
                .context("Failed to remove expiration")?;
            vec![removed.to_string()]
        }

        StoreCommand::Keys => {
            let mut lines = Vec::new();
            for key in app.list_all().await.context("Failed to list keys")? {
                let ttl = app.get_ttl(&key).await?;
                // Expired between the scan and the ttl lookup
                if ttl.is_missing() {
                    continue;
                }
                lines.push(match ttl.remaining() {
                    Some(left) => format!("{} (expires in {}s)", key, left.as_secs()),
                    None => key,
                });
            }
            lines
        }

        StoreCommand::DeleteAll => {
            let deleted = app.delete_all().await.context("Failed to delete keys")?;
            vec![format!("Deleted {} keys from '{}'", deleted, app.app_name())]
        }
    };
    Ok(lines)
}
