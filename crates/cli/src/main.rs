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

//! AppSpace CLI Tool
//!
//! ## Purpose
//! Command-line access to a single app namespace:
//! - Read and write values, dictionaries and lists
//! - Inspect and change expirations
//! - List or wipe every key of an app
//! - Run the bundled demos (`appspace demo tour`)
//!
//! Connection settings come from `APPSPACE_*` environment variables and can
//! be overridden with `--backend`, `--host`, `--port` and `--password`.

use anyhow::{Context, Result};
use appspace::{BackendType, Connection, ConnectionConfig, KVError};
use clap::{Parser, Subcommand};
use tracing::debug;

mod commands;
mod demos;

#[derive(Parser)]
#[command(name = "appspace")]
#[command(about = "AppSpace CLI - namespaced key-value storage", long_about = None)]
struct Cli {
    /// Backend (redis, in-memory)
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<BackendType>,

    /// Redis host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Redis port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Redis password
    #[arg(long, global = true)]
    password: Option<String>,

    /// App namespace the command operates on
    #[arg(short, long, global = true)]
    app: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Store(commands::StoreCommand),

    /// Run a bundled demo
    Demo {
        #[arg(value_enum)]
        name: demos::Demo,
    },
}

fn parse_backend(raw: &str) -> Result<BackendType, String> {
    BackendType::parse(raw).map_err(|e| e.to_string())
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn connection_config(&self) -> Result<ConnectionConfig> {
        let mut config =
            ConnectionConfig::from_env().context("Invalid APPSPACE_* environment")?;
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        Ok(config)
    }
}

/// Context line for a failed connect.
fn connect_hint(config: &ConnectionConfig, err: &KVError) -> String {
    if err.is_backend() {
        format!(
            "Cannot reach Redis at {}:{} (start a server or pass --backend in-memory)",
            config.host, config.port
        )
    } else {
        format!("Invalid connection settings for {}:{}", config.host, config.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.connection_config()?;
    debug!(?config, "Resolved connection config");

    let conn = Connection::from_config(&config)
        .await
        .map_err(|e| {
            let hint = connect_hint(&config, &e);
            anyhow::Error::new(e).context(hint)
        })?;

    match cli.command {
        Commands::Store(cmd) => {
            let app_name = cli
                .app
                .context("--app is required for this command")?;
            commands::execute(&conn.namespace(app_name), cmd).await
        }
        Commands::Demo { name } => demos::run(&conn, name).await,
    }
}
