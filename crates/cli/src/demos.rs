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

//! Bundled demos
//!
//! Each demo works in its own namespace (`counter_app`, `cache_app`, ...)
//! and walks through one everyday use of the store. The `tour` demo touches
//! every operation.

use anyhow::{Context, Result};
use appspace::{AppSpace, Connection, Ttl};
use clap::ValueEnum;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::info;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demo {
    /// Every operation, end to end
    Tour,
    /// Page-view counter and an expiring access token
    Counter,
    /// Fixed-window rate limiter
    RateLimiter,
    /// High scores kept in a dictionary
    Leaderboard,
    /// Login session with expiration
    Session,
    /// Todo list as a queue
    TaskQueue,
    /// Per-user notification inbox
    Notifications,
    /// App settings and feature flags
    Config,
    /// Cache-aside for a slow lookup
    Cache,
}

pub async fn run(conn: &Connection, demo: Demo) -> Result<()> {
    info!(?demo, backend = conn.backend_type(), "Running demo");
    match demo {
        Demo::Tour => tour(conn).await,
        Demo::Counter => counter(&conn.namespace("counter_app")).await,
        Demo::RateLimiter => rate_limiter(&conn.namespace("rate_limiter_app")).await,
        Demo::Leaderboard => leaderboard(&conn.namespace("leaderboard_app")).await,
        Demo::Session => session(&conn.namespace("session_app")).await,
        Demo::TaskQueue => task_queue(&conn.namespace("task_app")).await,
        Demo::Notifications => notifications(&conn.namespace("notification_app")).await,
        Demo::Config => config(&conn.namespace("config_app")).await,
        Demo::Cache => cache(&conn.namespace("cache_app")).await,
    }
}

fn section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(60));
}

// =============================================================================
// Tour
// =============================================================================

async fn tour(conn: &Connection) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("AppSpace Complete API Demo");
    println!("{}", "=".repeat(60));

    let app = conn.namespace("demo_app");

    println!("\nCleaning up any existing keys...");
    let deleted = app.delete_all().await?;
    if deleted > 0 {
        println!("   Deleted {} existing keys", deleted);
    }
    println!("   Ready!");

    section("1. SIMPLE KEY-VALUE OPERATIONS");
    app.save("username", "alice_2026", None).await?;
    println!("✓ Saved username: alice_2026");

    let username = app.load("username").await?;
    println!("✓ Loaded username: {}", username.as_deref().unwrap_or("(nil)"));

    if app.exists("username").await? {
        println!("✓ Username key exists");
    }

    app.save("temp_token", "TOKEN_XYZ", Some(5)).await?;
    println!("✓ Saved temp_token with 5 second expiration");
    println!("✓ Token expires in {} seconds", app.get_ttl("temp_token").await?);

    section("2. DICTIONARY OPERATIONS");
    app.save_dict(
        "user_42",
        [
            ("user_id", "42"),
            ("name", "Alice Johnson"),
            ("email", "alice@example.com"),
            ("role", "admin"),
            ("credits", "1000"),
        ],
        Some(3600),
    )
    .await?;
    println!("✓ Saved user profile dictionary");

    let profile = app.load_dict("user_42").await?;
    println!(
        "✓ Loaded user profile: {} ({})",
        field(&profile, "name"),
        field(&profile, "role")
    );
    println!(
        "  Email: {}, Credits: {}",
        field(&profile, "email"),
        field(&profile, "credits")
    );

    // Merge: only the changed fields are sent
    app.save_dict("user_42", [("credits", "1500"), ("last_login", "2026-01-22")], None)
        .await?;
    println!("✓ Updated user credits to 1500");

    section("3. LIST OPERATIONS");
    app.add_to_list("todo_list", ["Write documentation", "Fix bug #123"], None)
        .await?;
    println!("✓ Added 2 tasks to todo list");
    app.add_to_list("todo_list", ["Review pull request", "Deploy to production"], None)
        .await?;
    println!("✓ Added 2 more tasks");

    let todos = app.get_list("todo_list").await?;
    println!("✓ Todo list has {} items:", todos.len());
    for (i, task) in todos.iter().enumerate() {
        println!("  [{}] {}", i + 1, task);
    }

    app.add_to_list("recent_activity", ["User logged in", "Updated profile"], Some(10))
        .await?;
    println!("✓ Added recent activity with 10 second expiration");

    section("4. EXPIRATION MANAGEMENT");
    app.save("permanent_key", "This persists forever", None).await?;
    println!("✓ Saved permanent key (no expiration)");

    if app.set_expire("permanent_key", 15).await? {
        println!("✓ Added 15 second expiration to permanent key");
    }
    println!(
        "✓ Permanent key now expires in {} seconds",
        app.get_ttl("permanent_key").await?
    );

    if app.remove_expire("permanent_key").await? {
        println!("✓ Removed expiration - key is permanent again");
    }
    if app.get_ttl("permanent_key").await? == Ttl::Persistent {
        println!("✓ Confirmed: key has no expiration");
    }

    section("5. KEY MANAGEMENT");
    let keys = app.list_all().await?;
    println!("✓ Total keys in 'demo_app' namespace: {}", keys.len());
    println!("  Keys: {}", keys.join(", "));

    println!("\n✓ Checking key existence:");
    for key in ["username", "user_42", "todo_list", "nonexistent_key"] {
        let status = if app.exists(key).await? { "EXISTS" } else { "NOT FOUND" };
        println!("  {}: {}", key, status);
    }

    app.delete("permanent_key").await?;
    println!("\n✓ Deleted permanent_key");
    app.clear_list("todo_list").await?;
    println!("✓ Cleared todo_list");

    section("6. EXPIRATION DEMO (waiting for keys to expire)");
    if let Some(left) = app.get_ttl("temp_token").await?.remaining() {
        let wait = left + Duration::from_secs(1);
        println!("⏳ temp_token still exists...");
        println!("   Waiting {} seconds for it to expire...", wait.as_secs());
        sleep(wait).await;
    }
    if !app.exists("temp_token").await? {
        println!("✓ temp_token has expired and been auto-deleted");
    }

    section("7. MULTIPLE APP NAMESPACES");
    let app1 = conn.namespace("app_one");
    let app2 = conn.namespace("app_two");
    app1.save("counter", 100, None).await?;
    app2.save("counter", 200, None).await?;
    println!("✓ app_one counter: {}", app1.load("counter").await?.unwrap_or_default());
    println!("✓ app_two counter: {}", app2.load("counter").await?.unwrap_or_default());
    println!("✓ Keys are isolated in separate namespaces");

    section("8. FINAL SUMMARY");
    let remaining = app.list_all().await?;
    println!("✓ Keys remaining in 'demo_app': {}", remaining.len());
    for key in &remaining {
        match app.get_ttl(key).await? {
            Ttl::Expires(secs) => println!("  {} (expires in {}s)", key, secs),
            Ttl::Persistent => println!("  {} (permanent)", key),
            Ttl::Missing => println!("  {} (expired)", key),
        }
    }

    println!("\nCleaning up demo keys...");
    for space in [&app, &app1, &app2] {
        let deleted = space.delete_all().await?;
        println!("✓ Deleted {} keys from '{}'", deleted, space.app_name());
    }

    println!("\n{}", "=".repeat(60));
    println!("✅ Demo Complete! All AppSpace operations demonstrated.");
    println!("{}", "=".repeat(60));
    Ok(())
}

fn field<'a>(data: &'a HashMap<String, String>, name: &str) -> &'a str {
    data.get(name).map(String::as_str).unwrap_or("")
}

// =============================================================================
// Counter
// =============================================================================

async fn counter(app: &AppSpace) -> Result<()> {
    println!("--- Simple Counter Demo ---");

    let counter_key = "page_views";
    let current: u64 = match app.load(counter_key).await? {
        None => {
            println!("First time running! Initializing counter to 0.");
            0
        }
        Some(raw) => {
            let views = raw
                .parse::<u64>()
                .with_context(|| format!("{} is not a number: {}", counter_key, raw))?;
            println!("Current page views: {}", views);
            views
        }
    };

    let updated = current + 1;
    app.save(counter_key, updated, None).await?;
    println!("Updated page views to: {}", updated);

    let token_key = "temp_access_token_123";
    println!("\nGenerating temporary access token: {}", token_key);
    app.save(token_key, "ACTIVE", Some(3)).await?;

    println!("Token created. Checking status...");
    if app.exists(token_key).await? {
        println!("Token is VALID.");
    }

    println!("Waiting 4 seconds for token to expire...");
    sleep(Duration::from_secs(4)).await;

    if app.exists(token_key).await? {
        println!("Something went wrong, token still exists!");
    } else {
        println!("Token has EXPIRED as expected.");
    }
    Ok(())
}

// =============================================================================
// Rate limiter
// =============================================================================

/// Returns `true` if `user_id` exceeded `max_requests` in the current window.
///
/// The first request opens a window of `window_seconds`; later requests in
/// the same window bump the count without moving the window's end.
async fn is_rate_limited(
    app: &AppSpace,
    user_id: &str,
    max_requests: u64,
    window_seconds: u64,
) -> Result<bool> {
    let key = format!("rate_limit_{}", user_id);

    let count: u64 = match app.load(&key).await? {
        None => {
            app.save(&key, 1, Some(window_seconds)).await?;
            return Ok(false);
        }
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{} is not a number: {}", key, raw))?,
    };

    if count >= max_requests {
        return Ok(true);
    }
    app.save_keep_ttl(&key, count + 1).await?;
    Ok(false)
}

async fn rate_limiter(app: &AppSpace) -> Result<()> {
    println!("--- Rate Limiter Demo ---");
    println!("Limits users to 5 requests per 10 seconds\n");

    let user_id = "user_456";
    let key = format!("rate_limit_{}", user_id);
    app.delete(&key).await?;

    println!("Simulating 7 rapid requests from the same user:\n");
    for i in 1..=7 {
        if is_rate_limited(app, user_id, 5, 10).await? {
            println!("Request {}: ❌ BLOCKED (rate limit exceeded)", i);
        } else {
            println!("Request {}: ✓ ALLOWED", i);
        }
        sleep(Duration::from_millis(500)).await;
    }

    if let Some(left) = app.get_ttl(&key).await?.remaining() {
        let wait = left + Duration::from_secs(1);
        println!("\nRate limit resets in {} seconds", left.as_secs());
        println!("\nWaiting {} seconds for rate limit to reset...", wait.as_secs());
        sleep(wait).await;
    }

    println!("\nAfter rate limit window reset:");
    if !is_rate_limited(app, user_id, 5, 10).await? {
        println!("Request: ✓ ALLOWED (rate limit has reset)");
    }

    app.delete(&key).await?;
    Ok(())
}

// =============================================================================
// Leaderboard
// =============================================================================

/// Players ordered by score, highest first.
fn ranked(scores: HashMap<String, String>) -> Result<Vec<(String, u64)>> {
    let mut ranked = scores
        .into_iter()
        .map(|(player, score)| {
            let points = score
                .parse::<u64>()
                .with_context(|| format!("invalid score for {}: {}", player, score))?;
            Ok((player, points))
        })
        .collect::<Result<Vec<_>>>()?;
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(ranked)
}

async fn print_leaderboard(app: &AppSpace, key: &str, medals: bool) -> Result<()> {
    for (i, (player, points)) in ranked(app.load_dict(key).await?)?.into_iter().enumerate() {
        let rank = i + 1;
        if medals {
            let medal = match rank {
                1 => "🥇",
                2 => "🥈",
                3 => "🥉",
                _ => "  ",
            };
            println!("   {} #{} {}: {} points", medal, rank, player, points);
        } else {
            println!("   #{} {}: {} points", rank, player, points);
        }
    }
    Ok(())
}

async fn leaderboard(app: &AppSpace) -> Result<()> {
    println!("--- Game Leaderboard Demo ---");
    println!("Tracking high scores using dictionaries\n");

    let key = "high_scores";

    println!("1. Adding initial high scores:");
    app.save_dict(
        key,
        [("Alice", "1500"), ("Bob", "2300"), ("Charlie", "1800"), ("Diana", "2100")],
        None,
    )
    .await?;
    println!("   Scores added!\n");

    println!("2. Current Leaderboard:");
    print_leaderboard(app, key, false).await?;

    println!("\n3. Charlie just beat his high score!");
    app.save_dict(key, [("Charlie", "2500")], None).await?;
    println!("   Updated score saved!\n");

    println!("4. Updated Leaderboard:");
    print_leaderboard(app, key, true).await?;

    println!("\n5. New player 'Eve' joins with score 1900:");
    app.save_dict(key, [("Eve", "1900")], None).await?;

    println!("\n6. Final Leaderboard:");
    print_leaderboard(app, key, true).await?;

    println!("\n7. Demo complete. Clearing leaderboard...");
    app.delete(key).await?;
    Ok(())
}

// =============================================================================
// Session
// =============================================================================

async fn session(app: &AppSpace) -> Result<()> {
    println!("--- User Session Store Demo ---");

    let user_id = "user_42";
    let username = "coder_jane";
    println!("Logging in {} (ID: {})...", username, user_id);

    app.save_dict(
        user_id,
        [
            ("username", username),
            ("role", "admin"),
            ("theme", "dark"),
            ("last_login", "2023-10-27 10:00:00"),
        ],
        Some(3600),
    )
    .await?;
    println!("Session saved.");

    println!("\nRetrieving session details...");
    let mut data: Vec<_> = app.load_dict(user_id).await?.into_iter().collect();
    data.sort();
    println!("Session Data Loaded:");
    for (field, value) in &data {
        println!("  {}: {}", field, value);
    }

    let is_admin = data.iter().any(|(f, v)| f == "role" && v == "admin");
    if is_admin {
        println!("\n>> User is an ADMIN. Access Granted.");
    } else {
        println!("\n>> User is NOT an admin. Access Denied.");
    }

    println!("Session expires in {} seconds.", app.get_ttl(user_id).await?);

    println!("\nListing all keys in '{}':", app.app_name());
    println!("{:?}", app.list_all().await?);
    Ok(())
}

// =============================================================================
// Task queue
// =============================================================================

async fn task_queue(app: &AppSpace) -> Result<()> {
    println!("--- Task Queue / Todo List Demo ---");

    let key = "my_tasks";

    println!("Clearing any existing tasks...");
    app.clear_list(key).await?;

    println!("Adding 3 tasks to the queue...");
    app.add_to_list(key, ["Email the team", "Update website", "Buy coffee"], None)
        .await?;

    let tasks = app.get_list(key).await?;
    println!("Current tasks in queue ({}):", tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        println!("{}. {}", i + 1, task);
    }

    println!("\nUrgent task comes in...");
    app.add_to_list(key, ["Fix critical bug"], None).await?;

    println!("Updated task list:");
    println!("{:?}", app.get_list(key).await?);

    println!("\nDemo complete. Clearing list.");
    app.clear_list(key).await?;
    Ok(())
}

// =============================================================================
// Notifications
// =============================================================================

async fn notifications(app: &AppSpace) -> Result<()> {
    println!("--- Notification Queue Demo ---");
    println!("Simple messaging system using lists\n");

    let inbox = "user_inbox_789";
    app.clear_list(inbox).await?;

    println!("1. Sending notifications to user:");
    for message in [
        "Welcome to our app!",
        "You have a new message from Bob",
        "Your order has shipped",
        "You earned 50 bonus points!",
    ] {
        app.add_to_list(inbox, [message], None).await?;
        println!("   ✉️  {}", message);
        sleep(Duration::from_millis(300)).await;
    }

    let unread = app.get_list(inbox).await?;
    println!("\n2. User has {} unread notifications\n", unread.len());

    println!("3. User's Inbox:");
    for (i, message) in unread.iter().enumerate() {
        println!("   [{}] {}", i + 1, message);
    }

    println!("\n4. Urgent notification arrives:");
    let urgent = "🚨 Security alert: New login detected";
    app.add_to_list(inbox, [urgent], None).await?;
    println!("   {}", urgent);

    println!("\n5. Updated Inbox:");
    for (i, message) in app.get_list(inbox).await?.iter().enumerate() {
        let icon = if message.to_lowercase().contains("alert") { "🚨" } else { "📬" };
        println!("   {} [{}] {}", icon, i + 1, message);
    }

    println!("\n6. User reads all notifications...");
    sleep(Duration::from_secs(1)).await;
    app.clear_list(inbox).await?;
    println!("   Inbox cleared!");

    println!("\n7. Notifications remaining: {}", app.get_list(inbox).await?.len());
    Ok(())
}

// =============================================================================
// Config
// =============================================================================

async fn print_settings(app: &AppSpace, key: &str) -> Result<HashMap<String, String>> {
    let settings = app.load_dict(key).await?;
    let mut sorted: Vec<_> = settings.iter().collect();
    sorted.sort();
    for (name, value) in sorted {
        println!("   {}: {}", name, value);
    }
    Ok(settings)
}

async fn config(app: &AppSpace) -> Result<()> {
    println!("--- Application Configuration Demo ---");
    println!("Store and manage app settings\n");

    let key = "app_settings";

    println!("1. Setting up initial application configuration:");
    app.save_dict(
        key,
        [
            ("app_name", "MyAwesomeApp"),
            ("version", "1.0.0"),
            ("maintenance_mode", "false"),
            ("max_upload_size_mb", "100"),
            ("api_rate_limit", "1000"),
            ("theme", "dark"),
            ("debug_mode", "false"),
        ],
        None,
    )
    .await?;
    println!("   Configuration saved!\n");

    println!("2. Current Application Settings:");
    print_settings(app, key).await?;

    println!("\n3. Enabling maintenance mode...");
    app.save_dict(key, [("maintenance_mode", "true")], None).await?;
    println!("   Maintenance mode enabled!\n");

    println!("4. Checking if maintenance mode is active:");
    let settings = app.load_dict(key).await?;
    if field(&settings, "maintenance_mode") == "true" {
        println!("   🚧 App is in MAINTENANCE MODE");
        println!("   Users will see a maintenance page");
    } else {
        println!("   ✓ App is running normally");
    }

    println!("\n5. Deploying new version and changing settings:");
    app.save_dict(
        key,
        [
            ("version", "1.1.0"),
            ("maintenance_mode", "false"),
            ("debug_mode", "true"),
            ("theme", "light"),
        ],
        None,
    )
    .await?;
    println!("   Settings updated!\n");

    println!("6. Updated Application Settings:");
    let settings = print_settings(app, key).await?;

    println!("\n7. Using configuration as feature flags:");
    if field(&settings, "debug_mode") == "true" {
        println!("   🐛 Debug logging is ENABLED");
    } else {
        println!("   Debug logging is disabled");
    }

    println!("\n8. All keys in config namespace:");
    println!("   {:?}", app.list_all().await?);

    println!("\n9. Demo complete. Clearing configuration...");
    app.delete(key).await?;
    println!("   Configuration cleared!");
    Ok(())
}

// =============================================================================
// Cache
// =============================================================================

/// Stands in for a slow database query.
async fn expensive_lookup(user_id: &str) -> Vec<(String, String)> {
    println!("  [Simulating expensive database query for user {}...]", user_id);
    sleep(Duration::from_secs(2)).await;
    [
        ("id", user_id),
        ("name", "Alice Smith"),
        ("email", "alice@example.com"),
        ("credits", "1000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Cache-aside read: serve from the store, fall back to the slow lookup.
async fn cached_profile(
    app: &AppSpace,
    user_id: &str,
    key: &str,
) -> Result<HashMap<String, String>> {
    let cached = app.load_dict(key).await?;
    if !cached.is_empty() {
        println!("  Cache HIT - loaded from store");
        return Ok(cached);
    }

    println!("  Cache MISS - fetching from database...");
    let profile = expensive_lookup(user_id).await;
    app.save_dict(key, profile.clone(), Some(300)).await?;
    println!("  Cached for 5 minutes");
    Ok(profile.into_iter().collect())
}

async fn cache(app: &AppSpace) -> Result<()> {
    println!("--- Simple Cache Demo ---");
    println!("This demonstrates caching expensive operations\n");

    let user_id = "user_123";
    let key = format!("user_profile_{}", user_id);

    for (step, label) in [(1, "First request (cache miss)"), (2, "Second request (cache hit)")] {
        println!("{}. {}:", step, label);
        let started = Instant::now();
        let profile = cached_profile(app, user_id, &key).await?;
        println!("  Response time: {:.2} seconds", started.elapsed().as_secs_f64());
        let mut fields: Vec<_> = profile.into_iter().collect();
        fields.sort();
        println!("  User data: {:?}\n", fields);
    }

    println!("3. Cache expires in {} seconds", app.get_ttl(&key).await?);

    println!("\n4. Clearing cache for demo cleanup...");
    app.delete(&key).await?;
    println!("  Cache cleared!");
    Ok(())
}
