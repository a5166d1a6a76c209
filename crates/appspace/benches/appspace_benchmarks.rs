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

//! Performance benchmarks for AppSpace operations
//!
//! ## Purpose
//! Measures the overhead the namespaced accessor adds on top of a backend.
//! Runs against the in-memory backend so numbers reflect the facade, not
//! the network.
//!
//! ## Benchmarks
//! 1. **Simple values**: save, load, exists
//! 2. **Dictionaries**: merge into an existing hash, load
//! 3. **Lists**: append
//! 4. **Namespace scans**: list_all with a noisy neighbour app
//! 5. **Concurrent access**: many tasks sharing one accessor
//!
//! ## Running Benchmarks
//! ```bash
//! # Run all benchmarks
//! cargo bench -p appspace
//!
//! # Run specific benchmark
//! cargo bench -p appspace -- simple_values
//!
//! # Save baseline for comparison
//! cargo bench -p appspace -- --save-baseline main
//! ```

use appspace::{AppSpace, Connection};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use tokio::runtime::Runtime;

// =============================================================================
// BENCHMARK HELPERS
// =============================================================================

/// Create test key with prefix
fn test_key(prefix: &str, i: usize) -> String {
    format!("{}_{:08}", prefix, i)
}

/// Create test value of specified size
fn test_value(size: usize) -> String {
    "x".repeat(size)
}

fn bench_app() -> AppSpace {
    Connection::in_memory().namespace("bench_app")
}

/// Pre-populate `count` string keys
fn populate(rt: &Runtime, app: &AppSpace, prefix: &str, count: usize, value: &str) {
    rt.block_on(async {
        for i in 0..count {
            app.save(&test_key(prefix, i), value, None).await.unwrap();
        }
    });
}

// =============================================================================
// BENCHMARK 1: SIMPLE VALUES
// =============================================================================

fn bench_simple_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_values");
    let rt = Runtime::new().unwrap();

    for &size in &[100usize, 10 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("save", size), &size, |b, &size| {
            let app = bench_app();
            let value = test_value(size);
            let mut counter = 0;

            b.to_async(&rt).iter(|| {
                let app = app.clone();
                let value = value.clone();
                let key = test_key("save", counter % 1000);
                counter += 1;

                async move {
                    app.save(&key, value, None).await.unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("load", size), &size, |b, &size| {
            let app = bench_app();
            populate(&rt, &app, "load", 1000, &test_value(size));
            let mut counter = 0;

            b.to_async(&rt).iter(|| {
                let app = app.clone();
                let key = test_key("load", counter % 1000);
                counter += 1;

                async move {
                    let _ = black_box(app.load(&key).await.unwrap());
                }
            });
        });
    }

    group.bench_function("exists", |b| {
        let app = bench_app();
        populate(&rt, &app, "exists", 1000, "v");
        let mut counter = 0;

        b.to_async(&rt).iter(|| {
            let app = app.clone();
            // Half the lookups miss
            let key = test_key("exists", counter % 2000);
            counter += 1;

            async move {
                let _ = black_box(app.exists(&key).await.unwrap());
            }
        });
    });

    group.finish();
}

// =============================================================================
// BENCHMARK 2: DICTIONARIES
// =============================================================================

fn bench_dicts(c: &mut Criterion) {
    let mut group = c.benchmark_group("dicts");
    let rt = Runtime::new().unwrap();

    for &fields in &[4usize, 64] {
        group.throughput(Throughput::Elements(fields as u64));

        group.bench_with_input(BenchmarkId::new("save_dict", fields), &fields, |b, &fields| {
            let app = bench_app();
            let data: Vec<(String, String)> = (0..fields)
                .map(|i| (format!("field_{}", i), i.to_string()))
                .collect();

            b.to_async(&rt).iter(|| {
                let app = app.clone();
                let data = data.clone();
                async move {
                    app.save_dict("profile", data, None).await.unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("load_dict", fields), &fields, |b, &fields| {
            let app = bench_app();
            rt.block_on(async {
                let data = (0..fields).map(|i| (format!("field_{}", i), i.to_string()));
                app.save_dict("profile", data, None).await.unwrap();
            });

            b.to_async(&rt).iter(|| {
                let app = app.clone();
                async move {
                    let _ = black_box(app.load_dict("profile").await.unwrap());
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// BENCHMARK 3: LISTS
// =============================================================================

fn bench_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("lists");
    let rt = Runtime::new().unwrap();

    group.bench_function("add_to_list", |b| {
        let app = bench_app();
        let mut counter = 0usize;

        b.to_async(&rt).iter(|| {
            let app = app.clone();
            counter += 1;
            let reset = counter % 10_000 == 0;
            async move {
                if reset {
                    app.clear_list("queue").await.unwrap();
                }
                app.add_to_list("queue", [counter], None).await.unwrap();
            }
        });
    });

    group.finish();
}

// =============================================================================
// BENCHMARK 4: NAMESPACE SCANS
// =============================================================================

fn bench_list_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_all");
    let rt = Runtime::new().unwrap();
    group.sample_size(20);

    for &neighbours in &[0usize, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("with_neighbour_keys", neighbours),
            &neighbours,
            |b, &neighbours| {
                let conn = Connection::in_memory();
                let app = conn.namespace("bench_app");
                let other = conn.namespace("noisy_app");
                populate(&rt, &app, "mine", 100, "v");
                populate(&rt, &other, "theirs", neighbours, "v");

                b.to_async(&rt).iter(|| {
                    let app = app.clone();
                    async move {
                        let _ = black_box(app.list_all().await.unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// BENCHMARK 5: CONCURRENT ACCESS
// =============================================================================

fn bench_concurrent_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_access");
    let rt = Runtime::new().unwrap();
    let operation_count = 1000;
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for &task_count in &[1usize, 4, 8] {
        group.throughput(Throughput::Elements((operation_count * task_count) as u64));

        group.bench_with_input(
            BenchmarkId::new("mixed_80_20", task_count),
            &task_count,
            |b, &task_count| {
                let app = bench_app();
                populate(&rt, &app, "mixed", operation_count, "v");

                b.to_async(&rt).iter(|| {
                    let app = app.clone();
                    async move {
                        let mut handles = Vec::new();
                        for _ in 0..task_count {
                            let app = app.clone();
                            handles.push(tokio::spawn(async move {
                                for i in 0..operation_count {
                                    let key = test_key("mixed", i);
                                    if i % 5 == 0 {
                                        app.save(&key, i, None).await.unwrap();
                                    } else {
                                        let _ = black_box(app.load(&key).await.unwrap());
                                    }
                                }
                            }));
                        }
                        for handle in handles {
                            handle.await.unwrap();
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_simple_values,
    bench_dicts,
    bench_lists,
    bench_list_all,
    bench_concurrent_access
);
criterion_main!(benches);
