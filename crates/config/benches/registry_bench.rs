//! Registry read-path benchmarks
//!
//! Compares cached and uncached path splitting, then times raw lookups,
//! typed getters and record projection against a mid-sized section.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use keystone_config::core::path::{PathCache, split};
use keystone_config::core::value::tree_from_json;
use keystone_config::{ConfigTree, MapEnv, Registry, Unmarshal};
use serde_json::json;
use std::hint::black_box;

const PATHS: &[&str] = &[
    "app",
    "app.database.host",
    "app.database.connections.mysql.read.host",
    "app.services.cache.redis.cluster.nodes.primary.port",
];

#[derive(Default, Unmarshal)]
struct Database {
    host: String,
    port: i64,
    #[config(key = "max_connections")]
    pool: i64,
}

fn registry() -> Registry {
    let registry = Registry::builder()
        .with_env_source(MapEnv::new().with_var("APP_NAME", "bench"))
        .skip_dotenv()
        .build("testing")
        .expect("testing registry");

    registry.register("app", |_| -> ConfigTree {
        tree_from_json(json!({
            "name": "bench",
            "database": {
                "host": "localhost",
                "port": 5432,
                "max_connections": 64,
                "connections": { "mysql": { "read": { "host": "replica" } } }
            },
            "hosts": "a, b, c, d",
            "services": {
                "cache": { "redis": { "cluster": { "nodes": { "primary": { "port": "6379" } } } } }
            }
        }))
        .unwrap_or_default()
    });
    registry
}

// ============================================================================
// Path splitting
// ============================================================================

fn bench_path_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_split");
    let cache = PathCache::new();

    for path in PATHS {
        let depth = path.split('.').count();
        group.bench_with_input(BenchmarkId::new("uncached", depth), path, |b, path| {
            b.iter(|| black_box(split(black_box(path))))
        });
        group.bench_with_input(BenchmarkId::new("cached", depth), path, |b, path| {
            b.iter(|| black_box(cache.get(black_box(path))))
        });
    }

    group.finish();
}

// ============================================================================
// Registry reads
// ============================================================================

fn bench_get(c: &mut Criterion) {
    let registry = registry();

    c.bench_function("get_shallow", |b| {
        b.iter(|| black_box(registry.get(black_box("app.name"))))
    });

    c.bench_function("get_deep", |b| {
        b.iter(|| black_box(registry.get(black_box("app.database.connections.mysql.read.host"))))
    });

    c.bench_function("get_missing_with_default", |b| {
        b.iter(|| black_box(registry.get_int_or(black_box("app.database.timeout"), 30)))
    });
}

fn bench_typed_getters(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("typed_getters");

    group.bench_function("string", |b| {
        b.iter(|| black_box(registry.get_string(black_box("app.database.host"))))
    });
    group.bench_function("int", |b| {
        b.iter(|| black_box(registry.get_int(black_box("app.database.port"))))
    });
    group.bench_function("int_from_string", |b| {
        b.iter(|| {
            black_box(registry.get_int(black_box(
                "app.services.cache.redis.cluster.nodes.primary.port",
            )))
        })
    });
    group.bench_function("string_array_split", |b| {
        b.iter(|| black_box(registry.get_string_array(black_box("app.hosts"))))
    });
    group.bench_function("env_string", |b| {
        b.iter(|| black_box(registry.env_string(black_box("APP_NAME"), "default")))
    });

    group.finish();
}

fn bench_unmarshal(c: &mut Criterion) {
    let registry = registry();

    c.bench_function("unmarshal_key", |b| {
        b.iter(|| {
            let mut db = Database::default();
            registry
                .unmarshal_key(black_box("app.database"), &mut db)
                .map(|()| black_box((db.host.len(), db.port, db.pool)))
        })
    });
}

criterion_group!(
    benches,
    bench_path_split,
    bench_get,
    bench_typed_getters,
    bench_unmarshal
);
criterion_main!(benches);
