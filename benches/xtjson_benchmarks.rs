use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;
use xtjson::{lexer::tokenize, parse_json, Dialect, MemoryFetcher, XtJson};

// ============================================================================
// Test Data: Varying Complexity and Size
// ============================================================================

const TINY: &str = r#"{"value": 42}"#;

const SMALL: &str = r#"{
    "name": "test",
    "version": 1.0,
    "enabled": true,
    "tags": ["a", "b", "c"]
}"#;

const MEDIUM: &str = r#"{
    // servers share most of their settings
    "defaults": {"ssl": true, "retries": 5, "timeout": 30},
    "servers": [
        {"host": "server1.com", "port": 8080, "status": "active"},
        {"host": "server2.com", "port": 8081, "status": "active"},
        {"host": "server3.com", "port": 8082, "status": "inactive"}
    ],
    /* a set of regions, duplicates collapse */
    "regions": ("eu", "us", "eu", "ap"),
    "budget": `12 * 1024`
}"#;

const LARGE: &str = r#"{
    "app": {
        "name": "inventory",
        "version": "2.4.1",
        "description": "Tracks stock, orders and \"backorders\" across warehouses"
    },
    "database": {
        "primary": {"host": "db1.internal", "port": 5432, "pool": `4 * 8`},
        "replicas": [
            {"host": "db2.internal", "port": 5432, "weight": 0.5},
            {"host": "db3.internal", "port": 5432, "weight": 0.25},
            {"host": "db4.internal", "port": 5432, "weight": 0.25}
        ]
    },
    "cache": {
        "enabled": true,
        "ttl": `60 * 60`,
        "max_size": 10485760
    },
    "logging": {
        "level": "info",
        "format": "json",
        "output": "stdout",
        "filters": ("sql", "http", "sql")
    },
    "features": {
        "auth_enabled": true,
        "rate_limiting": true,
        "compression": false
    }
}"#;

// Generate a large document for stress testing
fn generate_array_doc(array_size: usize) -> String {
    let mut doc = String::from("{\n    \"items\": [\n");
    for i in 0..array_size {
        doc.push_str(&format!(
            "        {{\"id\": {}, \"name\": \"Item {}\", \"value\": {}, \"active\": {}}},\n",
            i,
            i,
            i * 100,
            i % 2 == 0
        ));
    }
    doc.push_str("    ]\n}");
    doc
}

// ============================================================================
// Tokenizer Benchmarks
// ============================================================================

fn bench_tokenize_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize_by_size");

    for (name, source) in [
        ("tiny", TINY),
        ("small", SMALL),
        ("medium", MEDIUM),
        ("large", LARGE),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| tokenize(black_box(src), Dialect::Extended))
        });
    }

    group.finish();
}

fn bench_tokenize_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize_array_scaling");

    for size in [10, 100, 1000] {
        let source = generate_array_doc(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| tokenize(black_box(src), Dialect::Extended))
        });
    }

    group.finish();
}

// ============================================================================
// End-to-End Benchmarks
// ============================================================================

fn bench_parse_sizes(c: &mut Criterion) {
    let session = XtJson::new();
    let mut group = c.benchmark_group("parse_by_size");

    for (name, source) in [
        ("tiny", TINY),
        ("small", SMALL),
        ("medium", MEDIUM),
        ("large", LARGE),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("default", name), source, |b, src| {
            b.iter(|| block_on(session.parse(black_box(src))))
        });
        group.bench_with_input(BenchmarkId::new("safe", name), source, |b, src| {
            b.iter(|| block_on(session.parse_safe(black_box(src))))
        });
    }

    group.finish();
}

fn bench_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_array_scaling");

    for size in [10, 100, 1000] {
        let source = generate_array_doc(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("json", size), &source, |b, src| {
            b.iter(|| parse_json(black_box(src)))
        });
        group.bench_with_input(BenchmarkId::new("json_to_string", size), &source, |b, src| {
            b.iter(|| parse_json(black_box(src)).map(|value| value.to_json()))
        });
    }

    group.finish();
}

fn bench_remote_references(c: &mut Criterion) {
    let session = XtJson::new().with_fetcher(
        MemoryFetcher::new()
            .with_document("small", SMALL)
            .with_document("large", LARGE),
    );
    let source = r#"{"a": ~"small", "b": ~"large", "c": [~"small", ~"small"]}"#;

    c.bench_function("remote_references", |b| {
        b.iter(|| block_on(session.parse_remote_unsafe(black_box(source))))
    });
}

criterion_group!(tokenizer_benches, bench_tokenize_sizes, bench_tokenize_scaling);
criterion_group!(parse_benches, bench_parse_sizes, bench_parse_scaling);
criterion_group!(remote_benches, bench_remote_references);
criterion_main!(tokenizer_benches, parse_benches, remote_benches);
