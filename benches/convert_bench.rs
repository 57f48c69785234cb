//! Performance benchmarks for member resolution and value conversion.
//!
//! Run with: cargo bench
//!
//! These benchmarks track:
//! - Resolution of a type's members
//! - Whole-object conversion with and without the class encryption flag
//! - Sealing strings of various sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use native_store::member::{Marker, Persistable, TypeDescriptor, Visibility};
use native_store::resolver::resolve;
use native_store::StoreResolver;

#[derive(Default)]
struct Record {
    id: u64,
    title: String,
    body: String,
    tags: Vec<String>,
    owner: Option<Owner>,
}

#[derive(Default)]
struct Owner {
    name: String,
    email: String,
}

impl Persistable for Owner {
    const TYPE_NAME: &'static str = "Owner";

    fn describe() -> TypeDescriptor<Self> {
        Self::descriptor()
            .field("name", Visibility::Public, |o| &o.name, |o, v| o.name = v)
            .field("email", Visibility::Private, |o| &o.email, |o, v| o.email = v)
            .marked(Marker::Encrypt)
    }
}

impl Persistable for Record {
    const TYPE_NAME: &'static str = "Record";

    fn describe() -> TypeDescriptor<Self> {
        Self::descriptor()
            .field("id", Visibility::Public, |r| &r.id, |r, v| r.id = v)
            .field("title", Visibility::Public, |r| &r.title, |r, v| r.title = v)
            .field("body", Visibility::Private, |r| &r.body, |r, v| r.body = v)
            .marked(Marker::Encrypt)
            .field("tags", Visibility::Public, |r| &r.tags, |r, v| r.tags = v)
            .nested_field("owner", Visibility::Public, |r| &r.owner, |r, v| r.owner = v)
    }
}

fn sample_record() -> Record {
    Record {
        id: 7,
        title: "benchmark".to_string(),
        body: "x".repeat(512),
        tags: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        owner: Some(Owner {
            name: "bench".to_string(),
            email: "bench@example.com".to_string(),
        }),
    }
}

/// Benchmark member resolution.
fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve_record", |b| {
        b.iter(|| black_box(resolve::<Record>()));
    });
}

/// Benchmark whole-object conversion in both directions.
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let resolver = StoreResolver::new(Some("benchmark-key")).expect("valid key");
    let record = sample_record();

    for encrypt_class in [false, true] {
        let tree = resolver.to_tree(&record, encrypt_class).expect("to_tree failed");

        group.bench_with_input(
            BenchmarkId::new("to_tree", encrypt_class),
            &encrypt_class,
            |b, &flag| {
                b.iter(|| black_box(resolver.to_tree(black_box(&record), flag).expect("to_tree failed")));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("from_tree", encrypt_class),
            &encrypt_class,
            |b, &flag| {
                b.iter(|| {
                    let restored: Record = resolver
                        .from_tree(black_box(&tree), flag)
                        .expect("from_tree failed");
                    black_box(restored);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark sealing performance with various payload sizes.
fn bench_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("seal");
    let resolver = StoreResolver::new(Some("benchmark-key")).expect("valid key");
    let sizes = vec![("1KB", 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        let data = "x".repeat(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(resolver.seal(black_box(data)).expect("seal failed")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_convert, bench_seal);
criterion_main!(benches);
