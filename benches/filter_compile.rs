//! Benchmarks for filter compilation and statement assembly.
//!
//! Benchmark targets:
//! - Empty filter: <1us
//! - Mixed five-predicate filter: <10us
//! - Large `OneOf` lists, bound vs inline

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use litestore::storage::sqlite::{QueryBuilder, compile_filter};
use litestore::{Filter, ListBinding, Pattern, QueryOptions, Value};

fn mixed_filter() -> Filter {
    Filter::new()
        .eq("status", "active")
        .eq("owner", 42)
        .one_of("role", ["admin", "owner", "editor"])
        .matches("name", Pattern::new("a%"))
        .eq("region", "eu-west")
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_filter");
    group.measurement_time(Duration::from_secs(5));

    let empty = Filter::new();
    let none = QueryOptions::new();
    group.bench_function("empty", |b| {
        b.iter(|| compile_filter(black_box(&empty), black_box(&none), ListBinding::Bound));
    });

    let filter = mixed_filter();
    let options = QueryOptions::new()
        .order_asc("name")
        .order_desc("created")
        .limit(50)
        .offset(100);
    group.bench_function("mixed", |b| {
        b.iter(|| compile_filter(black_box(&filter), black_box(&options), ListBinding::Bound));
    });

    group.finish();
}

fn bench_list_binding(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_of_list");

    for size in [10_i64, 100, 1000] {
        let filter = Filter::new().one_of("id", (0..size).map(Value::Integer));
        let options = QueryOptions::new();
        group.throughput(Throughput::Elements(size.unsigned_abs()));

        for binding in [ListBinding::Bound, ListBinding::Inline] {
            group.bench_with_input(
                BenchmarkId::new(binding.as_str(), size),
                &filter,
                |b, filter| {
                    b.iter(|| compile_filter(black_box(filter), &options, binding));
                },
            );
        }
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let filter = mixed_filter();
    let options = QueryOptions::new().fields(["id", "name", "role"]).limit(10);
    let builder = QueryBuilder::new("users");

    c.bench_function("select_statement", |b| {
        b.iter(|| {
            let compiled = compile_filter(black_box(&filter), &options, ListBinding::Bound);
            builder.select(options.fields.as_deref(), &compiled)
        });
    });
}

criterion_group!(benches, bench_compile, bench_list_binding, bench_select);
criterion_main!(benches);
