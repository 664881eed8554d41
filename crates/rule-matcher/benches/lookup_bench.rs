//! 查找性能基准测试
//!
//! 对比线性扫描与条件名索引在不同规则规模下的查找耗时。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_matcher::{ConditionSet, Engine, Predicate, Quantifier, ValueSet};
use std::hint::black_box;

/// 每条规则引用一个独立的条件名，便于索引发挥作用
fn create_engine(size: usize, indexed: bool) -> Engine<usize> {
    let rules = (0..size).map(|i| {
        ValueSet::builder()
            .condition(format!("cond_{}", i % 50), [i as i64, i as i64 + 1, i as i64 + 2])
            .output(i)
            .build()
            .unwrap()
    });

    Engine::builder()
        .predicate(Predicate::Equals)
        .quantifier(Quantifier::Any)
        .rules(rules)
        .indexed(indexed)
        .build()
}

fn bench_lookup_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_scaling");
    let query = ConditionSet::builder().condition("cond_7", 57).build();

    for size in [10, 100, 1000].iter() {
        let linear = create_engine(*size, false);
        let indexed = create_engine(*size, true);

        group.bench_with_input(BenchmarkId::new("linear", size), size, |b, _| {
            b.iter(|| linear.lookup(black_box(&query)))
        });
        group.bench_with_input(BenchmarkId::new("indexed", size), size, |b, _| {
            b.iter(|| indexed.lookup(black_box(&query)))
        });
    }

    group.finish();
}

fn bench_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicates");
    let query = ConditionSet::builder()
        .condition("text", "xx valx valy valz xxx")
        .build();

    let predicates = [
        ("contains", Predicate::Contains),
        ("contains_ignore_case", Predicate::ContainsIgnoreCase),
        (
            "or_equals_contains",
            Predicate::or([Predicate::Equals, Predicate::Contains]),
        ),
    ];

    for (name, predicate) in predicates {
        let engine = Engine::builder()
            .predicate(predicate)
            .quantifier(Quantifier::All)
            .rule(
                ValueSet::builder()
                    .condition("text", ["valx", "valy", "valz"])
                    .output(name)
                    .build()
                    .unwrap(),
            )
            .build();

        group.bench_function(name, |b| b.iter(|| engine.lookup(black_box(&query))));
    }

    group.finish();
}

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("patterns");
    let query = ConditionSet::builder()
        .condition("email", "someone@example.com")
        .build();
    let pattern = rule_matcher::Value::pattern(r"[\w.-]+@[\w.-]+\.\w+").unwrap();

    for (name, predicate) in [
        ("pattern_matches", Predicate::PatternMatches),
        ("pattern_find", Predicate::PatternFind),
    ] {
        let engine = Engine::builder()
            .predicate(predicate)
            .rule(
                ValueSet::builder()
                    .condition("email", [pattern.clone()])
                    .output(name)
                    .build()
                    .unwrap(),
            )
            .build();

        group.bench_function(name, |b| b.iter(|| engine.lookup(black_box(&query))));
    }

    group.finish();
}

criterion_group!(benches, bench_lookup_scaling, bench_predicates, bench_patterns);
criterion_main!(benches);
