use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linepick::buffer::MemoryBuffer;
use linepick::matcher::Matcher;
use linepick::Record;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;

/// Log-like lines with a known sprinkling of "timeout" and "Payment".
fn generate_records(count: usize, seed: u64) -> Vec<Arc<Record>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let levels = ["DEBUG", "INFO", "WARN", "ERROR"];
    let services = ["auth", "database", "cache", "Payment", "notification"];
    let outcomes = ["ok", "retry", "timeout", "connection_failed"];

    let lines: Vec<String> = (0..count)
        .map(|i| {
            format!(
                "[2024-09-02T10:{:02}:{:02}] {} {}: request {} {} user_{}",
                (i / 60) % 60,
                i % 60,
                levels[rng.gen_range(0..levels.len())],
                services[rng.gen_range(0..services.len())],
                i,
                outcomes[rng.gen_range(0..outcomes.len())],
                rng.gen_range(0..1000)
            )
        })
        .collect();
    MemoryBuffer::from_lines(&lines).snapshot()
}

fn bench_builtin_matchers(c: &mut Criterion) {
    let mut group = c.benchmark_group("builtin_matchers");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(3));

    for count in [10_000, 100_000] {
        let records = generate_records(count, 42);
        let cases = [
            ("ignore_case", Matcher::IgnoreCase, "timeout"),
            ("ignore_case_two_terms", Matcher::IgnoreCase, "payment timeout"),
            ("smart_case_upper", Matcher::SmartCase, "Payment"),
            ("regexp", Matcher::Regexp, r"user_9\d\d$"),
        ];
        for (name, matcher, query) in cases {
            group.bench_with_input(BenchmarkId::new(name, count), &records, |b, records| {
                b.iter(|| {
                    let matches = matcher.filter(black_box(records), black_box(query)).unwrap();
                    black_box(matches.len())
                })
            });
        }
    }

    group.finish();
}

fn bench_empty_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("empty_query");
    group.sample_size(10);

    let records = generate_records(100_000, 43);
    group.bench_function("pass_through", |b| {
        b.iter(|| {
            let matches = Matcher::IgnoreCase.filter(black_box(&records), "").unwrap();
            black_box(matches.len())
        })
    });

    group.finish();
}

fn bench_superseded_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("superseded_pass");
    group.sample_size(10);

    // A pass abandoned immediately should cost about one check interval
    let records = generate_records(100_000, 44);
    group.bench_function("abandoned", |b| {
        b.iter(|| {
            let outcome = Matcher::IgnoreCase
                .filter_cancellable(black_box(&records), "timeout", &|| true)
                .unwrap();
            black_box(outcome.is_none())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_builtin_matchers,
    bench_empty_query,
    bench_superseded_pass
);
criterion_main!(benches);
