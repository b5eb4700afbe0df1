//! Criteria evaluation benchmark suite.
//!
//! Benchmarks the per-action matching cost of each criteria variant; this
//! runs on the hot path of every dispatched action.
//!
//! Run with: cargo bench --bench criteria
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use socket_relay::{Action, Criteria};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const PREFIX_SET_SIZES: &[usize] = &[2, 8, 32];

fn sample_actions() -> Vec<Action> {
    vec![
        Action::new("CART_ADD").with_field("sku", "A-1"),
        Action::new("CART_REMOVE").with_field("sku", "A-1"),
        Action::new("USER_LOGIN"),
        Action::new("NAV_OPEN_MENU"),
        Action::new("PING"),
    ]
}

// ============================================================================
// Benchmark: Prefix Matching
// ============================================================================

fn bench_prefix(c: &mut Criterion) {
    let actions = sample_actions();
    let criteria = Criteria::prefix("CART_");

    c.bench_function("prefix_match", |b| {
        b.iter(|| {
            actions
                .iter()
                .filter(|action| criteria.matches(action))
                .count()
        });
    });
}

// ============================================================================
// Benchmark: Prefix Set Matching
// ============================================================================

fn bench_prefix_set(c: &mut Criterion) {
    let actions = sample_actions();

    let mut group = c.benchmark_group("prefix_set_match");

    for &size in PREFIX_SET_SIZES {
        let prefixes: Vec<String> = (0..size).map(|i| format!("MODULE{i}_")).collect();
        let criteria = Criteria::prefixes(prefixes);

        group.bench_with_input(BenchmarkId::new("miss_all", size), &criteria, |b, criteria| {
            b.iter(|| {
                actions
                    .iter()
                    .filter(|action| criteria.matches(action))
                    .count()
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Predicate Matching
// ============================================================================

fn bench_predicate(c: &mut Criterion) {
    let actions = sample_actions();
    let criteria = Criteria::predicate(|kind, _| kind == "PING");

    c.bench_function("predicate_match", |b| {
        b.iter(|| {
            actions
                .iter()
                .filter(|action| criteria.matches(action))
                .count()
        });
    });
}

criterion_group!(benches, bench_prefix, bench_prefix_set, bench_predicate);
criterion_main!(benches);
