use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use hookstock::{
    engine::{
        filter::{self, FilterState},
        page,
    },
    record::{HookRecord, Origin},
};

fn record(n: u32) -> HookRecord {
    HookRecord {
        date: format!("{:02}/{:02}/2024", n % 28 + 1, n % 12 + 1),
        id: format!("MK-{n}"),
        order: format!("ORD-{}", n % 500),
        pants_code: format!("P-{}", n % 40),
        shirt_code: format!("S-{}", n % 40),
        color: "black".to_string(),
        group: format!("team-{}", n % 12),
        quantity: (n % 30).to_string(),
        origin: Origin::Confirmed {
            year: "2024".to_string(),
            row_index: n + 2,
        },
    }
}

fn records(count: u32) -> Vec<HookRecord> {
    (0..count).map(record).collect()
}

fn bench_filter(c: &mut Criterion) {
    let all = records(50_000);
    let mut filter_state = FilterState::for_years(["2024"]);
    filter_state.code_query = "P-1".to_string();
    filter_state.group_query = "team-7".to_string();

    c.bench_function("filter_50k", |b| {
        b.iter(|| filter::apply(&all, &filter_state));
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let all = records(50_000);
    c.bench_function("total_quantity_50k", |b| {
        b.iter(|| filter::total_quantity(&all));
    });
}

fn bench_paginate(c: &mut Criterion) {
    let mut group = c.benchmark_group("paginate");
    let all = records(50_000);

    for size in [20usize, 100usize, 1000usize] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| page::paginate(&all, size, 7));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_aggregate, bench_paginate);
criterion_main!(benches);
