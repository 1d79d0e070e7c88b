use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mcqeval_core::config::AnalysisConfig;
use mcqeval_core::engine::analyze;
use mcqeval_core::model::RawTable;
use mcqeval_core::scoring::partition;

const CHOICES: [&str; 4] = ["A", "B", "C", "D"];

/// Deterministic table: key row plus `students` rows over `items` columns.
fn make_table(students: usize, items: usize) -> RawTable {
    let mut rows = Vec::with_capacity(students + 1);
    rows.push((0..items).map(|i| CHOICES[i % 4]).collect::<Vec<_>>());
    for s in 0..students {
        rows.push(
            (0..items)
                .map(|i| CHOICES[(s * 7 + i * 3 + s / 5) % 4])
                .collect(),
        );
    }
    RawTable::from_cells(rows)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let config = AnalysisConfig::default();

    for (students, items) in [(40, 20), (400, 50), (4000, 100)] {
        let table = make_table(students, items);
        group.bench_function(format!("students={students},items={items}"), |b| {
            b.iter(|| analyze(black_box(&table), black_box(&config)))
        });
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let analysis = match analyze(&make_table(4000, 100), &config) {
        Ok(a) => a,
        Err(e) => panic!("bench table failed to analyze: {e}"),
    };

    c.bench_function("partition/students=4000", |b| {
        b.iter(|| partition(black_box(&analysis.scores)))
    });
}

criterion_group!(benches, bench_analyze, bench_partition);
criterion_main!(benches);
