use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gridbox_core::{GridConfig, GridHint};
use gridbox_layout::{compute_grid, GridStrategy};

/// A form-like mix: mostly single cells with periodic wide and tall
/// nodes, plus a few explicit reservations.
fn form_hints(count: usize) -> Vec<GridHint> {
    (0..count)
        .map(|i| match i % 7 {
            0 => GridHint::auto().span(2, 1),
            3 => GridHint::auto().span(1, 2),
            5 => GridHint::auto().full_width(),
            _ => GridHint::auto(),
        })
        .collect()
}

fn bench_compute_grid(c: &mut Criterion) {
    let config = GridConfig::new(4);
    let hints = form_hints(100);

    c.bench_function("compute_grid/row_major/100", |b| {
        b.iter(|| compute_grid(black_box(&hints), &config, &GridStrategy::RowMajor));
    });

    c.bench_function("compute_grid/column_balanced/100", |b| {
        b.iter(|| compute_grid(black_box(&hints), &config, &GridStrategy::ColumnBalanced));
    });
}

criterion_group!(benches, bench_compute_grid);
criterion_main!(benches);
