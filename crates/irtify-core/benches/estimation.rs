use criterion::{black_box, criterion_group, criterion_main, Criterion};

use irtify_core::ctt::estimate_ctt;
use irtify_core::dif::analyze_dif;
use irtify_core::irt::{estimate_irt, icc};
use irtify_core::model::ResponseMatrix;

const OPTIONS: [&str; 4] = ["A", "B", "C", "D"];

/// Deterministic pseudo-random data set: examinee `e` answers item `i`
/// correctly more often the higher `e` is.
fn make_matrix(examinees: usize, items: usize) -> ResponseMatrix {
    let key: Vec<&str> = (0..items).map(|i| OPTIONS[i % 4]).collect();
    let rows: Vec<Vec<&str>> = (0..examinees)
        .map(|e| {
            (0..items)
                .map(|i| {
                    let roll = (e * 7919 + i * 104_729) % 100;
                    if roll < 30 + (e * 60 / examinees.max(1)) {
                        key[i]
                    } else {
                        OPTIONS[(i + e) % 4]
                    }
                })
                .collect()
        })
        .collect();
    ResponseMatrix::from_rows(key.clone(), rows).expect("benchmark matrix is well-formed")
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimators");

    for (examinees, items) in [(100, 20), (1000, 40)] {
        let matrix = make_matrix(examinees, items);
        group.bench_function(format!("ctt/{examinees}x{items}"), |b| {
            b.iter(|| estimate_ctt(black_box(&matrix)))
        });
        group.bench_function(format!("irt/{examinees}x{items}"), |b| {
            b.iter(|| estimate_irt(black_box(matrix.key()), black_box(matrix.records())))
        });
    }

    group.finish();
}

fn bench_dif(c: &mut Criterion) {
    let matrix = make_matrix(1000, 40);
    let groups: Vec<&str> = (0..1000).map(|e| if e % 2 == 0 { "F" } else { "M" }).collect();

    c.bench_function("dif/1000x40", |b| {
        b.iter(|| analyze_dif(black_box(&matrix), black_box(&groups)))
    });
}

fn bench_icc(c: &mut Criterion) {
    c.bench_function("icc", |b| {
        b.iter(|| icc(black_box(0.4), black_box(1.2), black_box(0.6), black_box(0.25)))
    });
}

criterion_group!(benches, bench_estimators, bench_dif, bench_icc);
criterion_main!(benches);
