//! Throughput of the measurement decoders and of whole runs per strategy.

use brc_stats::{Strategy, parse, run};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const SAMPLES: [&[u8]; 6] = [b"0.0", b"-5.5", b"12.3", b"-99.9", b"45.7", b"7.1"];

fn generate_input(lines: usize) -> Vec<u8> {
    let names = ["Abha", "Dakar", "Hamburg", "Ouagadougou", "Wellington"];
    let mut input = Vec::new();
    for i in 0..lines {
        let tenths = (i as i64 * 7919) % 1999 - 999;
        let sign = if tenths < 0 { "-" } else { "" };
        input.extend_from_slice(
            format!(
                "{};{sign}{}.{}\n",
                names[i % names.len()],
                tenths.abs() / 10,
                tenths.abs() % 10
            )
            .as_bytes(),
        );
    }
    input
}

fn bench_decoders(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(SAMPLES.len() as u64));
    group.bench_function("general", |b| {
        b.iter(|| {
            for text in SAMPLES {
                black_box(parse::parse_general(black_box(text)).ok());
            }
        })
    });
    group.bench_function("custom", |b| {
        b.iter(|| {
            for text in SAMPLES {
                black_box(parse::parse_custom(black_box(text)).ok());
            }
        })
    });
    group.bench_function("fixed", |b| {
        b.iter(|| {
            for text in SAMPLES {
                black_box(parse::parse_fixed(black_box(text)).ok());
            }
        })
    });
    group.finish();
}

fn bench_runs(c: &mut Criterion) {
    let lines = 100_000;
    let input = generate_input(lines);
    let mut group = c.benchmark_group("run");
    group.throughput(Throughput::Bytes(input.len() as u64));
    for strategy in [Strategy::Copy, Strategy::General, Strategy::Custom, Strategy::Fixed] {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &input, |b, input| {
            b.iter(|| {
                let mut out = Vec::new();
                run(strategy, &mut input.as_slice(), &mut out).ok();
                out
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decoders, bench_runs);
criterion_main!(benches);
