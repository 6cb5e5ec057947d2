#![allow(unused)]
extern crate scummscope;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use scummscope::{
    decompiler::evaluate, decode, Decompiler, ScriptKind, ScriptSource, Version,
};
use std::hint::black_box;

/// pushByte 5, writeWordVar L.0, [0005] pushWordVar L.0, pushByte 10, lt,
/// ifNot [0014], wordVarInc L.0, jump [0005], [0014] breakHere
const COUNTING_LOOP: &[u8] = &[
    0x00, 0x05, 0x43, 0x00, 0x40, 0x03, 0x00, 0x40, 0x00, 0x0A, 0x11, 0x5D, 0x06, 0x00, 0x4F,
    0x00, 0x40, 0x73, 0xF1, 0xFF, 0x6C,
];

/// The counting loop repeated `copies` times; every copy jumps within itself.
fn long_script(copies: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(COUNTING_LOOP.len() * copies);
    for _ in 0..copies {
        data.extend_from_slice(COUNTING_LOOP);
    }
    data
}

/// Benchmark the individual passes on one script
fn bench_passes(c: &mut Criterion) {
    let data = long_script(256);

    let mut group = c.benchmark_group("passes");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            let program = decode(black_box(&data), Version::V6).unwrap();
            black_box(program)
        });
    });

    let program = decode(&data, Version::V6).unwrap();
    group.bench_function("evaluate", |b| {
        b.iter(|| {
            let evaluation = evaluate(black_box(&program)).unwrap();
            black_box(evaluation)
        });
    });

    let kind = ScriptKind::Global(1);
    let decompiler = Decompiler::new(Version::V6);
    group.bench_function("decompile", |b| {
        b.iter(|| {
            let text = decompiler
                .decompile(&ScriptSource::new(&kind, black_box(&data)))
                .unwrap();
            black_box(text)
        });
    });
    group.finish();
}

/// Benchmark sequential against parallel decompilation of many small scripts
fn bench_many_scripts(c: &mut Criterion) {
    let kinds: Vec<ScriptKind> = (0..512).map(ScriptKind::Global).collect();
    let sources: Vec<ScriptSource> = kinds
        .iter()
        .map(|kind| ScriptSource::new(kind, COUNTING_LOOP))
        .collect();
    let decompiler = Decompiler::new(Version::V6);

    let mut group = c.benchmark_group("many_scripts");
    group.throughput(Throughput::Elements(sources.len() as u64));
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let texts: Vec<_> = sources
                .iter()
                .map(|source| decompiler.decompile(source))
                .collect();
            black_box(texts)
        });
    });
    group.bench_function("decompile_all", |b| {
        b.iter(|| black_box(decompiler.decompile_all(black_box(&sources))));
    });
    group.finish();
}

criterion_group!(benches, bench_passes, bench_many_scripts);
criterion_main!(benches);
