// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xenon::interceptor::array_buffer_to_string;
use xenon::HeadersInit;

fn binary_frame_benchmark(c: &mut Criterion) {
    let frames = vec!["AQID", "/w==", "", "not base64!"];

    c.bench_function("array_buffer_to_string", |b| {
        b.iter(|| {
            for frame in &frames {
                black_box(array_buffer_to_string(Some(frame)));
            }
        })
    });
}

fn headers_init_benchmark(c: &mut Criterion) {
    let pairs: Vec<(String, String)> = (0..16)
        .map(|i| (format!("x-header-{}", i), format!("value-{}", i)))
        .collect();
    let map = HeadersInit::map(pairs.iter().cloned());

    c.bench_function("headers_init_pairs", |b| {
        b.iter(|| black_box(HeadersInit::Pairs(pairs.clone()).into_headers()))
    });

    c.bench_function("headers_init_map", |b| {
        b.iter(|| black_box(map.clone().into_headers()))
    });
}

criterion_group!(benches, binary_frame_benchmark, headers_init_benchmark);
criterion_main!(benches);
