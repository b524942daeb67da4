// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use xctest_report::model::Suite;
use xctest_report::{LogParser, StreamAdapter, classify};

/// Build a log with `suites` suites of `cases` cases, every fifth case failing
fn generate_log(suites: usize, cases: usize) -> String {
    let mut log = String::from("Test Suite 'All tests' started at 2020-01-01 00:00:00.000\n");
    for s in 0..suites {
        let suite = format!("Suite{s}Tests");
        let _ = writeln!(log, "Test Suite '{suite}' started at 2020-01-01 00:00:00 GMT 0000");
        for c in 0..cases {
            let _ = writeln!(log, "Test Case '-[{suite} test{c}]' started.");
            log.push_str("    some noisy output from the test\n");
            if c % 5 == 4 {
                let _ = writeln!(
                    log,
                    "/src/{suite}.m:{c}: error: -[{suite} test{c}] : XCTAssertEqual failed: (\"1\") is not equal to (\"2\")"
                );
                let _ = writeln!(log, "Test Case '-[{suite} test{c}]' failed (0.012 seconds).");
            } else {
                let _ = writeln!(log, "Test Case '-[{suite} test{c}]' passed (0.001 seconds).");
            }
        }
        let _ = writeln!(log, "Test Suite '{suite}' passed at 2020-01-01 00:00:05 GMT 0000.");
    }
    log.push_str("Test Suite 'All tests' passed at 2020-01-01 00:00:06.000.\n** TEST SUCCEEDED **\n");
    log
}

fn classify_benchmark(c: &mut Criterion) {
    let lines = [
        "Test Case '-[FooTests testBar]' passed (0.500 seconds).",
        "/src/Foo.m:21: error: -[FooTests testBar] : ((nil) != nil) should be true",
        "CompileC /build/Foo.o Foo.m normal x86_64 objective-c",
    ];
    c.bench_function("classify_mixed_lines", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(classify(black_box(line)));
            }
        })
    });
}

fn stream_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_adapter");
    for suites in [1, 10, 50] {
        let log = generate_log(suites, 100);
        group.throughput(Throughput::Bytes(log.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(suites), &log, |b, log| {
            b.iter(|| {
                let parser = LogParser::new("bench", Vec::<Suite>::new());
                let mut adapter = StreamAdapter::new(std::io::sink(), parser);
                for chunk in log.as_bytes().chunks(8 * 1024) {
                    adapter.feed(chunk).expect("benchmark log parses");
                }
                black_box(adapter.finish().expect("benchmark log finishes"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, classify_benchmark, stream_benchmark);
criterion_main!(benches);
