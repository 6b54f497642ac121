//! Benchmarks for the Lanes compiler and VM.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. run_only: executes a pre-compiled program (lane calls, variables, natives)
//! 2. compile: JSON description to compiled program

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lanes_core::api::{CompilationOptions, compile};
use lanes_core::values::{NativeRegistry, Value};
use lanes_core::vm::Vm;

/// A program whose `main` lane calls `step` `n` times. Each call passes one
/// argument, compares it, branches (handing the argument on to the branch
/// lane) and calls a native function.
fn generate_program(n: usize) -> String {
    let call = r#"{"ScalarInt": 1}, {"Jump": "step"}"#;
    let calls = vec![call; n].join(", ");
    format!(
        r#"{{"lanes": {{
            "main": {{"cards": [{calls}]}},
            "step": {{"arguments": ["x"], "cards": [
                {{"ReadVar": "x"}}, {{"ReadVar": "x"}}, {{"ScalarInt": 1}}, "Equals",
                {{"IfElse": {{"then": "hit", "else": "miss"}}}}
            ]}},
            "hit": {{"arguments": ["x"], "cards": [{{"ReadVar": "x"}}, {{"CallNative": "sink"}}]}},
            "miss": {{"arguments": ["x"], "cards": ["Abort"]}}
        }}}}"#
    )
}

fn bench_run_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_only");

    let mut natives = NativeRegistry::new();
    natives.register("sink", 1, |args: &[Value]| {
        black_box(&args[0]);
        Ok(None)
    });

    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));

        let source = generate_program(size);
        let program =
            compile(source.as_bytes(), &CompilationOptions::default()).expect("Compile failed");

        group.bench_with_input(BenchmarkId::from_parameter(size), &program, |b, program| {
            let mut vm = Vm::new(&natives);
            b.iter(|| vm.run(black_box(program)).expect("Run failed"));
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for size in [10, 100, 1000] {
        let source = generate_program(size);
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| compile(black_box(source.as_bytes()), &CompilationOptions::default()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_run_only, bench_compile);
criterion_main!(benches);
