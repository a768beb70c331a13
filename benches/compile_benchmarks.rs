//! Performance benchmarks for the javelin pipeline.
//!
//! - Parsing alone, per test script
//! - Full compilation of units, per test script
//! - The wrapping compilers on small expressions and scripts
//!
//! With the `profile-with-puffin` feature the unit benchmarks print the
//! time spent per pipeline stage:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- compiler/units
//! ```

use bumpalo::Bump;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use javelin::{Compiler, JavaType, MethodSignature, guess_parameter_names};
use javelin_parser::Parser;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Print the average time of each top-level scope over the recorded frames.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;
    use std::collections::BTreeMap;

    let Some(frame_view) = FRAME_VIEW.get() else {
        return;
    };
    let view = frame_view.lock();
    let scopes = view.scope_collection();
    let mut timings: BTreeMap<String, i64> = BTreeMap::new();
    let mut frames = 0i64;
    for frame in view.recent_frames() {
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        frames += 1;
        for (_, stream_info) in unpacked.thread_streams.iter() {
            let Ok(top) = Reader::from_start(&stream_info.stream).read_top_scopes() else {
                continue;
            };
            for scope in top {
                if let Some(details) = scopes.fetch_by_id(&scope.id) {
                    *timings.entry(details.name().to_string()).or_insert(0) += scope.record.duration_ns;
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({frames} frames) ===");
    for (name, ns) in &timings {
        let avg = ns / frames.max(1);
        println!("  {:30} {:>10.2?}", name, std::time::Duration::from_nanos(avg as u64));
    }
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

const SCRIPTS: [(&str, &str); 3] = [
    ("counter", include_str!("../test_scripts/Counter.java")),
    ("accounts", include_str!("../test_scripts/Accounts.java")),
    ("text", include_str!("../test_scripts/Text.java")),
];

fn parse_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/units");
    for (name, source) in SCRIPTS {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let arena = Bump::new();
                let unit = Parser::new(black_box(source), &arena).compilation_unit().unwrap();
                black_box(unit.types.len())
            });
        });
    }
    group.finish();
}

fn compile_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let compiler = Compiler::with_builtins();
    let mut group = c.benchmark_group("compiler/units");
    for (name, source) in SCRIPTS {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let unit = compiler.compile_unit(black_box(source), "Bench.java").unwrap();
                end_profiling_frame();
                black_box(unit.classes.len())
            });
        });
    }
    group.finish();
    print_profiling_stats();
}

fn wrapper_benchmarks(c: &mut Criterion) {
    let compiler = Compiler::with_builtins();
    let mut group = c.benchmark_group("compiler/wrappers");

    let signature = MethodSignature::new()
        .param("a", JavaType::INT)
        .param("b", JavaType::INT)
        .returns(JavaType::INT);
    group.bench_function("expression", |b| {
        b.iter(|| {
            let unit = compiler
                .compile_expression(black_box("a * b + (a - b) / 2"), &signature)
                .unwrap();
            black_box(unit.classes.len())
        });
    });

    let script = "
        int total = 0;
        for (int i = a; i < b; i++) {
            if (i % 3 == 0) continue;
            total += i;
        }
        return total;
    ";
    group.bench_function("script", |b| {
        b.iter(|| {
            let unit = compiler.compile_script(black_box(script), &signature).unwrap();
            black_box(unit.classes.len())
        });
    });

    group.bench_function("guess_parameter_names", |b| {
        b.iter(|| black_box(guess_parameter_names(black_box("a.b + Foo.c * d - e.f(g)")).unwrap().len()));
    });
    group.finish();
}

criterion_group!(benches, parse_benchmarks, compile_benchmarks, wrapper_benchmarks);
criterion_main!(benches);
