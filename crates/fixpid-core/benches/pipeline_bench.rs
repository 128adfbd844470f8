//! Hot-path benchmarks: the saturating multiply and the full engine tick.
//!
//! Run with:
//!
//! ```bash
//! cargo bench -p fixpid-core
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fixpid_core::fixed::{Fixed, FixedFormat};
use fixpid_core::pid_pipeline::{PidPipeline, PipelineConfig, TickInput};

fn bench_fixed_mul(c: &mut Criterion) {
    let data = FixedFormat::new(24, 10).unwrap();
    let coeff = FixedFormat::new(24, 10).unwrap();
    let scaled = FixedFormat::new(48, 20).unwrap();
    let a = Fixed::from_f64(3.25, data);
    let k = Fixed::from_f64(0.125, coeff);

    c.bench_function("fixed/mul_resize", |b| {
        b.iter(|| {
            let p = black_box(a).mul(black_box(k), scaled);
            black_box(p.resize(data))
        })
    });
}

fn bench_pipeline_tick(c: &mut Criterion) {
    let mut pid = PidPipeline::new(PipelineConfig::default()).unwrap();
    pid.set_gains_f64(0.1, 0.03, 0.005);
    let error = Fixed::from_f64(1.0, pid.data_format());

    c.bench_function("pipeline/tick", |b| {
        b.iter(|| {
            black_box(pid.tick(TickInput {
                error: black_box(error),
                valid: true,
                reset: false,
            }))
        })
    });
}

criterion_group!(benches, bench_fixed_mul, bench_pipeline_tick);
criterion_main!(benches);
