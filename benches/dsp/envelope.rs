//! Benchmarks for the shared-coefficient ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysampler::dsp::envelope::{Envelope, EnvelopeContext};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up); long enough to stay there
        let env = Envelope::new(SAMPLE_RATE, 5_000.0, 20.0, 0.7, 500.0);
        let mut ctx = EnvelopeContext::default();
        ctx.trigger(1.0);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut ctx), black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let env = Envelope::new(SAMPLE_RATE, 2.0, 2.0, 0.7, 500.0);
        let mut ctx = EnvelopeContext::default();
        ctx.trigger(1.0);
        // Advance past attack/decay
        for _ in 0..400 {
            env.process(&mut ctx);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut ctx), black_box(&mut buffer));
            })
        });

        // Release phase (ramping down)
        let env = Envelope::new(SAMPLE_RATE, 2.0, 2.0, 0.7, 5_000.0);
        let mut ctx = EnvelopeContext::default();
        ctx.trigger(1.0);
        for _ in 0..400 {
            env.process(&mut ctx);
        }
        ctx.release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut ctx), black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
