//! Benchmarks for wavetable reads.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use polysampler::dsp::{
    oscillator::{Interpolation, OscillatorContext, WavetableOscillator},
    wavetable::{Waveform, Wavetable, DEFAULT_TABLE_SIZE},
};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, interpolation) in [
            ("nearest", Interpolation::Nearest),
            ("linear", Interpolation::Linear),
        ] {
            let osc = WavetableOscillator::new(Arc::new(Wavetable::sine()), interpolation);
            let mut ctx = OscillatorContext::default();
            ctx.start(440.0, 48_000.0);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.process(black_box(&mut ctx));
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");

    // Table generation happens off the audio thread, but it bounds startup.
    for waveform in [Waveform::Sine, Waveform::Saw, Waveform::Triangle] {
        group.bench_function(format!("{waveform:?}").to_lowercase(), |b| {
            b.iter(|| Wavetable::generate(black_box(waveform), DEFAULT_TABLE_SIZE))
        });
    }

    group.finish();
}
