//! Benchmarks for full engine blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysampler::{MidiMessage, Sampler, SamplerConfig, MAX_VOICES};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

/// Engine with `voices` notes held and settled into sustain.
fn held_chord(voices: usize, block_size: usize) -> Sampler {
    let (mut sampler, _handle) =
        Sampler::new(SamplerConfig::default()).expect("default config is valid");
    sampler
        .reset(SAMPLE_RATE, block_size)
        .expect("benchmark block size is valid");

    for (i, note) in (36u8..).take(voices).enumerate() {
        sampler
            .enqueue_midi(MidiMessage::note_on(note, 100, (i % block_size) as u32))
            .expect("queue has room for the chord");
    }

    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];
    for _ in 0..64 {
        sampler.process_block(&mut left, &mut right);
    }
    sampler
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === IDLE ===
        // Fast path: nothing sounding, nothing queued
        let mut idle = held_chord(0, size);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.process_block(black_box(&mut left), black_box(&mut right)))
        });

        // === SINGLE NOTE ===
        let mut single = held_chord(1, size);
        group.bench_with_input(BenchmarkId::new("1_voice", size), &size, |b, _| {
            b.iter(|| single.process_block(black_box(&mut left), black_box(&mut right)))
        });

        // === CHORD ===
        let mut chord = held_chord(4, size);
        group.bench_with_input(BenchmarkId::new("4_voices", size), &size, |b, _| {
            b.iter(|| chord.process_block(black_box(&mut left), black_box(&mut right)))
        });

        // === FULL POOL ===
        // Worst case for the render loop: every voice busy
        let mut full = held_chord(MAX_VOICES, size);
        group.bench_with_input(BenchmarkId::new("16_voices", size), &size, |b, _| {
            b.iter(|| full.process_block(black_box(&mut left), black_box(&mut right)))
        });
    }

    group.finish();
}

pub fn bench_stealing(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/stealing");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // Full pool plus one new note per block, so every block steals
        let mut sampler = held_chord(MAX_VOICES, size);
        let mut note = 60u8;
        group.bench_with_input(BenchmarkId::new("note_per_block", size), &size, |b, _| {
            b.iter(|| {
                note = if note >= 96 { 60 } else { note + 1 };
                let _ = sampler.enqueue_midi(MidiMessage::note_on(note, 100, 0));
                sampler.process_block(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    group.finish();
}
