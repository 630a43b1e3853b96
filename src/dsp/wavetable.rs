#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::TAU;

use crate::error::{Result, SamplerError};

/*
Wavetables
==========

A wavetable is one cycle of a waveform, sampled at a fixed number of points
and computed once at startup. Every oscillator in the engine reads from the
same table; only the read position (phase) is per voice.

    index   0        128       256       384      511
            │         │         │         │         │
    sine    0 ──╱‾‾‾‾‾╲───────────────────╱────────  (one full cycle)
                        ╲_____________╱

Reading the table at a fractional position `phase * len` and stepping the
phase by `frequency / sample_rate` each sample plays the cycle back at any
pitch. Table size trades memory for accuracy: 512 points of sine with linear
interpolation keeps the error below -90 dB, well under audibility.

The table is immutable after construction. Oscillators hold it through an
`Arc`, so the audio thread never allocates or copies it.
*/

/// Number of samples in the default single-cycle table.
pub const DEFAULT_TABLE_SIZE: usize = 512;

/// Shape of a generated single-cycle table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    /// Value of the waveform at `phase` cycles, `phase` in `[0, 1)`.
    fn value_at(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.25 - (phase - 0.25).round()).abs(),
        }
    }
}

/// One precomputed waveform cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Box<[f32]>,
}

impl Wavetable {
    /// Generate `size` points of `waveform`.
    pub fn generate(waveform: Waveform, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SamplerError::EmptyWavetable);
        }

        let samples = (0..size)
            .map(|i| waveform.value_at(i as f64 / size as f64) as f32)
            .collect();

        Ok(Self { samples })
    }

    /// The default 512-point sine cycle.
    pub fn sine() -> Self {
        let samples = (0..DEFAULT_TABLE_SIZE)
            .map(|i| (i as f64 / DEFAULT_TABLE_SIZE as f64 * TAU).sin() as f32)
            .collect();

        Self { samples }
    }

    /// Wrap an arbitrary single cycle.
    pub fn from_samples(samples: impl Into<Vec<f32>>) -> Result<Self> {
        let samples: Vec<f32> = samples.into();
        if samples.is_empty() {
            return Err(SamplerError::EmptyWavetable);
        }

        Ok(Self {
            samples: samples.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
