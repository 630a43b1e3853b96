//! Signal primitives shared by every voice.
//!
//! Each primitive is split into shared coefficients and a small per-voice
//! context, so a voice is plain `Copy` data and one parameter change reaches
//! every sounding note. Nothing here allocates after construction.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulating wavetable reader.
pub mod oscillator;
/// Single-cycle tables and the waveforms that fill them.
pub mod wavetable;

pub use envelope::{Envelope, EnvelopeContext, EnvelopeStage};
pub use oscillator::{Interpolation, OscillatorContext, WavetableOscillator};
pub use wavetable::{Waveform, Wavetable};
