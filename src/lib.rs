pub mod config; // Engine construction settings
pub mod dsp;
pub mod error;
pub mod io;
pub mod synth; // Voice management, MIDI scheduling and the render loop

pub use config::{EnvelopeParams, SamplerConfig};
pub use error::{Result, SamplerError};
pub use io::MidiMessage;
pub use synth::{ParamId, Sampler, SamplerHandle};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_BLOCK_SIZE: usize = 512;
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// Default polyphony.
pub const MAX_VOICES: usize = 16;
/// Fixed output gain applied to the voice sum.
pub const GAIN_FACTOR: f32 = 0.2;

pub const MIN_STAGE_TIME_MS: f32 = 2.0;
pub const MAX_STAGE_TIME_MS: f32 = 5_000.0;

pub const DEFAULT_ATTACK_MS: f32 = 5.0;
pub const DEFAULT_DECAY_MS: f32 = 20.0;
pub const DEFAULT_SUSTAIN: f32 = 1.0;
pub const DEFAULT_RELEASE_MS: f32 = 500.0;
