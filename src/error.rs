//! Error types for engine construction and event ingestion.

/// Errors reported by the sampler engine and its control handle.
///
/// None of these are raised from inside the render loop; an event that
/// cannot be queued there is dropped and logged instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplerError {
    #[error("polyphony must be at least one voice")]
    ZeroPolyphony,

    #[error("wavetable must contain at least one sample")]
    EmptyWavetable,

    #[error("block size must be at least one frame")]
    InvalidBlockSize,

    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("MIDI queue is full ({capacity} events), event dropped")]
    MidiQueueFull { capacity: usize },

    #[error("control queue is full, message dropped")]
    ControlQueueFull,

    #[error("malformed MIDI message: {0}")]
    InvalidMidi(&'static str),
}

pub type Result<T, E = SamplerError> = std::result::Result<T, E>;
