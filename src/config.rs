//! Engine configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::{
    dsp::{oscillator::Interpolation, wavetable::Waveform},
    error::{Result, SamplerError},
    synth::allocator::RetriggerPolicy,
    DEFAULT_ATTACK_MS, DEFAULT_DECAY_MS, DEFAULT_RELEASE_MS, DEFAULT_SUSTAIN, MAX_VOICES,
};

/// Amplitude envelope settings. Times are milliseconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain: f32,
    pub release_ms: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack_ms: DEFAULT_ATTACK_MS,
            decay_ms: DEFAULT_DECAY_MS,
            sustain: DEFAULT_SUSTAIN,
            release_ms: DEFAULT_RELEASE_MS,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Maximum simultaneous voices.
    pub max_voices: usize,
    pub waveform: Waveform,
    /// Points in the single-cycle table.
    pub table_size: usize,
    pub interpolation: Interpolation,
    pub retrigger: RetriggerPolicy,
    pub envelope: EnvelopeParams,
    /// Slots in the control → audio ring buffer.
    pub control_queue_capacity: usize,
    /// Note number of keyboard key index 0.
    pub keyboard_note_offset: u8,
    /// Only accept MIDI on this channel; `None` listens on all of them.
    pub midi_channel: Option<u8>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_voices: MAX_VOICES,
            waveform: Waveform::Sine,
            table_size: crate::dsp::wavetable::DEFAULT_TABLE_SIZE,
            interpolation: Interpolation::Linear,
            retrigger: RetriggerPolicy::Retrigger,
            envelope: EnvelopeParams::default(),
            control_queue_capacity: 1024,
            keyboard_note_offset: 48,
            midi_channel: None,
        }
    }
}

impl SamplerConfig {
    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_retrigger(mut self, retrigger: RetriggerPolicy) -> Self {
        self.retrigger = retrigger;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeParams) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_midi_channel(mut self, channel: Option<u8>) -> Self {
        self.midi_channel = channel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_voices == 0 {
            warn!("rejecting configuration with zero polyphony");
            return Err(SamplerError::ZeroPolyphony);
        }
        if self.table_size == 0 {
            warn!("rejecting configuration with an empty wavetable");
            return Err(SamplerError::EmptyWavetable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plugin_constants() {
        let config = SamplerConfig::default();
        assert_eq!(config.max_voices, 16);
        assert_eq!(config.table_size, 512);
        assert_eq!(config.envelope.attack_ms, 5.0);
        assert_eq!(config.envelope.decay_ms, 20.0);
        assert_eq!(config.envelope.sustain, 1.0);
        assert_eq!(config.envelope.release_ms, 500.0);
        assert_eq!(config.keyboard_note_offset, 48);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_configs() {
        assert_eq!(
            SamplerConfig::default().with_max_voices(0).validate(),
            Err(SamplerError::ZeroPolyphony)
        );
        assert_eq!(
            SamplerConfig::default().with_table_size(0).validate(),
            Err(SamplerError::EmptyWavetable)
        );
    }
}
