use crate::{
    dsp::envelope::TimedStage,
    io::midi::MidiMessage,
    DEFAULT_ATTACK_MS, DEFAULT_DECAY_MS, DEFAULT_RELEASE_MS, DEFAULT_SUSTAIN, MAX_STAGE_TIME_MS,
    MIN_STAGE_TIME_MS,
};

/// Host-automatable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    /// Amp attack, milliseconds.
    Attack,
    /// Amp decay, milliseconds.
    Decay,
    /// Amp sustain, 0.0 - 1.0.
    Sustain,
    /// Amp release, milliseconds.
    Release,
}

impl ParamId {
    pub const ALL: [ParamId; 4] = [
        ParamId::Attack,
        ParamId::Decay,
        ParamId::Sustain,
        ParamId::Release,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Attack => "Amp Attack",
            ParamId::Decay => "Amp Decay",
            ParamId::Sustain => "Amp Sustain",
            ParamId::Release => "Amp Release",
        }
    }

    /// Inclusive value range accepted from a host.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamId::Sustain => (0.0, 1.0),
            _ => (MIN_STAGE_TIME_MS, MAX_STAGE_TIME_MS),
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Attack => DEFAULT_ATTACK_MS,
            ParamId::Decay => DEFAULT_DECAY_MS,
            ParamId::Sustain => DEFAULT_SUSTAIN,
            ParamId::Release => DEFAULT_RELEASE_MS,
        }
    }

    /// Clamp a host value into `range`. Non-finite values map to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default_value();
        }
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }

    /// The envelope stage a time parameter controls.
    pub fn stage(self) -> Option<TimedStage> {
        match self {
            ParamId::Attack => Some(TimedStage::Attack),
            ParamId::Decay => Some(TimedStage::Decay),
            ParamId::Release => Some(TimedStage::Release),
            ParamId::Sustain => None,
        }
    }
}

/// Messages sent from the control thread to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    Midi(MidiMessage),
    Param { id: ParamId, value: f32 },
    AllNotesOff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sit_inside_ranges() {
        for id in ParamId::ALL {
            let (lo, hi) = id.range();
            let default = id.default_value();
            assert!((lo..=hi).contains(&default), "{}", id.name());
            assert_eq!(id.clamp(default), default);
        }
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(ParamId::Attack.clamp(0.0), MIN_STAGE_TIME_MS);
        assert_eq!(ParamId::Release.clamp(60_000.0), MAX_STAGE_TIME_MS);
        assert_eq!(ParamId::Sustain.clamp(1.5), 1.0);
        assert_eq!(ParamId::Sustain.clamp(-0.5), 0.0);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        for id in ParamId::ALL {
            assert_eq!(id.clamp(f32::NAN), id.default_value(), "{}", id.name());
            assert_eq!(id.clamp(f32::INFINITY), id.default_value(), "{}", id.name());
        }
    }
}
