use crate::io::midi::MidiMessage;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// Velocity 0..=127 as a linear gain.
#[inline]
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

/// Whether `msg` passes a channel filter; `None` listens on every channel.
#[inline]
pub fn channel_matches(msg: &MidiMessage, channel_filter: Option<u8>) -> bool {
    channel_filter.map_or(true, |channel| msg.channel() == channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(midi_note_to_freq(69), 440.0);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-9);
        assert!((midi_note_to_freq(60) - 261.625_565).abs() < 1e-5);
    }

    #[test]
    fn full_velocity_is_unity_gain() {
        assert_eq!(velocity_to_gain(127), 1.0);
        assert_eq!(velocity_to_gain(0), 0.0);
    }

    #[test]
    fn filters_by_channel() {
        let msg = MidiMessage::new(0x91, 60, 90, 0);
        assert!(channel_matches(&msg, None));
        assert!(channel_matches(&msg, Some(1)));
        assert!(!channel_matches(&msg, Some(0)));
    }
}
