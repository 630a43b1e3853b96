use crate::error::{Result, SamplerError};

/// Channel-voice status nibbles.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const PITCH_WHEEL: u8 = 0xE0;
}

/// Decoded channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit bend centred on zero (-8192..=8191).
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

/// Kind of a raw message, taken from its status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiStatus {
    NoteOn,
    NoteOff,
    ControlChange,
    ProgramChange,
    PitchWheel,
    Other,
}

/// A 3-byte MIDI message tagged with its frame offset inside a render block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
    /// Frames from the start of the block this message belongs to.
    pub offset: u32,
}

impl MidiMessage {
    pub fn new(status: u8, data1: u8, data2: u8, offset: u32) -> Self {
        Self {
            status,
            data1: data1 & 0x7F,
            data2: data2 & 0x7F,
            offset,
        }
    }

    pub fn note_on(note: u8, velocity: u8, offset: u32) -> Self {
        Self::new(status::NOTE_ON, note, velocity, offset)
    }

    pub fn note_off(note: u8, offset: u32) -> Self {
        Self::new(status::NOTE_OFF, note, 0, offset)
    }

    /// `value` is the bend centred on zero, -8192..=8191.
    pub fn pitch_wheel(value: i16, offset: u32) -> Self {
        let raw = (value.clamp(-8192, 8191) + 8192) as u16;
        Self::new(
            status::PITCH_WHEEL,
            (raw & 0x7F) as u8,
            (raw >> 7) as u8,
            offset,
        )
    }

    /// Parse raw bytes as delivered by a host or MIDI port.
    ///
    /// Missing data bytes read as zero, which matches running short
    /// messages such as program change.
    pub fn from_bytes(bytes: &[u8], offset: u32) -> Result<Self> {
        let (&status, data) = bytes
            .split_first()
            .ok_or(SamplerError::InvalidMidi("empty message"))?;

        if status & 0x80 == 0 {
            return Err(SamplerError::InvalidMidi("missing status byte"));
        }

        let data1 = data.first().copied().unwrap_or(0);
        let data2 = data.get(1).copied().unwrap_or(0);
        if data1 & 0x80 != 0 || data2 & 0x80 != 0 {
            return Err(SamplerError::InvalidMidi("status byte in data position"));
        }

        Ok(Self::new(status, data1, data2, offset))
    }

    #[inline]
    pub fn kind(&self) -> MidiStatus {
        match self.status & 0xF0 {
            status::NOTE_ON => MidiStatus::NoteOn,
            status::NOTE_OFF => MidiStatus::NoteOff,
            status::CONTROL_CHANGE => MidiStatus::ControlChange,
            status::PROGRAM_CHANGE => MidiStatus::ProgramChange,
            status::PITCH_WHEEL => MidiStatus::PitchWheel,
            _ => MidiStatus::Other,
        }
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    #[inline]
    pub fn note_number(&self) -> u8 {
        self.data1
    }

    #[inline]
    pub fn velocity(&self) -> u8 {
        self.data2
    }

    /// Note-on with nonzero velocity.
    #[inline]
    pub fn is_note_on(&self) -> bool {
        self.kind() == MidiStatus::NoteOn && self.data2 > 0
    }

    /// Note-off, or note-on with zero velocity.
    #[inline]
    pub fn is_note_off(&self) -> bool {
        match self.kind() {
            MidiStatus::NoteOff => true,
            MidiStatus::NoteOn => self.data2 == 0,
            _ => false,
        }
    }

    pub fn event(&self) -> Option<MidiEvent> {
        let channel = self.channel();
        match self.kind() {
            MidiStatus::NoteOn if self.data2 > 0 => Some(MidiEvent::NoteOn {
                channel,
                key: self.data1,
                velocity: self.data2,
            }),
            MidiStatus::NoteOn | MidiStatus::NoteOff => Some(MidiEvent::NoteOff {
                channel,
                key: self.data1,
                velocity: self.data2,
            }),
            MidiStatus::ControlChange => Some(MidiEvent::ControlChange {
                channel,
                controller: self.data1,
                value: self.data2,
            }),
            MidiStatus::ProgramChange => Some(MidiEvent::ProgramChange {
                channel,
                program: self.data1,
            }),
            MidiStatus::PitchWheel => {
                let raw = (self.data1 as i16) | ((self.data2 as i16) << 7);
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw - 8192,
                })
            }
            MidiStatus::Other => None,
        }
    }
}
