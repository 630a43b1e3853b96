//! Lock-free state shared between the audio thread and UI/control threads.
//!
//! Every field is an atomic so readers never block the render callback and
//! the render callback never blocks on them.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicUsize, Ordering};

use crate::io::midi::MidiMessage;

pub const NUM_KEYS: usize = 128;

const NO_KEY: i32 = -1;

#[derive(Debug)]
pub struct EngineStatus {
    active_voices: AtomicUsize,
    held_keys: AtomicUsize,
    dropped_events: AtomicUsize,
    key_status: [AtomicBool; NUM_KEYS],
    keyboard_key: AtomicI32,
    keyboard_velocity: AtomicU8,
}

impl EngineStatus {
    pub fn new() -> Self {
        Self {
            active_voices: AtomicUsize::new(0),
            held_keys: AtomicUsize::new(0),
            dropped_events: AtomicUsize::new(0),
            key_status: std::array::from_fn(|_| AtomicBool::new(false)),
            keyboard_key: AtomicI32::new(NO_KEY),
            keyboard_velocity: AtomicU8::new(0),
        }
    }

    /// Busy voices as of the end of the last rendered block.
    pub fn active_voices(&self) -> usize {
        self.active_voices.load(Ordering::Relaxed)
    }

    pub(crate) fn set_active_voices(&self, count: usize) {
        self.active_voices.store(count, Ordering::Relaxed);
    }

    /// MIDI events the render loop discarded because the block queue was
    /// full, since the engine was created.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events.load(Ordering::Relaxed)
    }

    pub(crate) fn record_drop(&self) {
        self.dropped_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of keys currently held by incoming MIDI.
    pub fn held_keys(&self) -> usize {
        self.held_keys.load(Ordering::Relaxed)
    }

    /// Whether incoming MIDI is holding `key` down.
    pub fn is_key_playing(&self, key: u8) -> bool {
        self.key_status
            .get(key as usize)
            .is_some_and(|held| held.load(Ordering::Relaxed))
    }

    /// Update the held-key table from an incoming note message.
    ///
    /// The count only moves when a key actually changes state, so repeated
    /// note-offs cannot drive it below zero.
    pub(crate) fn track_note(&self, msg: &MidiMessage) {
        let Some(slot) = self.key_status.get(msg.note_number() as usize) else {
            return;
        };

        if msg.is_note_on() {
            if !slot.swap(true, Ordering::AcqRel) {
                self.held_keys.fetch_add(1, Ordering::Relaxed);
            }
        } else if msg.is_note_off() && slot.swap(false, Ordering::AcqRel) {
            self.held_keys.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn clear_keys(&self) {
        for slot in &self.key_status {
            if slot.swap(false, Ordering::AcqRel) {
                self.held_keys.fetch_sub(1, Ordering::Relaxed);
            }
        }
    }

    /// The key index currently pressed on the external keyboard, if any.
    pub fn keyboard_key(&self) -> Option<u8> {
        u8::try_from(self.keyboard_key.load(Ordering::Acquire)).ok()
    }

    pub fn keyboard_velocity(&self) -> u8 {
        self.keyboard_velocity.load(Ordering::Acquire)
    }

    /// Press (or with `None`, lift) a key on the external keyboard.
    pub fn set_keyboard_key(&self, key: Option<u8>, velocity: u8) {
        // velocity first: the audio thread reads the key, then the velocity
        self.keyboard_velocity
            .store(velocity.min(127), Ordering::Release);
        self.keyboard_key
            .store(key.map_or(NO_KEY, i32::from), Ordering::Release);
    }
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self::new()
    }
}
