#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::trace;

use crate::{
    dsp::{envelope::Envelope, oscillator::WavetableOscillator},
    error::{Result, SamplerError},
    io::midi::MidiMessage,
    synth::voice::Voice,
};

/*
Voice Allocation
================

The pool is a fixed array of voices sized once at construction. Allocation
is a linear scan, O(polyphony) per note-on, which is negligible at the
voice counts a wavetable instrument uses (16 by default, 32 at most in
practice).

  1. First voice whose envelope is idle → use it.
  2. No idle voice → steal the quietest one: lowest envelope output, ties
     going to the earliest index. Stealing always succeeds, so a note-on is
     never dropped; the stolen note is simply cut off.

Note-off finds the first busy voice still bound to that key, unbinds it and
moves it into release. A note-off that matches nothing (the note was stolen,
or never started) is a normal occurrence and does nothing.

What happens when a note-on arrives for a key that is already sounding is a
policy choice, see `RetriggerPolicy`.
*/

/// Behaviour of a note-on for a key that already has a busy voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetriggerPolicy {
    /// Restart the voice already bound to the key. At most one voice is
    /// ever bound to a given note.
    #[default]
    Retrigger,
    /// Allocate another voice, stacking the same pitch. Each note-off
    /// releases one of them.
    NewVoice,
}

pub struct VoicePool {
    voices: Box<[Voice]>,
    policy: RetriggerPolicy,
}

impl VoicePool {
    pub fn new(max_voices: usize, policy: RetriggerPolicy) -> Result<Self> {
        if max_voices == 0 {
            return Err(SamplerError::ZeroPolyphony);
        }

        Ok(Self {
            voices: vec![Voice::new(); max_voices].into_boxed_slice(),
            policy,
        })
    }

    /// Index of the first idle voice, or of the quietest voice to steal.
    pub fn find_free_voice(&self) -> usize {
        if let Some(idx) = self.voices.iter().position(|v| !v.is_busy()) {
            return idx;
        }

        let mut quietest = 0;
        let mut level = f32::INFINITY;
        for (idx, voice) in self.voices.iter().enumerate() {
            let output = voice.envelope_output();
            if output < level {
                level = output;
                quietest = idx;
            }
        }

        trace!(voice = quietest, level, "stealing voice");
        quietest
    }

    /// Apply a note-on or note-off message. Other message kinds are ignored.
    ///
    /// Returns the index of the voice that was started or released.
    pub fn note_on_off(&mut self, msg: &MidiMessage, sample_rate: f64) -> Option<usize> {
        if msg.is_note_on() {
            Some(self.note_on(msg.note_number(), msg.velocity(), sample_rate))
        } else if msg.is_note_off() {
            self.note_off(msg.note_number())
        } else {
            None
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, sample_rate: f64) -> usize {
        let idx = match self.policy {
            RetriggerPolicy::Retrigger => self
                .bound_voice(note)
                .unwrap_or_else(|| self.find_free_voice()),
            RetriggerPolicy::NewVoice => self.find_free_voice(),
        };

        self.voices[idx].start(note, velocity, sample_rate);
        idx
    }

    pub fn note_off(&mut self, note: u8) -> Option<usize> {
        let idx = self.bound_voice(note)?;
        self.voices[idx].release();
        Some(idx)
    }

    /// Release every busy voice.
    pub fn release_all(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_busy()) {
            voice.release();
        }
    }

    /// Silence every voice without a release tail.
    pub fn kill_all(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.kill();
        }
    }

    /// Retune busy voices after a sample-rate change (`ratio` = old / new).
    pub fn rescale_pitch(&mut self, ratio: f64) {
        for voice in self.voices.iter_mut().filter(|v| v.is_busy()) {
            voice.rescale_pitch(ratio);
        }
    }

    /// Sum of every busy voice for one frame, before output gain.
    #[inline]
    pub fn process(&mut self, osc: &WavetableOscillator, env: &Envelope) -> f32 {
        let mut sum = 0.0;
        for voice in self.voices.iter_mut() {
            if voice.is_busy() {
                sum += voice.process(osc, env);
            }
        }
        sum
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_busy()).count()
    }

    pub fn has_active(&self) -> bool {
        self.voices.iter().any(Voice::is_busy)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    fn bound_voice(&self, note: u8) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| v.key() == Some(note) && v.is_busy())
    }
}
