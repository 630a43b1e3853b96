use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeContext, EnvelopeStage},
        oscillator::{OscillatorContext, WavetableOscillator},
    },
    io::converter::{midi_note_to_freq, velocity_to_gain},
};

/// One sounding note: oscillator phase, envelope state and key binding.
///
/// A voice is busy while its envelope is not idle. It becomes free again on
/// its own once the release stage reaches silence; nothing needs to reclaim it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Voice {
    key: Option<u8>,
    osc: OscillatorContext,
    env: EnvelopeContext,
}

impl Voice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `note` and start the attack stage.
    pub fn start(&mut self, note: u8, velocity: u8, sample_rate: f64) {
        self.key = Some(note);
        self.osc.start(midi_note_to_freq(note), sample_rate);
        self.env.trigger(velocity_to_gain(velocity));
    }

    /// Unbind the key and move the envelope into release.
    pub fn release(&mut self) {
        self.key = None;
        self.env.release();
    }

    /// Stop instantly without a release tail.
    pub fn kill(&mut self) {
        self.key = None;
        self.env.kill();
    }

    pub fn rescale_pitch(&mut self, ratio: f64) {
        self.osc.rescale(ratio);
    }

    /// Next output sample: oscillator times envelope gain.
    #[inline]
    pub fn process(&mut self, osc: &WavetableOscillator, env: &Envelope) -> f32 {
        osc.process(&mut self.osc) * env.process(&mut self.env)
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.env.is_active()
    }

    #[inline]
    pub fn key(&self) -> Option<u8> {
        self.key
    }

    #[inline]
    pub fn stage(&self) -> EnvelopeStage {
        self.env.stage
    }

    /// Envelope output before velocity scaling.
    #[inline]
    pub fn envelope_output(&self) -> f32 {
        self.env.output
    }

    pub fn oscillator(&self) -> &OscillatorContext {
        &self.osc
    }

    pub fn envelope(&self) -> &EnvelopeContext {
        &self.env
    }
}
