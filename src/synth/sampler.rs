use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, trace, warn};

use crate::{
    config::SamplerConfig,
    dsp::{
        envelope::Envelope,
        oscillator::WavetableOscillator,
        wavetable::Wavetable,
    },
    error::{Result, SamplerError},
    io::{
        converter::channel_matches,
        midi::{MidiMessage, MidiStatus},
    },
    synth::{
        allocator::VoicePool,
        message::{ControlMessage, ParamId},
        queue::MidiQueue,
        status::EngineStatus,
        voice::Voice,
    },
    DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, GAIN_FACTOR,
};

/*
Render Loop
===========

The engine is owned by the audio thread. Everything another thread wants to
change arrives through a lock-free ring buffer and is applied at the top of
the next block, so render never waits on a lock and never sees a half-applied
parameter set.

Per block of N frames:

  1. Drain control messages (MIDI, parameter changes, all-notes-off).
  2. Diff the external keyboard key against the last one seen; a change
     becomes a note-off for the old key and/or a note-on for the new one,
     both at frame 0.
  3. Nothing sounding and nothing queued → write silence and stop.
  4. For each frame s:
       a. dispatch every queued event with offset <= s
       b. sum oscillator * envelope over the busy voices
       c. scale by GAIN_FACTOR
       d. write the same value to every output channel
  5. flush(N): renormalize events aimed at later blocks.

Pitch-wheel messages are accepted and dequeued in 4a but not acted upon yet.
*/

/// Whether a message is one the engine queues: note or pitch wheel on the
/// configured channel.
fn accepts(msg: &MidiMessage, channel: Option<u8>) -> bool {
    channel_matches(msg, channel)
        && matches!(
            msg.kind(),
            MidiStatus::NoteOn | MidiStatus::NoteOff | MidiStatus::PitchWheel
        )
}

/// Polyphonic wavetable engine. Lives on the audio thread.
pub struct Sampler {
    pool: VoicePool,
    queue: MidiQueue,
    osc: WavetableOscillator,
    env: Envelope,
    rx: Consumer<ControlMessage>,
    status: Arc<EngineStatus>,
    sample_rate: f64,
    block_size: usize,
    last_key: Option<u8>,
    keyboard_note_offset: u8,
    midi_channel: Option<u8>,
}

/// Control-thread side of a [`Sampler`].
pub struct SamplerHandle {
    tx: Producer<ControlMessage>,
    status: Arc<EngineStatus>,
    midi_channel: Option<u8>,
}

impl Sampler {
    /// Build an engine and its control handle from `config`.
    pub fn new(config: SamplerConfig) -> Result<(Self, SamplerHandle)> {
        config.validate()?;
        let table = Wavetable::generate(config.waveform, config.table_size)?;
        Self::with_wavetable(config, Arc::new(table))
    }

    /// Build an engine that plays an existing single-cycle table.
    pub fn with_wavetable(
        config: SamplerConfig,
        table: Arc<Wavetable>,
    ) -> Result<(Self, SamplerHandle)> {
        config.validate()?;

        let sample_rate = DEFAULT_SAMPLE_RATE;
        let params = config.envelope;
        let env = Envelope::new(
            sample_rate as f32,
            params.attack_ms,
            params.decay_ms,
            params.sustain,
            params.release_ms,
        );
        let (tx, rx) = RingBuffer::<ControlMessage>::new(config.control_queue_capacity);
        let status = Arc::new(EngineStatus::new());

        let sampler = Self {
            pool: VoicePool::new(config.max_voices, config.retrigger)?,
            queue: MidiQueue::new(DEFAULT_BLOCK_SIZE),
            osc: WavetableOscillator::new(table, config.interpolation),
            env,
            rx,
            status: Arc::clone(&status),
            sample_rate,
            block_size: DEFAULT_BLOCK_SIZE,
            last_key: None,
            keyboard_note_offset: config.keyboard_note_offset,
            midi_channel: config.midi_channel,
        };

        let handle = SamplerHandle {
            tx,
            status,
            midi_channel: config.midi_channel,
        };

        debug!(
            voices = config.max_voices,
            table = sampler.osc.table().len(),
            "sampler created"
        );
        Ok((sampler, handle))
    }

    /// Reconfigure for a new sample rate and block size.
    ///
    /// Resizes the MIDI queue, so this allocates: call it from the host's
    /// setup path, not from the render callback. Sounding voices keep
    /// their pitch.
    pub fn reset(&mut self, sample_rate: f64, block_size: usize) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SamplerError::InvalidSampleRate(sample_rate));
        }
        if block_size == 0 {
            return Err(SamplerError::InvalidBlockSize);
        }

        let ratio = self.sample_rate / sample_rate;
        self.pool.rescale_pitch(ratio);

        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.queue.resize(block_size);
        self.env.set_sample_rate(sample_rate as f32);

        debug!(sample_rate, block_size, "sampler reset");
        Ok(())
    }

    /// Apply a parameter value, clamped to its range. Non-finite values
    /// leave the parameter unchanged.
    pub fn on_param_change(&mut self, id: ParamId, value: f32) {
        if !value.is_finite() {
            warn!(param = id.name(), value, "ignoring non-finite parameter value");
            return;
        }
        let value = id.clamp(value);
        match id.stage() {
            Some(stage) => self.env.set_stage_time(stage, value),
            None => self.env.set_sustain_level(value),
        }
        trace!(param = id.name(), value, "parameter changed");
    }

    /// Queue a MIDI message for the current block (or a later one, if its
    /// offset lies past the block end).
    ///
    /// Only note and pitch-wheel messages are queued; anything else is
    /// ignored. Note messages update the held-key table.
    pub fn enqueue_midi(&mut self, msg: MidiMessage) -> Result<()> {
        if !accepts(&msg, self.midi_channel) {
            trace!(status = msg.status, "ignoring MIDI message");
            return Ok(());
        }

        self.queue.add(msg).inspect_err(|err| {
            warn!(%err, status = msg.status, offset = msg.offset, "dropping MIDI event");
        })?;
        self.status.track_note(&msg);
        Ok(())
    }

    /// Release every sounding voice.
    pub fn all_notes_off(&mut self) {
        self.pool.release_all();
        self.status.clear_keys();
    }

    /// Render `left.len()` frames into two channel buffers.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        let frames = left.len().min(right.len());

        self.render(frames, |i, sample| {
            left[i] = sample;
            right[i] = sample;
        });
    }

    /// Render into an interleaved buffer of `channels` channels.
    pub fn process_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let frames = out.len() / channels;

        self.render(frames, |i, sample| {
            out[i * channels..(i + 1) * channels].fill(sample);
        });
    }

    fn render(&mut self, frames: usize, mut write: impl FnMut(usize, f32)) {
        self.drain_control();
        self.poll_keyboard();

        if !self.pool.has_active() && self.queue.is_empty() {
            for i in 0..frames {
                write(i, 0.0);
            }
            self.status.set_active_voices(0);
            return;
        }

        for s in 0..frames {
            while let Some(msg) = self.queue.peek().copied() {
                if msg.offset as usize > s {
                    break;
                }
                self.dispatch(&msg);
                self.queue.remove();
            }

            let output = self.pool.process(&self.osc, &self.env) * GAIN_FACTOR;
            write(s, output);
        }

        self.queue.flush(frames as u32);
        self.status.set_active_voices(self.pool.active_count());
    }

    fn dispatch(&mut self, msg: &MidiMessage) {
        match msg.kind() {
            MidiStatus::NoteOn | MidiStatus::NoteOff => {
                self.pool.note_on_off(msg, self.sample_rate);
            }
            MidiStatus::PitchWheel => {
                trace!(value = ?msg.event(), "pitch wheel not handled");
            }
            _ => {}
        }
    }

    fn drain_control(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            match msg {
                ControlMessage::Midi(msg) => self.queue_event(msg),
                ControlMessage::Param { id, value } => self.on_param_change(id, value),
                ControlMessage::AllNotesOff => self.pool.release_all(),
            }
        }
    }

    fn poll_keyboard(&mut self) {
        let key = self.status.keyboard_key();
        if key == self.last_key {
            return;
        }

        if let Some(old) = self.last_key {
            self.queue_event(MidiMessage::note_off(self.keyboard_note(old), 0));
        }

        self.last_key = key;

        if let Some(new) = key {
            let velocity = self.status.keyboard_velocity();
            self.queue_event(MidiMessage::note_on(self.keyboard_note(new), velocity, 0));
        }
    }

    fn keyboard_note(&self, key: u8) -> u8 {
        self.keyboard_note_offset.saturating_add(key).min(127)
    }

    /// Queue an event from inside render. A full queue drops it and counts
    /// the drop in the engine status.
    fn queue_event(&mut self, msg: MidiMessage) {
        if self.queue.add(msg).is_err() {
            self.status.record_drop();
            trace!(status = msg.status, offset = msg.offset, "dropping MIDI event");
        }
    }

    /// Busy voices right now.
    pub fn active_voice_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Whether incoming MIDI is holding `key` down.
    pub fn is_key_playing(&self, key: u8) -> bool {
        self.status.is_key_playing(key)
    }

    pub fn held_key_count(&self) -> usize {
        self.status.held_keys()
    }

    pub fn status(&self) -> Arc<EngineStatus> {
        Arc::clone(&self.status)
    }

    pub fn voices(&self) -> &[Voice] {
        self.pool.voices()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

impl SamplerHandle {
    /// Send a MIDI message to the audio thread.
    pub fn send_midi(&mut self, msg: MidiMessage) -> Result<()> {
        if !accepts(&msg, self.midi_channel) {
            trace!(status = msg.status, "ignoring MIDI message");
            return Ok(());
        }

        self.push(ControlMessage::Midi(msg))?;
        self.status.track_note(&msg);
        Ok(())
    }

    /// Change a parameter; it takes effect at the start of the next block.
    /// Non-finite values are dropped here, before they reach the audio thread.
    pub fn set_param(&mut self, id: ParamId, value: f32) -> Result<()> {
        if !value.is_finite() {
            warn!(param = id.name(), value, "ignoring non-finite parameter value");
            return Ok(());
        }
        self.push(ControlMessage::Param { id, value })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.push(ControlMessage::AllNotesOff)?;
        self.status.clear_keys();
        Ok(())
    }

    /// Press a key on the external keyboard (`None` lifts it). The engine
    /// turns changes into note messages at the next block.
    pub fn set_keyboard_key(&self, key: Option<u8>, velocity: u8) {
        self.status.set_keyboard_key(key, velocity);
    }

    pub fn keyboard_key(&self) -> Option<u8> {
        self.status.keyboard_key()
    }

    pub fn active_voices(&self) -> usize {
        self.status.active_voices()
    }

    pub fn is_key_playing(&self, key: u8) -> bool {
        self.status.is_key_playing(key)
    }

    pub fn held_keys(&self) -> usize {
        self.status.held_keys()
    }

    pub fn dropped_events(&self) -> usize {
        self.status.dropped_events()
    }

    pub fn status(&self) -> Arc<EngineStatus> {
        Arc::clone(&self.status)
    }

    fn push(&mut self, msg: ControlMessage) -> Result<()> {
        self.tx.push(msg).map_err(|_| {
            warn!(?msg, "control queue full");
            SamplerError::ControlQueueFull
        })
    }
}
