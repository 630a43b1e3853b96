/*
Shared-Coefficient ADSR Envelope
================================

A linear ADSR envelope split in two halves: the coefficients (stage times,
sustain level, sample rate) live once in `Envelope` and are shared by every
voice, while the per-voice runtime state lives in `EnvelopeContext`. One
parameter change therefore reshapes every sounding note on its next sample,
and a voice costs only a handful of floats.

Vocabulary
----------

  output      The ramp value before velocity scaling, 0.0 to 1.0. This is
              what voice stealing compares ("quietest voice").

  level       The velocity gain applied to the output (velocity / 127).
              process() returns output * level.

  stage       Idle, Attack, Decay, Sustain or Release.

  rate        How much `output` moves per sample in a stage, derived from
              the stage time and sample rate so that durations are
              sample-rate independent:

                  attack_rate  = 1 / (attack_s * sample_rate)
                  decay_rate   = (1 - sustain) / (decay_s * sample_rate)
                  release_rate = 1 / (release_s * sample_rate)

              Release moves by release_rate * release_level per sample, so it
              always takes release_s to fall from wherever it started.


The Shape
---------

  Output
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

The state machine:

    Idle ──note_on──→ Attack ──output=1──→ Decay ──output=S──→ Sustain
     ↑                  │                    │                    │
     │                  └──────note_off──────┴────────────────────┘
     │                                       ↓
     └──────────────output≈0─────────── Release

A zero stage time skips the stage on the next sample. Attack starts from the
current output, not from zero, so a stolen or retriggered voice ramps up
without a click.
*/

use tracing::warn;

use crate::{
    DEFAULT_ATTACK_MS, DEFAULT_DECAY_MS, DEFAULT_RELEASE_MS, DEFAULT_SUSTAIN, MAX_STAGE_TIME_MS,
};

/// Output below which a releasing envelope is considered silent.
const SILENCE: f32 = 1.0e-6;

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Stages whose duration can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedStage {
    Attack,
    Decay,
    Release,
}

/// Per-voice envelope state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeContext {
    pub stage: EnvelopeStage,
    /// Velocity gain applied to the output.
    pub level: f32,
    /// Last ramp value, before velocity scaling.
    pub output: f32,
    /// Output captured when release was triggered.
    pub release_level: f32,
}

impl EnvelopeContext {
    /// Gate high: begin the attack stage at `level` velocity gain.
    pub fn trigger(&mut self, level: f32) {
        self.level = level;
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: ramp from the current output down to zero.
    pub fn release(&mut self) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        self.release_level = self.output;
        self.stage = EnvelopeStage::Release;
    }

    /// Silence immediately.
    pub fn kill(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }
}

/// Stage coefficients shared by all voices.
#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: f32,
    attack_ms: f32,
    decay_ms: f32,
    sustain: f32,
    release_ms: f32,

    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Envelope {
    pub fn new(
        sample_rate: f32,
        attack_ms: f32,
        decay_ms: f32,
        sustain: f32,
        release_ms: f32,
    ) -> Self {
        let time = |ms: f32, fallback: f32| finite_or(ms, fallback).clamp(0.0, MAX_STAGE_TIME_MS);
        let mut env = Self {
            sample_rate,
            attack_ms: time(attack_ms, DEFAULT_ATTACK_MS),
            decay_ms: time(decay_ms, DEFAULT_DECAY_MS),
            sustain: finite_or(sustain, DEFAULT_SUSTAIN).clamp(0.0, 1.0),
            release_ms: time(release_ms, DEFAULT_RELEASE_MS),
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.update_rates();
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_rates();
    }

    /// Set a stage duration in milliseconds.
    ///
    /// Zero is accepted here and means "skip the stage"; the parameter
    /// interface clamps host values to `[MIN_STAGE_TIME_MS, MAX_STAGE_TIME_MS]`.
    /// Non-finite values are ignored.
    pub fn set_stage_time(&mut self, stage: TimedStage, ms: f32) {
        if !ms.is_finite() {
            warn!(?stage, ms, "ignoring non-finite stage time");
            return;
        }
        let ms = ms.clamp(0.0, MAX_STAGE_TIME_MS);
        match stage {
            TimedStage::Attack => self.attack_ms = ms,
            TimedStage::Decay => self.decay_ms = ms,
            TimedStage::Release => self.release_ms = ms,
        }
        self.update_rates();
    }

    /// Non-finite values are ignored.
    pub fn set_sustain_level(&mut self, sustain: f32) {
        if !sustain.is_finite() {
            warn!(sustain, "ignoring non-finite sustain level");
            return;
        }
        self.sustain = sustain.clamp(0.0, 1.0);
        self.update_rates();
    }

    pub fn stage_time(&self, stage: TimedStage) -> f32 {
        match stage {
            TimedStage::Attack => self.attack_ms,
            TimedStage::Decay => self.decay_ms,
            TimedStage::Release => self.release_ms,
        }
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Per-sample step for a stage of `ms` milliseconds covering `span`.
    /// Infinite for a zero-length stage, which completes it in one sample.
    fn rate(&self, ms: f32, span: f32) -> f32 {
        let samples = ms * 0.001 * self.sample_rate;
        if samples <= 0.0 {
            f32::INFINITY
        } else {
            span / samples
        }
    }

    fn update_rates(&mut self) {
        self.attack_rate = self.rate(self.attack_ms, 1.0);
        self.decay_rate = self.rate(self.decay_ms, 1.0 - self.sustain);
        self.release_rate = self.rate(self.release_ms, 1.0);
    }

    /// Advance `ctx` by one sample and return the velocity-scaled gain.
    #[inline]
    pub fn process(&self, ctx: &mut EnvelopeContext) -> f32 {
        match ctx.stage {
            EnvelopeStage::Idle => {
                ctx.output = 0.0;
            }

            EnvelopeStage::Attack => {
                ctx.output += self.attack_rate;
                if ctx.output >= 1.0 {
                    ctx.output = 1.0;
                    ctx.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                ctx.output -= self.decay_rate;
                if ctx.output <= self.sustain {
                    ctx.output = self.sustain;
                    ctx.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                ctx.output = self.sustain;
            }

            EnvelopeStage::Release => {
                ctx.output -= self.release_rate * ctx.release_level;
                if ctx.output <= SILENCE || !ctx.output.is_finite() {
                    ctx.output = 0.0;
                    ctx.stage = EnvelopeStage::Idle;
                }
            }
        }

        ctx.output * ctx.level
    }

    /// Render a block of gain values for one context.
    pub fn render(&self, ctx: &mut EnvelopeContext, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx);
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(
            crate::DEFAULT_SAMPLE_RATE as f32,
            crate::DEFAULT_ATTACK_MS,
            crate::DEFAULT_DECAY_MS,
            crate::DEFAULT_SUSTAIN,
            crate::DEFAULT_RELEASE_MS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn run(env: &Envelope, ctx: &mut EnvelopeContext, samples: usize) {
        for _ in 0..samples {
            env.process(ctx);
        }
    }

    /// Samples spent in each stage until `ctx` leaves `stage`.
    fn samples_in(env: &Envelope, ctx: &mut EnvelopeContext, stage: EnvelopeStage) -> usize {
        let mut count = 0;
        while ctx.stage == stage {
            env.process(ctx);
            count += 1;
            assert!(count < 1_000_000, "stuck in {stage:?}");
        }
        count
    }

    #[test]
    fn attack_reaches_full_level() {
        let env = Envelope::new(SAMPLE_RATE, 10.0, 100.0, 0.7, 200.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        let attack = samples_in(&env, &mut ctx, EnvelopeStage::Attack);

        assert!(attack.abs_diff(10) <= 1, "attack took {attack} samples");
        assert_eq!(ctx.output, 1.0);
        assert_eq!(ctx.stage, EnvelopeStage::Decay);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let env = Envelope::new(SAMPLE_RATE, 10.0, 50.0, sustain, 200.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        run(&env, &mut ctx, 70);

        assert_eq!(ctx.stage, EnvelopeStage::Sustain);
        assert_eq!(ctx.output, sustain);
        run(&env, &mut ctx, 500);
        assert_eq!(ctx.stage, EnvelopeStage::Sustain);
    }

    #[test]
    fn stage_durations_follow_configured_times() {
        let env = Envelope::new(SAMPLE_RATE, 20.0, 40.0, 0.5, 80.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        let attack = samples_in(&env, &mut ctx, EnvelopeStage::Attack);
        let decay = samples_in(&env, &mut ctx, EnvelopeStage::Decay);
        assert_eq!(ctx.stage, EnvelopeStage::Sustain);
        run(&env, &mut ctx, 100);

        ctx.release();
        let release = samples_in(&env, &mut ctx, EnvelopeStage::Release);
        assert_eq!(ctx.stage, EnvelopeStage::Idle);

        assert!(attack.abs_diff(20) <= 1, "attack took {attack} samples");
        assert!(decay.abs_diff(40) <= 1, "decay took {decay} samples");
        assert!(release.abs_diff(80) <= 1, "release took {release} samples");
    }

    #[test]
    fn durations_are_sample_rate_independent() {
        for rate in [22_050.0, 44_100.0, 96_000.0] {
            let env = Envelope::new(rate, 5.0, 20.0, 0.5, 50.0);
            let mut ctx = EnvelopeContext::default();
            ctx.trigger(1.0);

            let attack = samples_in(&env, &mut ctx, EnvelopeStage::Attack);
            let seconds = attack as f32 / rate;
            assert!((seconds - 0.005).abs() < 2.0 / rate, "{rate}: {seconds}s");
        }
    }

    #[test]
    fn release_starts_from_current_output() {
        let env = Envelope::new(SAMPLE_RATE, 100.0, 10.0, 1.0, 100.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        run(&env, &mut ctx, 50);
        let captured = ctx.output;
        ctx.release();

        assert_eq!(ctx.stage, EnvelopeStage::Release);
        assert_eq!(ctx.release_level, captured);
        // half the output gone after half the release time
        run(&env, &mut ctx, 50);
        assert!((ctx.output - captured * 0.5).abs() < 0.02);
    }

    #[test]
    fn zero_attack_skips_to_decay() {
        let env = Envelope::new(SAMPLE_RATE, 0.0, 10.0, 0.5, 10.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        let gain = env.process(&mut ctx);

        assert_eq!(gain, 1.0);
        assert_eq!(ctx.stage, EnvelopeStage::Decay);
    }

    #[test]
    fn full_sustain_skips_decay() {
        let env = Envelope::new(SAMPLE_RATE, 2.0, 20.0, 1.0, 10.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        run(&env, &mut ctx, 3);

        assert_eq!(ctx.stage, EnvelopeStage::Sustain);
        assert_eq!(env.process(&mut ctx), 1.0);
    }

    #[test]
    fn velocity_scales_output() {
        let env = Envelope::new(SAMPLE_RATE, 0.0, 0.0, 1.0, 10.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(0.5);
        run(&env, &mut ctx, 3);

        assert_eq!(ctx.output, 1.0);
        assert_eq!(env.process(&mut ctx), 0.5);
    }

    #[test]
    fn coefficient_changes_apply_to_running_context() {
        let mut env = Envelope::new(SAMPLE_RATE, 10.0, 10.0, 0.8, 10.0);
        let mut ctx = EnvelopeContext::default();

        ctx.trigger(1.0);
        run(&env, &mut ctx, 30);
        assert_eq!(ctx.output, 0.8);

        env.set_sustain_level(0.3);
        env.process(&mut ctx);
        assert_eq!(ctx.output, 0.3);
    }

    #[test]
    fn release_on_idle_is_ignored() {
        let mut ctx = EnvelopeContext::default();
        ctx.release();
        assert_eq!(ctx.stage, EnvelopeStage::Idle);
    }

    #[test]
    fn non_finite_coefficients_are_ignored() {
        let mut env = Envelope::new(SAMPLE_RATE, 10.0, 10.0, 0.5, 10.0);
        env.set_stage_time(TimedStage::Attack, f32::NAN);
        env.set_stage_time(TimedStage::Release, f32::INFINITY);
        env.set_sustain_level(f32::NAN);

        assert_eq!(env.stage_time(TimedStage::Attack), 10.0);
        assert_eq!(env.stage_time(TimedStage::Release), 10.0);
        assert_eq!(env.sustain_level(), 0.5);

        let mut ctx = EnvelopeContext::default();
        ctx.trigger(1.0);
        let attack = samples_in(&env, &mut ctx, EnvelopeStage::Attack);
        assert!(attack.abs_diff(10) <= 1);
    }

    #[test]
    fn construction_replaces_non_finite_values() {
        let env = Envelope::new(SAMPLE_RATE, f32::NAN, f32::INFINITY, f32::NAN, -1.0);

        assert_eq!(env.stage_time(TimedStage::Attack), DEFAULT_ATTACK_MS);
        assert_eq!(env.stage_time(TimedStage::Decay), DEFAULT_DECAY_MS);
        assert_eq!(env.sustain_level(), DEFAULT_SUSTAIN);
        assert_eq!(env.stage_time(TimedStage::Release), 0.0);
    }
}
