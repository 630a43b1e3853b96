//! Audio setup: the output stream owns the engine, the UI keeps the handle.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use tracing::{error, info};

use polysampler::{Sampler, SamplerConfig, MAX_BLOCK_SIZE};

use super::ui::UiApp;

/// Samples kept in flight for the oscilloscope.
const SCOPE_CAPACITY: usize = 8192;

pub struct App {
    config: SamplerConfig,
}

impl App {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Open the default output device and run the UI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        let max_voices = self.config.max_voices;
        let base_note = self.config.keyboard_note_offset;

        let (mut sampler, handle) =
            Sampler::new(self.config).wrap_err("failed to build sampler")?;
        sampler
            .reset(sample_rate, MAX_BLOCK_SIZE)
            .wrap_err("failed to configure sampler")?;

        info!(sample_rate, channels, "opening output stream");

        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                // hosts may ask for more than one engine block per callback
                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    sampler.process_interleaved(chunk, channels);
                }

                for frame in data.chunks(channels) {
                    if scope_tx.push(frame[0]).is_err() {
                        break;
                    }
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result =
            UiApp::new(handle, scope_rx, sample_rate, max_voices, base_note).run(&mut terminal);
        ratatui::restore();

        result
    }
}
