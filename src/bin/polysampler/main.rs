//! polysampler - terminal keyboard for the wavetable sampler
//!
//! Run with: cargo run
//! Log to a file with: POLYSAMPLER_LOG=polysampler.log cargo run

mod app;
mod ui;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use std::{fs::File, sync::Mutex};
use tracing_subscriber::EnvFilter;

use app::App;
use polysampler::SamplerConfig;

const LOG_ENV: &str = "POLYSAMPLER_LOG";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    App::new(SamplerConfig::default()).run()
}

/// The terminal belongs to the UI, so logs only go to a file, and only when
/// one is asked for. Per-event engine logs sit at `trace` and stay off
/// unless `RUST_LOG` asks for them: the audio callback writes through the
/// same file lock.
fn init_logging() -> EyreResult<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };

    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to create log file {}", path.to_string_lossy()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
