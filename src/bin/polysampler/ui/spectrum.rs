//! Spectrum of the scope buffer, with a dominant-frequency readout.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Display columns, log-spaced from LOW_HZ to Nyquist.
const DISPLAY_BINS: usize = 64;
const LOW_HZ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct Spectrum {
    fft: Arc<dyn Fft<f32>>,
    /// Hann window
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin range feeding each display column
    columns: Vec<(f64, usize, usize)>,
    /// (frequency Hz, magnitude dB) per display column
    data: Vec<(f64, f64)>,
    bin_hz: f64,
    peak_hz: Option<f64>,
}

impl Spectrum {
    pub fn new(len: usize, sample_rate: f64) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(len);
        let window = (0..len)
            .map(|i| {
                let t = i as f32 / (len.max(2) - 1) as f32;
                0.5 * (1.0 - (std::f32::consts::TAU * t).cos())
            })
            .collect();

        let bin_hz = sample_rate / len as f64;
        let half = (len / 2).max(1);
        let nyquist = sample_rate / 2.0;
        let ratio = (nyquist / LOW_HZ).max(1.0);

        let mut columns = Vec::with_capacity(DISPLAY_BINS);
        for i in 0..DISPLAY_BINS {
            let lo = LOW_HZ * ratio.powf(i as f64 / DISPLAY_BINS as f64);
            let hi = LOW_HZ * ratio.powf((i + 1) as f64 / DISPLAY_BINS as f64);
            let first = ((lo / bin_hz).round() as usize).min(half - 1);
            let last = ((hi / bin_hz).round() as usize).clamp(first + 1, half);
            columns.push(((lo * hi).sqrt(), first, last));
        }

        let data = columns.iter().map(|&(hz, _, _)| (hz, FLOOR_DB)).collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); len],
            columns,
            data,
            bin_hz,
            peak_hz: None,
        }
    }

    /// Recompute from the latest `samples`; ignored unless the length matches.
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let power = |bin: &Complex<f32>| (bin.norm_sqr() as f64).max(1e-12);

        for (point, &(hz, first, last)) in self.data.iter_mut().zip(&self.columns) {
            let loudest = self.scratch[first..last].iter().map(power).fold(0.0, f64::max);
            *point = (hz, (10.0 * loudest.log10()).max(FLOOR_DB));
        }

        let half = self.scratch.len() / 2;
        self.peak_hz = self.scratch[1..half.max(1)]
            .iter()
            .enumerate()
            .max_by(|a, b| power(a.1).total_cmp(&power(b.1)))
            .filter(|(_, bin)| power(*bin) > 1e-6)
            .map(|(i, _)| (i + 1) as f64 * self.bin_hz);
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.data
    }

    /// Centre frequency of the loudest FFT bin, if anything is sounding.
    pub fn peak_hz(&self) -> Option<f64> {
        self.peak_hz
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &Spectrum) {
    let title = match spectrum.peak_hz() {
        Some(hz) => format!(" Spectrum  peak {hz:.0} Hz "),
        None => " Spectrum ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let data = spectrum.data();
    let max_hz = data.last().map_or(1.0, |&(hz, _)| hz);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([LOW_HZ, max_hz])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 20.0])
                .labels(vec!["-100", "-40", "20"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
