//! TUI module for polysampler
//!
//! A two-row computer keyboard stands in for the plugin's on-screen piano.
//! Terminals report no key-up, so piano keys toggle: press once to hold the
//! note, again (or another key) to let go.

mod keyboard;
mod panel;
mod scope;
mod spectrum;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use polysampler::{ParamId, SamplerHandle};

use keyboard::{key_index, render_keyboard, KEYS_PER_ROW};
use panel::{render_params, render_status};
use scope::render_scope;
use spectrum::{render_spectrum, Spectrum};

/// Samples shown in the oscilloscope.
const SCOPE_SIZE: usize = 1024;

const MAX_OCTAVE_SHIFT: u8 = 3;

pub struct UiApp {
    handle: SamplerHandle,
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    spectrum: Spectrum,
    sample_rate: f64,
    max_voices: usize,
    /// Note played by keyboard index 0.
    base_note: u8,
    /// Current value of each entry in `ParamId::ALL`.
    params: [f32; 4],
    selected: usize,
    /// Octaves added to the key index, on top of the engine's note offset.
    octave: u8,
    velocity: u8,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: SamplerHandle,
        scope_rx: Consumer<f32>,
        sample_rate: f64,
        max_voices: usize,
        base_note: u8,
    ) -> Self {
        Self {
            handle,
            scope_rx,
            scope: vec![0.0; SCOPE_SIZE],
            spectrum: Spectrum::new(SCOPE_SIZE, sample_rate),
            sample_rate,
            max_voices,
            base_note,
            params: ParamId::ALL.map(ParamId::default_value),
            selected: 0,
            octave: 0,
            velocity: 100,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.handle.set_keyboard_key(None, 0);
        Ok(())
    }

    fn poll_scope(&mut self) {
        let before = self.scope.len();
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() == before {
            return;
        }

        if self.scope.len() > SCOPE_SIZE {
            let excess = self.scope.len() - SCOPE_SIZE;
            self.scope.drain(0..excess);
        }
        self.spectrum.update(&self.scope);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(ParamId::ALL.len() - 1),
            KeyCode::Left => self.adjust_param(false),
            KeyCode::Right => self.adjust_param(true),
            KeyCode::Char(' ') => {
                self.handle.set_keyboard_key(None, 0);
                let _ = self.handle.all_notes_off();
            }
            KeyCode::Char('<') => self.shift_octave(false),
            KeyCode::Char('>') => self.shift_octave(true),
            KeyCode::PageUp => self.velocity = self.velocity.saturating_add(8).min(127),
            KeyCode::PageDown => self.velocity = self.velocity.saturating_sub(8).max(1),
            KeyCode::Char(c) => {
                if let Some(index) = key_index(c) {
                    self.toggle_key(index + self.octave * KEYS_PER_ROW);
                }
            }
            _ => {}
        }
    }

    fn toggle_key(&mut self, index: u8) {
        if self.handle.keyboard_key() == Some(index) {
            self.handle.set_keyboard_key(None, 0);
        } else {
            self.handle.set_keyboard_key(Some(index), self.velocity);
        }
    }

    fn shift_octave(&mut self, up: bool) {
        self.handle.set_keyboard_key(None, 0);
        self.octave = if up {
            (self.octave + 1).min(MAX_OCTAVE_SHIFT)
        } else {
            self.octave.saturating_sub(1)
        };
    }

    fn adjust_param(&mut self, up: bool) {
        let id = ParamId::ALL[self.selected];
        let current = self.params[self.selected];
        let value = match id {
            ParamId::Sustain if up => current + 0.05,
            ParamId::Sustain => current - 0.05,
            _ if up => current * 1.25,
            _ => current / 1.25,
        };
        let value = id.clamp(value);

        // a full control queue keeps the old value on screen
        if self.handle.set_param(id, value).is_ok() {
            self.params[self.selected] = value;
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(6), // Envelope parameters
                Constraint::Length(4), // Keyboard
                Constraint::Min(6),    // Scope and spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(
            frame,
            chunks[0],
            &self.handle,
            self.sample_rate,
            self.max_voices,
            self.base_note,
            self.velocity,
        );
        render_params(frame, chunks[1], &self.params, self.selected);
        render_keyboard(frame, chunks[2], self.handle.keyboard_key(), self.octave);

        let analysis = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        render_scope(frame, analysis[0], &self.scope);
        render_spectrum(frame, analysis[1], &self.spectrum);

        let help = Paragraph::new(
            " [z..m / q..i] Keys  [↑↓] Select  [←→] Adjust  [<>] Octave  [PgUp/PgDn] Velocity  [Space] Panic  [Esc] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
