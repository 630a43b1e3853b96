//! Status bar and envelope parameter list.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use polysampler::{ParamId, SamplerHandle};

use super::keyboard::note_name;

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    handle: &SamplerHandle,
    sample_rate: f64,
    max_voices: usize,
    base_note: u8,
    velocity: u8,
) {
    let block = Block::default().title(" polysampler ").borders(Borders::ALL);

    let key = handle
        .keyboard_key()
        .map(|index| note_name(base_note.saturating_add(index).min(127)))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz  ", sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Voices: {}/{}  ", handle.active_voices(), max_voices),
            Style::default().fg(Color::Green),
        ),
        Span::styled(format!("Key: {key:<4} "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("Velocity: {velocity}  "),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("Held (MIDI): {}  ", handle.held_keys()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Dropped: {}", handle.dropped_events()),
            Style::default().fg(Color::Red),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_params(frame: &mut Frame, area: Rect, values: &[f32; 4], selected: usize) {
    let block = Block::default().title(" Envelope ").borders(Borders::ALL);

    let lines: Vec<Line> = ParamId::ALL
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (id, value))| {
            let text = match id {
                ParamId::Sustain => format!("{:<12} {:>8.2}", id.name(), value),
                _ => format!("{:<12} {:>6.0} ms", id.name(), value),
            };
            let style = if i == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!(" {text}"), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
