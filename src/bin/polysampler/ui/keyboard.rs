//! Computer-keyboard piano: two rows, one octave each.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const KEYS_PER_ROW: u8 = 12;

/// Lower row plays the first octave, upper row the second.
const LOWER_ROW: [char; 12] = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm'];
const UPPER_ROW: [char; 12] = ['q', '2', 'w', '3', 'e', 'r', '5', 't', '6', 'y', '7', 'u'];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Keyboard key index for a character, before any octave shift.
pub fn key_index(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    if let Some(i) = LOWER_ROW.iter().position(|&k| k == c) {
        return Some(i as u8);
    }
    UPPER_ROW
        .iter()
        .position(|&k| k == c)
        .map(|i| i as u8 + KEYS_PER_ROW)
}

/// "C4", "F#3", ... for a MIDI note number.
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, pressed: Option<u8>, octave: u8) {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);

    let base = octave * KEYS_PER_ROW;
    let rows = [(&UPPER_ROW, base + KEYS_PER_ROW), (&LOWER_ROW, base)];

    let lines: Vec<Line> = rows
        .iter()
        .map(|(row, first)| {
            let spans = row
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let index = first + i as u8;
                    let sharp = NOTE_NAMES[i].len() > 1;
                    let style = if pressed == Some(index) {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else if sharp {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    Span::styled(format!(" {}:{:<3}", c, NOTE_NAMES[i]), style)
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_cover_two_octaves() {
        assert_eq!(key_index('z'), Some(0));
        assert_eq!(key_index('m'), Some(11));
        assert_eq!(key_index('Q'), Some(12));
        assert_eq!(key_index('u'), Some(23));
        assert_eq!(key_index('p'), None);
    }

    #[test]
    fn names_notes() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(49), "C#3");
    }
}
