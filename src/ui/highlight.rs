use iced::advanced::text::highlighter::{self, Highlighter};
use iced::font::{Font, Weight};
use iced::{Color, Theme};
use std::ops::Range;

/// Kinds of ABC syntax the editor colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Information field label, e.g. `T:`
    Field,
    /// Rest of an information field line
    FieldText,
    /// `[K:G]` style field inside the music
    InlineField,
    /// `%%` stylesheet / MIDI directive
    Directive,
    Comment,
    /// Guitar chord or annotation, `"Am"`
    ChordSymbol,
    /// `!trill!` style decoration
    Decoration,
    BarLine,
}

/// Line-oriented ABC highlighter.
///
/// Header lines run from `X:` to the first `K:`; after that the tune
/// body continues until a blank line. The state at the start of each
/// line is remembered so iced can restart highlighting mid-document.
#[derive(Debug)]
pub struct AbcHighlighter {
    current_line: usize,
    /// `starts_in_body[i]` is true when line `i` begins inside a tune body
    starts_in_body: Vec<bool>,
}

impl Highlighter for AbcHighlighter {
    type Settings = ();
    type Highlight = Token;
    type Iterator<'a> = std::vec::IntoIter<(Range<usize>, Token)>;

    fn new(_settings: &Self::Settings) -> Self {
        Self {
            current_line: 0,
            starts_in_body: vec![false],
        }
    }

    fn update(&mut self, _new_settings: &Self::Settings) {
        self.change_line(0);
    }

    fn change_line(&mut self, line: usize) {
        self.starts_in_body.truncate(line + 1);
        self.current_line = line.min(self.starts_in_body.len() - 1);
    }

    fn highlight_line(&mut self, line: &str) -> Self::Iterator<'_> {
        let in_body = self
            .starts_in_body
            .get(self.current_line)
            .copied()
            .unwrap_or(false);

        let (spans, next_in_body) = highlight(line, in_body);

        self.starts_in_body.truncate(self.current_line + 1);
        self.starts_in_body.push(next_in_body);
        self.current_line += 1;

        spans.into_iter()
    }

    fn current_line(&self) -> usize {
        self.current_line
    }
}

/// Tokenize one line; returns the spans and whether the next line is body
pub fn highlight(line: &str, in_body: bool) -> (Vec<(Range<usize>, Token)>, bool) {
    let mut spans = Vec::new();

    if line.trim().is_empty() {
        return (spans, false);
    }
    if line.starts_with("%%") {
        spans.push((0..line.len(), Token::Directive));
        return (spans, in_body);
    }
    if line.starts_with('%') {
        spans.push((0..line.len(), Token::Comment));
        return (spans, in_body);
    }

    if let Some(label) = field_label(line) {
        spans.push((0..2, Token::Field));
        let text_end = line.find('%').filter(|&i| i >= 2).unwrap_or(line.len());
        if text_end > 2 {
            spans.push((2..text_end, Token::FieldText));
        }
        if text_end < line.len() {
            spans.push((text_end..line.len(), Token::Comment));
        }

        let next_in_body = match label {
            'X' => false,
            'K' => true,
            _ => in_body,
        };
        return (spans, next_in_body);
    }

    if in_body {
        music(line, &mut spans);
    }
    (spans, in_body)
}

/// `T:` style label at the start of a line
fn field_label(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let label = chars.next()?;
    (label.is_ascii_alphabetic() && chars.next() == Some(':')).then_some(label)
}

fn music(line: &str, spans: &mut Vec<(Range<usize>, Token)>) {
    let bytes = line.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                spans.push((i..bytes.len(), Token::Comment));
                return;
            }
            b'"' => {
                let end = closing(bytes, i, b'"');
                spans.push((i..end, Token::ChordSymbol));
                i = end;
            }
            b'!' => {
                let end = closing(bytes, i, b'!');
                spans.push((i..end, Token::Decoration));
                i = end;
            }
            b'[' if bytes.get(i + 2) == Some(&b':') && bytes[i + 1].is_ascii_alphabetic() => {
                let end = closing(bytes, i, b']');
                spans.push((i..end, Token::InlineField));
                i = end;
            }
            b'|' | b':' | b'[' | b']' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i], b'|' | b':' | b'[' | b']') {
                    i += 1;
                }
                if line[start..i].contains('|') || &line[start..i] == "::" {
                    spans.push((start..i, Token::BarLine));
                }
            }
            _ => i += 1,
        }
    }
}

/// End (exclusive) of a span opened at `start` and closed by `delimiter`,
/// or the end of the line when it is never closed
fn closing(bytes: &[u8], start: usize, delimiter: u8) -> usize {
    bytes[start + 1..]
        .iter()
        .position(|&b| b == delimiter)
        .map(|offset| start + 1 + offset + 1)
        .unwrap_or(bytes.len())
}

/// Colours for each token in the current theme
pub fn to_format(token: &Token, theme: &Theme) -> highlighter::Format<Font> {
    let palette = theme.extended_palette();

    let bold = Font {
        weight: Weight::Bold,
        ..Font::MONOSPACE
    };

    let (color, font): (Color, Option<Font>) = match token {
        Token::Field => (palette.primary.strong.color, Some(bold)),
        Token::FieldText => (palette.primary.base.color, None),
        Token::InlineField => (palette.primary.strong.color, None),
        Token::Directive => (palette.success.base.color, None),
        Token::Comment => (palette.background.strong.color, None),
        Token::ChordSymbol => (palette.danger.base.color, None),
        Token::Decoration => (palette.secondary.strong.color, None),
        Token::BarLine => (palette.background.base.text, Some(bold)),
    };

    highlighter::Format {
        color: Some(color),
        font,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str, in_body: bool) -> Vec<(&str, Token)> {
        highlight(line, in_body)
            .0
            .into_iter()
            .map(|(range, token)| (&line[range], token))
            .collect()
    }

    #[test]
    fn test_header_fields() {
        assert_eq!(
            tokens("T:The Kesh % jig", false),
            [
                ("T:", Token::Field),
                ("The Kesh ", Token::FieldText),
                ("% jig", Token::Comment)
            ]
        );
    }

    #[test]
    fn test_key_line_starts_body_and_blank_line_ends_it() {
        assert!(!highlight("X:1", true).1);
        assert!(highlight("K:G", false).1);
        assert!(highlight("GAB c2d|", true).1);
        assert!(!highlight("", true).1);
    }

    #[test]
    fn test_directives_and_comments() {
        assert_eq!(tokens("%%MIDI program 41", true), [("%%MIDI program 41", Token::Directive)]);
        assert_eq!(tokens("% from a session", false), [("% from a session", Token::Comment)]);
    }

    #[test]
    fn test_music_line() {
        assert_eq!(
            tokens("|:\"G\"GAB !trill!c2d [K:D] :|", true),
            [
                ("|:", Token::BarLine),
                ("\"G\"", Token::ChordSymbol),
                ("!trill!", Token::Decoration),
                ("[K:D]", Token::InlineField),
                (":|", Token::BarLine),
            ]
        );
    }

    #[test]
    fn test_music_outside_tune_is_plain() {
        assert!(tokens("just some notes | here", false).is_empty());
    }

    #[test]
    fn test_unclosed_chord_runs_to_end() {
        assert_eq!(tokens("\"Am CDE", true), [("\"Am CDE", Token::ChordSymbol)]);
    }

    #[test]
    fn test_restart_mid_document() {
        let mut highlighter = AbcHighlighter::new(&());
        for line in ["X:1", "K:C", "CDEF|"] {
            highlighter.highlight_line(line);
        }
        assert_eq!(highlighter.current_line(), 3);

        // Re-highlighting from line 2 must remember we are in the body
        highlighter.change_line(2);
        let spans: Vec<_> = highlighter.highlight_line("GABc|").collect();
        assert_eq!(spans, [(4..5, Token::BarLine)]);
    }
}
