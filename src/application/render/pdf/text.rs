//! Text encoding and metrics for the standard Helvetica faces.

use crate::application::sanitize::sanitize_text;

/// The three faces registered on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    /// Resource name used by `Tf`.
    pub fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }
}

/// Glyph widths in 1/1000 em for bytes 0x20..=0x7E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// WinAnsi code points for punctuation outside Latin-1.
fn win_ansi_extra(ch: char) -> Option<u8> {
    Some(match ch {
        '\u{20AC}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2039}' => 0x8B,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        '\u{203A}' => 0x9B,
        _ => return None,
    })
}

/// Encode text for a simple font with `WinAnsiEncoding`.
///
/// Latin-1 passes through, smart punctuation maps to its WinAnsi slot and
/// everything else goes through the charset sanitizer. Control characters
/// become spaces.
pub fn encode(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 4];
    for ch in text.chars() {
        if let Some(byte) = win_ansi_extra(ch) {
            bytes.push(byte);
            continue;
        }
        match u32::from(ch) {
            0x20..=0x7E | 0xA0..=0xFF => bytes.push(u32::from(ch) as u8),
            0x00..=0x1F | 0x7F..=0x9F => bytes.push(b' '),
            _ => {
                let replacement = sanitize_text(ch.encode_utf8(&mut buffer));
                bytes.extend(replacement.bytes().filter(u8::is_ascii));
            }
        }
    }
    bytes
}

fn glyph_width(byte: u8, font: Font) -> u16 {
    let table = match font {
        Font::Bold => &HELVETICA_BOLD,
        Font::Regular | Font::Italic => &HELVETICA,
    };
    match byte {
        0x20..=0x7E => table[usize::from(byte - 0x20)],
        0x85 | 0x97 => 1000,
        0x95 => 350,
        0x91 | 0x92 => if font == Font::Bold { 278 } else { 222 },
        0x93 | 0x94 => if font == Font::Bold { 500 } else { 333 },
        0xA0 | 0xB7 => 278,
        _ => 556,
    }
}

/// Advance width of encoded text in points.
pub fn width(bytes: &[u8], font: Font, size: f32) -> f32 {
    let units: u32 = bytes.iter().map(|&byte| u32::from(glyph_width(byte, font))).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap of `text` into encoded lines no wider than `max_width`.
/// Explicit newlines always break; words wider than a line are split.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let space = width(b" ", font, size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let encoded = encode(paragraph);
        let mut line: Vec<u8> = Vec::new();
        let mut line_width = 0.0;

        for word in encoded.split(|&byte| byte == b' ').filter(|word| !word.is_empty()) {
            let word_width = width(word, font, size);
            if !line.is_empty() && line_width + space + word_width <= max_width {
                line.push(b' ');
                line.extend_from_slice(word);
                line_width += space + word_width;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if word_width <= max_width {
                line.extend_from_slice(word);
                line_width = word_width;
            } else {
                let mut pieces = split_word(word, font, size, max_width);
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                line_width = width(&last, font, size);
                line = last;
            }
        }
        lines.push(line);
    }
    lines
}

fn split_word(word: &[u8], font: Font, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let mut pieces = Vec::new();
    let mut piece = Vec::new();
    for &byte in word {
        let candidate = width(&piece, font, size) + width(&[byte], font, size);
        if !piece.is_empty() && candidate > max_width {
            pieces.push(std::mem::take(&mut piece));
        }
        piece.push(byte);
    }
    pieces.push(piece);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_punctuation_uses_win_ansi_slots() {
        assert_eq!(encode("\u{201C}Hi\u{201D} \u{2014} ok\u{2026}"), vec![
            0x93, b'H', b'i', 0x94, b' ', 0x97, b' ', b'o', b'k', 0x85
        ]);
        assert_eq!(encode("caf\u{00E9}"), b"caf\xE9".to_vec());
    }

    #[test]
    fn characters_outside_win_ansi_fall_back_to_the_charset_sanitizer() {
        assert_eq!(encode("\u{4E2D}"), b"[U+4E2D]".to_vec());
        assert_eq!(encode("a\tb"), b"a b".to_vec());
    }

    #[test]
    fn widths_follow_font_metrics() {
        assert!((width(b"Hello", Font::Regular, 10.0) - 22.78).abs() < 0.01);
        assert!(width(b"Hello", Font::Bold, 10.0) > width(b"Hello", Font::Regular, 10.0));
    }

    #[test]
    fn wrap_breaks_on_spaces_and_newlines() {
        let lines = wrap("one two three\nfour", Font::Regular, 10.0, 45.0);
        let text: Vec<String> = lines
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect();
        assert_eq!(text, vec!["one two", "three", "four"]);
    }

    #[test]
    fn wrap_splits_words_longer_than_a_line() {
        let lines = wrap("abcdefghijklmnop", Font::Regular, 10.0, 30.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| width(line, Font::Regular, 10.0) <= 30.0));
        assert_eq!(lines.concat(), b"abcdefghijklmnop".to_vec());
    }
}
