//! Glyph metrics for the standard Times fonts and WinAnsi text encoding.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em. The PDF viewer
//! supplies the glyphs, so only the widths are needed to wrap text.

/// Advance widths of ASCII 0x20..=0x7E in Times-Roman.
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '../
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 0..?
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // @..O
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // P.._
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // `..o
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // p..~
];

/// Advance widths of ASCII 0x20..=0x7E in Times-Bold.
const TIMES_BOLD_ASCII: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Width used for glyphs without a metric entry.
const FALLBACK_WIDTH: u16 = 500;

/// One of the standard PDF fonts used by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
}

impl StandardFont {
    pub const ALL: [StandardFont; 2] = [StandardFont::TimesRoman, StandardFont::TimesBold];

    /// PostScript name written to the font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
        }
    }

    /// Name of the font in a page's resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::TimesRoman => "F1",
            Self::TimesBold => "F2",
        }
    }

    /// Advance width of `c` in 1/1000 em.
    pub fn char_width(self, c: char) -> u16 {
        let ascii = match self {
            Self::TimesRoman => &TIMES_ROMAN_ASCII,
            Self::TimesBold => &TIMES_BOLD_ASCII,
        };
        let bold = self == Self::TimesBold;

        match c {
            ' '..='~' => ascii[c as usize - 0x20],
            '\u{a0}' => 250,
            '\u{2018}' | '\u{2019}' => 333,
            '\u{201c}' | '\u{201d}' => {
                if bold {
                    500
                } else {
                    444
                }
            }
            '\u{2022}' => 350,
            '\u{2013}' => 500,
            '\u{2014}' | '\u{2026}' => 1000,
            '\u{20ac}' => 500,
            '\u{2122}' => {
                if bold {
                    1000
                } else {
                    980
                }
            }
            '\u{a9}' => {
                if bold {
                    747
                } else {
                    760
                }
            }
            'Æ' => 1000,
            'æ' => {
                if bold {
                    722
                } else {
                    667
                }
            }
            _ => match latin1_base(c) {
                Some(base) => ascii[base as usize - 0x20],
                None => FALLBACK_WIDTH,
            },
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Unaccented ASCII letter for an accented Latin-1 letter.
fn latin1_base(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

/// Encode text for a WinAnsiEncoding font.
///
/// Characters outside the encoding become `?` so the string stays one byte
/// per glyph, which word spacing (`Tw`) relies on.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(StandardFont::TimesRoman.char_width(' '), 250);
        assert_eq!(StandardFont::TimesRoman.char_width('W'), 944);
        assert_eq!(StandardFont::TimesRoman.char_width('m'), 778);
        assert_eq!(StandardFont::TimesRoman.char_width('~'), 541);
        assert_eq!(StandardFont::TimesBold.char_width('W'), 1000);
        assert_eq!(StandardFont::TimesBold.char_width('a'), 500);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        let font = StandardFont::TimesRoman;
        assert_eq!(font.char_width('é'), font.char_width('e'));
        assert_eq!(font.char_width('Ö'), font.char_width('O'));
        assert_eq!(font.char_width('漢'), FALLBACK_WIDTH);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let font = StandardFont::TimesRoman;
        // "ma" = 778 + 444
        assert!((font.text_width("ma", 10.0) - 12.22).abs() < 1e-4);
        assert!((font.text_width("ma", 20.0) - 24.44).abs() < 1e-4);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(to_win_ansi("Hi"), b"Hi".to_vec());
        assert_eq!(to_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(
            to_win_ansi("\u{201c}no\u{201d}\u{2014}"),
            vec![0x93, b'n', b'o', 0x94, 0x97]
        );
        assert_eq!(to_win_ansi("漢"), b"?".to_vec());
    }
}
