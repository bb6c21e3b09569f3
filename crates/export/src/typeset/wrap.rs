//! Greedy word wrapping shared by the interior typesetter and the cover.

use super::metrics::StandardFont;

/// Fraction of the usable width a line may fill before it wraps.
pub const WRAP_RATIO: f32 = 0.92;

/// Break `text` into lines using `font` at `size`.
///
/// The first line may be narrower than the rest (a first-line indent).
/// Widths are the usable widths; lines wrap at [`WRAP_RATIO`] of them.
pub fn wrap_text(
    text: &str,
    font: StandardFont,
    size: f32,
    first_width: f32,
    rest_width: f32,
) -> Vec<String> {
    wrap_words(
        text.split_whitespace(),
        |line| font.text_width(line, size),
        first_width * WRAP_RATIO,
        rest_width * WRAP_RATIO,
    )
}

/// Accumulate words into a line while its measured width stays within the
/// limit; on overflow commit the line and start the next one with the word
/// that did not fit.
///
/// A single word wider than the limit gets a line to itself.
pub fn wrap_words<'a, I, M>(words: I, measure: M, first_limit: f32, rest_limit: f32) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    M: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in words {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let limit = if lines.is_empty() {
            first_limit
        } else {
            rest_limit
        };
        let candidate_len = current.len();
        current.push(' ');
        current.push_str(word);

        if measure(&current) > limit {
            current.truncate(candidate_len);
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn char_count(line: &str) -> f32 {
        line.chars().count() as f32
    }

    #[test]
    fn test_wraps_on_overflow() {
        let lines = wrap_words("aa bb cc dd".split(' '), char_count, 5.0, 5.0);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn test_narrower_first_line() {
        let lines = wrap_words("aa bb cc dd".split(' '), char_count, 2.0, 8.0);
        assert_eq!(lines, vec!["aa", "bb cc dd"]);
    }

    #[test]
    fn test_oversized_word_gets_own_line() {
        let lines = wrap_words(
            "a verylongword b".split(' '),
            char_count,
            4.0,
            4.0,
        );
        assert_eq!(lines, vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(wrap_text("   ", StandardFont::TimesRoman, 11.0, 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_text_respects_ratio() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
        let width = 200.0;
        for line in wrap_text(&text, StandardFont::TimesRoman, 11.0, width, width) {
            assert!(StandardFont::TimesRoman.text_width(&line, 11.0) <= width * WRAP_RATIO);
        }
    }

    proptest! {
        #[test]
        fn prop_lines_fit_and_keep_words(
            words in prop::collection::vec("[a-z]{1,14}", 0..60),
            limit in 5.0f32..40.0,
        ) {
            let lines = wrap_words(words.iter().map(String::as_str), char_count, limit, limit);

            for line in &lines {
                let fits = char_count(line) <= limit;
                let single_word = !line.contains(' ');
                prop_assert!(fits || single_word);
            }

            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
            let expected: Vec<&str> = words.iter().map(String::as_str).collect();
            prop_assert_eq!(rejoined, expected);
        }
    }
}
