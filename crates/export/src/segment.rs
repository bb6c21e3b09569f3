//! Chapter segmentation of plain-text manuscripts.
//!
//! Manuscripts mark chapters in many mutually exclusive ways, so boundaries
//! are found with an ordered cascade of recognizers. The first family that
//! splits the text into more than one segment wins and later families are
//! never tried. Segmentation never fails: in the worst case the whole
//! manuscript becomes a single chapter.

use once_cell::sync::Lazy;
use quire_types::Chapter;
use regex::Regex;
use tracing::{debug, info};

/// Segments shorter than this (in characters, after trimming) are discarded.
pub const MIN_SEGMENT_CHARS: usize = 50;

/// Lines longer than this are never treated as chapter titles.
pub const MAX_TITLE_CHARS: usize = 120;

const WHOLE_MANUSCRIPT: &str = "whole manuscript";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("segmentation pattern is a valid regex")
}

static CHAPTER_NUMBER_TITLE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?mi)^[ \t]*chapter[ \t]+\d+[ \t]*[:.\-–—][ \t]*\S.*$"));
static CHAPTER_NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"(?mi)^[ \t]*chapter[ \t]+\d+[ \t]*$"));
static ROMAN_TITLE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?m)^[ \t]*(?:(?:Chapter|CHAPTER)[ \t]+)?[IVXLCDM]+[ \t]*[:.][ \t]*\S.*$")
});
static ROMAN_NUMBER: Lazy<Regex> =
    Lazy::new(|| compile(r"(?m)^[ \t]*(?:(?:Chapter|CHAPTER)[ \t]+)?[IVXLCDM]+[ \t]*$"));
static NUMBERED_LIST: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^[ \t]*\d+\.[ \t]+\S.*$"));
static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^[ \t]*#{1,3}[ \t]+\S.*$"));
static SCENE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| compile(r"(?m)^[ \t]*\*[ \t]*\*[ \t]*\*[ \t]*$"));
static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| compile(r"\n(?:[ \t]*\n){3,}"));
static FORM_FEED: Lazy<Regex> = Lazy::new(|| compile(r"\x0C"));

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| compile(r"\n[ \t]*\n"));
static MARKDOWN_PREFIX: Lazy<Regex> = Lazy::new(|| compile(r"^#{1,6}[ \t]+"));
static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "Chapter 4", "CHAPTER FOUR: The Well"
        compile(r"(?i)^chapter\b"),
        // "12", "12. The Well", "XII", "XII: The Well"
        compile(r"^(?:\d+|[IVXLCDM]+)(?:[ \t]*[.:)\-–—][ \t]*.*)?$"),
        // "A. The Well", "B) Another"
        compile(r"^[A-Z][.)][ \t]+\S"),
        // "## The Well"
        compile(r"^#{1,6}[ \t]+\S"),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitMode {
    /// Each match opens a new segment and stays at its start.
    BeforeMatch,
    /// Matches sit between segments and are dropped.
    Separator,
}

/// One recognizer in the boundary cascade.
struct BoundaryFamily {
    name: &'static str,
    pattern: &'static Lazy<Regex>,
    mode: SplitMode,
}

impl BoundaryFamily {
    /// Split `text` on this family's boundaries, dropping blank segments.
    fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for m in self.pattern.find_iter(text) {
            segments.push(&text[cursor..m.start()]);
            cursor = match self.mode {
                SplitMode::BeforeMatch => m.start(),
                SplitMode::Separator => m.end(),
            };
        }
        segments.push(&text[cursor..]);
        segments.retain(|s| !s.trim().is_empty());
        segments
    }
}

/// Chapter heading conventions, highest priority first.
static BOUNDARY_FAMILIES: [BoundaryFamily; 7] = [
    BoundaryFamily {
        name: "chapter number with title",
        pattern: &CHAPTER_NUMBER_TITLE,
        mode: SplitMode::BeforeMatch,
    },
    BoundaryFamily {
        name: "chapter number",
        pattern: &CHAPTER_NUMBER,
        mode: SplitMode::BeforeMatch,
    },
    BoundaryFamily {
        name: "roman numeral with title",
        pattern: &ROMAN_TITLE,
        mode: SplitMode::BeforeMatch,
    },
    BoundaryFamily {
        name: "roman numeral",
        pattern: &ROMAN_NUMBER,
        mode: SplitMode::BeforeMatch,
    },
    BoundaryFamily {
        name: "numbered list",
        pattern: &NUMBERED_LIST,
        mode: SplitMode::BeforeMatch,
    },
    BoundaryFamily {
        name: "markdown heading",
        pattern: &MARKDOWN_HEADING,
        mode: SplitMode::BeforeMatch,
    },
    BoundaryFamily {
        name: "scene separator",
        pattern: &SCENE_SEPARATOR,
        mode: SplitMode::Separator,
    },
];

/// Tried only when no heading convention matched.
static FALLBACK_SEPARATORS: [BoundaryFamily; 2] = [
    BoundaryFamily {
        name: "blank line run",
        pattern: &BLANK_LINE_RUN,
        mode: SplitMode::Separator,
    },
    BoundaryFamily {
        name: "form feed",
        pattern: &FORM_FEED,
        mode: SplitMode::Separator,
    },
];

/// Outcome of segmenting a manuscript.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub chapters: Vec<Chapter>,
    /// Name of the boundary family that produced the split.
    pub strategy: &'static str,
}

/// Split a manuscript into chapters. Never fails.
pub fn segment(text: &str) -> Vec<Chapter> {
    segment_with_report(text).chapters
}

/// Split a manuscript into chapters and report which boundary family won.
pub fn segment_with_report(text: &str) -> Segmentation {
    let normalized = normalize_line_endings(text);

    let (mut strategy, segments) = BOUNDARY_FAMILIES
        .iter()
        .chain(FALLBACK_SEPARATORS.iter())
        .find_map(|family| {
            let segments = family.split(&normalized);
            (segments.len() > 1).then_some((family.name, segments))
        })
        .unwrap_or((WHOLE_MANUSCRIPT, vec![normalized.as_str()]));
    debug!(
        "Boundary family '{}' produced {} segments",
        strategy,
        segments.len()
    );

    let mut chapters: Vec<Chapter> = Vec::new();
    for segment in segments {
        let segment = segment.trim();
        if segment.chars().count() < MIN_SEGMENT_CHARS {
            debug!("Dropping short segment ({} chars)", segment.chars().count());
            continue;
        }

        let position = chapters.len() + 1;
        let (first_line, rest) = segment.split_once('\n').unwrap_or((segment, ""));
        let (title, body) = match detect_title(first_line) {
            Some(title) => (title, rest),
            None => (format!("Chapter {}", position), segment),
        };

        let paragraphs = split_paragraphs(body);
        if paragraphs.is_empty() {
            continue;
        }
        chapters.push(Chapter::new(position, title, paragraphs));
    }

    if chapters.is_empty() {
        strategy = WHOLE_MANUSCRIPT;
        chapters.push(Chapter::new(1, "Chapter 1", split_paragraphs(&normalized)));
    }

    info!(
        "Segmented manuscript into {} chapter(s) using {} boundaries",
        chapters.len(),
        strategy
    );
    Segmentation { chapters, strategy }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Recognize a chapter title line, returning the cleaned title.
fn detect_title(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > MAX_TITLE_CHARS {
        return None;
    }

    if TITLE_PATTERNS.iter().any(|p| p.is_match(line)) || is_all_caps(line) {
        let title = MARKDOWN_PREFIX.replace(line, "");
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    } else {
        None
    }
}

fn is_all_caps(line: &str) -> bool {
    let mut upper = 0;
    for c in line.chars().filter(|c| c.is_alphabetic()) {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            upper += 1;
        }
    }
    upper >= 2
}

/// Split on blank lines, collapsing line breaks inside a paragraph to spaces.
fn split_paragraphs(body: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(body)
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FILLER: &str = "The road wound through the hills for many miles, and nobody spoke.";

    fn titles(chapters: &[Chapter]) -> Vec<&str> {
        chapters.iter().map(|c| c.title()).collect()
    }

    #[test]
    fn test_chapter_number_with_title() {
        let text = format!(
            "Chapter 1: Arrival\n{FILLER}\n\nChapter 2: Departure\n{FILLER}\n\nChapter 3: Return\n{FILLER}\n"
        );
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "chapter number with title");
        assert_eq!(
            titles(&result.chapters),
            vec!["Chapter 1: Arrival", "Chapter 2: Departure", "Chapter 3: Return"]
        );
        assert!(result.chapters.iter().all(|c| c.paragraphs() == [FILLER]));
    }

    #[test]
    fn test_higher_priority_family_wins() {
        // Both numbered headings and scene separators are present; headings win.
        let text = format!(
            "Chapter 1\n{FILLER}\n***\n{FILLER}\n\nChapter 2\n{FILLER}\n"
        );
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "chapter number");
        assert_eq!(titles(&result.chapters), vec!["Chapter 1", "Chapter 2"]);
        // The separator stays inside chapter one's body text.
        assert!(result.chapters[0].paragraphs()[0].contains("***"));
    }

    #[test]
    fn test_single_match_is_not_accepted() {
        let text = format!("Chapter 1: Alone\n{FILLER}\n\n{FILLER}\n");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, WHOLE_MANUSCRIPT);
        assert_eq!(titles(&result.chapters), vec!["Chapter 1: Alone"]);
        assert_eq!(result.chapters[0].paragraphs().len(), 2);
    }

    #[test]
    fn test_roman_numerals() {
        let text = format!("I\n{FILLER}\n\nII\n{FILLER}\n\nIII\n{FILLER}");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "roman numeral");
        assert_eq!(titles(&result.chapters), vec!["I", "II", "III"]);

        let text = format!("IV: The Well\n{FILLER}\n\nV: The Rope\n{FILLER}");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "roman numeral with title");
        assert_eq!(titles(&result.chapters), vec!["IV: The Well", "V: The Rope"]);
    }

    #[test]
    fn test_markdown_headings_strip_marker() {
        let text = format!("# Morning\n{FILLER}\n\n# Evening\n{FILLER}");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "markdown heading");
        assert_eq!(titles(&result.chapters), vec!["Morning", "Evening"]);
    }

    #[test]
    fn test_scene_separators_get_synthetic_titles() {
        let text = format!("{FILLER}\n\n***\n\n{FILLER}\n\n* * *\n\n{FILLER}");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "scene separator");
        assert_eq!(
            titles(&result.chapters),
            vec!["Chapter 1", "Chapter 2", "Chapter 3"]
        );
    }

    #[test]
    fn test_blank_line_fallback_then_form_feed() {
        let text = format!("{FILLER}\n\n\n\n{FILLER}");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "blank line run");
        assert_eq!(result.chapters.len(), 2);

        let text = format!("{FILLER}\x0C{FILLER}");
        let result = segment_with_report(&text);
        assert_eq!(result.strategy, "form feed");
        assert_eq!(result.chapters.len(), 2);
    }

    #[test]
    fn test_short_segments_dropped_and_numbering_follows_retained() {
        let text = format!("Chapter 1\nToo short.\n\nChapter 2\n{FILLER}\n\nChapter 3\n{FILLER}");
        let chapters = segment(&text);
        assert_eq!(titles(&chapters), vec!["Chapter 2", "Chapter 3"]);
        assert_eq!(chapters[0].id().as_str(), "ch-1-chapter-2");
    }

    #[test]
    fn test_long_first_line_is_body_text() {
        let long_line = format!("IT WAS {}", "A VERY LONG OPENING ".repeat(7));
        assert!(long_line.chars().count() > MAX_TITLE_CHARS);
        let chapters = segment(&format!("{long_line}\n\n{FILLER}"));
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title(), "Chapter 1");
        assert_eq!(chapters[0].paragraphs()[0], long_line.trim());
    }

    #[test]
    fn test_line_endings_and_paragraph_collapse() {
        let text = "first line\r\nstill first paragraph\r\n\r\nsecond paragraph is here and long enough";
        let chapters = segment(text);
        assert_eq!(
            chapters[0].paragraphs(),
            [
                "first line still first paragraph",
                "second paragraph is here and long enough"
            ]
        );
    }

    #[test]
    fn test_tiny_manuscript_still_yields_one_chapter() {
        let chapters = segment("Hello.");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title(), "Chapter 1");
        assert_eq!(chapters[0].paragraphs(), ["Hello."]);
    }

    #[test]
    fn test_ids_are_unique() {
        let text = format!("# Same\n{FILLER}\n\n# Same\n{FILLER}");
        let chapters = segment(&text);
        assert_eq!(chapters.len(), 2);
        assert_ne!(chapters[0].id(), chapters[1].id());
    }

    #[test]
    fn test_detect_title_variants() {
        assert_eq!(detect_title("CHAPTER FOUR"), Some("CHAPTER FOUR".to_string()));
        assert_eq!(detect_title("12. The Well"), Some("12. The Well".to_string()));
        assert_eq!(detect_title("B) Second"), Some("B) Second".to_string()));
        assert_eq!(detect_title("THE END"), Some("THE END".to_string()));
        assert_eq!(detect_title("I went home."), None);
        assert_eq!(detect_title("A quiet morning."), None);
    }

    fn is_word_subsequence(needle: &[&str], haystack: &[&str]) -> bool {
        let mut remaining = haystack.iter();
        needle.iter().all(|word| remaining.any(|candidate| candidate == word))
    }

    proptest! {
        #[test]
        fn prop_segmentation_covers_input(
            pieces in proptest::collection::vec(
                prop_oneof![
                    Just("Chapter 1: Start\n".to_string()),
                    Just("Chapter 2\n".to_string()),
                    Just("\n\n".to_string()),
                    Just("\n\n\n\n".to_string()),
                    Just("***\n".to_string()),
                    Just("# Heading\n".to_string()),
                    "[a-z]{1,12}( [a-z]{1,12}){0,12}\n",
                ],
                1..40,
            )
        ) {
            let text: String = pieces.concat();
            prop_assume!(!text.trim().is_empty());

            let chapters = segment(&text);
            prop_assert!(!chapters.is_empty());

            let output: Vec<String> = chapters
                .iter()
                .flat_map(|c| c.paragraphs().iter())
                .flat_map(|p| p.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                .collect();
            let output: Vec<&str> = output.iter().map(String::as_str).collect();
            let input: Vec<&str> = text.split_whitespace().collect();
            prop_assert!(is_word_subsequence(&output, &input));
        }
    }
}
