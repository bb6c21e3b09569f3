//! The chapter model shared by every output format.

use serde::{Deserialize, Serialize};

/// Longest slug fragment kept from a chapter title.
const MAX_SLUG_LEN: usize = 48;

/// Stable identifier of a chapter within one manuscript.
///
/// The same string is used as the HTML anchor, the EPUB manifest item id and
/// the PDF named destination. It always starts with a letter so it is a valid
/// XML `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChapterId(String);

impl ChapterId {
    /// Build the id for the chapter at 1-based `position` with the given title.
    pub fn for_position(position: usize, title: &str) -> Self {
        let mut slug = slug::slugify(title);
        if slug.len() > MAX_SLUG_LEN {
            slug.truncate(MAX_SLUG_LEN);
            while slug.ends_with('-') {
                slug.pop();
            }
        }

        if slug.is_empty() {
            Self(format!("ch-{position}"))
        } else {
            Self(format!("ch-{position}-{slug}"))
        }
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One chapter of a segmented manuscript.
///
/// Chapters are produced once per publish run and never mutated afterwards;
/// renderers only ever borrow them.
///
/// `paragraphs` is non-empty for every chapter cut from real text. The one
/// exception is the `Chapter 1` fallback for a blank manuscript, which the
/// publisher rejects before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    id: ChapterId,
    title: String,
    paragraphs: Vec<String>,
}

impl Chapter {
    /// Create a chapter at 1-based `position`. The id is derived from the
    /// position and title so it is unique within the manuscript.
    pub fn new(position: usize, title: impl Into<String>, paragraphs: Vec<String>) -> Self {
        let title = title.into();
        Self {
            id: ChapterId::for_position(position, &title),
            title,
            paragraphs,
        }
    }

    pub fn id(&self) -> &ChapterId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Total number of words across all paragraphs.
    pub fn word_count(&self) -> usize {
        self.paragraphs
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_title() {
        let id = ChapterId::for_position(1, "Chapter 1: Arrival");
        assert_eq!(id.as_str(), "ch-1-chapter-1-arrival");
    }

    #[test]
    fn test_id_without_usable_title() {
        assert_eq!(ChapterId::for_position(7, "***").as_str(), "ch-7");
        assert_eq!(ChapterId::for_position(2, "").as_str(), "ch-2");
    }

    #[test]
    fn test_long_title_is_truncated() {
        let title = "a very long chapter title that keeps going well beyond any sane length";
        let id = ChapterId::for_position(3, title);
        assert!(id.as_str().len() <= "ch-3-".len() + MAX_SLUG_LEN);
        assert!(!id.as_str().ends_with('-'));
    }

    #[test]
    fn test_word_count() {
        let chapter = Chapter::new(
            1,
            "One",
            vec!["two words".to_string(), "and three more".to_string()],
        );
        assert_eq!(chapter.word_count(), 5);
        assert_eq!(chapter.id().as_str(), "ch-1-one");
    }
}
