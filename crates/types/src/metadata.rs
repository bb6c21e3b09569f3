//! Book-level metadata read from a project's metadata directory.

use serde::{Deserialize, Serialize};

/// Metadata describing a book.
///
/// `title` and `author` are required by every renderer; everything else is
/// free text that may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub language: String,
    pub publisher: String,
    pub description: String,
    pub buy_url: Option<String>,
    pub pov: Option<String>,
    pub copyright: Option<String>,
    pub dedication: Option<String>,
    pub about_author: Option<String>,
    pub blurb: Option<String>,
}

impl BookMetadata {
    /// Create metadata with the required fields and English as the language.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            language: "en".to_string(),
            ..Default::default()
        }
    }

    /// Language tag, falling back to `en` when unset.
    pub fn language_or_default(&self) -> &str {
        if self.language.trim().is_empty() {
            "en"
        } else {
            &self.language
        }
    }

    /// Copyright line, falling back to a generated notice.
    pub fn copyright_line(&self, year: i32) -> String {
        match &self.copyright {
            Some(text) => text.clone(),
            None => format!("Copyright © {} {}. All rights reserved.", year, self.author),
        }
    }

    /// Description for catalogues: explicit description first, then the blurb.
    pub fn summary(&self) -> Option<&str> {
        if !self.description.trim().is_empty() {
            Some(&self.description)
        } else {
            self.blurb.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let metadata = BookMetadata::new("Title", "Author");
        assert_eq!(metadata.language_or_default(), "en");
        assert!(metadata.summary().is_none());
        assert_eq!(
            metadata.copyright_line(2026),
            "Copyright © 2026 Author. All rights reserved."
        );
    }

    #[test]
    fn test_summary_prefers_description() {
        let mut metadata = BookMetadata::new("Title", "Author");
        metadata.blurb = Some("Blurb".to_string());
        assert_eq!(metadata.summary(), Some("Blurb"));

        metadata.description = "Description".to_string();
        assert_eq!(metadata.summary(), Some("Description"));
    }
}
