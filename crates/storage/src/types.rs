//! Supporting types for the project storage system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MANUSCRIPT_FILE: &str = "manuscript.txt";
pub const METADATA_DIR: &str = "metadata";
pub const INDEX_FILE: &str = "index.html";

pub const TITLE_FILE: &str = "_title.txt";
pub const AUTHOR_FILE: &str = "_author.txt";
pub const PUBLISHER_FILE: &str = "_publisher.txt";
pub const LANGUAGE_FILE: &str = "_language.txt";
pub const DESCRIPTION_FILE: &str = "_description.txt";
pub const BUY_URL_FILE: &str = "_buy_url.txt";
pub const COPYRIGHT_FILE: &str = "_copyright.txt";
pub const DEDICATION_FILE: &str = "_dedication.txt";
pub const ABOUT_AUTHOR_FILE: &str = "_about_author.txt";
pub const BLURB_FILE: &str = "_back_cover_blurb.txt";
pub const POV_FILE: &str = "_pov.txt";

/// Candidate file names for the front cover, in lookup order.
pub const FRONT_COVER_FILES: &[&str] = &["cover.png", "cover.jpg", "cover.jpeg"];

/// Candidate file names for the back-cover author photo, in lookup order.
pub const BACK_PHOTO_FILES: &[&str] = &["author_photo.png", "author_photo.jpg", "author_photo.jpeg"];

/// Identifier of a project: the name of its directory inside the collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create a new ProjectId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Timestamp embedded in generated artifact file names.
///
/// An ISO-8601 UTC instant with `-`, `:` and `.` removed, e.g.
/// `20261015T093012123Z`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactTimestamp(String);

impl ArtifactTimestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format("%Y%m%dT%H%M%S%3fZ").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of files the publisher writes into a project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Html,
    Epub,
    Pdf,
    PaperbackCover,
    CoverProof,
}

impl ArtifactKind {
    /// Kinds produced by a publish run and linked from the book index.
    pub const PUBLISHED: [ArtifactKind; 4] = [
        ArtifactKind::Html,
        ArtifactKind::Epub,
        ArtifactKind::Pdf,
        ArtifactKind::PaperbackCover,
    ];

    fn prefix(self) -> &'static str {
        match self {
            Self::Html | Self::Epub | Self::Pdf => "manuscript_",
            Self::PaperbackCover => "paperback_cover_",
            Self::CoverProof => "paperback_cover_proof_",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Html => ".html",
            Self::Epub => ".epub",
            Self::Pdf | Self::PaperbackCover | Self::CoverProof => ".pdf",
        }
    }

    /// File name for this kind at the given timestamp.
    pub fn file_name(self, timestamp: &ArtifactTimestamp) -> String {
        format!("{}{}{}", self.prefix(), timestamp, self.extension())
    }

    /// Identify a generated artifact by its file name.
    pub fn classify(file_name: &str) -> Option<ArtifactKind> {
        // Proof files share the paperback cover prefix, so check them first.
        [
            Self::CoverProof,
            Self::PaperbackCover,
            Self::Html,
            Self::Epub,
            Self::Pdf,
        ]
        .into_iter()
        .find(|kind| {
            file_name
                .strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_suffix(kind.extension()))
                .is_some_and(is_timestamp)
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Html => "Web",
            Self::Epub => "EPUB",
            Self::Pdf => "PDF",
            Self::PaperbackCover => "Paperback cover",
            Self::CoverProof => "Cover proof",
        }
    }
}

fn is_timestamp(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_digit() || c == 'T' || c == 'Z')
}

/// A generated artifact found in a project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub file_name: String,
}

/// Lightweight summary of a project for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub has_manuscript: bool,
    pub has_metadata: bool,
    pub artifacts: Vec<ArtifactInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 12).unwrap();
        assert_eq!(
            ArtifactTimestamp::from_datetime(at).as_str(),
            "20261015T093012000Z"
        );
    }

    #[test]
    fn test_file_names_classify_back() {
        let ts = ArtifactTimestamp("20261015T093012000Z".to_string());
        for kind in [
            ArtifactKind::Html,
            ArtifactKind::Epub,
            ArtifactKind::Pdf,
            ArtifactKind::PaperbackCover,
            ArtifactKind::CoverProof,
        ] {
            assert_eq!(ArtifactKind::classify(&kind.file_name(&ts)), Some(kind));
        }
    }

    #[test]
    fn test_classify_ignores_other_files() {
        assert_eq!(ArtifactKind::classify("manuscript.txt"), None);
        assert_eq!(ArtifactKind::classify("manuscript_notes.html"), None);
        assert_eq!(ArtifactKind::classify("cover.png"), None);
        assert_eq!(ArtifactKind::classify("manuscript_.pdf"), None);
    }
}
