//! Core types for export operations.

use chrono::Duration;
use quire_types::{BookMetadata, Chapter, PageCount};

/// A segmented manuscript together with its metadata.
///
/// Built once per run; every exporter borrows the same chapter list so ids
/// never drift between formats.
#[derive(Debug, Clone)]
pub struct Book {
    pub metadata: BookMetadata,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn new(metadata: BookMetadata, chapters: Vec<Chapter>) -> Self {
        Self { metadata, chapters }
    }

    /// Segment `text` and pair the chapters with `metadata`.
    pub fn from_manuscript(metadata: BookMetadata, text: &str) -> Self {
        Self::new(metadata, crate::segment::segment(text))
    }
}

/// Information about an export format.
#[derive(Debug, Clone)]
pub struct FormatInfo {
    /// Unique identifier (e.g., "epub").
    pub id: String,
    /// Human-readable name (e.g., "EPUB E-book").
    pub name: String,
    /// MIME type for HTTP responses.
    pub mime_type: Option<String>,
}

impl FormatInfo {
    /// Create new format info.
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            mime_type: None,
        }
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: String) -> Self {
        self.mime_type = Some(mime_type);
        self
    }
}

/// Export configuration options.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Render only the first N chapters (a sample). Only the HTML exporter honours it.
    pub chapter_limit: Option<usize>,
}

impl ExportOptions {
    /// Create new options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the rendered chapters.
    pub fn with_chapter_limit(mut self, limit: usize) -> Self {
        self.chapter_limit = Some(limit);
        self
    }
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Whether export succeeded.
    pub success: bool,
    /// Number of chapters rendered.
    pub chapters_processed: u32,
    /// Total output size in bytes.
    pub total_size: u64,
    /// Realized page count, for paginated formats.
    pub page_count: Option<PageCount>,
    /// Time taken.
    pub export_duration: Duration,
}

impl ExportResult {
    /// Create successful result.
    pub fn success(chapters_processed: u32, total_size: u64, duration: Duration) -> Self {
        Self {
            success: true,
            chapters_processed,
            total_size,
            page_count: None,
            export_duration: duration,
        }
    }

    /// Attach the realized page count.
    pub fn with_page_count(mut self, page_count: PageCount) -> Self {
        self.page_count = Some(page_count);
        self
    }
}
