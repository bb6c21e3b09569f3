//! Export manager for single-format exports.

use std::collections::HashMap;
use tokio::io::AsyncWrite;

use crate::error::{ExportError, Result};
use crate::traits::Exporter;
use crate::types::{Book, ExportOptions, ExportResult, FormatInfo};

/// Manager for export operations.
pub struct ExportManager {
    exporters: HashMap<String, Box<dyn Exporter>>,
}

impl ExportManager {
    /// Create new export manager.
    pub fn new() -> Self {
        Self {
            exporters: HashMap::new(),
        }
    }

    /// Register an exporter.
    pub fn register<E: Exporter + 'static>(&mut self, exporter: E) -> Result<()> {
        let format_info = exporter.format_info();
        let format_id = format_info.id.clone();

        if self.exporters.contains_key(&format_id) {
            return Err(ExportError::InvalidConfiguration {
                message: format!("Exporter for format '{}' already registered", format_id),
            });
        }

        self.exporters.insert(format_id, Box::new(exporter));
        Ok(())
    }

    /// Export a book to the specified format.
    pub async fn export(
        &self,
        format: &str,
        book: &Book,
        writer: Box<dyn AsyncWrite + Send + Unpin>,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let exporter =
            self.exporters
                .get(format)
                .ok_or_else(|| ExportError::UnsupportedFormat {
                    format: format.to_string(),
                })?;

        exporter.export(book, writer, options).await
    }

    /// Get format information.
    pub fn format_info(&self, format: &str) -> Option<FormatInfo> {
        self.exporters.get(format).map(|e| e.format_info())
    }

    /// List available formats.
    pub fn available_formats(&self) -> Vec<FormatInfo> {
        let mut formats: Vec<_> = self.exporters.values().map(|e| e.format_info()).collect();
        formats.sort_by(|a, b| a.id.cmp(&b.id));
        formats
    }

    /// Check if format is supported.
    pub fn supports_format(&self, format: &str) -> bool {
        self.exporters.contains_key(format)
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{EpubExporter, HtmlExporter};
    use quire_types::{BookMetadata, Chapter};

    fn sample_book() -> Book {
        Book::new(
            BookMetadata::new("Sample", "Writer"),
            vec![Chapter::new(
                1,
                "Opening",
                vec!["It began quietly.".to_string()],
            )],
        )
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut manager = ExportManager::new();
        manager.register(HtmlExporter::new()).unwrap();
        let err = manager.register(HtmlExporter::new()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_available_formats_sorted() {
        let mut manager = ExportManager::new();
        manager.register(HtmlExporter::new()).unwrap();
        manager.register(EpubExporter::new()).unwrap();

        let ids: Vec<_> = manager
            .available_formats()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec!["epub", "html"]);
        assert!(manager.supports_format("html"));
        assert!(!manager.supports_format("docx"));
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let manager = ExportManager::new();
        let err = manager
            .export(
                "docx",
                &sample_book(),
                Box::new(tokio::io::sink()),
                &ExportOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_export_html_writes_output() {
        let mut manager = ExportManager::new();
        manager.register(HtmlExporter::new()).unwrap();

        let result = manager
            .export(
                "html",
                &sample_book(),
                Box::new(tokio::io::sink()),
                &ExportOptions::new(),
            )
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.chapters_processed, 1);
        assert!(result.total_size > 0);
    }
}
