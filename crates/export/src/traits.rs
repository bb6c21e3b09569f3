//! Core trait for export functionality.

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::types::{Book, ExportOptions, ExportResult, FormatInfo};

/// Core trait for exporting a segmented book to a file format.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Get format information.
    fn format_info(&self) -> FormatInfo;

    /// Render the book and write it to `writer`.
    async fn export(
        &self,
        book: &Book,
        writer: Box<dyn AsyncWrite + Send + Unpin>,
        options: &ExportOptions,
    ) -> Result<ExportResult>;
}
