//! PDF export format implementation.

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::traits::Exporter;
use crate::typeset::PdfTypesetter;
use crate::types::{Book, ExportOptions, ExportResult, FormatInfo};

/// PDF format exporter producing the print interior.
pub struct PdfExporter {
    typesetter: PdfTypesetter,
}

impl PdfExporter {
    /// Create new PDF exporter with the 6×9 trade layout.
    pub fn new() -> Self {
        Self {
            typesetter: PdfTypesetter::new(),
        }
    }

    /// Create exporter with a custom typesetter.
    pub fn with_typesetter(typesetter: PdfTypesetter) -> Self {
        Self { typesetter }
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exporter for PdfExporter {
    fn format_info(&self) -> FormatInfo {
        FormatInfo::new("pdf".to_string(), "PDF Document".to_string())
            .with_mime_type("application/pdf".to_string())
    }

    async fn export(
        &self,
        book: &Book,
        mut writer: Box<dyn AsyncWrite + Send + Unpin>,
        _options: &ExportOptions,
    ) -> Result<ExportResult> {
        let start_time = Utc::now();

        let pdf = self.typesetter.typeset(&book.chapters, &book.metadata)?;

        writer.write_all(&pdf.bytes).await?;
        writer.flush().await?;

        let duration = Utc::now().signed_duration_since(start_time);
        Ok(ExportResult::success(
            book.chapters.len() as u32,
            pdf.bytes.len() as u64,
            duration,
        )
        .with_page_count(pdf.page_count))
    }
}
