//! Quire Export - turns a plain-text manuscript into its published artifacts
//!
//! This crate segments manuscripts into chapters and renders them as a
//! standalone web page, an EPUB package, a typeset print interior and a
//! paperback wrap-around cover, then records the result in the collection's
//! book index.

pub mod error;
pub mod manager;
pub mod traits;
pub mod types;

pub mod cover;
pub mod formats;
pub mod index;
pub mod markup;
pub mod publisher;
pub mod segment;
pub mod typeset;

// Re-export main types
pub use error::{ExportError, Result};
pub use manager::ExportManager;
pub use traits::Exporter;
pub use types::{Book, ExportOptions, ExportResult, FormatInfo};

// Re-export exporters
pub use formats::{EpubExporter, HtmlExporter, PdfExporter};

// Re-export the pipeline stages
pub use cover::{CoverOptions, RenderedCover, compute_dimensions, render_cover};
pub use formats::{build_epub, render_html};
pub use index::{remove_entry, upsert_entry};
pub use publisher::{CoverProofReport, PublishOptions, PublishReport, Publisher};
pub use segment::{Segmentation, segment, segment_with_report};
pub use typeset::{PdfTypesetter, TypesetPdf};

// Re-export storage types we work with
pub use quire_storage::{ProjectId, ProjectStorage};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Create an export manager with all exporters registered
pub fn default_export_manager() -> Result<ExportManager> {
    let mut manager = ExportManager::new();
    manager.register(HtmlExporter::new())?;
    manager.register(EpubExporter::new())?;
    manager.register(PdfExporter::new())?;
    Ok(manager)
}
