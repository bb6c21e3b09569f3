//! Export format implementations.

pub mod epub;
pub mod html;
pub mod pdf;

// Re-export exporters
pub use epub::{EpubExporter, build_epub};
pub use html::{HtmlExporter, HtmlOptions, render_html};
pub use pdf::PdfExporter;
