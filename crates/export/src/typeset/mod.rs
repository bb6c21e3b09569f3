//! Manual PDF typesetting on top of `lopdf`.
//!
//! There is no layout engine here: text is measured with the standard font
//! metrics, wrapped greedily and paginated with a running cursor.

pub mod document;
pub mod layout;
pub mod metrics;
pub mod wrap;

pub use document::PdfBuilder;
pub use layout::{PageGeometry, PdfTypesetter, TypesetPdf, Typography};
pub use metrics::StandardFont;
pub use wrap::{WRAP_RATIO, wrap_text, wrap_words};
