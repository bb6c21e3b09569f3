//! Error types for export operations.

use thiserror::Error;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Error types for export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Format is not supported.
    #[error("Unsupported export format: '{format}'")]
    UnsupportedFormat { format: String },

    /// Project storage operation failed.
    #[error(transparent)]
    Storage(#[from] quire_storage::ProjectStorageError),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Page count outside what the print vendor can bind.
    #[error(
        "Page count {page_count} is outside the printable range {min}-{max}. \
         Add or remove manuscript text so the interior fits"
    )]
    PageCountOutOfRange { page_count: u32, min: u32, max: u32 },

    /// Paper and ink combination the print vendor does not offer.
    #[error("{paper} paper cannot be printed with {ink} ink. Use white paper for color interiors")]
    UnsupportedPaperInk { paper: String, ink: String },

    /// No front cover image was found.
    #[error(
        "No front cover image for project '{project}'. Add cover.png or cover.jpg to {}, \
         pass --cover <path>, or enable publish.generate_cover",
        dir.display()
    )]
    MissingFrontCover {
        project: String,
        dir: std::path::PathBuf,
    },

    /// The manuscript has no text to publish.
    #[error("Manuscript for project '{project}' is empty. Add text to manuscript.txt and publish again")]
    EmptyManuscript { project: String },

    /// Image decoding or encoding failed.
    #[error("Image error: {message}")]
    Image { message: String },

    /// Format-specific error.
    #[error("Format error: {message}")]
    FormatError { message: String },

    /// Other error.
    #[error("Export error: {message}")]
    Other { message: String },
}

impl From<eyre::Report> for ExportError {
    fn from(error: eyre::Report) -> Self {
        ExportError::FormatError {
            message: error.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(error: zip::result::ZipError) -> Self {
        ExportError::FormatError {
            message: format!("EPUB archive error: {}", error),
        }
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(error: lopdf::Error) -> Self {
        ExportError::FormatError {
            message: format!("PDF error: {}", error),
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(error: image::ImageError) -> Self {
        ExportError::Image {
            message: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ExportError {
    fn from(error: tokio::task::JoinError) -> Self {
        ExportError::Other {
            message: format!("Rendering task failed: {}", error),
        }
    }
}
