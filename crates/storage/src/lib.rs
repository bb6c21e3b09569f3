//! Project storage interface and implementations for quire.
//!
//! A *collection* is a directory holding one sub-directory per book project
//! plus the shared `index.html`. This crate knows where manuscripts, metadata
//! files, cover images and generated artifacts live inside it; it knows
//! nothing about how artifacts are rendered.

pub mod backends;
pub mod error;
pub mod traits;
pub mod types;

// Re-export the main interface and types for easy access
pub use backends::FilesystemStorage;
pub use error::{ProjectStorageError, Result};
pub use traits::ProjectStorage;
pub use types::{ArtifactInfo, ArtifactKind, ArtifactTimestamp, ProjectId, ProjectSummary};
