//! Trait definitions for the project storage system.

use async_trait::async_trait;
use quire_types::BookMetadata;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{ArtifactInfo, ArtifactKind, ArtifactTimestamp, ProjectId, ProjectSummary};

/// Main trait for project storage operations.
///
/// Metadata is read fresh on every call; implementations must not cache it,
/// so edits between publish runs are always picked up.
#[async_trait]
pub trait ProjectStorage: Send + Sync {
    // === Project Operations ===

    /// Directory holding the given project's files.
    fn project_dir(&self, project: &ProjectId) -> PathBuf;

    /// Check if a project directory exists.
    async fn exists_project(&self, project: &ProjectId) -> Result<bool>;

    /// List all projects in the collection.
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    // === Inputs ===

    /// Read the project's manuscript as UTF-8 text.
    async fn read_manuscript(&self, project: &ProjectId) -> Result<String>;

    /// Load the project's metadata files.
    ///
    /// # Errors
    /// Fails when the metadata directory is absent or the title/author files
    /// are missing or empty.
    async fn load_metadata(&self, project: &ProjectId) -> Result<BookMetadata>;

    /// Locate the front cover image, if the project has one.
    async fn find_front_cover(&self, project: &ProjectId) -> Result<Option<PathBuf>>;

    /// Locate the back-cover author photo, if the project has one.
    async fn find_back_photo(&self, project: &ProjectId) -> Result<Option<PathBuf>>;

    /// Read any binary asset (cover image, photo) by path.
    async fn read_asset(&self, path: &Path) -> Result<Vec<u8>>;

    // === Artifacts ===

    /// List generated artifacts in the project directory.
    async fn list_artifacts(&self, project: &ProjectId) -> Result<Vec<ArtifactInfo>>;

    /// Write one artifact and return its path.
    async fn write_artifact(
        &self,
        project: &ProjectId,
        kind: ArtifactKind,
        timestamp: &ArtifactTimestamp,
        data: &[u8],
    ) -> Result<PathBuf>;

    /// Delete previously generated artifacts of the given kinds.
    ///
    /// # Returns
    /// The paths that were removed
    async fn remove_artifacts(
        &self,
        project: &ProjectId,
        kinds: &[ArtifactKind],
    ) -> Result<Vec<PathBuf>>;

    // === Collection Index ===

    /// Read the collection's `index.html`, `None` if it does not exist yet.
    async fn read_index(&self) -> Result<Option<String>>;

    /// Replace the collection's `index.html`.
    async fn write_index(&self, html: &str) -> Result<()>;
}
