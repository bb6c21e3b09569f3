//! Filesystem-based storage backend implementation.

use async_trait::async_trait;
use quire_types::BookMetadata;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{ProjectStorageError, Result};
use crate::traits::ProjectStorage;
use crate::types::{
    ABOUT_AUTHOR_FILE, AUTHOR_FILE, ArtifactInfo, ArtifactKind, ArtifactTimestamp,
    BACK_PHOTO_FILES, BLURB_FILE, BUY_URL_FILE, COPYRIGHT_FILE, DEDICATION_FILE,
    DESCRIPTION_FILE, FRONT_COVER_FILES, INDEX_FILE, LANGUAGE_FILE, MANUSCRIPT_FILE,
    METADATA_DIR, POV_FILE, PUBLISHER_FILE, ProjectId, ProjectSummary, TITLE_FILE,
};

/// Default upper bound for manuscripts accepted by the pipeline (10 MiB).
pub const DEFAULT_MAX_MANUSCRIPT_BYTES: u64 = 10 * 1024 * 1024;

/// Filesystem-based storage backend.
///
/// Directory structure:
/// ```text
/// collection_root/
/// +-- index.html
/// +-- {project}/
///     +-- manuscript.txt
///     +-- cover.png | cover.jpg
///     +-- author_photo.png | author_photo.jpg
///     +-- metadata/
///     |   +-- _title.txt
///     |   +-- _author.txt
///     |   +-- ...
///     +-- manuscript_{timestamp}.html|.epub|.pdf
///     +-- paperback_cover_{timestamp}.pdf
/// ```
#[derive(Debug, Clone)]
pub struct FilesystemStorage {
    root_path: PathBuf,
    max_manuscript_bytes: u64,
}

impl FilesystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// # Arguments
    /// * `root_path` - Path to the collection root directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> Self {
        Self {
            root_path: root_path.as_ref().to_path_buf(),
            max_manuscript_bytes: DEFAULT_MAX_MANUSCRIPT_BYTES,
        }
    }

    /// Override the manuscript size limit.
    pub fn with_max_manuscript_bytes(mut self, max_bytes: u64) -> Self {
        self.max_manuscript_bytes = max_bytes;
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Initialize the collection root directory.
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root_path)
            .await
            .map_err(|e| ProjectStorageError::operation("Failed to create collection root", e))
    }

    fn get_index_path(&self) -> PathBuf {
        self.root_path.join(INDEX_FILE)
    }

    fn get_metadata_dir(&self, project: &ProjectId) -> PathBuf {
        self.project_dir(project).join(METADATA_DIR)
    }

    async fn require_project(&self, project: &ProjectId) -> Result<PathBuf> {
        let dir = self.project_dir(project);
        if !is_dir(&dir).await {
            return Err(ProjectStorageError::ProjectNotFound { path: dir });
        }
        Ok(dir)
    }

    async fn first_existing(&self, project: &ProjectId, candidates: &[&str]) -> Option<PathBuf> {
        let dir = self.project_dir(project);
        for name in candidates {
            let path = dir.join(name);
            if is_file(&path).await {
                return Some(path);
            }
        }
        None
    }
}

/// Read a single-value metadata file. Missing or whitespace-only files yield `None`.
///
/// Line endings are normalized to `\n` so paragraph breaks survive files
/// saved on Windows or classic Mac OS.
async fn read_metadata_value(dir: &Path, file: &str) -> Result<Option<String>> {
    let path = dir.join(file);
    match fs::read_to_string(&path).await {
        Ok(content) => {
            let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
            let trimmed = normalized.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProjectStorageError::operation(
            format!("Failed to read {}", path.display()),
            e,
        )),
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

#[async_trait]
impl ProjectStorage for FilesystemStorage {
    fn project_dir(&self, project: &ProjectId) -> PathBuf {
        self.root_path.join(project.as_str())
    }

    async fn exists_project(&self, project: &ProjectId) -> Result<bool> {
        Ok(is_dir(&self.project_dir(project)).await)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        if !is_dir(&self.root_path).await {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.root_path)
            .await
            .map_err(|e| ProjectStorageError::operation("Failed to read collection root", e))?;

        let mut projects = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if !entry.file_type().await.is_ok_and(|ft| ft.is_dir()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            let id = ProjectId::new(name);
            let dir = entry.path();
            projects.push(ProjectSummary {
                has_manuscript: is_file(&dir.join(MANUSCRIPT_FILE)).await,
                has_metadata: is_dir(&dir.join(METADATA_DIR)).await,
                artifacts: self.list_artifacts(&id).await?,
                id,
            });
        }

        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    async fn read_manuscript(&self, project: &ProjectId) -> Result<String> {
        let dir = self.require_project(project).await?;
        let path = dir.join(MANUSCRIPT_FILE);

        let metadata = fs::metadata(&path)
            .await
            .map_err(|_| ProjectStorageError::ManuscriptNotFound { path: path.clone() })?;
        if metadata.len() > self.max_manuscript_bytes {
            return Err(ProjectStorageError::ManuscriptTooLarge {
                size: metadata.len(),
                max_size: self.max_manuscript_bytes,
            });
        }

        let bytes = fs::read(&path)
            .await
            .map_err(|e| ProjectStorageError::operation("Failed to read manuscript", e))?;
        debug!("Read manuscript {} ({} bytes)", path.display(), bytes.len());

        String::from_utf8(bytes).map_err(|e| ProjectStorageError::InvalidManuscriptEncoding {
            path,
            source: Some(eyre::eyre!("UTF-8 error: {}", e)),
        })
    }

    async fn load_metadata(&self, project: &ProjectId) -> Result<BookMetadata> {
        self.require_project(project).await?;
        let dir = self.get_metadata_dir(project);
        if !is_dir(&dir).await {
            return Err(ProjectStorageError::MetadataDirectoryNotFound { path: dir });
        }

        let title = read_metadata_value(&dir, TITLE_FILE).await?.ok_or_else(|| {
            ProjectStorageError::MissingMetadata {
                field: "title".to_string(),
                path: dir.join(TITLE_FILE),
            }
        })?;
        let author = read_metadata_value(&dir, AUTHOR_FILE).await?.ok_or_else(|| {
            ProjectStorageError::MissingMetadata {
                field: "author".to_string(),
                path: dir.join(AUTHOR_FILE),
            }
        })?;

        let blurb = read_metadata_value(&dir, BLURB_FILE).await?;
        let description = read_metadata_value(&dir, DESCRIPTION_FILE)
            .await?
            .or_else(|| blurb.clone())
            .unwrap_or_default();

        Ok(BookMetadata {
            title,
            author,
            language: read_metadata_value(&dir, LANGUAGE_FILE)
                .await?
                .unwrap_or_else(|| "en".to_string()),
            publisher: read_metadata_value(&dir, PUBLISHER_FILE)
                .await?
                .unwrap_or_default(),
            description,
            buy_url: read_metadata_value(&dir, BUY_URL_FILE).await?,
            pov: read_metadata_value(&dir, POV_FILE).await?,
            copyright: read_metadata_value(&dir, COPYRIGHT_FILE).await?,
            dedication: read_metadata_value(&dir, DEDICATION_FILE).await?,
            about_author: read_metadata_value(&dir, ABOUT_AUTHOR_FILE).await?,
            blurb,
        })
    }

    async fn find_front_cover(&self, project: &ProjectId) -> Result<Option<PathBuf>> {
        Ok(self.first_existing(project, FRONT_COVER_FILES).await)
    }

    async fn find_back_photo(&self, project: &ProjectId) -> Result<Option<PathBuf>> {
        Ok(self.first_existing(project, BACK_PHOTO_FILES).await)
    }

    async fn read_asset(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProjectStorageError::AssetNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ProjectStorageError::operation(format!("Failed to read {}", path.display()), e)
            }
        })
    }

    async fn list_artifacts(&self, project: &ProjectId) -> Result<Vec<ArtifactInfo>> {
        let dir = self.project_dir(project);
        if !is_dir(&dir).await {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| ProjectStorageError::operation("Failed to read project directory", e))?;

        let mut artifacts = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if !entry.file_type().await.is_ok_and(|ft| ft.is_file()) {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if let Some(kind) = ArtifactKind::classify(&file_name) {
                artifacts.push(ArtifactInfo {
                    kind,
                    path: entry.path(),
                    file_name,
                });
            }
        }

        // Timestamps sort lexically, so the newest artifact of each kind is last.
        artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(artifacts)
    }

    async fn write_artifact(
        &self,
        project: &ProjectId,
        kind: ArtifactKind,
        timestamp: &ArtifactTimestamp,
        data: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.require_project(project).await?;
        let path = dir.join(kind.file_name(timestamp));

        fs::write(&path, data).await.map_err(|e| {
            ProjectStorageError::operation(format!("Failed to write {}", path.display()), e)
        })?;
        debug!("Wrote {} ({} bytes)", path.display(), data.len());

        Ok(path)
    }

    async fn remove_artifacts(
        &self,
        project: &ProjectId,
        kinds: &[ArtifactKind],
    ) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for artifact in self.list_artifacts(project).await? {
            if !kinds.contains(&artifact.kind) {
                continue;
            }
            fs::remove_file(&artifact.path).await.map_err(|e| {
                ProjectStorageError::operation(
                    format!("Failed to remove {}", artifact.path.display()),
                    e,
                )
            })?;
            removed.push(artifact.path);
        }
        Ok(removed)
    }

    async fn read_index(&self) -> Result<Option<String>> {
        let path = self.get_index_path();
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProjectStorageError::operation("Failed to read index file", e)),
        }
    }

    async fn write_index(&self, html: &str) -> Result<()> {
        self.initialize().await?;
        fs::write(self.get_index_path(), html)
            .await
            .map_err(|e| ProjectStorageError::operation("Failed to write index file", e))
    }
}
