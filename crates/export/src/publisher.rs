//! End-to-end publishing of a project into its artifacts and index entry.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use quire_storage::{ArtifactKind, ArtifactTimestamp, ProjectId, ProjectStorage};
use quire_types::{BookMetadata, CoverDimensions, InkType, PageCount, PaperType, PrintSpec};
use tracing::{debug, info};

use crate::cover::{
    CoverOptions, compute_dimensions_with_spec, encode_png, generate_cover_art, render_cover,
};
use crate::error::{ExportError, Result};
use crate::formats::{HtmlOptions, build_epub, render_html};
use crate::index::{IndexEntry, IndexLink, remove_entry, upsert_entry};
use crate::typeset::PdfTypesetter;
use crate::types::Book;

/// Settings for one publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub paper: PaperType,
    pub ink: InkType,
    /// Publish only the first N chapters as the web edition.
    pub html_chapter_limit: Option<usize>,
    /// Generate abstract art when the project has no front cover.
    pub generate_cover: bool,
    /// Front cover image overriding the project's own.
    pub front_cover: Option<PathBuf>,
    /// Author photo overriding the project's own.
    pub back_photo: Option<PathBuf>,
    pub back_color: [u8; 3],
    pub spine_color: [u8; 3],
    pub print_spec: PrintSpec,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            paper: PaperType::White,
            ink: InkType::Bw,
            html_chapter_limit: None,
            generate_cover: false,
            front_cover: None,
            back_photo: None,
            back_color: CoverOptions::DEFAULT_BACK_COLOR,
            spine_color: CoverOptions::DEFAULT_SPINE_COLOR,
            print_spec: PrintSpec::PAPERBACK_6X9,
        }
    }
}

/// Outcome of a publish run.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub project: ProjectId,
    pub chapter_count: usize,
    pub page_count: PageCount,
    pub dimensions: CoverDimensions,
    /// Artifacts written, in html/epub/pdf/cover order.
    pub written: Vec<PathBuf>,
    /// Stale artifacts deleted before writing.
    pub removed: Vec<PathBuf>,
    pub spine_lettered: bool,
    pub elapsed: Duration,
}

/// Outcome of rendering a cover proof.
#[derive(Debug, Clone)]
pub struct CoverProofReport {
    pub path: PathBuf,
    pub dimensions: CoverDimensions,
    pub spine_lettered: bool,
}

/// Everything read from storage before rendering starts.
struct PublishInputs {
    book: Arc<Book>,
    front_cover: Vec<u8>,
    back_photo: Option<Vec<u8>>,
}

/// Runs the publishing pipeline against a project store.
pub struct Publisher {
    storage: Arc<dyn ProjectStorage>,
}

impl Publisher {
    pub fn new(storage: Arc<dyn ProjectStorage>) -> Self {
        Self { storage }
    }

    /// Publish `project`: render every artifact, replace the previous ones
    /// and update the book index.
    ///
    /// Inputs are validated and all rendering finishes before anything on
    /// disk is deleted or written, so a failed run leaves the previous
    /// publication intact.
    pub async fn publish(
        &self,
        project: &ProjectId,
        options: &PublishOptions,
    ) -> Result<PublishReport> {
        let start_time = Utc::now();
        info!("Publishing project '{}'", project);

        let inputs = self.load_inputs(project, options).await?;
        let book = inputs.book.clone();
        info!(
            "Segmented manuscript into {} chapters",
            book.chapters.len()
        );

        // html and epub do not depend on the page count; run them alongside the typesetter
        let html_task = {
            let book = book.clone();
            let html_options = HtmlOptions {
                chapter_limit: options.html_chapter_limit,
                author: Some(book.metadata.author.clone()),
                language: Some(book.metadata.language_or_default().to_string()),
            };
            tokio::task::spawn_blocking(move || {
                render_html(&book.metadata.title, &book.chapters, &html_options)
            })
        };
        let epub_task = {
            let book = book.clone();
            tokio::task::spawn_blocking(move || build_epub(&book.chapters, &book.metadata))
        };
        let pdf_task = {
            let book = book.clone();
            tokio::task::spawn_blocking(move || {
                PdfTypesetter::new().typeset(&book.chapters, &book.metadata)
            })
        };

        let (html, epub, pdf) = tokio::try_join!(html_task, epub_task, pdf_task)?;
        let epub = epub?;
        let pdf = pdf?;
        info!("Typeset interior: {} pages", pdf.page_count);

        let dimensions =
            compute_dimensions_with_spec(pdf.page_count, options.paper, options.ink, &options.print_spec)?;
        debug!(
            "Cover {:.4} x {:.4} in, spine {:.4} in",
            dimensions.full_cover_width_in, dimensions.full_cover_height_in, dimensions.spine_width_in
        );

        let cover_options = self.cover_options(&book.metadata, &inputs, options, false);
        let front_cover = inputs.front_cover;
        let cover = tokio::task::spawn_blocking(move || {
            render_cover(&dimensions, &front_cover, &cover_options)
        })
        .await??;

        let removed = self
            .storage
            .remove_artifacts(project, &ArtifactKind::PUBLISHED)
            .await?;
        for path in &removed {
            info!("Removed stale artifact {}", path.display());
        }

        let timestamp = ArtifactTimestamp::now();
        let outputs: [(ArtifactKind, &[u8]); 4] = [
            (ArtifactKind::Html, html.as_bytes()),
            (ArtifactKind::Epub, &epub),
            (ArtifactKind::Pdf, &pdf.bytes),
            (ArtifactKind::PaperbackCover, &cover.bytes),
        ];
        let mut written = Vec::with_capacity(outputs.len());
        for (kind, data) in outputs {
            let path = self
                .storage
                .write_artifact(project, kind, &timestamp, data)
                .await?;
            debug!("Wrote {} ({} bytes)", path.display(), data.len());
            written.push(path);
        }

        let entry = index_entry(project, &book.metadata, &timestamp);
        let index = self.storage.read_index().await?.unwrap_or_default();
        self.storage
            .write_index(&upsert_entry(&index, project.as_str(), &entry.render()))
            .await?;
        info!("Updated book index entry for '{}'", project);

        Ok(PublishReport {
            project: project.clone(),
            chapter_count: book.chapters.len(),
            page_count: pdf.page_count,
            dimensions,
            written,
            removed,
            spine_lettered: cover.spine_lettered,
            elapsed: Utc::now().signed_duration_since(start_time),
        })
    }

    /// Remove `project` from the book index. Artifacts are left on disk.
    ///
    /// Returns whether an entry was removed.
    pub async fn unpublish(&self, project: &ProjectId) -> Result<bool> {
        let Some(index) = self.storage.read_index().await? else {
            info!("No book index yet; nothing to unpublish");
            return Ok(false);
        };

        let updated = remove_entry(&index, project.as_str());
        if updated == index {
            info!("Project '{}' is not in the book index", project);
            return Ok(false);
        }

        self.storage.write_index(&updated).await?;
        info!("Removed '{}' from the book index", project);
        Ok(true)
    }

    /// Render the wrap cover with guides for a known page count, as a
    /// separate proof file outside the published set.
    pub async fn cover_proof(
        &self,
        project: &ProjectId,
        page_count: Option<PageCount>,
        options: &PublishOptions,
    ) -> Result<CoverProofReport> {
        let inputs = self.load_inputs(project, options).await?;

        let page_count = match page_count {
            Some(pages) => pages,
            None => {
                let book = inputs.book.clone();
                tokio::task::spawn_blocking(move || {
                    PdfTypesetter::new().typeset(&book.chapters, &book.metadata)
                })
                .await??
                .page_count
            }
        };

        let dimensions =
            compute_dimensions_with_spec(page_count, options.paper, options.ink, &options.print_spec)?;
        let cover_options = self.cover_options(&inputs.book.metadata, &inputs, options, true);
        let front_cover = inputs.front_cover;
        let cover = tokio::task::spawn_blocking(move || {
            render_cover(&dimensions, &front_cover, &cover_options)
        })
        .await??;

        let path = self
            .storage
            .write_artifact(
                project,
                ArtifactKind::CoverProof,
                &ArtifactTimestamp::now(),
                &cover.bytes,
            )
            .await?;
        info!("Wrote cover proof {}", path.display());

        Ok(CoverProofReport {
            path,
            dimensions,
            spine_lettered: cover.spine_lettered,
        })
    }

    /// Read metadata, manuscript and images, failing before any rendering.
    async fn load_inputs(
        &self,
        project: &ProjectId,
        options: &PublishOptions,
    ) -> Result<PublishInputs> {
        let metadata = self.storage.load_metadata(project).await?;
        let manuscript = self.storage.read_manuscript(project).await?;
        if manuscript.trim().is_empty() {
            return Err(ExportError::EmptyManuscript {
                project: project.to_string(),
            });
        }

        let front_cover = match &options.front_cover {
            Some(path) => self.storage.read_asset(path).await?,
            None => match self.storage.find_front_cover(project).await? {
                Some(path) => self.storage.read_asset(&path).await?,
                None if options.generate_cover => {
                    info!("No front cover found; generating abstract cover art");
                    let spec = &options.print_spec;
                    let art = generate_cover_art(
                        &metadata.title,
                        spec.to_px(spec.trim_width_in + spec.bleed_in),
                        spec.to_px(spec.trim_height_in + 2.0 * spec.bleed_in),
                    );
                    encode_png(&art)?
                }
                None => {
                    return Err(ExportError::MissingFrontCover {
                        project: project.to_string(),
                        dir: self.storage.project_dir(project),
                    });
                }
            },
        };

        let back_photo = match &options.back_photo {
            Some(path) => Some(self.storage.read_asset(path).await?),
            None => match self.storage.find_back_photo(project).await? {
                Some(path) => Some(self.storage.read_asset(&path).await?),
                None => None,
            },
        };

        let book = tokio::task::spawn_blocking(move || Book::from_manuscript(metadata, &manuscript))
            .await?;

        Ok(PublishInputs {
            book: Arc::new(book),
            front_cover,
            back_photo,
        })
    }

    fn cover_options(
        &self,
        metadata: &BookMetadata,
        inputs: &PublishInputs,
        options: &PublishOptions,
        guides: bool,
    ) -> CoverOptions {
        let mut cover = CoverOptions::for_book(metadata)
            .with_colors(options.back_color, options.spine_color)
            .with_guides(guides);
        if let Some(photo) = &inputs.back_photo {
            cover = cover.with_author_photo(photo.clone());
        }
        cover
    }
}

/// The index card for a freshly published project.
fn index_entry(
    project: &ProjectId,
    metadata: &BookMetadata,
    timestamp: &ArtifactTimestamp,
) -> IndexEntry {
    IndexEntry {
        title: metadata.title.clone(),
        author: metadata.author.clone(),
        pov: metadata.pov.clone(),
        description: metadata.summary().map(str::to_string),
        links: ArtifactKind::PUBLISHED
            .iter()
            .map(|kind| IndexLink::artifact(kind.label(), project.as_str(), &kind.file_name(timestamp)))
            .collect(),
        buy_url: metadata.buy_url.clone(),
    }
}
