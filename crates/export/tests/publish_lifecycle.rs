//! Publishing writes the artifacts and an index entry; unpublishing removes
//! only the entry.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use quire_export::cover::{encode_png, generate_cover_art};
use quire_export::index::INDEX_TEMPLATE;
use quire_export::{ExportError, PublishOptions, Publisher};
use quire_storage::{FilesystemStorage, ProjectId, ProjectStorage};
use quire_types::PrintSpec;
use tempfile::TempDir;

/// Long enough that the interior clears the minimum printable page count.
fn manuscript() -> String {
    let paragraph = "The tide came in over the flats and the birds lifted away. ".repeat(7);
    ["Arrival", "Departure", "Return"]
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let body = vec![paragraph.trim(); 50].join("\n\n");
            format!("Chapter {}: {}\n\n{}\n", i + 1, title, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn create_project(root: &Path, name: &str, with_cover: bool) -> ProjectId {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("metadata")).unwrap();
    fs::write(dir.join("metadata/_title.txt"), "Crossings\n").unwrap();
    fs::write(dir.join("metadata/_author.txt"), "A. Writer\n").unwrap();
    fs::write(
        dir.join("metadata/_back_cover_blurb.txt"),
        "Three journeys across the same stretch of water.",
    )
    .unwrap();
    fs::write(dir.join("manuscript.txt"), manuscript()).unwrap();
    if with_cover {
        let cover = encode_png(&generate_cover_art("Crossings", 30, 45)).unwrap();
        fs::write(dir.join("cover.png"), cover).unwrap();
    }
    ProjectId::new(name)
}

/// Full geometry at low resolution so the cover raster stays small.
fn options() -> PublishOptions {
    PublishOptions {
        print_spec: PrintSpec {
            dpi: 30,
            ..PrintSpec::PAPERBACK_6X9
        },
        ..PublishOptions::default()
    }
}

fn setup(with_cover: bool) -> (TempDir, Arc<FilesystemStorage>, ProjectId) {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FilesystemStorage::new(temp_dir.path()));
    let project = create_project(temp_dir.path(), "crossings", with_cover);
    (temp_dir, storage, project)
}

#[tokio::test]
async fn test_publish_then_unpublish_restores_index() {
    let (_temp_dir, storage, project) = setup(true);
    storage.write_index(INDEX_TEMPLATE).await.unwrap();
    let before = storage.read_index().await.unwrap().unwrap();

    let publisher = Publisher::new(storage.clone());
    let report = publisher.publish(&project, &options()).await.unwrap();

    assert_eq!(report.chapter_count, 3);
    assert!(report.page_count.get() >= 24);
    assert_eq!(report.written.len(), 4);
    assert!(report.removed.is_empty());
    assert!(report.written.iter().all(|p| p.exists()));

    let published = storage.read_index().await.unwrap().unwrap();
    assert!(published.contains("<!-- BOOK_START:crossings -->"));
    for path in &report.written {
        let file_name = path.file_name().unwrap().to_string_lossy();
        assert!(published.contains(&format!("crossings/{}", file_name)));
    }

    assert!(publisher.unpublish(&project).await.unwrap());
    let after = storage.read_index().await.unwrap().unwrap();
    assert_eq!(after, before);
    assert!(report.written.iter().all(|p| p.exists()));

    assert!(!publisher.unpublish(&project).await.unwrap());
}

#[tokio::test]
async fn test_republish_replaces_stale_artifacts() {
    let (_temp_dir, storage, project) = setup(true);
    let publisher = Publisher::new(storage.clone());

    let first = publisher.publish(&project, &options()).await.unwrap();
    let second = publisher.publish(&project, &options()).await.unwrap();

    assert_eq!(second.removed.len(), 4);
    let artifacts = storage.list_artifacts(&project).await.unwrap();
    assert_eq!(artifacts.len(), 4);
    assert!(second.written.iter().all(|p| p.exists()));
    if first.written != second.written {
        assert!(first.written.iter().all(|p| !p.exists()));
    }

    let index = storage.read_index().await.unwrap().unwrap();
    assert_eq!(index.matches("<!-- BOOK_START:crossings -->").count(), 1);
}

#[tokio::test]
async fn test_missing_cover_fails_before_writing() {
    let (_temp_dir, storage, project) = setup(false);
    let publisher = Publisher::new(storage.clone());

    let err = publisher.publish(&project, &options()).await.unwrap_err();
    assert!(matches!(err, ExportError::MissingFrontCover { .. }));
    assert!(storage.list_artifacts(&project).await.unwrap().is_empty());
    assert!(storage.read_index().await.unwrap().is_none());
}

#[tokio::test]
async fn test_generated_cover_when_enabled() {
    let (_temp_dir, storage, project) = setup(false);
    let publisher = Publisher::new(storage.clone());

    let options = PublishOptions {
        generate_cover: true,
        ..options()
    };
    let report = publisher.publish(&project, &options).await.unwrap();
    assert_eq!(report.written.len(), 4);
}

#[tokio::test]
async fn test_short_manuscript_is_rejected_before_writing() {
    let (temp_dir, storage, project) = setup(true);
    fs::write(
        temp_dir.path().join("crossings/manuscript.txt"),
        "Chapter 1: Brief\nOnly a few lines here, far too short for a printed book.\n",
    )
    .unwrap();

    let publisher = Publisher::new(storage.clone());
    let err = publisher.publish(&project, &options()).await.unwrap_err();
    assert!(matches!(err, ExportError::PageCountOutOfRange { .. }));
    assert!(storage.list_artifacts(&project).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_manuscript_is_rejected_before_writing() {
    let (temp_dir, storage, project) = setup(true);
    storage.write_index(INDEX_TEMPLATE).await.unwrap();
    fs::write(temp_dir.path().join("crossings/manuscript.txt"), " \n\r\n\t\n").unwrap();

    let publisher = Publisher::new(storage.clone());
    let err = publisher.publish(&project, &options()).await.unwrap_err();
    assert!(matches!(err, ExportError::EmptyManuscript { .. }));
    assert!(err.to_string().contains("manuscript.txt"));
    assert!(storage.list_artifacts(&project).await.unwrap().is_empty());
    assert_eq!(storage.read_index().await.unwrap().unwrap(), INDEX_TEMPLATE);
}

#[tokio::test]
async fn test_cover_proof_is_not_a_published_artifact() {
    let (_temp_dir, storage, project) = setup(true);
    let publisher = Publisher::new(storage.clone());

    let proof = publisher
        .cover_proof(&project, Some(quire_types::PageCount::new(150)), &options())
        .await
        .unwrap();
    assert!(proof.path.exists());
    assert!(proof.spine_lettered);
    assert!(
        proof
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("paperback_cover_proof_")
    );
    assert!(storage.read_index().await.unwrap().is_none());
}
