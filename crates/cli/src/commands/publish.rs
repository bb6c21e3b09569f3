use eyre::Result;
use quire_export::{Book, PublishOptions, Publisher};
use quire_storage::{ArtifactKind, ProjectId, ProjectStorage};
use quire_types::PageCount;
use std::sync::Arc;

/// Publish a project, or describe what publishing would do.
pub async fn handle_publish_command(
    project: String,
    options: PublishOptions,
    storage: Arc<dyn ProjectStorage>,
    dry_run: bool,
) -> Result<()> {
    let id = ProjectId::new(project);

    if dry_run {
        return describe_publish(&id, &options, storage.as_ref()).await;
    }

    println!("📚 Publishing {}", id);
    let publisher = Publisher::new(storage);
    match publisher.publish(&id, &options).await {
        Ok(report) => {
            println!("✅ Published {} chapters", report.chapter_count);
            println!("  📄 Interior: {} pages", report.page_count);
            println!(
                "  📐 Cover: {:.3} x {:.3} in (spine {:.3} in)",
                report.dimensions.full_cover_width_in,
                report.dimensions.full_cover_height_in,
                report.dimensions.spine_width_in
            );
            if !report.spine_lettered {
                println!("  💡 Spine left blank: too thin for lettering");
            }
            for path in &report.removed {
                println!("  🗑️  {}", path.display());
            }
            for path in &report.written {
                println!("  📁 {}", path.display());
            }
            println!(
                "  ⏱️  Publish time: {:.2}s",
                report.elapsed.num_milliseconds() as f64 / 1000.0
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Publish failed: {}", e);
            Err(e.into())
        }
    }
}

async fn describe_publish(
    id: &ProjectId,
    options: &PublishOptions,
    storage: &dyn ProjectStorage,
) -> Result<()> {
    let metadata = storage.load_metadata(id).await?;
    let manuscript = storage.read_manuscript(id).await?;
    let book = Book::from_manuscript(metadata, &manuscript);

    println!("Would publish: {} by {}", book.metadata.title, book.metadata.author);
    println!("  Chapters: {}", book.chapters.len());
    if let Some(limit) = options.html_chapter_limit {
        println!("  Web edition: first {} chapters", limit.min(book.chapters.len()));
    }
    println!("  Print: {} paper, {} ink", options.paper, options.ink);

    let cover = match &options.front_cover {
        Some(path) => Some(path.clone()),
        None => storage.find_front_cover(id).await?,
    };
    match cover {
        Some(path) => println!("  Front cover: {}", path.display()),
        None if options.generate_cover => println!("  Front cover: generated"),
        None => println!("  ❌ No front cover found; publishing would fail"),
    }

    let stale = storage.list_artifacts(id).await?;
    let stale: Vec<_> = stale
        .iter()
        .filter(|artifact| ArtifactKind::PUBLISHED.contains(&artifact.kind))
        .collect();
    if !stale.is_empty() {
        println!("  Would replace {} existing artifacts", stale.len());
    }
    Ok(())
}

pub async fn handle_unpublish_command(
    project: String,
    storage: Arc<dyn ProjectStorage>,
    dry_run: bool,
) -> Result<()> {
    let id = ProjectId::new(project);

    if dry_run {
        println!("Would remove {} from the book index", id);
        return Ok(());
    }

    let publisher = Publisher::new(storage);
    if publisher.unpublish(&id).await? {
        println!("✅ Removed {} from the book index", id);
        println!("  💡 Published files were kept in the project directory");
    } else {
        println!("📚 {} is not in the book index", id);
    }
    Ok(())
}

pub async fn handle_cover_proof_command(
    project: String,
    pages: Option<u32>,
    options: PublishOptions,
    storage: Arc<dyn ProjectStorage>,
    dry_run: bool,
) -> Result<()> {
    let id = ProjectId::new(project);

    if dry_run {
        match pages {
            Some(pages) => println!("Would render a cover proof for {} at {} pages", id, pages),
            None => println!("Would typeset {} and render a cover proof", id),
        }
        return Ok(());
    }

    let publisher = Publisher::new(storage);
    let report = publisher
        .cover_proof(&id, pages.map(PageCount::new), &options)
        .await?;

    println!("✅ Cover proof written to: {}", report.path.display());
    println!(
        "  📐 {:.3} x {:.3} in (spine {:.3} in)",
        report.dimensions.full_cover_width_in,
        report.dimensions.full_cover_height_in,
        report.dimensions.spine_width_in
    );
    if !report.spine_lettered {
        println!("  💡 Spine left blank: too thin for lettering");
    }
    Ok(())
}
