use eyre::Result;
use quire_export::{Book, ExportOptions, default_export_manager};
use quire_storage::{ProjectId, ProjectStorage};
use std::path::PathBuf;

/// Export one project to a single format, outside the publish set.
pub async fn handle_export_command(
    project: String,
    format: String,
    output: Option<PathBuf>,
    sample: Option<usize>,
    storage: &dyn ProjectStorage,
    dry_run: bool,
) -> Result<()> {
    let export_manager = default_export_manager()?;
    let format = format.to_lowercase();

    let Some(format_info) = export_manager.format_info(&format) else {
        println!("❌ Unsupported format: {}", format);
        let available: Vec<_> = export_manager
            .available_formats()
            .into_iter()
            .map(|info| info.id)
            .collect();
        println!("💡 Available formats: {}", available.join(", "));
        return Err(eyre::eyre!("Unsupported export format: {}", format));
    };

    let id = ProjectId::new(project);
    let metadata = storage.load_metadata(&id).await?;
    let manuscript = storage.read_manuscript(&id).await?;
    if manuscript.trim().is_empty() {
        println!("❌ Manuscript for {} is empty", id);
        return Err(eyre::eyre!("Nothing to export: manuscript.txt for '{}' is empty", id));
    }
    let book = Book::from_manuscript(metadata, &manuscript);

    let output_path = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}.{}", sanitize_filename(&book.metadata.title), format))
    });

    println!("📚 Exporting: {}", book.metadata.title);
    println!("  Author: {}", book.metadata.author);
    println!("  Chapters: {}", book.chapters.len());
    println!("  Output: {}", output_path.display());

    if dry_run {
        println!("Would export to {}: {}", format_info.name, output_path.display());
        return Ok(());
    }

    let mut export_options = ExportOptions::new();
    if let Some(limit) = sample {
        if format != "html" {
            println!("  💡 --sample only applies to html; exporting all chapters");
        }
        export_options = export_options.with_chapter_limit(limit);
    }

    println!("📖 Starting {} export...", format_info.name);
    let file = tokio::fs::File::create(&output_path).await?;
    let writer = Box::new(file);

    match export_manager
        .export(&format, &book, writer, &export_options)
        .await
    {
        Ok(result) => {
            println!("✅ Successfully exported to: {}", output_path.display());
            println!("  📄 Chapters processed: {}", result.chapters_processed);
            if let Some(pages) = result.page_count {
                println!("  📄 Pages: {}", pages);
            }
            println!("  📁 File size: {} bytes", result.total_size);
            println!("  ⏱️  Export time: {:?}", result.export_duration);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Export failed: {}", e);
            Err(e.into())
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '_',
            c => c,
        })
        .collect()
}
