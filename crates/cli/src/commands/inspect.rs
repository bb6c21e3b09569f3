use eyre::{Context, Result};
use quire_export::cover::{SPINE_LETTERING_MIN_PAGES, compute_dimensions};
use quire_export::segment_with_report;
use quire_types::{InkType, PageCount, PaperType, Region};
use std::path::PathBuf;

/// Print how a manuscript file splits into chapters.
pub async fn handle_chapters_command(file: PathBuf, preview: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(&file)
        .await
        .wrap_err_with(|| format!("Failed to read manuscript {}", file.display()))?;

    let segmentation = segment_with_report(&text);
    println!(
        "📖 {} chapters (split on {})",
        segmentation.chapters.len(),
        segmentation.strategy
    );

    for (position, chapter) in segmentation.chapters.iter().enumerate() {
        println!(
            "  {:>3}. {} [{}] {} paragraphs, {} words",
            position + 1,
            chapter.title(),
            chapter.id(),
            chapter.paragraphs().len(),
            chapter.word_count()
        );
        if preview && let Some(first) = chapter.paragraphs().first() {
            println!("       {}", preview_line(first, 72));
        }
    }
    Ok(())
}

/// Print the wrap-around cover geometry for a page count.
pub fn handle_dimensions_command(pages: u32, paper: PaperType, ink: InkType) -> Result<()> {
    let dims = compute_dimensions(PageCount::new(pages), paper, ink)?;

    println!("📐 Paperback cover for {} pages ({} paper, {} ink)", pages, paper, ink);
    println!(
        "  Full cover: {:.4} x {:.4} in ({} x {} px at {} dpi)",
        dims.full_cover_width_in,
        dims.full_cover_height_in,
        dims.width_px,
        dims.height_px,
        dims.spec.dpi
    );
    println!("  Spine: {:.4} in", dims.spine_width_in);
    print_region("Back cover", &dims.layout.back_cover);
    print_region("Spine", &dims.layout.spine);
    print_region("Front cover", &dims.layout.front_cover);
    if pages < SPINE_LETTERING_MIN_PAGES {
        println!(
            "  💡 Spine text needs at least {} pages; the spine will be left blank",
            SPINE_LETTERING_MIN_PAGES
        );
    }
    Ok(())
}

fn print_region(name: &str, region: &Region) {
    println!(
        "  {:<12} {:.4}-{:.4} in (px {}-{})",
        name, region.start_in, region.end_in, region.start_px, region.end_px
    );
}

fn preview_line(paragraph: &str, max_chars: usize) -> String {
    if paragraph.chars().count() <= max_chars {
        return paragraph.to_string();
    }
    let cut: String = paragraph.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_line_truncates_on_char_boundary() {
        assert_eq!(preview_line("short", 72), "short");
        assert_eq!(preview_line("héllo wörld", 6), "héllo…");
    }

    #[test]
    fn test_dimensions_rejects_cream_color() {
        assert!(handle_dimensions_command(120, PaperType::Cream, InkType::StandardColor).is_err());
        assert!(handle_dimensions_command(120, PaperType::White, InkType::Bw).is_ok());
    }
}
