//! A three-chapter manuscript flows through every renderer with consistent
//! chapter ids.

use std::io::{Cursor, Read};

use quire_export::formats::HtmlOptions;
use quire_export::{PdfTypesetter, build_epub, compute_dimensions, render_html, segment};
use quire_types::{BookMetadata, InkType, PageCount, PaperType};
use zip::ZipArchive;

const MANUSCRIPT: &str = "\
Chapter 1: Arrival
The ferry docked an hour late and the harbour smelled of diesel and rain.
Nobody was waiting on the quay.

Chapter 2: Departure
By the end of the week the house was packed into boxes and the keys were
returned to the agent, who did not ask where they were going.

Chapter 3: Return
Years later the same ferry, repainted, carried them back across the water
to a town that had forgotten them entirely.
";

fn opf(epub: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(epub)).unwrap();
    let mut file = archive.by_name("OEBPS/content.opf").unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_three_chapters_stay_in_lock_step() {
    let chapters = segment(MANUSCRIPT);
    let titles: Vec<_> = chapters.iter().map(|c| c.title()).collect();
    assert_eq!(
        titles,
        vec!["Chapter 1: Arrival", "Chapter 2: Departure", "Chapter 3: Return"]
    );

    let html = render_html("Crossings", &chapters, &HtmlOptions::default());
    assert_eq!(html.matches("<section class=\"chapter\" id=").count(), 3);

    let metadata = BookMetadata::new("Crossings", "A. Writer");
    let epub = build_epub(&chapters, &metadata).unwrap();
    let opf = opf(&epub);
    assert_eq!(opf.matches("<itemref ").count(), 3);

    let mut last_position = 0;
    for chapter in &chapters {
        let id = chapter.id().as_str();
        assert!(html.contains(&format!("id=\"{}\"", id)));

        let position = opf.find(&format!("<itemref idref=\"{}\"/>", id)).unwrap();
        assert!(position > last_position, "spine out of order at {}", id);
        last_position = position;
    }

    let pdf = PdfTypesetter::new().typeset(&chapters, &metadata).unwrap();
    assert!(pdf.page_count.get() >= 3);
    assert_eq!(pdf.chapter_start_pages.len(), 3);
}

#[test]
fn test_spine_for_120_white_pages() {
    let dims = compute_dimensions(PageCount::new(120), PaperType::White, InkType::Bw).unwrap();
    assert_eq!(dims.spine_width_in, 120.0 * 0.002237 + 0.0025);
    assert!(
        (dims.full_cover_width_in - (2.0 * 6.0 + dims.spine_width_in + 2.0 * 0.125)).abs() < 1e-12
    );
}
