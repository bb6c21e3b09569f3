//! EPUB 3 package builder.
//!
//! Writes the archive directly with `zip` so that manifest item ids are the
//! chapter ids and the file order is under our control.

use std::io::{Cursor, Write};

use async_trait::async_trait;
use chrono::Utc;
use quire_types::{BookMetadata, Chapter};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;
use crate::markup::{escape_html, split_paragraphs};
use crate::traits::Exporter;
use crate::types::{Book, ExportOptions, ExportResult, FormatInfo};

const MIMETYPE: &[u8] = b"application/epub+zip";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

const STYLESHEET: &str = r#"body { font-family: serif; line-height: 1.5; margin: 0 5%; }
h1 { text-align: center; font-weight: normal; margin: 2em 0 1.5em; page-break-before: always; }
p { margin: 0; text-indent: 1.5em; text-align: justify; }
h1 + p { text-indent: 0; }
.dedication { margin-top: 30%; text-align: center; font-style: italic; text-indent: 0; }
.about p { text-indent: 0; margin-bottom: 0.8em; }
nav ol { list-style: none; padding: 0; }
"#;

/// A non-chapter page placed after the chapters in reading order.
struct ExtraPage {
    id: &'static str,
    title: &'static str,
    body: String,
}

/// Build a complete EPUB archive in memory.
///
/// Each chapter is stored as `OEBPS/{id}.xhtml` with manifest id `{id}`.
/// The spine lists chapters in order, followed by the dedication and about
/// pages when the metadata carries them.
pub fn build_epub(chapters: &[Chapter], metadata: &BookMetadata) -> Result<Vec<u8>> {
    let identifier = format!("urn:uuid:{}", uuid::Uuid::new_v4());
    let modified = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let language = metadata.language_or_default();
    let extras = extra_pages(metadata);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let options_stored =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let options_deflate =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    // mimetype must be the first entry and uncompressed
    zip.start_file("mimetype", options_stored)?;
    zip.write_all(MIMETYPE)?;

    zip.start_file("META-INF/container.xml", options_deflate)?;
    zip.write_all(CONTAINER_XML.as_bytes())?;

    let opf = generate_opf(chapters, &extras, metadata, &identifier, &modified);
    zip.start_file("OEBPS/content.opf", options_deflate)?;
    zip.write_all(opf.as_bytes())?;

    zip.start_file("OEBPS/nav.xhtml", options_deflate)?;
    zip.write_all(generate_nav(chapters, &extras, language).as_bytes())?;

    zip.start_file("OEBPS/toc.ncx", options_deflate)?;
    zip.write_all(generate_ncx(chapters, &extras, metadata, &identifier).as_bytes())?;

    zip.start_file("OEBPS/style.css", options_deflate)?;
    zip.write_all(STYLESHEET.as_bytes())?;

    for chapter in chapters {
        let path = format!("OEBPS/{}.xhtml", chapter.id());
        zip.start_file(&path, options_deflate)?;
        zip.write_all(chapter_xhtml(chapter, language).as_bytes())?;
    }

    for page in &extras {
        zip.start_file(format!("OEBPS/{}.xhtml", page.id), options_deflate)?;
        zip.write_all(xhtml_document(page.title, language, &page.body).as_bytes())?;
    }

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    debug!(
        "Built EPUB with {} chapters and {} extra pages ({} bytes)",
        chapters.len(),
        extras.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn extra_pages(metadata: &BookMetadata) -> Vec<ExtraPage> {
    let mut pages = Vec::new();
    if let Some(dedication) = non_empty(&metadata.dedication) {
        pages.push(ExtraPage {
            id: "dedication",
            title: "Dedication",
            body: split_paragraphs(dedication)
                .iter()
                .map(|p| format!("<p class=\"dedication\">{}</p>", escape_html(p)))
                .collect::<Vec<_>>()
                .join("\n"),
        });
    }
    if let Some(about) = non_empty(&metadata.about_author) {
        let paragraphs: String = split_paragraphs(about)
            .iter()
            .map(|p| format!("<p>{}</p>\n", escape_html(p)))
            .collect();
        pages.push(ExtraPage {
            id: "about",
            title: "About the Author",
            body: format!(
                "<h1>About the Author</h1>\n<div class=\"about\">\n{}</div>",
                paragraphs
            ),
        });
    }
    pages
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn generate_opf(
    chapters: &[Chapter],
    extras: &[ExtraPage],
    metadata: &BookMetadata,
    identifier: &str,
    modified: &str,
) -> String {
    let mut opf = String::new();
    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape_html(identifier)
    ));
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_html(&metadata.title)
    ));
    opf.push_str(&format!(
        "    <dc:creator>{}</dc:creator>\n",
        escape_html(&metadata.author)
    ));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape_html(metadata.language_or_default())
    ));
    if !metadata.publisher.trim().is_empty() {
        opf.push_str(&format!(
            "    <dc:publisher>{}</dc:publisher>\n",
            escape_html(&metadata.publisher)
        ));
    }
    if let Some(summary) = metadata.summary() {
        opf.push_str(&format!(
            "    <dc:description>{}</dc:description>\n",
            escape_html(summary)
        ));
    }
    if let Some(copyright) = non_empty(&metadata.copyright) {
        opf.push_str(&format!(
            "    <dc:rights>{}</dc:rights>\n",
            escape_html(copyright)
        ));
    }
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        modified
    ));
    opf.push_str("  </metadata>\n  <manifest>\n");

    opf.push_str(
        "    <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
    );
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    opf.push_str("    <item id=\"css\" href=\"style.css\" media-type=\"text/css\"/>\n");
    for chapter in chapters {
        opf.push_str(&format!(
            "    <item id=\"{id}\" href=\"{id}.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
            id = chapter.id()
        ));
    }
    for page in extras {
        opf.push_str(&format!(
            "    <item id=\"{id}\" href=\"{id}.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
            id = page.id
        ));
    }
    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
    for chapter in chapters {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", chapter.id()));
    }
    for page in extras {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", page.id));
    }
    opf.push_str("  </spine>\n</package>\n");
    opf
}

fn generate_nav(chapters: &[Chapter], extras: &[ExtraPage], language: &str) -> String {
    let mut items = String::new();
    for chapter in chapters {
        items.push_str(&format!(
            "      <li><a href=\"{}.xhtml\">{}</a></li>\n",
            chapter.id(),
            escape_html(chapter.title())
        ));
    }
    for page in extras {
        items.push_str(&format!(
            "      <li><a href=\"{}.xhtml\">{}</a></li>\n",
            page.id, page.title
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head>
  <title>Contents</title>
  <link rel="stylesheet" type="text/css" href="style.css"/>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>Contents</h1>
    <ol>
{items}    </ol>
  </nav>
</body>
</html>
"#,
        lang = escape_html(language),
        items = items
    )
}

fn generate_ncx(
    chapters: &[Chapter],
    extras: &[ExtraPage],
    metadata: &BookMetadata,
    identifier: &str,
) -> String {
    let entries = chapters
        .iter()
        .map(|c| (c.id().as_str(), c.title()))
        .chain(extras.iter().map(|p| (p.id, p.title)));

    let mut nav_points = String::new();
    for (order, (id, title)) in entries.enumerate() {
        nav_points.push_str(&format!(
            r#"    <navPoint id="nav-{id}" playOrder="{order}">
      <navLabel><text>{title}</text></navLabel>
      <content src="{id}.xhtml"/>
    </navPoint>
"#,
            id = id,
            order = order + 1,
            title = escape_html(title)
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{uid}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <docAuthor><text>{author}</text></docAuthor>
  <navMap>
{nav_points}  </navMap>
</ncx>
"#,
        uid = escape_html(identifier),
        title = escape_html(&metadata.title),
        author = escape_html(&metadata.author),
        nav_points = nav_points
    )
}

fn chapter_xhtml(chapter: &Chapter, language: &str) -> String {
    let mut body = format!("<h1 id=\"{}\">{}</h1>\n", chapter.id(), escape_html(chapter.title()));
    for paragraph in chapter.paragraphs() {
        body.push_str(&format!("<p>{}</p>\n", escape_html(paragraph)));
    }
    xhtml_document(chapter.title(), language, &body)
}

fn xhtml_document(title: &str, language: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}" lang="{lang}">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="style.css"/>
</head>
<body>
{body}
</body>
</html>
"#,
        lang = escape_html(language),
        title = escape_html(title),
        body = body
    )
}

/// EPUB format exporter.
pub struct EpubExporter;

impl EpubExporter {
    /// Create new EPUB exporter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for EpubExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exporter for EpubExporter {
    fn format_info(&self) -> FormatInfo {
        FormatInfo::new("epub".to_string(), "EPUB E-book".to_string())
            .with_mime_type("application/epub+zip".to_string())
    }

    async fn export(
        &self,
        book: &Book,
        mut writer: Box<dyn AsyncWrite + Send + Unpin>,
        _options: &ExportOptions,
    ) -> Result<ExportResult> {
        let start_time = Utc::now();

        let epub_data = build_epub(&book.chapters, &book.metadata)?;

        writer.write_all(&epub_data).await?;
        writer.flush().await?;

        let duration = Utc::now().signed_duration_since(start_time);
        Ok(ExportResult::success(
            book.chapters.len() as u32,
            epub_data.len() as u64,
            duration,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn sample_chapters() -> Vec<Chapter> {
        vec![
            Chapter::new(1, "Arrival", vec!["One.".to_string()]),
            Chapter::new(2, "Departure", vec!["Two & more.".to_string()]),
            Chapter::new(3, "Return", vec!["Three.".to_string()]),
        ]
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_exporter_creation() {
        let exporter = EpubExporter::new();
        let format_info = exporter.format_info();

        assert_eq!(format_info.id, "epub");
        assert_eq!(format_info.name, "EPUB E-book");
        assert_eq!(
            format_info.mime_type,
            Some("application/epub+zip".to_string())
        );
    }

    #[test]
    fn test_mimetype_is_first_and_stored() {
        let bytes = build_epub(&sample_chapters(), &BookMetadata::new("T", "A")).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();

        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        drop(first);

        assert!(archive.by_name("META-INF/container.xml").is_ok());
        assert!(archive.by_name("OEBPS/nav.xhtml").is_ok());
        assert!(archive.by_name("OEBPS/style.css").is_ok());
    }

    #[test]
    fn test_manifest_ids_match_chapter_ids() {
        let chapters = sample_chapters();
        let bytes = build_epub(&chapters, &BookMetadata::new("T", "A")).unwrap();
        let opf = read_entry(&bytes, "OEBPS/content.opf");

        assert_eq!(opf.matches("<itemref ").count(), 3);
        let mut last = 0;
        for chapter in &chapters {
            let itemref = format!("<itemref idref=\"{}\"/>", chapter.id());
            let position = opf.find(&itemref).unwrap();
            assert!(position > last);
            last = position;
            assert!(opf.contains(&format!("<item id=\"{}\"", chapter.id())));
            read_entry(&bytes, &format!("OEBPS/{}.xhtml", chapter.id()));
        }
    }

    #[test]
    fn test_metadata_is_escaped() {
        let mut metadata = BookMetadata::new("Salt & <Sea>", "O'Brien");
        metadata.description = "A \"tale\"".to_string();
        let bytes = build_epub(&sample_chapters(), &metadata).unwrap();
        let opf = read_entry(&bytes, "OEBPS/content.opf");

        assert!(opf.contains("<dc:title>Salt &amp; &lt;Sea&gt;</dc:title>"));
        assert!(opf.contains("<dc:creator>O&#x27;Brien</dc:creator>"));
        assert!(opf.contains("<dc:description>A &quot;tale&quot;</dc:description>"));
        assert!(opf.contains("urn:uuid:"));
    }

    #[test]
    fn test_identifier_is_fresh_per_build() {
        let chapters = sample_chapters();
        let metadata = BookMetadata::new("T", "A");
        let first = read_entry(&build_epub(&chapters, &metadata).unwrap(), "OEBPS/content.opf");
        let second = read_entry(&build_epub(&chapters, &metadata).unwrap(), "OEBPS/content.opf");
        assert_ne!(first, second);
    }

    #[test]
    fn test_optional_pages_follow_chapters() {
        let mut metadata = BookMetadata::new("T", "A");
        metadata.dedication = Some("For the sea.".to_string());
        metadata.about_author = Some("Lives by the coast.".to_string());
        let bytes = build_epub(&sample_chapters(), &metadata).unwrap();
        let opf = read_entry(&bytes, "OEBPS/content.opf");

        assert_eq!(opf.matches("<itemref ").count(), 5);
        let last_chapter = opf.find("<itemref idref=\"ch-3-return\"/>").unwrap();
        assert!(opf.find("<itemref idref=\"dedication\"/>").unwrap() > last_chapter);
        assert!(read_entry(&bytes, "OEBPS/about.xhtml").contains("Lives by the coast."));
    }

    #[test]
    fn test_about_page_keeps_paragraph_breaks() {
        let mut metadata = BookMetadata::new("T", "A");
        metadata.about_author = Some("First paragraph.\n\nSecond\nparagraph.".to_string());
        metadata.dedication = Some("For M.\n\nAnd for J.".to_string());
        let bytes = build_epub(&sample_chapters(), &metadata).unwrap();

        let about = read_entry(&bytes, "OEBPS/about.xhtml");
        assert_eq!(about.matches("<p>").count(), 2);
        assert!(about.contains("<p>Second paragraph.</p>"));
        let dedication = read_entry(&bytes, "OEBPS/dedication.xhtml");
        assert_eq!(dedication.matches("<p class=\"dedication\">").count(), 2);
    }
}
