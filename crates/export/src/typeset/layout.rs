//! Interior typesetting: manual line breaking and pagination onto fixed
//! trade-paperback pages.

use chrono::{Datelike, Utc};
use lopdf::content::Operation;
use lopdf::{Dictionary, Object, ObjectId, dictionary};
use quire_types::{BookMetadata, Chapter, PageCount};
use tracing::debug;

use super::document::{PdfBuilder, text_line, text_string};
use super::metrics::StandardFont;
use super::wrap::wrap_text;
use crate::error::Result;
use crate::markup::split_paragraphs;

/// Physical page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_side: f32,
}

impl PageGeometry {
    /// 6×9 inch trim with 0.875 inch top/bottom and 0.75 inch side margins.
    pub const TRADE_6X9: PageGeometry = PageGeometry {
        width: 432.0,
        height: 648.0,
        margin_top: 63.0,
        margin_bottom: 63.0,
        margin_side: 54.0,
    };

    pub fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin_side
    }

    fn top(&self) -> f32 {
        self.height - self.margin_top
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::TRADE_6X9
    }
}

/// Font sizes and spacing, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub body_size: f32,
    pub line_height: f32,
    pub heading_size: f32,
    pub heading_line_height: f32,
    pub paragraph_indent: f32,
    pub chapter_drop: f32,
    pub folio_size: f32,
    pub folio_offset: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            body_size: 11.0,
            line_height: 15.0,
            heading_size: 18.0,
            heading_line_height: 24.0,
            paragraph_indent: 18.0,
            chapter_drop: 72.0,
            folio_size: 9.0,
            folio_offset: 36.0,
        }
    }
}

/// Extra word spacing beyond which a line is left ragged.
const MAX_WORD_SPACING: f32 = 8.0;

/// Output of the typesetter.
#[derive(Debug, Clone)]
pub struct TypesetPdf {
    pub bytes: Vec<u8>,
    pub page_count: PageCount,
    /// 1-based page on which each chapter opens, in chapter order.
    pub chapter_start_pages: Vec<u32>,
}

/// Lays out a book onto fixed-size pages and serializes it as PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfTypesetter {
    geometry: PageGeometry,
    typography: Typography,
}

impl PdfTypesetter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_typography(mut self, typography: Typography) -> Self {
        self.typography = typography;
        self
    }

    /// Typeset the book. The returned page count is the number of pages
    /// actually produced.
    pub fn typeset(&self, chapters: &[Chapter], metadata: &BookMetadata) -> Result<TypesetPdf> {
        let mut composer = Composer::new(self.geometry, self.typography);

        composer.title_page(metadata);
        composer.copyright_page(metadata);
        if let Some(dedication) = non_empty(&metadata.dedication) {
            composer.dedication_page(dedication);
        }
        composer.contents(chapters);

        let mut chapter_starts = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            chapter_starts.push(composer.chapter(chapter.title(), chapter.paragraphs()));
        }

        if let Some(about) = non_empty(&metadata.about_author) {
            composer.chapter("About the Author", &split_paragraphs(about));
        }

        let pages = composer.finish();
        let page_count = pages.len() as u32;

        let mut builder = PdfBuilder::new();
        let size = (self.geometry.width, self.geometry.height);
        for page in pages {
            builder.add_page(size, page.operations, None, None)?;
        }

        let catalog_extra = self.navigation(&mut builder, chapters, &chapter_starts);

        let mut info = dictionary! {
            "Title" => text_string(&metadata.title),
            "Author" => text_string(&metadata.author),
            "Producer" => text_string(concat!("quire ", env!("CARGO_PKG_VERSION"))),
        };
        if let Some(summary) = metadata.summary() {
            info.set("Subject", text_string(summary));
        }

        let bytes = builder.finish(catalog_extra, info)?;
        debug!(
            "Typeset {} chapters onto {} pages ({} bytes)",
            chapters.len(),
            page_count,
            bytes.len()
        );

        Ok(TypesetPdf {
            bytes,
            page_count: PageCount::new(page_count),
            chapter_start_pages: chapter_starts.iter().map(|i| *i as u32 + 1).collect(),
        })
    }

    /// Outline entries and named destinations keyed by chapter id.
    fn navigation(
        &self,
        builder: &mut PdfBuilder,
        chapters: &[Chapter],
        chapter_starts: &[usize],
    ) -> Dictionary {
        let mut catalog_extra = Dictionary::new();
        if chapters.is_empty() {
            return catalog_extra;
        }

        let top = self.geometry.height;
        let page_ids: Vec<ObjectId> = builder.page_ids().to_vec();
        let destination = |index: usize| -> Object {
            vec![
                Object::Reference(page_ids[index]),
                "FitH".into(),
                top.into(),
            ]
            .into()
        };

        let mut dests = Dictionary::new();
        for (chapter, start) in chapters.iter().zip(chapter_starts) {
            dests.set(chapter.id().as_str(), destination(*start));
        }

        let document = builder.document_mut();
        let outline_root_id = document.new_object_id();
        let item_ids: Vec<ObjectId> = chapters.iter().map(|_| document.new_object_id()).collect();

        for (i, (chapter, start)) in chapters.iter().zip(chapter_starts).enumerate() {
            let mut item = dictionary! {
                "Title" => text_string(chapter.title()),
                "Parent" => outline_root_id,
                "Dest" => destination(*start),
            };
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if i + 1 < item_ids.len() {
                item.set("Next", item_ids[i + 1]);
            }
            document.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        let first = item_ids[0];
        let last = item_ids[item_ids.len() - 1];
        document.objects.insert(
            outline_root_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first,
                "Last" => last,
                "Count" => item_ids.len() as i64,
            }),
        );

        catalog_extra.set("Outlines", outline_root_id);
        catalog_extra.set("PageMode", "UseOutlines");
        catalog_extra.set("Dests", dests);
        catalog_extra
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

struct PageDraft {
    operations: Vec<Operation>,
    folio: bool,
}

/// Running layout state: the pages so far and the vertical cursor on the
/// last one.
struct Composer {
    geometry: PageGeometry,
    typography: Typography,
    pages: Vec<PageDraft>,
    cursor: f32,
    folio: bool,
}

impl Composer {
    fn new(geometry: PageGeometry, typography: Typography) -> Self {
        Self {
            geometry,
            typography,
            pages: Vec::new(),
            cursor: geometry.top(),
            folio: false,
        }
    }

    /// Start a new page; returns its 0-based index.
    fn start_page(&mut self, folio: bool) -> usize {
        self.pages.push(PageDraft {
            operations: Vec::new(),
            folio,
        });
        self.folio = folio;
        self.cursor = self.geometry.top();
        self.pages.len() - 1
    }

    /// Move the cursor down one line, breaking the page when the line would
    /// cross the bottom margin. Returns the baseline for the line.
    fn advance(&mut self, line_height: f32) -> f32 {
        if self.pages.is_empty() || self.cursor - line_height < self.geometry.margin_bottom {
            self.start_page(self.folio);
        }
        self.cursor -= line_height;
        self.cursor
    }

    fn emit(&mut self, operations: Vec<Operation>) {
        if let Some(page) = self.pages.last_mut() {
            page.operations.extend(operations);
        }
    }

    fn centered_line(&mut self, font: StandardFont, size: f32, y: f32, text: &str) {
        let width = font.text_width(text, size);
        let x = self.geometry.margin_side + (self.geometry.text_width() - width).max(0.0) / 2.0;
        self.emit(text_line(font, size, x, y, text, 0.0));
    }

    /// Centered block of wrapped lines starting at the current cursor.
    fn centered_block(&mut self, font: StandardFont, size: f32, line_height: f32, text: &str) {
        let width = self.geometry.text_width();
        for line in wrap_text(text, font, size, width, width) {
            let y = self.advance(line_height);
            self.centered_line(font, size, y, &line);
        }
    }

    fn title_page(&mut self, metadata: &BookMetadata) {
        self.start_page(false);
        self.cursor = self.geometry.height * 0.68;
        self.centered_block(StandardFont::TimesBold, 26.0, 32.0, &metadata.title);
        self.cursor -= 24.0;
        self.centered_block(StandardFont::TimesRoman, 14.0, 18.0, &metadata.author);

        if !metadata.publisher.trim().is_empty() {
            self.cursor = self.geometry.margin_bottom + 24.0;
            self.centered_block(StandardFont::TimesRoman, 10.0, 14.0, &metadata.publisher);
        }
    }

    /// Notices set small and anchored to the bottom margin. Text too long
    /// for one page flows from the top instead, continuing onto further pages.
    fn copyright_page(&mut self, metadata: &BookMetadata) {
        self.start_page(false);

        let mut notices = split_paragraphs(&metadata.copyright_line(Utc::now().year()));
        if !metadata.publisher.trim().is_empty() {
            notices.push(format!("Published by {}", metadata.publisher.trim()));
        }

        let size = 9.0;
        let line_height = 13.0;
        let gap = line_height / 2.0;
        let width = self.geometry.text_width();
        let blocks: Vec<Vec<String>> = notices
            .iter()
            .map(|n| wrap_text(n, StandardFont::TimesRoman, size, width, width))
            .collect();

        let line_count: usize = blocks.iter().map(Vec::len).sum();
        let height = line_height * line_count as f32 + gap * blocks.len().saturating_sub(1) as f32;
        if height <= self.geometry.top() - self.geometry.margin_bottom {
            // small slack so accumulated rounding never forces a break
            self.cursor = self.geometry.margin_bottom + height + 0.01;
        }

        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                self.cursor -= gap;
            }
            for line in block {
                let y = self.advance(line_height);
                self.emit(text_line(
                    StandardFont::TimesRoman,
                    size,
                    self.geometry.margin_side,
                    y,
                    line,
                    0.0,
                ));
            }
        }
    }

    fn dedication_page(&mut self, dedication: &str) {
        self.start_page(false);
        self.cursor = self.geometry.height * 0.7;
        for paragraph in split_paragraphs(dedication) {
            self.centered_block(StandardFont::TimesRoman, 12.0, 16.0, &paragraph);
        }
    }

    /// Table of contents: chapter titles only, continuing onto further pages
    /// when needed.
    fn contents(&mut self, chapters: &[Chapter]) {
        self.start_page(false);
        self.cursor -= self.typography.chapter_drop / 2.0;
        let heading = self.typography.heading_size;
        self.centered_block(
            StandardFont::TimesBold,
            heading,
            self.typography.heading_line_height,
            "Contents",
        );
        self.cursor -= self.typography.heading_line_height;

        let size = self.typography.body_size;
        let width = self.geometry.text_width();
        for chapter in chapters {
            let lines = wrap_text(chapter.title(), StandardFont::TimesRoman, size, width, width - 18.0);
            for (i, line) in lines.iter().enumerate() {
                let y = self.advance(self.typography.line_height + 3.0);
                let x = self.geometry.margin_side + if i == 0 { 0.0 } else { 18.0 };
                self.emit(text_line(StandardFont::TimesRoman, size, x, y, line, 0.0));
            }
        }
    }

    /// A titled flow on a fresh page; returns the index of its first page.
    fn chapter(&mut self, title: &str, paragraphs: &[String]) -> usize {
        let start = self.start_page(true);
        self.cursor -= self.typography.chapter_drop;
        self.centered_block(
            StandardFont::TimesBold,
            self.typography.heading_size,
            self.typography.heading_line_height,
            title,
        );
        self.cursor -= self.typography.heading_line_height;

        for (i, paragraph) in paragraphs.iter().enumerate() {
            let indent = if i == 0 {
                0.0
            } else {
                self.typography.paragraph_indent
            };
            self.paragraph(paragraph, indent);
        }
        start
    }

    /// Justified paragraph; the last line is set ragged.
    fn paragraph(&mut self, text: &str, indent: f32) {
        let font = StandardFont::TimesRoman;
        let size = self.typography.body_size;
        let width = self.geometry.text_width();
        let lines = wrap_text(text, font, size, width - indent, width);
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            let y = self.advance(self.typography.line_height);
            let (x, available) = if i == 0 {
                (self.geometry.margin_side + indent, width - indent)
            } else {
                (self.geometry.margin_side, width)
            };
            let spacing = if i < last {
                word_spacing(font, size, line, available)
            } else {
                0.0
            };
            self.emit(text_line(font, size, x, y, line, spacing));
        }
    }

    /// Stamp folios and hand back the finished pages.
    fn finish(mut self) -> Vec<PageDraft> {
        let size = self.typography.folio_size;
        let y = self.typography.folio_offset;
        let center = self.geometry.width / 2.0;
        for (index, page) in self.pages.iter_mut().enumerate() {
            if page.folio {
                let number = (index + 1).to_string();
                let x = center - StandardFont::TimesRoman.text_width(&number, size) / 2.0;
                page.operations
                    .extend(text_line(StandardFont::TimesRoman, size, x, y, &number, 0.0));
            }
        }
        self.pages
    }
}

/// `Tw` that stretches `line` to `available`, or 0 when the gaps would get
/// too wide.
fn word_spacing(font: StandardFont, size: f32, line: &str, available: f32) -> f32 {
    let spaces = line.matches(' ').count();
    if spaces == 0 {
        return 0.0;
    }
    let extra = (available - font.text_width(line, size)) / spaces as f32;
    if extra > 0.0 && extra <= MAX_WORD_SPACING {
        extra
    } else {
        0.0
    }
}
