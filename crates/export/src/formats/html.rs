//! Standalone HTML rendering.
//!
//! The document carries its own styles and no external assets so it can be
//! opened straight from disk.

use async_trait::async_trait;
use chrono::Utc;
use quire_types::Chapter;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::markup::escape_html;
use crate::traits::Exporter;
use crate::types::{Book, ExportOptions, ExportResult, FormatInfo};

const STYLE: &str = r#"
    body { margin: 0; background: #faf8f3; color: #222; font-family: Georgia, 'Times New Roman', serif; }
    main { max-width: 38em; margin: 0 auto; padding: 3em 1.5em; line-height: 1.6; font-size: 1.1em; }
    header { text-align: center; margin-bottom: 3em; }
    header h1 { font-size: 2.2em; margin-bottom: 0.2em; }
    header .author { font-style: italic; color: #555; }
    nav.toc ol { padding-left: 1.2em; }
    nav.toc a { color: #6b3e26; text-decoration: none; }
    section.chapter { margin-top: 4em; }
    section.chapter h2 { text-align: center; font-weight: normal; letter-spacing: 0.05em; }
    section.chapter p { margin: 0; text-indent: 1.5em; text-align: justify; }
    section.chapter h2 + p { text-indent: 0; }
    .sample-notice { margin-top: 4em; text-align: center; font-style: italic; color: #777; }
"#;

/// Options for the HTML renderer.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Render only the first N chapters.
    pub chapter_limit: Option<usize>,
    /// Byline shown under the title.
    pub author: Option<String>,
    /// `lang` of the document; `en` when unset.
    pub language: Option<String>,
}

/// Render chapters to a single self-contained HTML document.
///
/// Each chapter becomes a `<section>` whose `id` is the chapter id. A
/// chapter limit truncates the rendered set without touching `chapters`.
pub fn render_html(title: &str, chapters: &[Chapter], options: &HtmlOptions) -> String {
    let limit = options
        .chapter_limit
        .unwrap_or(chapters.len())
        .min(chapters.len());
    let rendered = &chapters[..limit];
    let title = escape_html(title);

    let mut html = String::with_capacity(rendered.iter().map(chapter_size_hint).sum::<usize>() + 4096);
    let language = options
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("en");
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n",
        escape_html(language)
    ));
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("  <title>{}</title>\n", title));
    html.push_str(&format!("  <style>{}  </style>\n", STYLE));
    html.push_str("</head>\n<body>\n<main>\n");

    html.push_str(&format!("<header>\n  <h1>{}</h1>\n", title));
    if let Some(author) = &options.author {
        html.push_str(&format!(
            "  <p class=\"author\">{}</p>\n",
            escape_html(author)
        ));
    }
    html.push_str("</header>\n");

    html.push_str("<nav class=\"toc\">\n  <h2>Contents</h2>\n  <ol>\n");
    for chapter in rendered {
        html.push_str(&format!(
            "    <li><a href=\"#{}\">{}</a></li>\n",
            chapter.id(),
            escape_html(chapter.title())
        ));
    }
    html.push_str("  </ol>\n</nav>\n");

    for chapter in rendered {
        html.push_str(&format!(
            "<section class=\"chapter\" id=\"{}\">\n  <h2>{}</h2>\n",
            chapter.id(),
            escape_html(chapter.title())
        ));
        for paragraph in chapter.paragraphs() {
            html.push_str(&format!("  <p>{}</p>\n", escape_html(paragraph)));
        }
        html.push_str("</section>\n");
    }

    if limit < chapters.len() {
        html.push_str(&format!(
            "<p class=\"sample-notice\">This sample contains {} of {} chapters.</p>\n",
            limit,
            chapters.len()
        ));
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn chapter_size_hint(chapter: &Chapter) -> usize {
    chapter.paragraphs().iter().map(|p| p.len() + 12).sum::<usize>() + 128
}

/// HTML format exporter.
pub struct HtmlExporter;

impl HtmlExporter {
    /// Create new HTML exporter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exporter for HtmlExporter {
    fn format_info(&self) -> FormatInfo {
        FormatInfo::new("html".to_string(), "Web Page".to_string())
            .with_mime_type("text/html".to_string())
    }

    async fn export(
        &self,
        book: &Book,
        mut writer: Box<dyn AsyncWrite + Send + Unpin>,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let start_time = Utc::now();

        let html_options = HtmlOptions {
            chapter_limit: options.chapter_limit,
            author: Some(book.metadata.author.clone()),
            language: Some(book.metadata.language_or_default().to_string()),
        };
        let html = render_html(&book.metadata.title, &book.chapters, &html_options);
        let chapters_processed = options
            .chapter_limit
            .map_or(book.chapters.len(), |limit| limit.min(book.chapters.len()));

        writer.write_all(html.as_bytes()).await?;
        writer.flush().await?;

        let duration = Utc::now().signed_duration_since(start_time);
        Ok(ExportResult::success(
            chapters_processed as u32,
            html.len() as u64,
            duration,
        ))
    }
}
