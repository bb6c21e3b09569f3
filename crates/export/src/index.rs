//! Patching of the shared book index page.
//!
//! Entries live between `<!-- BOOKS_START -->` and `<!-- BOOKS_END -->`, one
//! block per project delimited by `<!-- BOOK_START:id -->` and
//! `<!-- BOOK_END:id -->`. All edits are plain text surgery on those markers.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::{info, warn};
use url::Url;

use crate::markup::escape_html;

/// Opening outer marker.
pub const BOOKS_START: &str = "<!-- BOOKS_START -->";
/// Closing outer marker.
pub const BOOKS_END: &str = "<!-- BOOKS_END -->";

/// Index document used when the existing one lacks the outer markers.
pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Reduce a project name to `[A-Za-z0-9_]` so it is safe inside a marker.
pub fn sanitize_marker_id(project: &str) -> String {
    let id: String = project
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.is_empty() { "_".to_string() } else { id }
}

fn start_marker(id: &str) -> String {
    format!("<!-- BOOK_START:{} -->", id)
}

fn end_marker(id: &str) -> String {
    format!("<!-- BOOK_END:{} -->", id)
}

/// Insert or replace the entry for `project`.
///
/// Any existing block for the project is removed first and the new block is
/// placed right after `BOOKS_START`, so the newest entry comes first. A
/// document without both outer markers is replaced by the template.
pub fn upsert_entry(index_html: &str, project: &str, entry_html: &str) -> String {
    let id = sanitize_marker_id(project);

    let base = if index_html.contains(BOOKS_START) && index_html.contains(BOOKS_END) {
        index_html.to_string()
    } else {
        if index_html.trim().is_empty() {
            info!("Creating book index from template");
        } else {
            warn!("Book index is missing its BOOKS_START/BOOKS_END markers; rebuilding it from the template");
        }
        INDEX_TEMPLATE.to_string()
    };

    let (mut html, _) = remove_blocks(&base, &id);

    let block = format!(
        "{}\n{}\n{}\n",
        start_marker(&id),
        entry_html.trim_end_matches(['\n', '\r']),
        end_marker(&id)
    );

    // markers were present in `base` and removal never touches them
    let Some(marker) = html.find(BOOKS_START) else {
        return html;
    };
    let after = marker + BOOKS_START.len();
    if html[after..].starts_with('\n') {
        html.insert_str(after + 1, &block);
    } else {
        html.insert_str(after, &format!("\n{}", block));
    }
    html
}

/// Remove the entry for `project`, along with the newline that followed it.
///
/// Returns the input unchanged when the project has no entry.
pub fn remove_entry(index_html: &str, project: &str) -> String {
    let id = sanitize_marker_id(project);
    remove_blocks(index_html, &id).0
}

/// Whether the index currently holds an entry for `project`.
pub fn has_entry(index_html: &str, project: &str) -> bool {
    index_html.contains(&start_marker(&sanitize_marker_id(project)))
}

/// Delete every block for `id`. Returns the new text and whether anything
/// was removed.
fn remove_blocks(html: &str, id: &str) -> (String, bool) {
    let start = start_marker(id);
    let end = end_marker(id);
    let mut result = html.to_string();
    let mut removed = false;

    while let Some(block_start) = result.find(&start) {
        let Some(end_offset) = result[block_start..].find(&end) else {
            warn!(
                "Book index has an unterminated entry for '{}'; leaving it in place",
                id
            );
            break;
        };
        let mut block_end = block_start + end_offset + end.len();
        if result[block_end..].starts_with("\r\n") {
            block_end += 2;
        } else if result[block_end..].starts_with('\n') {
            block_end += 1;
        }
        result.replace_range(block_start..block_end, "");
        removed = true;
    }

    (result, removed)
}

/// A published artifact linked from an index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLink {
    pub label: String,
    /// Path relative to the index page.
    pub href: String,
}

impl IndexLink {
    /// Link to `file_name` inside the project directory `project`.
    pub fn artifact(label: impl Into<String>, project: &str, file_name: &str) -> Self {
        Self {
            label: label.into(),
            href: format!("{}/{}", encode_path_segment(project), encode_path_segment(file_name)),
        }
    }
}

/// Characters escaped inside one relative path segment. Non-ASCII is always
/// encoded by `utf8_percent_encode`.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// The card shown for one book on the index page.
#[derive(Debug, Clone, Default)]
pub struct IndexEntry {
    pub title: String,
    pub author: String,
    pub pov: Option<String>,
    pub description: Option<String>,
    pub links: Vec<IndexLink>,
    pub buy_url: Option<String>,
}

impl IndexEntry {
    /// Render the entry as an HTML fragment. All text is escaped; the buy
    /// link is only emitted for an absolute http(s) URL.
    pub fn render(&self) -> String {
        let mut html = String::from("<article class=\"book\">\n");
        html.push_str(&format!("  <h2>{}</h2>\n", escape_html(&self.title)));
        html.push_str(&format!(
            "  <p class=\"author\">by {}</p>\n",
            escape_html(&self.author)
        ));
        if let Some(pov) = self.pov.as_deref().filter(|p| !p.trim().is_empty()) {
            html.push_str(&format!(
                "  <p class=\"pov\">Point of view: {}</p>\n",
                escape_html(pov)
            ));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            html.push_str(&format!(
                "  <p class=\"description\">{}</p>\n",
                escape_html(description)
            ));
        }

        html.push_str("  <p class=\"links\">\n");
        for link in &self.links {
            html.push_str(&format!(
                "    <a href=\"{}\">{}</a>\n",
                escape_html(&link.href),
                escape_html(&link.label)
            ));
        }
        if let Some(url) = self.buy_url.as_deref().and_then(web_url) {
            html.push_str(&format!(
                "    <a class=\"buy\" href=\"{}\">Buy</a>\n",
                escape_html(url.as_str())
            ));
        }
        html.push_str("  </p>\n</article>");
        html
    }
}

fn web_url(raw: &str) -> Option<Url> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            warn!("Ignoring buy URL with unsupported scheme '{}'", url.scheme());
            None
        }
        Err(e) => {
            warn!("Ignoring invalid buy URL '{}': {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "<html>\n<!-- BOOKS_START -->\n<!-- BOOKS_END -->\n</html>\n";

    #[test]
    fn test_sanitize_marker_id() {
        assert_eq!(sanitize_marker_id("My Book-2"), "My_Book_2");
        assert_eq!(sanitize_marker_id("x --> y"), "x_____y");
        assert_eq!(sanitize_marker_id(""), "_");
    }

    #[test]
    fn test_upsert_then_remove_restores_document() {
        let updated = upsert_entry(INDEX, "tides", "<p>Tides</p>");
        assert!(updated.contains("<!-- BOOK_START:tides -->\n<p>Tides</p>\n<!-- BOOK_END:tides -->\n"));
        assert!(has_entry(&updated, "tides"));

        assert_eq!(remove_entry(&updated, "tides"), INDEX);
    }

    #[test]
    fn test_upsert_replaces_existing_entry() {
        let first = upsert_entry(INDEX, "tides", "<p>old</p>");
        let second = upsert_entry(&first, "tides", "<p>new</p>");

        assert_eq!(second.matches("BOOK_START:tides").count(), 1);
        assert!(second.contains("<p>new</p>"));
        assert!(!second.contains("<p>old</p>"));
    }

    #[test]
    fn test_newest_entry_first() {
        let html = upsert_entry(INDEX, "first", "<p>1</p>");
        let html = upsert_entry(&html, "second", "<p>2</p>");
        let first = html.find("BOOK_START:first").unwrap();
        let second = html.find("BOOK_START:second").unwrap();
        assert!(second < first);

        let html = remove_entry(&html, "second");
        assert!(!html.contains("BOOK_START:second"));
        assert!(html.contains("BOOK_START:first"));
        assert!(html.contains(BOOKS_START) && html.contains(BOOKS_END));
    }

    #[test]
    fn test_missing_markers_bootstrap_template() {
        let html = upsert_entry("<html>no markers</html>", "tides", "<p>Tides</p>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(BOOKS_START) && html.contains(BOOKS_END));
        let start = html.find(BOOKS_START).unwrap();
        let entry = html.find("BOOK_START:tides").unwrap();
        let end = html.find(BOOKS_END).unwrap();
        assert!(start < entry && entry < end);
    }

    #[test]
    fn test_remove_missing_entry_is_noop() {
        assert_eq!(remove_entry(INDEX, "absent"), INDEX);
        assert_eq!(remove_entry("plain text", "absent"), "plain text");
    }

    #[test]
    fn test_unterminated_block_is_left_alone() {
        let broken = "<!-- BOOKS_START -->\n<!-- BOOK_START:tides -->\n<p>x</p>\n<!-- BOOKS_END -->";
        assert_eq!(remove_entry(broken, "tides"), broken);
    }

    #[test]
    fn test_project_names_do_not_collide_by_prefix() {
        let html = upsert_entry(INDEX, "tide", "<p>a</p>");
        let html = upsert_entry(&html, "tides", "<p>b</p>");
        let html = remove_entry(&html, "tide");
        assert!(html.contains("<p>b</p>"));
        assert!(!html.contains("<p>a</p>"));
    }

    #[test]
    fn test_entry_render_escapes_and_filters_urls() {
        let entry = IndexEntry {
            title: "Salt & Sea".to_string(),
            author: "<Anon>".to_string(),
            pov: Some("First person".to_string()),
            description: None,
            links: vec![IndexLink::artifact("EPUB", "salt sea", "manuscript_1.epub")],
            buy_url: Some("javascript:alert(1)".to_string()),
        };
        let html = entry.render();
        assert!(html.contains("<h2>Salt &amp; Sea</h2>"));
        assert!(html.contains("by &lt;Anon&gt;"));
        assert!(html.contains("href=\"salt%20sea/manuscript_1.epub\""));
        assert!(!html.contains("javascript"));

        let entry = IndexEntry {
            buy_url: Some("https://shop.example/book".to_string()),
            ..entry
        };
        assert!(entry.render().contains("href=\"https://shop.example/book\""));
    }

    #[test]
    fn test_artifact_links_encode_unsafe_project_names() {
        let link = IndexLink::artifact("Web", "Café [draft]", "manuscript_x.html");
        assert_eq!(link.href, "Caf%C3%A9%20%5Bdraft%5D/manuscript_x.html");

        let link = IndexLink::artifact("Web", "a|b^c`d\\e", "50%.pdf");
        assert_eq!(link.href, "a%7Cb%5Ec%60d%5Ce/50%25.pdf");
    }
}
