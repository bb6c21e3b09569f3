//! Text helpers shared by the HTML, XHTML, PDF and index writers.

/// Escape HTML/XML special characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Split free text on blank lines, joining the lines inside each paragraph.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().chain(std::iter::once("")) {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.extend(line.split_whitespace());
        }
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Hello & <world>"), "Hello &amp; &lt;world&gt;");
        assert_eq!(escape_html("\"Test\""), "&quot;Test&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
        assert_eq!(escape_html("plain — text"), "plain — text");
    }

    #[test]
    fn test_split_paragraphs_on_blank_lines() {
        assert_eq!(
            split_paragraphs("One\nline.\n \nTwo.\n\n\n"),
            vec!["One line.".to_string(), "Two.".to_string()]
        );
        assert!(split_paragraphs("  \n ").is_empty());
    }
}
