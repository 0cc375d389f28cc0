//! Text extraction for non-plain-text inputs.
//!
//! Extraction is pipeline-layer: ingestion supplies bytes or markup and
//! this module returns plain UTF-8 text. OCR and speech transcription
//! happen outside this system; their output arrives here as text.

use anyhow::{Context, Result};

/// Extract plain text from a PDF byte buffer.
pub fn extract_pdf(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).context("PDF extraction failed")
}

/// Strip markup from an HTML page, returning its visible text.
///
/// `<script>` and `<style>` bodies are dropped entirely; block-level
/// closing tags become newlines so paragraphs stay separated; runs of
/// whitespace collapse to a single space per line.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        rest = &rest[lt..];

        let tag_end = match rest.find('>') {
            Some(i) => i,
            None => break, // unterminated tag, drop the tail
        };
        let tag = rest[1..tag_end].trim();
        let tag_name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        rest = &rest[tag_end + 1..];

        // Skip the whole element body for non-content tags.
        if !tag.starts_with('/') && (tag_name == "script" || tag_name == "style") {
            let close = format!("</{}", tag_name);
            if let Some(pos) = rest.to_ascii_lowercase().find(&close) {
                rest = &rest[pos..];
                if let Some(end) = rest.find('>') {
                    rest = &rest[end + 1..];
                } else {
                    rest = "";
                }
            } else {
                rest = "";
            }
            continue;
        }

        if matches!(
            tag_name.as_str(),
            "p" | "div" | "br" | "li" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        ) {
            out.push('\n');
        }
    }
    out.push_str(rest);

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    // Collapse intra-line whitespace and blank-line runs.
    let mut lines: Vec<String> = Vec::new();
    for line in decoded.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }
    lines.join("\n")
}

/// Pull a page title out of raw HTML, if one exists.
pub fn html_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<title")?;
    let open_end = html[start..].find('>')? + start + 1;
    let close = lower[open_end..].find("</title")? + open_end;
    let title = strip_html(&html[open_end..close]);
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_basic() {
        let html = "<html><body><h1>Heading</h1><p>First   paragraph.</p><p>Second.</p></body></html>";
        let text = strip_html(html);
        assert_eq!(text, "Heading\nFirst paragraph.\nSecond.");
    }

    #[test]
    fn test_strip_html_drops_script_and_style() {
        let html = "<p>before</p><script>var x = '<p>not text</p>';</script><style>p { color: red }</style><p>after</p>";
        let text = strip_html(html);
        assert_eq!(text, "before\nafter");
    }

    #[test]
    fn test_strip_html_entities() {
        assert_eq!(strip_html("a &amp; b &lt;c&gt;"), "a & b <c>");
    }

    #[test]
    fn test_strip_html_plain_text_passthrough() {
        assert_eq!(strip_html("no markup here"), "no markup here");
    }

    #[test]
    fn test_html_title() {
        let html = "<html><head><title> My  Page </title></head><body>x</body></html>";
        assert_eq!(html_title(html).as_deref(), Some("My Page"));
        assert_eq!(html_title("<p>no title</p>"), None);
    }
}
