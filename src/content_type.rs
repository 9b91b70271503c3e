//! Content-type classification
//!
//! Decides early whether a payload is worth parsing and, if so, whether it
//! goes through the markup parser or is treated as plain text.

use std::path::Path;

/// How a payload is handled by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML, XHTML or XML markup
    Markup,
    /// Plain text, markdown, CSV, JSON, YAML
    PlainText,
    /// Anything else; rejected before parsing
    Binary,
}

const MARKUP_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "application/xml", "text/xml"];

const TEXT_TYPES: &[&str] = &[
    "application/json",
    "application/x-yaml",
    "application/yaml",
    "application/x-ndjson",
];

/// Lowercased media type without parameters (`text/html; charset=utf-8` -> `text/html`)
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Classify a Content-Type header value
pub fn classify(content_type: &str) -> ContentKind {
    let essence = essence(content_type);
    if MARKUP_TYPES.contains(&essence.as_str()) || essence.ends_with("+xml") {
        ContentKind::Markup
    } else if essence.starts_with("text/") || TEXT_TYPES.contains(&essence.as_str()) || essence.ends_with("+json") {
        ContentKind::PlainText
    } else {
        ContentKind::Binary
    }
}

/// The `charset` parameter of a Content-Type header, if any
pub fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}

/// Content type implied by a file extension, for `file://` sources
pub fn from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "html" | "htm" => "text/html",
        "xhtml" => "application/xhtml+xml",
        "xml" => "application/xml",
        "txt" | "text" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",
        _ => return None,
    };
    Some(content_type)
}

/// Cheap check for markup when no content type was supplied
pub fn looks_like_markup(prefix: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&prefix[..prefix.len().min(512)]).to_ascii_lowercase();
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with('<')
        && ["<html", "<!doctype", "<body", "<head", "<div", "<p", "<?xml", "<main", "<article"]
            .iter()
            .any(|tag| head.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("text/html; charset=utf-8"), ContentKind::Markup);
        assert_eq!(classify("application/rss+xml"), ContentKind::Markup);
        assert_eq!(classify("text/plain"), ContentKind::PlainText);
        assert_eq!(classify("application/json"), ContentKind::PlainText);
        assert_eq!(classify("image/png"), ContentKind::Binary);
        assert_eq!(classify("application/octet-stream"), ContentKind::Binary);
    }

    #[test]
    fn test_charset_param() {
        assert_eq!(charset("text/html; charset=ISO-8859-1"), Some("ISO-8859-1"));
        assert_eq!(charset("text/html;charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset("text/html"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(from_extension(Path::new("/tmp/a.HTML")), Some("text/html"));
        assert_eq!(from_extension(Path::new("notes.md")), Some("text/markdown"));
        assert_eq!(from_extension(Path::new("archive.zip")), None);
    }

    #[test]
    fn test_looks_like_markup() {
        assert!(looks_like_markup(b"  <!DOCTYPE html><html></html>"));
        assert!(!looks_like_markup(b"just some words"));
    }
}
