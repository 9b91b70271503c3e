//! Character encoding detection
//!
//! Precedence is byte-order mark, then the declared `charset` parameter,
//! then a `<meta charset>` sniffed from the first kilobyte, then UTF-8.
//! When the declared and sniffed charsets disagree, a UTF-8 reading wins if
//! the payload is UTF-8; otherwise the first one that decodes cleanly does.
//! UTF-8 with a few stray bytes stays UTF-8 instead of turning the whole
//! document into windows-1252.

use crate::error::ParseError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// How far into the payload `<meta charset>` is looked for
const SNIFF_WINDOW: usize = 1024;

/// Share of replacement/control characters above which text counts as binary
const MAX_GARBAGE_RATIO: f64 = 0.1;

/// Decoded text and the encoding that produced it
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Decoded text
    pub text: String,
    /// Encoding used
    pub encoding: &'static Encoding,
}

fn meta_charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#)
            .expect("meta charset regex should compile")
    })
}

/// Charset announced by a `<meta>` tag near the start of the payload
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_WINDOW)]);
    let label = meta_charset_re().captures(&head)?.get(1)?.as_str().to_string();
    Encoding::for_label(label.as_bytes())
}

/// Decode `bytes`, honouring BOM, declared charset and markup hints
pub fn decode(bytes: &[u8], declared: Option<&str>, sniff_markup: bool) -> Result<Decoded, ParseError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return finish(text.into_owned(), encoding);
    }

    let declared = declared.and_then(|label| Encoding::for_label(label.trim().as_bytes()));
    let sniffed = if sniff_markup {
        sniff_meta_charset(bytes)
    } else {
        None
    };

    match (declared, sniffed) {
        (Some(declared), Some(sniffed)) if declared != sniffed => resolve_conflict(bytes, declared, sniffed),
        _ => decode_with_fallback(bytes, declared.or(sniffed).unwrap_or(UTF_8)),
    }
}

/// Pick between a declared and a sniffed charset that disagree
///
/// Single-byte charsets accept any input, so a UTF-8 reading is checked
/// first and kept whenever the payload actually is UTF-8.
fn resolve_conflict(
    bytes: &[u8],
    declared: &'static Encoding,
    sniffed: &'static Encoding,
) -> Result<Decoded, ParseError> {
    if declared == UTF_8 || sniffed == UTF_8 {
        let (text, had_errors) = UTF_8.decode_without_bom_handling(bytes);
        if !had_errors || mostly_utf8(&text) {
            debug!(
                "Charsets disagree (declared {}, markup {}); payload is UTF-8",
                declared.name(),
                sniffed.name()
            );
            return finish(text.into_owned(), UTF_8);
        }
    }

    for candidate in [declared, sniffed] {
        if candidate == UTF_8 {
            continue;
        }
        let (text, had_errors) = candidate.decode_without_bom_handling(bytes);
        if !had_errors {
            debug!(
                "Charsets disagree (declared {}, markup {}); using {}",
                declared.name(),
                sniffed.name(),
                candidate.name()
            );
            return finish(text.into_owned(), candidate);
        }
    }

    decode_with_fallback(bytes, declared)
}

/// Decode with `primary`, falling back to windows-1252 when it fails
fn decode_with_fallback(bytes: &[u8], primary: &'static Encoding) -> Result<Decoded, ParseError> {
    let (text, had_errors) = primary.decode_without_bom_handling(bytes);
    if !had_errors {
        return finish(text.into_owned(), primary);
    }
    if primary == UTF_8 && mostly_utf8(&text) {
        debug!("Keeping UTF-8 despite malformed sequences");
        return finish(text.into_owned(), UTF_8);
    }
    if primary != WINDOWS_1252 {
        let (alt, alt_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
        if !alt_errors {
            debug!("Re-decoded document as {} (tried {})", WINDOWS_1252.name(), primary.name());
            return finish(alt.into_owned(), WINDOWS_1252);
        }
    }
    finish(text.into_owned(), primary)
}

/// Whether lossily decoded UTF-8 has more well-formed non-ASCII characters
/// than malformed sequences
fn mostly_utf8(text: &str) -> bool {
    let (mut valid, mut malformed) = (0usize, 0usize);
    for c in text.chars().filter(|c| !c.is_ascii()) {
        if c == '\u{FFFD}' {
            malformed += 1;
        } else {
            valid += 1;
        }
    }
    valid > malformed
}

fn finish(text: String, encoding: &'static Encoding) -> Result<Decoded, ParseError> {
    if looks_binary(&text) {
        return Err(ParseError::DecodeFailed(encoding.name().to_string()));
    }
    Ok(Decoded { text, encoding })
}

fn looks_binary(text: &str) -> bool {
    let mut total = 0usize;
    let mut garbage = 0usize;
    for c in text.chars().take(8192) {
        total += 1;
        if c == '\u{FFFD}' || (c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\u{c}')) {
            garbage += 1;
        }
    }
    total > 0 && garbage as f64 / total as f64 > MAX_GARBAGE_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_utf8() {
        let decoded = decode("héllo".as_bytes(), None, true).unwrap();
        assert_eq!(decoded.text, "héllo");
        assert_eq!(decoded.encoding, UTF_8);
    }

    #[test]
    fn test_bom_wins() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("café".as_bytes());
        let decoded = decode(&bytes, Some("iso-8859-1"), true).unwrap();
        assert_eq!(decoded.text, "café");
        assert_eq!(decoded.encoding, UTF_8);
    }

    #[test]
    fn test_declared_charset_used() {
        // "café" in latin-1
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        let decoded = decode(&bytes, Some("ISO-8859-1"), false).unwrap();
        assert_eq!(decoded.text, "café");
    }

    #[test]
    fn test_redecodes_when_declared_disagrees_with_meta() {
        let mut bytes = b"<html><head><meta charset=\"windows-1252\"></head><body>caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</body></html>");
        let decoded = decode(&bytes, Some("utf-8"), true).unwrap();
        assert!(decoded.text.contains("café"));
        assert_eq!(decoded.encoding, WINDOWS_1252);
    }

    #[test]
    fn test_utf8_payload_wins_over_latin1_header() {
        let bytes = "<html><head><meta charset=\"utf-8\"></head><body>café naïve</body></html>".as_bytes();
        let decoded = decode(bytes, Some("iso-8859-1"), true).unwrap();
        assert!(decoded.text.contains("café naïve"));
        assert_eq!(decoded.encoding, UTF_8);
    }

    #[test]
    fn test_stray_byte_keeps_utf8() {
        let mut bytes = "café naïve résumé ".as_bytes().to_vec();
        bytes.push(0xFF);
        let decoded = decode(&bytes, None, true).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "café naïve résumé \u{FFFD}");
    }

    #[test]
    fn test_undeclared_latin1_falls_back() {
        // "café naïve" in latin-1
        let bytes = b"caf\xE9 na\xEFve";
        let decoded = decode(bytes, None, true).unwrap();
        assert_eq!(decoded.encoding, WINDOWS_1252);
        assert_eq!(decoded.text, "café naïve");
    }

    #[test]
    fn test_sniff_meta_http_equiv() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#;
        assert_eq!(sniff_meta_charset(html).map(|e| e.name()), Some("Shift_JIS"));
    }

    #[test]
    fn test_binary_payload_rejected() {
        let bytes: Vec<u8> = (0u8..32).cycle().take(512).collect();
        let err = decode(&bytes, None, false).unwrap_err();
        assert_eq!(err.kind(), "decode-failed");
    }
}
