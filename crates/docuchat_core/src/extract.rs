//! crates/docuchat_core/src/extract.rs
//!
//! Converts uploaded bytes plus a declared media type into plain text.
//! Plain-text-like types are decoded directly; everything else degrades
//! silently to a fixed placeholder (no real PDF/DOCX parsing is wired up).

/// Media types whose bytes are treated as UTF-8 text.
const PLAIN_TEXT_TYPES: [&str; 3] = ["text/plain", "text/markdown", "application/json"];

/// Extracts plain text from `bytes` according to the declared `media_type`.
///
/// Never fails: undecodable byte sequences are replaced lossily, and
/// unsupported media types produce placeholder content rather than an error.
pub fn extract_text(bytes: &[u8], media_type: &str) -> String {
    if PLAIN_TEXT_TYPES.contains(&media_type) {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    format!(
        "Extracted text from {} file.\n\
         This is placeholder content; a dedicated parser for this media type \
         is not part of this service.\n\
         Plain-text, markdown, and JSON uploads are decoded directly.",
        media_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through_unchanged() {
        assert_eq!(extract_text(b"hello world", "text/plain"), "hello world");
    }

    #[test]
    fn markdown_and_json_decode_directly() {
        assert_eq!(extract_text(b"# Title", "text/markdown"), "# Title");
        assert_eq!(extract_text(b"{\"a\":1}", "application/json"), "{\"a\":1}");
    }

    #[test]
    fn invalid_utf8_decodes_lossily() {
        let text = extract_text(&[0x68, 0x69, 0xff], "text/plain");
        assert!(text.starts_with("hi"));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn unsupported_type_yields_placeholder_naming_the_type() {
        let text = extract_text(b"%PDF-1.4", "application/pdf");
        assert!(text.contains("application/pdf"));
        assert!(text.contains("placeholder"));
    }
}
