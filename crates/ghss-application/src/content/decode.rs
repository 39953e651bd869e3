//! Decoding (§4.C step 3): base64-decode remote content and reject
//! anything that isn't valid UTF-8 once decoded. Rejected files are
//! skipped, not fatal.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use ghss_domain::ports::RemoteContent;

/// Decode a single content entry to UTF-8 text, or `None` if it should be
/// skipped (base64 payload doesn't decode, or decoded bytes aren't valid
/// UTF-8).
pub fn decode(entry: &RemoteContent) -> Option<String> {
    if entry.encoding.eq_ignore_ascii_case("base64") {
        let bytes = STANDARD.decode(entry.content.replace('\n', "")).ok()?;
        String::from_utf8(bytes).ok()
    } else {
        Some(entry.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str, encoding: &str) -> RemoteContent {
        RemoteContent {
            path: "f.txt".to_string(),
            file_type: "file".to_string(),
            content: content.to_string(),
            size: content.len() as u64,
            encoding: encoding.to_string(),
        }
    }

    #[test]
    fn plain_utf8_passes_through() {
        assert_eq!(decode(&entry("hello", "utf-8")).unwrap(), "hello");
    }

    #[test]
    fn base64_decodes() {
        let b64 = STANDARD.encode("hello world");
        assert_eq!(decode(&entry(&b64, "base64")).unwrap(), "hello world");
    }

    #[test]
    fn non_utf8_after_decode_is_skipped() {
        let invalid = STANDARD.encode([0xFF, 0xFE, 0xFD]);
        assert!(decode(&entry(&invalid, "base64")).is_none());
    }
}
