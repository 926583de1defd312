//! Character encoding resolution for text files of unknown provenance
//!
//! Resolution runs a statistical detector first and trusts its guess only
//! above a confidence threshold; below it, a fixed ladder of common
//! encodings is tried in order. Decoding itself never fails: undecodable
//! sequences are replaced so a malformed file degrades instead of aborting
//! ingestion.

use encoding_rs::{Encoding, UTF_8};

/// Minimum detector confidence required to trust its guess
const CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Encodings tried in order when statistical detection is inconclusive:
/// UTF-8, two legacy Chinese encodings, Big5, then Windows-1252 (which
/// accepts any byte sequence).
const FALLBACK_LABELS: [&str; 5] = ["utf-8", "gbk", "gb2312", "big5", "windows-1252"];

/// Pick the encoding to decode `bytes` with.
///
/// Pure function of the input bytes; always yields a usable encoding.
pub fn resolve_encoding(bytes: &[u8]) -> &'static Encoding {
    let (label, confidence, _language) = chardet::detect(bytes);

    if confidence >= CONFIDENCE_THRESHOLD {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return encoding;
        }
    }

    fallback_encoding(bytes).unwrap_or(UTF_8)
}

/// First ladder encoding that decodes `bytes` without error
pub fn fallback_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    FALLBACK_LABELS
        .iter()
        .filter_map(|label| Encoding::for_label(label.as_bytes()))
        .find(|encoding| {
            encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .is_some()
        })
}

/// Decode raw bytes into text, never failing.
///
/// Malformed sequences under the resolved encoding are replaced with
/// U+FFFD. Returns the decoded text and the name of the encoding actually
/// used (BOM sniffing may override the resolved one).
pub fn decode_bytes(bytes: &[u8]) -> (String, &'static str) {
    let encoding = resolve_encoding(bytes);
    let (text, actual, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), actual.name())
}
