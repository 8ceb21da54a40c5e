use icu_normalizer::ComposingNormalizerBorrowed;

/// Canonical comparison form for typed or chosen answers: NFC, trimmed,
/// inner whitespace collapsed, lowercased.
pub fn normalize(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    let composed = nfc.normalize(text.trim());
    composed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
