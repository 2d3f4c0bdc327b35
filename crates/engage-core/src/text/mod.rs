//! Comment text heuristics: normalization, fingerprints, link counting

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://\S+|www\.\S+)").expect("valid regex")
});

/// Canonical form used for duplicate detection.
///
/// Decomposes, drops diacritics and punctuation, lowercases, and collapses
/// runs of whitespace to a single space.
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hex SHA-256 of the normalized text
pub fn text_fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(normalize_text(text).as_bytes()))
}

/// Number of link-like substrings (`http://`, `https://`, `www.`)
pub fn count_links(text: &str) -> usize {
    LINK_RE.find_iter(text).count()
}

/// Salted digest of a client address. The raw address never leaves this function.
pub fn hash_ip(salt: &str, ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(ip.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Length in characters, after trimming
pub fn text_length(text: &str) -> usize {
    text.trim().chars().count()
}
