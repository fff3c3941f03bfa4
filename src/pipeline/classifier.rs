//! Content classifier — link detection and banned-word matching.
//!
//! Two independent detectors; either one flags a message. Both run before
//! any punishment is issued and neither has side effects.
//!
//! Link detection is layered: platform URL annotations first, then literal
//! keyword probes, then skeleton probes that survive spacing/dotting/
//! repetition obfuscation, then a guarded suffix heuristic. The skeleton
//! layers trade precision for recall on purpose; the tables below are the
//! single place to re-tune them.

use crate::pipeline::normalize::{normalize, skeleton};

/// Literal substrings that mark a link in lowercased text.
const URL_KEYWORDS: &[&str] = &[
    "http://", "https://", "www.", ".com", ".ir", ".net", ".org", "t.me", "bit.ly",
];

/// Known top-level domains / extensions, skeleton form.
const EXTENSIONS: &[&str] = &[
    "com", "ir", "net", "org", "xyz", "tk", "info", "io", "me", "site",
];

/// Frequently-advertised site names, skeleton form.
const KNOWN_SITES: &[&str] = &[
    "google", "youtube", "instagram", "telegram", "whatsapp", "sex", "porn", "xxx",
];

/// Bare protocol/host prefixes, skeleton form.
const PREFIXES: &[&str] = &["http", "https", "www", "tme"];

/// Punctuation that gates the suffix heuristic: a skeleton ending in an
/// extension only counts as a link when the raw text carried at least one
/// of these separators.
const LINK_SYMBOLS: &[char] = &['.', '/', ',', '\\', '_'];

/// Decide whether a message contains a link.
///
/// `has_url_entity` is true when the platform attached a URL/text-link
/// annotation to the text or caption; that check short-circuits everything
/// else.
pub fn has_link(text: &str, has_url_entity: bool) -> bool {
    if has_url_entity {
        return true;
    }

    let lower = text.to_lowercase();
    if URL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    let skel = skeleton(&lower);
    for site in KNOWN_SITES {
        for ext in EXTENSIONS {
            if skel.contains(&format!("{site}{ext}")) {
                return true;
            }
        }
    }
    if PREFIXES.iter().any(|p| skel.contains(p)) {
        return true;
    }

    // Suffix heuristic: "site ee . com" style. The length guard keeps a
    // bare word that merely ends like an extension ("com") from matching.
    if lower.contains(LINK_SYMBOLS) {
        for ext in EXTENSIONS {
            if skel.ends_with(ext) && skel.len() > ext.len() + 2 {
                return true;
            }
        }
    }

    false
}

/// Find the first configured banned word present in `text`.
///
/// A word matches on its literal lowercased form, or on its normalized form
/// against the normalized text (defeats repetition and punctuation tricks).
/// Iteration order decides which word is reported, not whether one is.
pub fn find_banned<'a>(text: &str, words: &'a [String]) -> Option<&'a str> {
    if words.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    let canonical = normalize(text);
    for word in words {
        let word_lower = word.to_lowercase();
        if lower.contains(&word_lower) {
            return Some(word);
        }
        let word_canonical = normalize(word);
        if !word_canonical.is_empty() && canonical.contains(&word_canonical) {
            return Some(word);
        }
    }
    None
}
