//! Text canonicalization for obfuscation-resistant matching.
//!
//! Spammers dodge literal matching with punctuation insertion and character
//! repetition ("Sp.a.m", "spaaam"). Both transforms here are pure and O(n):
//! lowercase, drop everything outside the accepted alphabets, collapse runs
//! of the same character.

/// Letters of the Arabic/Persian Unicode block.
fn is_persian(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// Reduce text to its canonical comparable form.
///
/// Keeps ASCII alphanumerics and Persian letters, collapses consecutive
/// repeats, lowercased. Lowercasing happens before the collapse so the
/// function is idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars().flat_map(char::to_lowercase) {
        if !(c.is_ascii_alphanumeric() || is_persian(c)) {
            continue;
        }
        if prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Strip text down to a bare lowercase ASCII-letter skeleton with repeats
/// collapsed. Used by the link detector to catch spaced-out or dotted URLs.
pub fn skeleton(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if !c.is_ascii_alphabetic() {
            continue;
        }
        let c = c.to_ascii_lowercase();
        if prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}
