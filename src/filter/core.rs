use std::sync::LazyLock;

use regex::Regex;

/// Patterns that mark a candidate as junk rather than a plausible password
/// word: common webmail/social domain fragments, URL prefixes, a loose
/// `@...net` form, HTML tag fragments, full email addresses, all-digit
/// strings, and anything of length <= 5.
static DENYLIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "(xiaonei|zomato|fbobh|fccdbbcdaa|yahoo|linkedin|gmail|yandex|hotmail)",
        "|http://",
        "|https://",
        "|@.*\\.net",
        "|<tr>|<div>|<a href|<p>|<img src",
        "|[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\\.[A-Za-z]{2,6}",
        "|^[0-9]+$",
        "|^.{0,5}$",
    ))
    .expect("denylist pattern compiles")
});

/// True iff `s` contains no alphabetic character (Unicode letter classes).
/// Used to reject pure digit/punctuation strings.
pub fn has_no_letters(s: &str) -> bool {
    !s.chars().any(char::is_alphabetic)
}

/// True iff every character of `s` is within the ASCII range.
pub fn is_ascii_only(s: &str) -> bool {
    s.is_ascii()
}

const VOWELS: &[u8] = b"aeiouAEIOU";

/// A 5-byte window qualifies when it holds at least one vowel and at most
/// one byte that is neither a vowel nor an ASCII letter.
fn window_is_word_like(window: &[u8]) -> bool {
    let mut has_vowel = false;
    let mut non_letters = 0;
    for &b in window {
        if VOWELS.contains(&b) {
            has_vowel = true;
        } else if !b.is_ascii_alphabetic() {
            non_letters += 1;
        }
    }
    has_vowel && non_letters <= 1
}

/// Cheap heuristic for "contains a plausible natural-language word
/// fragment": slide a 5-byte window across `s` and accept as soon as any
/// window qualifies. Tolerates one embedded digit/symbol per window; strings
/// shorter than 5 never qualify.
pub fn looks_like_a_word(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 5 {
        return false;
    }
    bytes.windows(5).any(window_is_word_like)
}

/// True when `s` does NOT match the denylist.
pub fn passes_denylist(s: &str) -> bool {
    !DENYLIST.is_match(s)
}

/// Composite acceptance rule shared by the ingestion path and the generation
/// pipeline: a candidate is kept only when every predicate agrees.
pub fn is_quality_candidate(s: &str) -> bool {
    !has_no_letters(s) && is_ascii_only(s) && looks_like_a_word(s) && passes_denylist(s)
}
