use std::io::{self, Write};

use crate::filter;

/// Tunables for the expansion/normalization stage.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Inclusive word-window range for n-gram expansion.
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Candidate length bounds, inclusive.
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 5,
            min_len: 4,
            max_len: 32,
        }
    }
}

/// Strip everything outside printable ASCII (space through `~`). NUL,
/// newline, tab, CR, FF, VT and all multibyte sequences fall out bytewise,
/// so the result is always pure ASCII.
pub fn strip_nonprintable(line: &[u8]) -> String {
    line.iter()
        .copied()
        .filter(|&b| b == b' ' || b.is_ascii_graphic())
        .map(char::from)
        .collect()
}

/// Title-case each space-separated word and join without spaces:
/// "hello world" -> "HelloWorld". Lines without whitespace pass through
/// untouched.
pub fn merge_words(line: &str) -> String {
    if !line.contains(' ') {
        return line.to_string();
    }
    let mut merged = String::with_capacity(line.len());
    for word in line.split_whitespace() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            merged.push(first.to_ascii_uppercase());
            merged.push_str(chars.as_str());
        }
    }
    merged
}

/// Normalize one expanded line: strip non-printables, lower-case, then merge
/// multi-word phrases into one CamelCase-like token.
pub fn normalize(line: &str) -> String {
    let mut clean = strip_nonprintable(line.as_bytes());
    clean.make_ascii_lowercase();
    merge_words(&clean)
}

/// Generate every contiguous k-word span of `line` for k in
/// `ngram_min..=ngram_max`, joined with single spaces, with `.` `,` `;`
/// removed and surrounding whitespace trimmed. Runs on the raw line, before
/// any casing normalization.
pub fn ngrams(line: &str, ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let mut grams = Vec::new();
    for k in ngram_min.max(1)..=ngram_max {
        for span in words.windows(k) {
            let joined = span.join(" ");
            let stripped: String = joined
                .chars()
                .filter(|c| !matches!(c, '.' | ',' | ';'))
                .collect();
            grams.push(stripped.trim().to_string());
        }
    }
    grams
}

/// Trim the leading run of ASCII digits.
pub fn trim_leading_digits(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// Trim the trailing run of ASCII digits.
pub fn trim_trailing_digits(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Expand one chunk of raw input through the n-gram, normalize and filter
/// chain, writing one surviving candidate per line to `out`. Returns the
/// number of candidates written.
///
/// The quality filter runs twice: once on the normalized candidate and again
/// after digit trimming and length enforcement, because trimming can change
/// the verdict in either direction.
pub fn expand_chunk(
    chunk: &[u8],
    opts: &TransformOptions,
    out: &mut impl Write,
) -> io::Result<u64> {
    let mut written = 0;
    let mut start = 0;
    for pos in memchr::memchr_iter(b'\n', chunk) {
        written += expand_line(&chunk[start..pos], opts, out)?;
        start = pos + 1;
    }
    if start < chunk.len() {
        written += expand_line(&chunk[start..], opts, out)?;
    }
    Ok(written)
}

fn expand_line(raw: &[u8], opts: &TransformOptions, out: &mut impl Write) -> io::Result<u64> {
    let raw = String::from_utf8_lossy(raw);
    let mut written = 0;
    for gram in ngrams(&raw, opts.ngram_min, opts.ngram_max) {
        let candidate = normalize(&gram);
        if !filter::is_quality_candidate(&candidate) {
            continue;
        }
        let trimmed = trim_leading_digits(trim_trailing_digits(&candidate));
        if !(opts.min_len..=opts.max_len).contains(&trimmed.len()) {
            continue;
        }
        if !filter::is_quality_candidate(trimmed) {
            continue;
        }
        out.write_all(trimmed.as_bytes())?;
        out.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}
