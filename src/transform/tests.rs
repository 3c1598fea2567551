use proptest::prelude::*;

use super::core::*;
use crate::filter;

/// Helper: expand `input` and return the surviving candidates as strings.
fn expand(input: &str, ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let opts = TransformOptions {
        ngram_min,
        ngram_max,
        ..TransformOptions::default()
    };
    let mut out = Vec::new();
    expand_chunk(input.as_bytes(), &opts, &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn strips_control_and_non_ascii_bytes() {
    assert_eq!(strip_nonprintable(b"pass\x00\x01word\t\r"), "password");
    assert_eq!(strip_nonprintable("pässword".as_bytes()), "pssword");
    assert_eq!(strip_nonprintable(b"keep space"), "keep space");
}

#[test]
fn merges_multi_word_lines() {
    assert_eq!(merge_words("hello world"), "HelloWorld");
    assert_eq!(merge_words("one two three"), "OneTwoThree");
    assert_eq!(merge_words("single"), "single");
    assert_eq!(merge_words("double  space"), "DoubleSpace");
}

#[test]
fn normalize_lowercases_then_merges() {
    assert_eq!(normalize("HELLO WORLD"), "HelloWorld");
    assert_eq!(normalize("MiXeD"), "mixed");
}

#[test]
fn single_word_unigram_is_identity_modulo_punctuation() {
    assert_eq!(ngrams("password", 1, 1), vec!["password"]);
    assert_eq!(ngrams("pass.word;", 1, 1), vec!["password"]);
    assert_eq!(ngrams("  padded  ", 1, 1), vec!["padded"]);
}

#[test]
fn ngram_expansion_covers_all_spans() {
    assert_eq!(
        ngrams("a b c", 1, 3),
        vec!["a", "b", "c", "a b", "b c", "a b c"]
    );
    // window larger than the line yields nothing extra
    assert_eq!(ngrams("a b", 3, 5), Vec::<String>::new());
    assert_eq!(ngrams("", 1, 5), Vec::<String>::new());
}

#[test]
fn digit_trims() {
    assert_eq!(trim_trailing_digits("password123"), "password");
    assert_eq!(trim_leading_digits("123password"), "password");
    assert_eq!(trim_leading_digits(trim_trailing_digits("12pass34")), "pass");
    assert_eq!(trim_trailing_digits("1234"), "");
    assert_eq!(trim_leading_digits(""), "");
}

#[test]
fn expands_plain_passwords() {
    assert_eq!(expand("password123\n", 1, 1), vec!["password"]);
    assert_eq!(expand("hunter2\n", 1, 1), vec!["hunter"]);
    assert_eq!(expand("123hunter2\n", 1, 1), vec!["hunter"]);
}

#[test]
fn expands_phrases_into_merged_ngrams() {
    // "horse" is expanded but falls to the denylist length rule (<= 5)
    assert_eq!(
        expand("correct horse battery\n", 1, 2),
        vec!["correct", "battery", "CorrectHorse", "HorseBattery"]
    );
}

#[test]
fn refilters_after_digit_trimming() {
    // "12345hello" passes the first filter, but the trimmed "hello" is five
    // characters and falls to the denylist length rule on the re-check.
    assert_eq!(expand("12345hello\n", 1, 1), Vec::<String>::new());
}

#[test]
fn enforces_length_bounds() {
    let long = "a".repeat(33);
    assert_eq!(expand(&format!("{long}\n"), 1, 1), Vec::<String>::new());

    let max = format!("br{}\n", "a".repeat(30));
    assert_eq!(expand(&max, 1, 1), vec![max.trim().to_string()]);
}

#[test]
fn drops_junk_lines() {
    assert_eq!(expand("123456\n", 1, 1), Vec::<String>::new());
    assert_eq!(expand("!!!###\n", 1, 1), Vec::<String>::new());
    assert_eq!(expand("\n\n\n", 1, 1), Vec::<String>::new());
    assert_eq!(expand("mygmailpass\n", 1, 1), Vec::<String>::new());
}

#[test]
fn tolerates_invalid_utf8_and_control_bytes() {
    let mut input = b"pass\xffword\n".to_vec();
    input.extend_from_slice(b"ok\x07maybe\n");
    let opts = TransformOptions::default();
    let mut out = Vec::new();
    let written = expand_chunk(&input, &opts, &mut out).unwrap();
    assert_eq!(written, 2);
    assert_eq!(String::from_utf8(out).unwrap(), "password\nokmaybe\n");
}

#[test]
fn final_line_without_newline_is_processed() {
    assert_eq!(expand("password123", 1, 1), vec!["password"]);
}

proptest! {
    #[test]
    fn digit_trimming_is_idempotent(s in ".*") {
        let once = trim_leading_digits(trim_trailing_digits(&s)).to_string();
        let twice = trim_leading_digits(trim_trailing_digits(&once)).to_string();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_output_is_a_bounded_quality_candidate(
        input in proptest::collection::vec(any::<u8>(), 0..2048)
    ) {
        let opts = TransformOptions::default();
        let mut out = Vec::new();
        expand_chunk(&input, &opts, &mut out).unwrap();
        for line in out.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            prop_assert!((4..=32).contains(&line.len()));
            let s = std::str::from_utf8(line).unwrap();
            prop_assert!(filter::is_quality_candidate(s));
        }
    }
}
