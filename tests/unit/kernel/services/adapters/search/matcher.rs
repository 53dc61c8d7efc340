use super::*;
use crate::models::MatchInterval;

fn run(text: &str, pattern: &str, options: SearchOptions) -> Vec<(usize, usize)> {
    let compiled = CompiledPattern::compile(pattern, &options).unwrap();
    let cancelled = AtomicBool::new(false);
    scan_rope(&Rope::from_str(text), &compiled, &cancelled)
        .unwrap()
        .iter()
        .map(|m| (m.start, m.end))
        .collect()
}

fn assert_well_formed(intervals: &[(usize, usize)]) {
    for &(s, e) in intervals {
        assert!(e > s, "zero-length interval {s}..{e}");
    }
    for pair in intervals.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlap {:?}", pair);
    }
}

#[test]
fn test_literal_ababab() {
    let matches = run("ababab", "ab", SearchOptions::literal(false));
    assert_eq!(matches, vec![(0, 2), (2, 4), (4, 6)]);
}

#[test]
fn test_literal_non_overlapping() {
    let matches = run("aaaa", "aa", SearchOptions::literal(false));
    assert_eq!(matches, vec![(0, 2), (2, 4)]);
}

#[test]
fn test_literal_case_insensitive() {
    let matches = run("Hello HELLO hello", "hello", SearchOptions::literal(true));
    assert_eq!(matches, vec![(0, 5), (6, 11), (12, 17)]);
}

#[test]
fn test_literal_case_insensitive_unicode() {
    let matches = run("ÉCOLE école", "école", SearchOptions::literal(true));
    assert_eq!(matches, vec![(0, 5), (6, 11)]);
}

#[test]
fn test_literal_is_not_regex() {
    let matches = run("a.b axb", "a.b", SearchOptions::literal(false));
    assert_eq!(matches, vec![(0, 3)]);
}

#[test]
fn test_offsets_are_chars_not_bytes() {
    let matches = run("日本語 text 日本", "日本", SearchOptions::literal(false));
    assert_eq!(matches, vec![(0, 2), (9, 11)]);

    let matches = run("ü-x-ü-x", "x", SearchOptions::regex(false));
    assert_eq!(matches, vec![(2, 3), (6, 7)]);
}

#[test]
fn test_whole_word_boundary() {
    let matches = run("cat category cat", "cat", SearchOptions::whole_word(false));
    assert_eq!(matches, vec![(0, 3), (13, 16)]);
}

#[test]
fn test_whole_word_escapes_pattern() {
    let matches = run("a+b ab a+b", "a+b", SearchOptions::whole_word(false));
    assert_eq!(matches, vec![(0, 3), (7, 10)]);
}

#[test]
fn test_regex_multiline_anchors() {
    let matches = run("foo\nbar\nfoo", "^foo$", SearchOptions::regex(false));
    assert_eq!(matches, vec![(0, 3), (8, 11)]);
}

#[test]
fn test_regex_anchors_on_crlf_lines() {
    let matches = run("foo\r\nfoo\r\n", "foo$", SearchOptions::regex(false));
    assert_eq!(matches, vec![(0, 3), (5, 8)]);

    let matches = run("foo\r\nbar\r\n", "^bar$", SearchOptions::regex(false));
    assert_eq!(matches, vec![(5, 8)]);
}

#[test]
fn test_regex_case_flag() {
    assert_eq!(run("ABC abc", "abc", SearchOptions::regex(false)), vec![(4, 7)]);
    assert_eq!(
        run("ABC abc", "abc", SearchOptions::regex(true)),
        vec![(0, 3), (4, 7)]
    );
}

#[test]
fn test_regex_skips_zero_length_matches() {
    let matches = run("ab", "x*", SearchOptions::regex(false));
    assert!(matches.is_empty());

    let matches = run("aab", "a*", SearchOptions::regex(false));
    assert_eq!(matches, vec![(0, 2)]);
}

#[test]
fn test_regex_match_at_text_end_terminates() {
    let matches = run("xx yy", r"\w+", SearchOptions::regex(false));
    assert_eq!(matches, vec![(0, 2), (3, 5)]);
}

#[test]
fn test_results_are_well_formed() {
    let text = "the quick brown fox jumps over the lazy dog ".repeat(50);
    for (pattern, options) in [
        ("o", SearchOptions::literal(false)),
        ("THE", SearchOptions::literal(true)),
        ("the", SearchOptions::whole_word(false)),
        (r"\w*o\w*", SearchOptions::regex(false)),
        (r"\s*", SearchOptions::regex(false)),
    ] {
        let matches = run(&text, pattern, options);
        assert!(!matches.is_empty(), "{pattern}");
        assert_well_formed(&matches);
    }
}

#[test]
fn test_compile_rejects_empty_pattern() {
    let err = CompiledPattern::compile("", &SearchOptions::literal(false)).unwrap_err();
    assert_eq!(err, SearchError::EmptyPattern);
}

#[test]
fn test_compile_rejects_bad_regex() {
    let err = CompiledPattern::compile("[invalid", &SearchOptions::regex(false)).unwrap_err();
    assert!(matches!(err, SearchError::RegexSyntax(_)));

    // only regex mode interprets metacharacters
    assert!(CompiledPattern::compile("[invalid", &SearchOptions::literal(true)).is_ok());
    assert!(CompiledPattern::compile("[invalid", &SearchOptions::whole_word(false)).is_ok());
}

#[test]
fn test_cancelled_scan_returns_abort() {
    let compiled = CompiledPattern::compile("a", &SearchOptions::literal(false)).unwrap();
    let cancelled = AtomicBool::new(true);
    let result = scan_str("aaaa", &compiled, &cancelled);
    assert_eq!(result, Err(ScanAbort::Cancelled));
}

#[test]
fn test_scan_str_matches_store_ordering() {
    let compiled = CompiledPattern::compile("b", &SearchOptions::literal(false)).unwrap();
    let cancelled = AtomicBool::new(false);
    let store = scan_str("abcb", &compiled, &cancelled).unwrap();
    assert_eq!(store.get(1), Some(MatchInterval::new(3, 4)));
    assert_eq!(store.index_of(1, 2), Some(0));
}
