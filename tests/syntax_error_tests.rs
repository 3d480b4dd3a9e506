#![allow(clippy::uninlined_format_args)]

use jsregexp::{ErrorKind, Regex};

#[track_caller]
fn test_1_error(pattern: &str, expected_err: &str) {
    let res = Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);

    let err = res.err().unwrap().text;
    assert!(
        err.contains(expected_err),
        "Error text '{}' did not contain '{}' for pattern '{}'",
        err,
        expected_err,
        pattern
    );
}

#[track_caller]
fn test_1_kind(pattern: &str, kind: ErrorKind, position: usize) {
    match Regex::new(pattern) {
        Ok(_) => panic!("Pattern should not have parsed: {}", pattern),
        Err(err) => {
            assert_eq!(err.kind, kind, "wrong kind for pattern '{}'", pattern);
            assert_eq!(err.position, position, "wrong position for pattern '{}'", pattern);
        }
    }
}

#[test]
fn test_excessive_capture_groups() {
    let mut captures = String::from("s");
    for _ in 0..65536 {
        captures.push_str("(x)");
    }
    test_1_error(captures.as_str(), "Capture group count limit exceeded");
}

#[test]
fn test_syntax_errors() {
    test_1_error(r"*", "Nothing to repeat");
    test_1_error(r"+a", "Nothing to repeat");
    test_1_error(r"?", "Nothing to repeat");
    test_1_error(r"{3,5}", "Nothing to repeat");
    test_1_error(r"a|*", "Nothing to repeat");
    test_1_error(r"x**", "Invalid quantifier *");
    test_1_error(r"x+*", "Invalid quantifier *");
    test_1_error(r"x{5,3}", "Invalid quantifier {5,3}");
    test_1_error(r"a{0}", "Invalid quantifier {0}");
    test_1_error(r"a{0,0}", "Invalid quantifier {0,0}");
    test_1_error(r"a{70000}", "Quantifier count too large {70000}");
    test_1_error(r"a{1,65536}", "Quantifier count too large");
    test_1_error(r"a{2", "Unterminated quantifier {2");
    test_1_error(r"a{2,", "Unterminated quantifier");

    test_1_error(r"[abc", "Unterminated character class [abc");
    test_1_error(r"[abc\", "Unterminated character class");
    test_1_error(r"[z-a]", "Invalid character range in [z-a]");

    test_1_error(r"(", "Unterminated group");
    test_1_error(r"(?!", "Unterminated group");
    test_1_error(r"(?:a|b", "Unterminated group");
    test_1_error(r"abc)", "Unmatched ')'");
    test_1_error(r"(a))", "Unmatched ')'");

    test_1_error("\\", "Trailing backslash");
    test_1_error("abc\\", "Trailing backslash");

    test_1_error("^*", "follows an assertion");
    test_1_error("$+", "follows an assertion");
    test_1_error(r"\b{3}", "follows an assertion");
    test_1_error("(?=abc)*", "follows an assertion");
    test_1_error("(?!abc){3,}", "follows an assertion");

    test_1_error("(?q:abc)", "Invalid group (?q");
    test_1_error("(?<=a)b", "Invalid group");
    test_1_error("(?<name>a)", "Invalid group");
    test_1_error(r"\99999999999", "too large");
}

#[test]
fn test_error_positions() {
    test_1_kind("*", ErrorKind::NothingToRepeat, 0);
    test_1_kind("ab|?", ErrorKind::NothingToRepeat, 3);
    test_1_kind("x**", ErrorKind::BadQuantifier, 2);
    test_1_kind("ab{5,3}", ErrorKind::BadQuantifier, 2);
    test_1_kind("a{70000}", ErrorKind::QuantifierOverflow, 1);
    test_1_kind("a{2", ErrorKind::UnterminatedQuantifier, 1);
    test_1_kind("ab[cd", ErrorKind::UnterminatedClass, 2);
    test_1_kind("a(b(c)", ErrorKind::UnterminatedGroup, 1);
    test_1_kind("ab)", ErrorKind::UnmatchedParen, 2);
    test_1_kind("a(?q)", ErrorKind::InvalidGroup, 1);
    test_1_kind("a[bz-a]", ErrorKind::BadRange, 3);
    test_1_kind("ab\\", ErrorKind::TrailingBackslash, 2);
    test_1_kind("x^+", ErrorKind::NothingToRepeat, 2);
    // Positions count UTF-16 code units.
    test_1_kind("\u{1F600}**", ErrorKind::BadQuantifier, 3);
}

#[test]
fn test_lenient_syntax() {
    // Constructs other engines reject but ES3 runtimes accept.
    for pattern in [
        "]", "}", "{", "a{", "a{,5}", "x{y}", "[]", "[^]", r"\1(a)", r"\8", r"\c", r"\c1", r"\x",
        r"\u12", r"\q", "[a-]", "[-a]", r"[\d-z]",
    ] {
        assert!(Regex::new(pattern).is_ok(), "Pattern should have parsed: {}", pattern);
    }
}

#[test]
fn test_flag_errors() {
    let err = Regex::with_flags("a", "gx").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidFlag);
    assert_eq!(err.position, 1);
    assert!(err.text.contains("Invalid flag 'x'"), "{}", err.text);

    assert_eq!(
        Regex::with_flags("a", "u").unwrap_err().kind,
        ErrorKind::InvalidFlag
    );
    assert_eq!(
        Regex::with_flags("a", "s").unwrap_err().kind,
        ErrorKind::InvalidFlag
    );
    assert!(Regex::with_flags("a", "gg").is_ok());
    assert!(Regex::with_flags("a", "").is_ok());
}

#[test]
fn test_error_display() {
    let err = Regex::new("a{2,1}").unwrap_err();
    assert!(err.to_string().contains("Invalid quantifier {2,1}"), "{}", err);
}
