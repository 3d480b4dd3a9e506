use jsregexp::{RegExpStatics, Regex};

fn replace(pattern: &str, flags: &str, text: &str, template: &str) -> String {
    let mut re = Regex::with_flags(pattern, flags).unwrap();
    re.replace(text, template, &mut RegExpStatics::new())
        .unwrap()
}

#[test]
fn test_replace_basic() {
    assert_eq!(replace("world", "", "hello world", "universe"), "hello universe");
}

#[test]
fn test_replace_no_match() {
    assert_eq!(replace("xyz", "", "hello world", "universe"), "hello world");
}

#[test]
fn test_replace_with_capture_groups() {
    assert_eq!(replace(r"(\w+)\s+(\w+)", "", "hello world", "$2 $1"), "world hello");
}

#[test]
fn test_replace_date_format() {
    assert_eq!(
        replace(r"(\d+)-(\d+)-(\d+)", "", "2015-01-02", "$3/$2/$1"),
        "02/01/2015"
    );
    assert_eq!(
        replace(r"(\d{4})-(\d{2})-(\d{2})", "", "2023-12-25", "$2/$3/$1"),
        "12/25/2023"
    );
}

#[test]
fn test_replace_with_literal_dollar() {
    assert_eq!(replace("a", "", "ab", "$$"), "$b");
    assert_eq!(replace(r"\d+", "", "Price: 123", "$$0"), "Price: $0");
    assert_eq!(replace(r"\w+", "", "hello", "test$"), "test$");
}

#[test]
fn test_replace_group_zero_is_literal() {
    assert_eq!(replace(r"\d+", "", "Price: 123", "[$0]"), "Price: [$0]");
    assert_eq!(replace(r"(\w)(\w)(\w)", "", "abc", "$3$2$1$0"), "cba$0");
}

#[test]
fn test_replace_nonexistent_group() {
    assert_eq!(replace(r"(\w+)", "", "hello", "$1 $2 $3"), "hello $2 $3");
    // Only the first digit names a group when two digits would not.
    assert_eq!(replace(r"(\w+)", "", "hello", "$10"), "hello0");
    assert_eq!(replace(r"(\w+)", "", "hello", "$999"), "$999");
}

#[test]
fn test_replace_two_digit_groups() {
    let pattern = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
    assert_eq!(replace(pattern, "", "abcdefghijk", "$11$10$1"), "kja");
    assert_eq!(replace(pattern, "", "abcdefghijk", "$012"), "a2");
    assert_eq!(replace(pattern, "", "abcdefghijk", "$12"), "a2");
}

#[test]
fn test_replace_registers() {
    assert_eq!(replace("b", "", "abc", "[$&]"), "a[b]c");
    assert_eq!(replace("b", "", "abc", "[$`]"), "a[a]c");
    assert_eq!(replace("b", "", "abc", "[$']"), "a[c]c");
    assert_eq!(replace("(b)(c)?", "", "abd", "[$+]"), "a[b]d");
    assert_eq!(replace("(b)(c)", "", "abcd", "[$+]"), "a[c]d");
    // $` and $' are relative to the whole subject for each match.
    assert_eq!(replace(r"\d", "g", "a1b2", "<$`>"), "a<a>b<a1b>");
    assert_eq!(replace(r"\d", "g", "a1b2", "<$'>"), "a<b2>b<>");
}

#[test]
fn test_replace_all_basic() {
    assert_eq!(replace(r"\d+", "g", "a1b2c3", "X"), "aXbXcX");
    assert_eq!(
        replace(r"(\w+)\s+(\w+)", "g", "hello world foo bar", "$2-$1"),
        "world-hello bar-foo"
    );
    assert_eq!(replace(r"\b(\w)(\w+)", "g", "hello world", "$1.$2"), "h.ello w.orld");
}

#[test]
fn test_replace_all_empty_matches() {
    assert_eq!(replace("x*", "g", "ab", "-"), "-a-b-");
    assert_eq!(replace("a*", "g", "baaac", "-"), "-b--c-");
    assert_eq!(replace("", "g", "", "-"), "-");
    assert_eq!(replace(r"(?=\d)", "", "a1b2c", "X"), "aX1b2c");
    assert_eq!(replace(r"(?=\d)", "g", "a1b2c", "X"), "aX1bX2c");
}

#[test]
fn test_replace_global_ignores_last_index() {
    let mut statics = RegExpStatics::new();
    let mut re = Regex::with_flags("a", "g").unwrap();
    re.set_last_index(2);
    let result = re.replace("aaa", "b", &mut statics).unwrap();
    assert_eq!(result, "bbb");
    assert_eq!(re.last_index(), 0);

    // A non-global replace leaves lastIndex alone.
    let mut re = Regex::new("a").unwrap();
    re.set_last_index(2);
    let result = re.replace("aaa", "b", &mut statics).unwrap();
    assert_eq!(result, "baa");
    assert_eq!(re.last_index(), 2);
}

#[test]
fn test_replace_updates_statics() {
    let mut statics = RegExpStatics::new();
    let mut re = Regex::with_flags(r"(\d)", "g").unwrap();
    re.replace("a1b2c", "#", &mut statics).unwrap();
    assert_eq!(statics.last_match().to_string(), "2");
    assert_eq!(statics.paren(1).to_string(), "2");
    assert_eq!(statics.left_context().to_string(), "a1b");
    assert_eq!(statics.right_context().to_string(), "c");
}

#[test]
fn test_replace_with_closure() {
    let mut statics = RegExpStatics::new();
    let mut re = Regex::new(r"\d+").unwrap();
    let result = re
        .replace_with("Price: $123", &mut statics, |args| {
            let num: i32 = args.matched.to_string().parse().unwrap();
            format!("{}", num * 2)
        })
        .unwrap();
    assert_eq!(result, "Price: $246");

    let mut re = Regex::with_flags(r"\d+", "g").unwrap();
    let result = re
        .replace_with("Items: 5, 10, 15", &mut statics, |args| {
            let num: i32 = args.matched.to_string().parse().unwrap();
            format!("[{}]", num * 10)
        })
        .unwrap();
    assert_eq!(result, "Items: [50], [100], [150]");
}

#[test]
fn test_replace_closure_arguments() {
    let mut statics = RegExpStatics::new();
    let mut re = Regex::with_flags(r"(\w)(\d)?", "g").unwrap();
    let mut seen = Vec::new();
    let result = re
        .replace_with("a1 b", &mut statics, |args| {
            seen.push((
                args.matched.to_string(),
                args.group(1).map(|s| s.to_string()),
                args.group(2).map(|s| s.to_string()),
                args.offset,
            ));
            assert_eq!(args.subject.to_string(), "a1 b");
            String::from("_")
        })
        .unwrap();
    assert_eq!(result, "_ _");
    assert_eq!(
        seen,
        vec![
            ("a1".to_string(), Some("a".to_string()), Some("1".to_string()), 0),
            ("b".to_string(), Some("b".to_string()), None, 3),
        ]
    );
}

#[test]
fn test_replace_email() {
    assert_eq!(
        replace(r"(\w+)@(\w+)\.(\w+)", "", "Contact: user@example.com", "$1 at $2 dot $3"),
        "Contact: user at example dot com"
    );
}

#[test]
fn test_replace_backreferences() {
    assert_eq!(replace(r"(\w+)\s+\1", "", "hello hello world", "[$1]"), "[hello] world");
}

#[test]
fn test_replace_case_insensitive() {
    assert_eq!(replace(r"(\w+)", "i", "Hello WORLD", "[$1]"), "[Hello] WORLD");
    assert_eq!(replace("o", "gi", "fOo bOO", "0"), "f00 b00");
}

#[test]
fn test_complex_replacement() {
    assert_eq!(
        replace(
            r"(\d{1,2})/(\d{1,2})/(\d{4})",
            "g",
            "Born on 12/25/1990 and graduated on 5/15/2012",
            "$3-$1-$2"
        ),
        "Born on 1990-12-25 and graduated on 2012-5-15"
    );
}

#[test]
fn test_replace_non_ascii() {
    assert_eq!(replace("\u{e9}", "g", "\u{e9}t\u{e9}", "e"), "ete");
    assert_eq!(replace("(.)(.)", "", "\u{1F600}!", "$2$1"), "\u{fffd}\u{fffd}!");
    assert_eq!(replace("b", "", "\u{1F600}b", "[$`]"), "\u{1F600}[\u{1F600}]");
}
