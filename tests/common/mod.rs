#![allow(clippy::uninlined_format_args)]

use jsregexp::{Config, ErrorKind, Flags, RegExpStatics, Regex};

/// Test that \p pattern fails to parse with default flags.
pub fn test_parse_fails(pattern: &str) {
    let res = Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Test that \p pattern fails to parse with flags.
pub fn test_parse_fails_flags(pattern: &str, flags: &str) {
    let res = Regex::with_flags(pattern, flags);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// \return the kind and position of the error from parsing \p pattern.
#[track_caller]
pub fn parse_error(pattern: &str) -> (ErrorKind, usize) {
    match Regex::new(pattern) {
        Ok(_) => panic!("Pattern should not have parsed: {}", pattern),
        Err(err) => (err.kind, err.position),
    }
}

/// Format a Match by inserting commas between all capture groups.
fn format_match(r: &jsregexp::Match, input: &str) -> String {
    let mut result = input[r.range()].to_string();
    for cg in r.captures.iter() {
        result.push(',');
        if let Some(cg) = cg {
            result.push_str(&input[cg.clone()])
        }
    }
    result
}

/// Encode a string as UTF16.
pub fn to_utf16(input: &str) -> Vec<u16> {
    input.encode_utf16().collect()
}

/// Given a range of a string encoded as UTF16, return the corresponding
/// range in the original string (UTF-8).
pub fn range_from_utf16(utf16: &[u16], r: jsregexp::Range) -> jsregexp::Range {
    use std::char::decode_utf16;
    // Figure out start.
    let start_utf8: usize = decode_utf16(utf16[0..r.start].iter().copied())
        .map(|r| r.expect("Invalid UTF16").len_utf8())
        .sum();
    let len_utf8: usize = decode_utf16(utf16[r].iter().copied())
        .map(|r| r.expect("Invalid UTF16").len_utf8())
        .sum();
    start_utf8..(start_utf8 + len_utf8)
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that a Vec<&str> is equal to a
    /// Vec<&str>.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

impl VecTestHelpers for Vec<String> {
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// A regex compiled under a TestConfig.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: Regex,
}

impl TestCompiledRegex {
    /// The compiled regex.
    pub fn regex(&self) -> Regex {
        self.re.clone()
    }

    /// Search for self in \p input, returning a list of all matches.
    /// 'start' is given as the byte offset into the UTF8 string; the ranges
    /// of the matches are converted back to UTF8.
    #[track_caller]
    pub fn matches(&self, input: &str, start: usize) -> Vec<jsregexp::Match> {
        let u16_start = input[..start].chars().map(char::len_utf16).sum();
        let u16_input = to_utf16(input);
        let mut matches: Vec<_> = self.re.find_from(&u16_input[..], u16_start).collect();
        for matc in matches.iter_mut() {
            matc.range = range_from_utf16(&u16_input, matc.range());
            for r in matc.captures.iter_mut().flatten() {
                *r = range_from_utf16(&u16_input, r.clone());
            }
        }
        matches
    }

    /// Search for self in \p input, returning the first Match, or None if
    /// none.
    pub fn find(&self, input: &str) -> Option<jsregexp::Match> {
        self.matches(input, 0).into_iter().next()
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        match self.find(input) {
            Some(m) => format_match(&m, input),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the match as a Vec containing None
    /// for unmatched groups, or the matched strings.
    #[track_caller]
    pub fn match1_vec<'b>(&self, input: &'b str) -> Vec<Option<&'b str>> {
        let mut result = Vec::new();
        let m: jsregexp::Match = self.find(input).expect("Failed to match");
        result.push(Some(&input[m.range()]));
        for cr in m.captures {
            result.push(cr.map(|r| &input[r]));
        }
        result
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(self.find(input).is_none(), "Should not have matched")
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(self.find(input).is_some(), "Should have matched")
    }

    /// Return a list of all non-overlapping total match ranges from a given
    /// start.
    pub fn match_all_from(&self, input: &str, start: usize) -> Vec<jsregexp::Range> {
        self.matches(input, start)
            .into_iter()
            .map(move |m| m.range())
            .collect()
    }

    /// Return a list of all non-overlapping matches.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| &input[m.range()])
            .collect()
    }

    /// Collect all matches into a String, separated by commas.
    pub fn run_global_match(&self, input: &str) -> String {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| format_match(&m, input))
            .collect::<Vec<String>>()
            .join(",")
    }

    /// Replace against fresh registers.
    #[track_caller]
    pub fn replace(&self, input: &str, template: &str) -> String {
        let mut re = self.re.clone();
        re.replace(input, template, &mut RegExpStatics::new())
            .expect("replace failed")
    }

    /// Split against fresh registers.
    #[track_caller]
    pub fn split(&self, input: &str, limit: Option<usize>) -> Vec<String> {
        self.re
            .split(input, limit, &mut RegExpStatics::new())
            .expect("split failed")
    }

    /// Run exec repeatedly on a global regex until it fails, returning each
    /// formatted match and the lastIndex after it.
    #[track_caller]
    pub fn exec_all(&self, input: &str) -> Vec<(String, usize)> {
        assert!(self.re.global(), "exec_all needs a global regex");
        let mut re = self.re.clone();
        let mut statics = RegExpStatics::new();
        let mut result = Vec::new();
        while let Some(m) = re.exec(input, &mut statics).expect("exec failed") {
            result.push((m.as_string(), re.last_index()));
        }
        assert_eq!(re.last_index(), 0, "lastIndex not reset after failure");
        result
    }
}

/// Description of how to test a regex.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    // Whether to optimize.
    optimize: bool,
}

impl TestConfig {
    /// Compile a pattern to a regex, with default flags.
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        self.compilef(pattern, "")
    }

    /// Compile a pattern to a regex, with given flags.
    #[track_caller]
    pub fn compilef(&self, pattern: &str, flags_str: &str) -> TestCompiledRegex {
        self.compile_config(pattern, flags_str, Config::default())
    }

    /// Compile a pattern to a regex, with given flags and config.
    #[track_caller]
    pub fn compile_config(
        &self,
        pattern: &str,
        flags_str: &str,
        config: Config,
    ) -> TestCompiledRegex {
        let mut flags = Flags::parse(flags_str).expect("invalid flags");
        flags.no_opt = !self.optimize;

        let re = Regex::with_config(pattern, flags, config);
        assert!(
            re.is_ok(),
            "Failed to parse! flags: {} pattern: {}, error: {}",
            flags_str,
            pattern,
            re.unwrap_err()
        );
        TestCompiledRegex { re: re.unwrap() }
    }

    /// Test that \p pattern and \p flags successfully parses, and matches
    /// \p input.
    #[track_caller]
    pub fn test_match_succeeds(&self, pattern: &str, flags_str: &str, input: &str) {
        let cr = self.compilef(pattern, flags_str);
        cr.test_succeeds(input)
    }

    /// Test that \p pattern and \p flags successfully parses, and does not
    /// match \p input.
    #[track_caller]
    pub fn test_match_fails(&self, pattern: &str, flags_str: &str, input: &str) {
        let cr = self.compilef(pattern, flags_str);
        cr.test_fails(input)
    }
}

/// Invoke \p F with each test config, in turn.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    // Note we wish to be able to determine the TestConfig from the line number.
    func(TestConfig { optimize: false });
    func(TestConfig { optimize: true });
}
