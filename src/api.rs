use crate::exec::{self, ExecError, ExecMode, Execution};
use crate::ir::Program;
use crate::parse::{self, ErrorKind};
use crate::replace::{self, Callback, ReplaceArgs, Template};
use crate::statics::RegExpStatics;
use crate::types::{Range, SubString, Subject};
use crate::util::{to_units, units_to_string};
use std::rc::Rc;
use std::{fmt, str::FromStr};

pub use parse::Error;

/// Flags used to control regex parsing.
/// The default flags are non-global, case-sensitive, not-multiline, and
/// optimizing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// If set, exec and test start at lastIndex and advance it, and replace
    /// replaces every match.
    /// Equivalent to the 'g' flag in JavaScript.
    pub global: bool,

    /// If set, make the regex case-insensitive.
    /// Equivalent to the 'i' flag in JavaScript.
    pub icase: bool,

    /// If set, ^ and $ match at line separators, not just the input boundaries.
    /// Equivalent to the 'm' flag in JavaScript.
    pub multiline: bool,

    /// If set, disable the compile-time fast paths: single character loops,
    /// literal lookahead, anchoring and the first character scan.
    pub no_opt: bool,
}

impl Flags {
    /// Construct a Flags from a Unicode codepoints iterator, using JavaScript
    /// field names. 'g' means global, 'i' means to ignore case, 'm' means
    /// multiline. Other characters are silently skipped.
    #[inline]
    pub fn new<T: Iterator<Item = u32>>(chars: T) -> Self {
        let mut result = Self::default();
        for c in chars {
            match char::from_u32(c).unwrap_or(char::MAX) {
                'g' => {
                    result.global = true;
                }
                'i' => {
                    result.icase = true;
                }
                'm' => {
                    result.multiline = true;
                }
                _ => {
                    // Silently skip unsupported flags.
                }
            }
        }
        result
    }

    /// Parse a JavaScript flag string. Duplicate flags are accepted; any
    /// character other than g, i or m is an error.
    pub fn parse(s: &str) -> Result<Flags, Error> {
        let mut position = 0;
        for c in s.chars() {
            if !matches!(c, 'g' | 'i' | 'm') {
                return Err(Error {
                    text: format!("Invalid flag '{}'", c),
                    position,
                    kind: ErrorKind::InvalidFlag,
                });
            }
            position += c.len_utf16();
        }
        Ok(Flags::from(s))
    }
}

impl From<&str> for Flags {
    /// Construct a Flags from a string, using JavaScript field names.
    ///
    /// See also: [`Flags::new`], and [`Flags::parse`] which rejects unknown
    /// flags.
    #[inline]
    fn from(s: &str) -> Self {
        Self::new(s.chars().map(u32::from))
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.icase {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        Ok(())
    }
}

/// How a decimal escape like \2 is told apart from an octal escape.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum BackrefMode {
    /// A backreference iff its value does not exceed the number of groups
    /// opened before it.
    #[default]
    Legacy,

    /// A backreference iff its value does not exceed the number of groups in
    /// the whole pattern.
    Ecma,
}

/// Where the left context register starts for a match.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LeftContextMode {
    /// Everything before the match.
    #[default]
    FromSubjectStart,

    /// Only the text between where the search started and the match. For
    /// global iteration this is the text since the previous match.
    FromSearchStart,
}

/// Per-pattern settings that are not expressible as JavaScript flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of pending backtrack entries and loop frames before an
    /// execution fails with [`ExecError::BacktrackLimitExceeded`]. This bounds
    /// the memory a single match may use.
    pub backtrack_limit: usize,

    pub backrefs: BackrefMode,

    pub left_context: LeftContextMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backtrack_limit: 1_000_000,
            backrefs: BackrefMode::default(),
            left_context: LeftContextMode::default(),
        }
    }
}

/// A Match represents a portion of a subject which was found to match a
/// Regex. Indexes are in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The total range of the match. Note this may be empty, if the regex
    /// matched an empty string.
    pub range: Range,

    /// The list of captures. This has length equal to the number of capturing
    /// groups in the regex. For each capture, if the value is None, that group
    /// did not match (for example, it was in a not-taken branch of an
    /// alternation). If the value is Some, the group did match with the
    /// enclosed range.
    pub captures: Vec<Option<Range>>,

    subject: Subject,
}

impl Match {
    pub(crate) fn new(range: Range, captures: Vec<Option<Range>>, subject: Subject) -> Match {
        Match {
            range,
            captures,
            subject,
        }
    }

    /// Access a group by index, using the convention of Python's group()
    /// function. Index 0 is the total match, index 1 is the first capture
    /// group.
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        if idx == 0 {
            Some(self.range.clone())
        } else {
            self.captures.get(idx - 1)?.clone()
        }
    }

    /// Returns the range of the match in the subject.
    ///
    /// This is a convenience function to work around
    /// the fact that Range does not support Copy.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    /// Returns the starting offset of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the ending offset of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// The JavaScript `index` of the match; the same as [`Match::start`].
    #[inline]
    pub fn index(&self) -> usize {
        self.range.start
    }

    /// Return an iterator over a Match. The first returned value is the total
    /// match, and subsequent values represent the capture groups.
    #[inline]
    pub fn groups(&self) -> Groups<'_> {
        Groups::new(self)
    }

    /// The subject that was searched.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The matched text as a view into the subject.
    pub fn substring(&self) -> SubString {
        self.subject.substring(self.range())
    }

    /// The matched text.
    pub fn as_string(&self) -> String {
        units_to_string(&self.subject.units()[self.range()])
    }

    /// The text of group \p idx, or None if it did not participate.
    pub fn group_string(&self, idx: usize) -> Option<String> {
        let range = self.group(idx)?;
        Some(units_to_string(&self.subject.units()[range]))
    }
}

/// An iterator over the capture groups of a [`Match`]
///
/// This struct is created by the [`groups`] method on [`Match`].
///
/// [`Match`]: ../struct.Match.html
/// [`groups`]: ../struct.Match.html#method.groups
#[derive(Clone)]
pub struct Groups<'m> {
    mat: &'m Match,
    i: usize,
    max: usize,
}

impl<'m> Groups<'m> {
    #[inline]
    fn new(mat: &'m Match) -> Self {
        Self {
            mat,
            i: 0,
            max: mat.captures.len() + 1,
        }
    }
}

impl Iterator for Groups<'_> {
    type Item = Option<Range>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let i = self.i;
        if i < self.max {
            self.i += 1;
            Some(self.mat.group(i))
        } else {
            None
        }
    }
}

/// A Regex is the compiled version of a pattern, plus its lastIndex.
///
/// Clones share the compiled graph but have their own lastIndex. A Regex is
/// not Send; use one per thread.
#[derive(Debug, Clone)]
pub struct Regex {
    program: Rc<Program>,
    last_index: usize,
}

impl Regex {
    /// Construct a regex by parsing `pattern` using the default flags.
    /// An Error may be returned if the syntax is invalid.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Self::with_config(pattern, Flags::default(), Config::default())
    }

    /// Construct a regex by parsing `pattern` with the JavaScript flag string
    /// `flags`. Unknown flags are an error.
    pub fn with_flags(pattern: &str, flags: &str) -> Result<Regex, Error> {
        Self::with_config(pattern, Flags::parse(flags)?, Config::default())
    }

    /// Construct a regex by parsing `pattern` with `flags` and `config`.
    pub fn with_config(pattern: &str, flags: Flags, config: Config) -> Result<Regex, Error> {
        Self::from_units(&to_units(pattern), flags, config)
    }

    /// Construct a regex from a pattern given as UTF-16 code units.
    pub fn from_units(pattern: &[u16], flags: Flags, config: Config) -> Result<Regex, Error> {
        let program = parse::try_parse(pattern, flags, config)?;
        Ok(Self::from_program(program))
    }

    /// Construct a regex which matches `text` literally.
    pub fn from_literal(text: &str, flags: Flags) -> Regex {
        let program = parse::compile_literal(&to_units(text), flags, Config::default());
        Self::from_program(program)
    }

    fn from_program(program: Program) -> Regex {
        log::debug!(
            "compiled /{}/{}: {} nodes, {} groups",
            units_to_string(&program.source),
            program.flags,
            program.nodes.len(),
            program.group_count
        );
        Regex {
            program: Rc::new(program),
            last_index: 0,
        }
    }

    /// The pattern source.
    pub fn source(&self) -> String {
        units_to_string(&self.program.source)
    }

    pub fn flags(&self) -> Flags {
        self.program.flags
    }

    pub fn config(&self) -> Config {
        self.program.config
    }

    pub fn global(&self) -> bool {
        self.program.flags.global
    }

    pub fn ignore_case(&self) -> bool {
        self.program.flags.icase
    }

    pub fn multiline(&self) -> bool {
        self.program.flags.multiline
    }

    /// Number of capturing groups.
    pub fn group_count(&self) -> usize {
        self.program.group_count as usize
    }

    /// Where the next exec or test of a global regex starts.
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn set_last_index(&mut self, last_index: usize) {
        self.last_index = last_index;
    }

    /// Run the regex once against `subject`, recording a match in `statics`.
    /// A global regex starts at lastIndex and advances it.
    pub fn exec<S: Into<Subject>>(
        &mut self,
        subject: S,
        statics: &mut RegExpStatics,
    ) -> Result<Option<Match>, ExecError> {
        let execution = self.execute(&subject.into(), statics, ExecMode::Match)?;
        Ok(execution.into_match())
    }

    /// \return whether exec would find a match. Registers and lastIndex are
    /// updated the same way.
    pub fn test<S: Into<Subject>>(
        &mut self,
        subject: S,
        statics: &mut RegExpStatics,
    ) -> Result<bool, ExecError> {
        let execution = self.execute(&subject.into(), statics, ExecMode::Test)?;
        Ok(execution.is_match())
    }

    /// Like exec, but a subject that ran out before the regex could decide
    /// yields [`Execution::Incomplete`] rather than [`Execution::NoMatch`].
    pub fn exec_prefix<S: Into<Subject>>(
        &mut self,
        subject: S,
        statics: &mut RegExpStatics,
    ) -> Result<Execution, ExecError> {
        self.execute(&subject.into(), statics, ExecMode::Prefix)
    }

    fn execute(
        &mut self,
        subject: &Subject,
        statics: &mut RegExpStatics,
        mode: ExecMode,
    ) -> Result<Execution, ExecError> {
        exec::execute(
            &self.program,
            Some(&mut self.last_index),
            statics,
            subject,
            mode,
        )
    }

    /// Replace the first match in `subject`, or every match if the regex is
    /// global, expanding `template` for each. See [`Template`] for the $
    /// sequences understood.
    pub fn replace<S: Into<Subject>>(
        &mut self,
        subject: S,
        template: &str,
        statics: &mut RegExpStatics,
    ) -> Result<String, ExecError> {
        let template = Template::new(template, self.group_count());
        replace::replace(
            &self.program,
            &mut self.last_index,
            statics,
            &subject.into(),
            template,
        )
    }

    /// Like replace, but the replacement text is computed by `f`.
    pub fn replace_with<S, F>(
        &mut self,
        subject: S,
        statics: &mut RegExpStatics,
        f: F,
    ) -> Result<String, ExecError>
    where
        S: Into<Subject>,
        F: FnMut(&ReplaceArgs) -> String,
    {
        replace::replace(
            &self.program,
            &mut self.last_index,
            statics,
            &subject.into(),
            Callback(f),
        )
    }

    /// \return the offset of the first match in `subject`, ignoring lastIndex.
    pub fn search<S: Into<Subject>>(
        &self,
        subject: S,
        statics: &mut RegExpStatics,
    ) -> Result<Option<usize>, ExecError> {
        replace::search(&self.program, statics, &subject.into())
    }

    /// Split `subject` around matches, splicing in the captures of each
    /// separator. At most `limit` parts are returned.
    pub fn split<S: Into<Subject>>(
        &self,
        subject: S,
        limit: Option<usize>,
        statics: &mut RegExpStatics,
    ) -> Result<Vec<String>, ExecError> {
        replace::split(&self.program, statics, &subject.into(), limit)
    }

    /// Searches `text` to find the first match.
    /// Neither lastIndex nor any registers are touched.
    #[inline]
    pub fn find<S: Into<Subject>>(&self, text: S) -> Option<Match> {
        self.find_iter(text).next()
    }

    /// Searches `text`, returning an iterator over non-overlapping matches.
    #[inline]
    pub fn find_iter<S: Into<Subject>>(&self, text: S) -> exec::Matches<'_> {
        self.find_from(text, 0)
    }

    /// Returns an iterator for matches found in `text` starting at code unit
    /// index `start`. Note this may be different from passing a sliced `text`
    /// in the case of anchors and word boundaries.
    /// Example:
    ///
    ///  ```rust
    ///   use jsregexp::Regex;
    ///   let re = Regex::new(r"\bb").unwrap();
    ///   assert!(re.find("ab").is_none());
    ///   assert!(re.find_from("ab", 1).next().is_none());
    ///   assert_eq!(re.find("b").unwrap().range(), 0..1);
    ///   ```
    #[inline]
    pub fn find_from<S: Into<Subject>>(&self, text: S, start: usize) -> exec::Matches<'_> {
        exec::Matches::new(&self.program, text.into(), start)
    }

    /// A listing of the compiled node graph, one node per line.
    pub fn dump_nodes(&self) -> String {
        self.program.to_string()
    }
}

impl fmt::Display for Regex {
    /// Renders as /source/flags.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}/{}", self.source(), self.program.flags)
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression
    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

/// Escape `text` so that it compiles to a regex matching it literally.
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '/'
        ) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
