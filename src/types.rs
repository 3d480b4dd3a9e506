use crate::util::{to_shared_units, units_to_string};
use std::fmt;
use std::ops;
use std::rc::Rc;

/// A group index is u16.
/// CaptureGroupID 0 corresponds to the first capture group.
pub type CaptureGroupID = u16;

/// The maximum number of capture groups supported.
pub const MAX_CAPTURE_GROUPS: usize = 65535;

/// The largest count accepted in a `{n,m}` quantifier; counts must fit in 16 bits.
pub const MAX_REPEAT: u32 = 0xFFFF;

/// The text being matched, as shared UTF-16 code units.
/// Cloning a Subject is cheap and never copies the text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Subject(Rc<[u16]>);

impl Subject {
    /// Wrap a buffer of code units.
    pub fn new(units: Rc<[u16]>) -> Subject {
        Subject(units)
    }

    /// \return the code units of this subject.
    #[inline(always)]
    pub fn units(&self) -> &[u16] {
        &self.0
    }

    /// \return the length in code units.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// \return the view of the code units in \p range.
    pub fn substring(&self, range: Range) -> SubString {
        debug_assert!(range.start <= range.end && range.end <= self.len());
        SubString {
            text: self.clone(),
            start: range.start,
            len: range.end - range.start,
        }
    }

    /// \return a view of the whole subject.
    pub fn whole(&self) -> SubString {
        self.substring(0..self.len())
    }
}

impl Default for Subject {
    fn default() -> Self {
        Subject(Rc::from(Vec::new()))
    }
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Subject(to_shared_units(s))
    }
}

impl From<&String> for Subject {
    fn from(s: &String) -> Self {
        Subject::from(s.as_str())
    }
}

impl From<String> for Subject {
    fn from(s: String) -> Self {
        Subject::from(s.as_str())
    }
}

impl From<&Subject> for Subject {
    fn from(s: &Subject) -> Self {
        s.clone()
    }
}

impl From<&[u16]> for Subject {
    fn from(units: &[u16]) -> Self {
        Subject(Rc::from(units))
    }
}

impl From<Vec<u16>> for Subject {
    fn from(units: Vec<u16>) -> Self {
        Subject(Rc::from(units))
    }
}

impl From<Rc<[u16]>> for Subject {
    fn from(units: Rc<[u16]>) -> Self {
        Subject(units)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&units_to_string(&self.0))
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", units_to_string(&self.0))
    }
}

/// Range is used to express the extent of a match, as code unit indexes into
/// the subject.
pub type Range = ops::Range<usize>;

/// A zero-copy view into a Subject: the buffer, a start offset and a length.
/// Captures and the match registers are SubStrings, so recording a match never
/// copies text.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SubString {
    text: Subject,
    start: usize,
    len: usize,
}

impl SubString {
    /// The empty substring, not attached to any subject.
    pub fn empty() -> SubString {
        SubString::default()
    }

    /// Offset of the view in its subject.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last code unit of the view.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Length in code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.start..self.end()
    }

    /// The code units of the view.
    #[inline]
    pub fn units(&self) -> &[u16] {
        &self.text.units()[self.range()]
    }

    /// The subject this view points into.
    pub fn subject(&self) -> &Subject {
        &self.text
    }
}

impl fmt::Display for SubString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&units_to_string(self.units()))
    }
}

impl fmt::Debug for SubString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SubString({}..{} {:?})",
            self.start,
            self.end(),
            units_to_string(self.units())
        )
    }
}

/// Representation of a capture group while matching.
/// `entry` is recorded when the group is entered; `capture` is only set when
/// the group is left, so a backreference inside its own group sees the
/// previous capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupData {
    pub entry: Option<usize>,
    pub capture: Option<Range>,
}

impl GroupData {
    pub fn new() -> GroupData {
        GroupData {
            entry: None,
            capture: None,
        }
    }

    pub fn as_range(&self) -> Option<Range> {
        self.capture.clone()
    }

    /// Reset the group to "not entered."
    pub fn reset(&mut self) {
        self.entry = None;
        self.capture = None;
    }
}
