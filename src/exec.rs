//! Execution facade.
//!
//! One call runs a compiled pattern against a subject: it picks the start
//! offset (the pattern's lastIndex for global patterns), invokes the matcher,
//! packages the result, and updates the match registers.

use crate::api::Match;
use crate::classicalbacktrack::MatchAttempter;
use crate::ir::Program;
use crate::statics::RegExpStatics;
use crate::types::{CaptureGroupID, Subject};
use std::fmt;

/// An error raised while executing a compiled pattern.
/// The pattern remains usable after an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Backtracking state grew past the pattern's backtrack limit.
    BacktrackLimitExceeded { limit: usize },

    /// A backreference named a group the pattern does not have.
    BadBackreference {
        group: u32,
        group_count: CaptureGroupID,
    },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecError::BacktrackLimitExceeded { limit } => {
                write!(f, "Backtrack limit of {} exceeded", limit)
            }
            ExecError::BadBackreference { group, group_count } => write!(
                f,
                "Backreference \\{} exceeds number of capture groups ({})",
                group, group_count
            ),
        }
    }
}

impl std::error::Error for ExecError {}

/// How a call uses the matcher's result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExecMode {
    /// Only whether there is a match.
    Test,

    /// The match and its captures.
    Match,

    /// Like Match, but distinguishes a subject that is too short to decide.
    Prefix,
}

/// The outcome of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The pattern cannot match the subject.
    NoMatch,

    /// No match was found, but some attempt ran out of input; a longer subject
    /// might match. Only produced in Prefix mode.
    Incomplete,

    Matched(Match),
}

impl Execution {
    /// \return the match, if any.
    pub fn into_match(self) -> Option<Match> {
        match self {
            Execution::Matched(m) => Some(m),
            Execution::NoMatch | Execution::Incomplete => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Execution::Matched(..))
    }
}

/// \return the offset following \p m, stepping past empty matches.
pub(crate) fn advance_past(m: &Match) -> usize {
    if m.range.is_empty() {
        m.end() + 1
    } else {
        m.end()
    }
}

/// Run \p program once against \p subject.
/// If \p last_index is given and the pattern is global, the search starts
/// there and it is advanced past the match, or reset to 0 on failure.
/// Otherwise the search starts at 0. The registers in \p statics are updated
/// only on success.
pub(crate) fn execute(
    program: &Program,
    last_index: Option<&mut usize>,
    statics: &mut RegExpStatics,
    subject: &Subject,
    mode: ExecMode,
) -> Result<Execution, ExecError> {
    let last_index = last_index.filter(|_| program.flags.global);
    let start = last_index.as_ref().map_or(0, |li| **li);
    if start > subject.len() {
        if let Some(li) = last_index {
            log::trace!("lastIndex {} is past the subject; reset to 0", start);
            *li = 0;
        }
        return Ok(Execution::NoMatch);
    }

    let multiline = program.flags.multiline || statics.multiline;
    let mut matcher = MatchAttempter::new(program, subject.units(), multiline);
    let range = match matcher.search(start)? {
        Some(range) => range,
        None => {
            if let Some(li) = last_index {
                if *li != 0 {
                    log::trace!("lastIndex reset to 0 after failed match");
                }
                *li = 0;
            }
            if mode == ExecMode::Prefix && matcher.hit_end() {
                return Ok(Execution::Incomplete);
            }
            return Ok(Execution::NoMatch);
        }
    };

    let m = Match::new(range, matcher.captures(), subject.clone());
    statics.record(program, &m, start);
    if let Some(li) = last_index {
        *li = advance_past(&m);
        log::trace!("lastIndex advanced to {}", *li);
    }
    Ok(Execution::Matched(m))
}

/// Run \p program anchored at exactly \p pos, without touching any
/// registers.
pub(crate) fn match_at(
    program: &Program,
    subject: &Subject,
    pos: usize,
    multiline: bool,
) -> Result<Option<Match>, ExecError> {
    let mut matcher = MatchAttempter::new(program, subject.units(), multiline);
    Ok(matcher
        .match_at(pos)?
        .map(|end| Match::new(pos..end, matcher.captures(), subject.clone())))
}

/// A struct which enables iteration over matches.
/// Iteration neither reads nor writes lastIndex or the registers. An
/// execution error ends the iteration.
#[derive(Debug)]
pub struct Matches<'r> {
    program: &'r Program,
    subject: Subject,
    offset: Option<usize>,
}

impl<'r> Matches<'r> {
    pub(crate) fn new(program: &'r Program, subject: Subject, start: usize) -> Self {
        let start = start.min(subject.len());
        Matches {
            program,
            subject,
            offset: Some(start),
        }
    }
}

impl Iterator for Matches<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset.take()?;
        if start > self.subject.len() {
            return None;
        }
        let mut matcher = MatchAttempter::new(
            self.program,
            self.subject.units(),
            self.program.flags.multiline,
        );
        let range = matcher.search(start).ok()??;
        let m = Match::new(range, matcher.captures(), self.subject.clone());
        self.offset = Some(advance_past(&m));
        Some(m)
    }
}
