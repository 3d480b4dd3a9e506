//! The legacy match registers: RegExp.lastMatch, RegExp.$1 and friends.
//!
//! Every successful exec, replace, split or search overwrites the registers.
//! They are owned by the embedder and passed to each call, so independent
//! contexts (or tests) never see each other's matches.

use crate::api::{LeftContextMode, Match};
use crate::ir::Program;
use crate::types::{SubString, Subject};

/// Registers describing the most recent successful match.
#[derive(Debug, Clone, Default)]
pub struct RegExpStatics {
    /// When set, every pattern matches as if it had the m flag.
    pub multiline: bool,

    input: Subject,

    last_match: SubString,

    /// One entry per capture group of the last pattern; unmatched groups are
    /// empty.
    parens: Vec<SubString>,

    last_paren: SubString,

    left_context: SubString,

    right_context: SubString,

    last_source: String,
}

impl RegExpStatics {
    pub fn new() -> RegExpStatics {
        RegExpStatics::default()
    }

    /// Record a successful match of \p program. \p search_start is where the
    /// search for the match began.
    pub(crate) fn record(&mut self, program: &Program, m: &Match, search_start: usize) {
        let subject = m.subject();
        self.input = subject.clone();
        self.last_match = subject.substring(m.range());
        self.parens.clear();
        self.parens.extend(m.captures.iter().map(|capture| match capture {
            Some(range) => subject.substring(range.clone()),
            None => SubString::empty(),
        }));
        self.last_paren = self
            .parens
            .iter()
            .rev()
            .find(|paren| !paren.is_empty())
            .cloned()
            .unwrap_or_default();
        let left_start = match program.config.left_context {
            LeftContextMode::FromSubjectStart => 0,
            LeftContextMode::FromSearchStart => search_start.min(m.start()),
        };
        self.left_context = subject.substring(left_start..m.start());
        self.right_context = subject.substring(m.end()..subject.len());
        self.last_source = String::from_utf16_lossy(&program.source);
    }

    /// Forget the last match.
    pub fn clear(&mut self) {
        let multiline = self.multiline;
        *self = RegExpStatics {
            multiline,
            ..Default::default()
        };
    }

    /// RegExp.input: the subject of the last match.
    pub fn input(&self) -> &Subject {
        &self.input
    }

    /// RegExp.lastMatch, aka $&.
    pub fn last_match(&self) -> &SubString {
        &self.last_match
    }

    /// RegExp.lastParen, aka $+: the last group with a non-empty capture.
    pub fn last_paren(&self) -> &SubString {
        &self.last_paren
    }

    /// RegExp.leftContext, aka $`.
    pub fn left_context(&self) -> &SubString {
        &self.left_context
    }

    /// RegExp.rightContext, aka $'.
    pub fn right_context(&self) -> &SubString {
        &self.right_context
    }

    /// RegExp.$1 through RegExp.$9, and beyond. Group 0 and groups the last
    /// pattern did not have are empty.
    pub fn paren(&self, n: usize) -> SubString {
        match n {
            0 => SubString::empty(),
            n => self.parens.get(n - 1).cloned().unwrap_or_default(),
        }
    }

    /// Number of capture groups in the last matched pattern.
    pub fn paren_count(&self) -> usize {
        self.parens.len()
    }

    /// Source of the last pattern to match.
    pub fn last_source(&self) -> &str {
        &self.last_source
    }
}
