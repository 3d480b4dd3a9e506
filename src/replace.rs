//! Replacement templates, and the replace, search and split operations built
//! on the execution facade.

use crate::api::Match;
use crate::exec::{self, ExecError, ExecMode};
use crate::ir::Program;
use crate::statics::RegExpStatics;
use crate::types::{Range, SubString, Subject};
use std::ops;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    /// Code units of the template, copied as is.
    Literal(ops::Range<usize>),
    /// $&
    LastMatch,
    /// $`
    LeftContext,
    /// $'
    RightContext,
    /// $+
    LastParen,
    /// $n or $nn, 1-based.
    Group(usize),
}

/// A parsed replacement template like "$2-$1".
#[derive(Debug, Clone)]
pub struct Template {
    units: Vec<u16>,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse \p template for a pattern with \p group_count capture groups.
    /// A $ which does not start a substitution is kept literally.
    pub fn new(template: &str, group_count: usize) -> Template {
        let bytes = template.as_bytes();
        let mut result = Template {
            units: Vec::with_capacity(template.len()),
            pieces: Vec::new(),
        };
        let mut literal_start = 0;
        let mut search_from = 0;
        while let Some(offset) = memchr::memchr(b'$', &bytes[search_from..]) {
            let dollar = search_from + offset;
            let digit = |i: usize| match bytes.get(i) {
                Some(&b) if b.is_ascii_digit() => Some((b - b'0') as usize),
                _ => None,
            };
            let (piece, len) = match bytes.get(dollar + 1) {
                Some(b'$') => (None, 2),
                Some(b'&') => (Some(Piece::LastMatch), 2),
                Some(b'`') => (Some(Piece::LeftContext), 2),
                Some(b'\'') => (Some(Piece::RightContext), 2),
                Some(b'+') => (Some(Piece::LastParen), 2),
                _ => match (digit(dollar + 1), digit(dollar + 2)) {
                    (Some(d1), Some(d2)) if (1..=group_count).contains(&(d1 * 10 + d2)) => {
                        (Some(Piece::Group(d1 * 10 + d2)), 3)
                    }
                    (Some(d1), _) if (1..=group_count).contains(&d1) => {
                        (Some(Piece::Group(d1)), 2)
                    }
                    _ => {
                        // Not a substitution; the $ is literal.
                        search_from = dollar + 1;
                        continue;
                    }
                },
            };
            result.push_literal(&template[literal_start..dollar]);
            match piece {
                Some(piece) => result.pieces.push(piece),
                None => result.push_literal("$"),
            }
            literal_start = dollar + len;
            search_from = literal_start;
        }
        result.push_literal(&template[literal_start..]);
        result
    }

    fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let start = self.units.len();
        self.units.extend(text.encode_utf16());
        let end = self.units.len();
        if let Some(Piece::Literal(range)) = self.pieces.last_mut() {
            if range.end == start {
                range.end = end;
                return;
            }
        }
        self.pieces.push(Piece::Literal(start..end));
    }

    /// Call \p f with each expanded segment, in order.
    fn for_each_segment<F: FnMut(&[u16])>(&self, statics: &RegExpStatics, mut f: F) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(range) => f(&self.units[range.clone()]),
                Piece::LastMatch => f(statics.last_match().units()),
                Piece::LeftContext => f(statics.left_context().units()),
                Piece::RightContext => f(statics.right_context().units()),
                Piece::LastParen => f(statics.last_paren().units()),
                Piece::Group(n) => f(statics.paren(*n).units()),
            }
        }
    }

    /// \return the length in code units of the expansion against the current
    /// registers, without building it.
    pub fn expanded_len(&self, statics: &RegExpStatics) -> usize {
        let mut len = 0;
        self.for_each_segment(statics, |segment| len += segment.len());
        len
    }

    /// Append the expansion against the current registers to \p out.
    pub fn expand_into(&self, statics: &RegExpStatics, out: &mut Vec<u16>) {
        out.reserve(self.expanded_len(statics));
        self.for_each_segment(statics, |segment| out.extend_from_slice(segment));
    }

    /// \return the expansion against the current registers.
    pub fn expand(&self, statics: &RegExpStatics) -> String {
        let mut out = Vec::new();
        self.expand_into(statics, &mut out);
        String::from_utf16_lossy(&out)
    }
}

/// The arguments a replacement callback receives, mirroring the positional
/// arguments (match, group1, ..., offset, subject).
#[derive(Debug, Clone)]
pub struct ReplaceArgs {
    /// The matched text.
    pub matched: SubString,

    /// One entry per capture group; None for groups that did not participate.
    pub groups: Vec<Option<SubString>>,

    /// Offset of the match in the subject.
    pub offset: usize,

    /// The whole subject.
    pub subject: Subject,
}

impl ReplaceArgs {
    fn new(m: &Match) -> ReplaceArgs {
        let subject = m.subject().clone();
        ReplaceArgs {
            matched: subject.substring(m.range()),
            groups: m
                .captures
                .iter()
                .map(|capture| capture.clone().map(|range| subject.substring(range)))
                .collect(),
            offset: m.start(),
            subject,
        }
    }

    /// \return the text of group \p n, 1-based. Group 0 is the match.
    pub fn group(&self, n: usize) -> Option<&SubString> {
        match n {
            0 => Some(&self.matched),
            n => self.groups.get(n - 1)?.as_ref(),
        }
    }
}

/// Produces the replacement text for each match.
pub(crate) trait Replacer {
    /// Append the replacement for \p m, which is already recorded in
    /// \p statics, to \p out.
    fn replace_append(&mut self, statics: &RegExpStatics, m: &Match, out: &mut Vec<u16>);
}

impl Replacer for Template {
    fn replace_append(&mut self, statics: &RegExpStatics, _m: &Match, out: &mut Vec<u16>) {
        self.expand_into(statics, out)
    }
}

/// A callback used as a Replacer.
pub(crate) struct Callback<F>(pub F);

impl<F> Replacer for Callback<F>
where
    F: FnMut(&ReplaceArgs) -> String,
{
    fn replace_append(&mut self, _statics: &RegExpStatics, m: &Match, out: &mut Vec<u16>) {
        let text = (self.0)(&ReplaceArgs::new(m));
        out.extend(text.encode_utf16());
    }
}

/// Replace the first match of \p program in \p subject, or every match if
/// the pattern is global. A global replace starts from 0 and leaves
/// \p last_index at 0.
pub(crate) fn replace<R: Replacer>(
    program: &Program,
    last_index: &mut usize,
    statics: &mut RegExpStatics,
    subject: &Subject,
    mut replacer: R,
) -> Result<String, ExecError> {
    let global = program.flags.global;
    if global {
        *last_index = 0;
    }
    let units = subject.units();
    let mut out: Vec<u16> = Vec::with_capacity(units.len());
    let mut copied = 0;
    loop {
        let execution =
            exec::execute(program, Some(&mut *last_index), statics, subject, ExecMode::Match)?;
        let m = match execution.into_match() {
            Some(m) => m,
            None => break,
        };
        out.extend_from_slice(&units[copied..m.start()]);
        replacer.replace_append(statics, &m, &mut out);
        copied = m.end();
        if !global {
            break;
        }
    }
    out.extend_from_slice(&units[copied..]);
    Ok(String::from_utf16_lossy(&out))
}

/// \return the offset of the first match, ignoring lastIndex and the global
/// flag.
pub(crate) fn search(
    program: &Program,
    statics: &mut RegExpStatics,
    subject: &Subject,
) -> Result<Option<usize>, ExecError> {
    let execution = exec::execute(program, None, statics, subject, ExecMode::Match)?;
    Ok(execution.into_match().map(|m| m.start()))
}

/// Split \p subject around matches of \p program, splicing in the captures
/// of each separator. At most \p limit parts are returned.
pub(crate) fn split(
    program: &Program,
    statics: &mut RegExpStatics,
    subject: &Subject,
    limit: Option<usize>,
) -> Result<Vec<String>, ExecError> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut parts = Vec::new();
    if limit == 0 {
        return Ok(parts);
    }
    let multiline = program.flags.multiline || statics.multiline;
    let units = subject.units();
    let size = units.len();
    let text = |range: Range| String::from_utf16_lossy(&units[range]);

    if size == 0 {
        match exec::match_at(program, subject, 0, multiline)? {
            Some(m) => statics.record(program, &m, 0),
            None => parts.push(String::new()),
        }
        return Ok(parts);
    }

    // p is the start of the pending part; q is where the next separator is
    // tried.
    let mut p = 0;
    let mut q = 0;
    while q != size {
        let m = match exec::match_at(program, subject, q, multiline)? {
            Some(m) if m.end() != p => m,
            _ => {
                q += 1;
                continue;
            }
        };
        statics.record(program, &m, p);
        parts.push(text(p..q));
        if parts.len() == limit {
            return Ok(parts);
        }
        p = m.end();
        for capture in &m.captures {
            parts.push(capture.clone().map(text).unwrap_or_default());
            if parts.len() == limit {
                return Ok(parts);
            }
        }
        q = p;
    }
    parts.push(text(p..size));
    Ok(parts)
}
