//! Classical backtracking execution engine
//!
//! The matcher walks the node graph iteratively. Choice points, capture undo
//! records and loop state live on a heap backtrack stack, and quantifier and
//! lookahead continuations live in a frame arena, so the native stack does
//! not grow with the length of the input.

use crate::charclasses::{is_digit, is_line_terminator, is_space, is_word_char};
use crate::exec::ExecError;
use crate::folds;
use crate::ir::{Node, NodeFlags, NodeId, Op, Program, Repeat};
use crate::types::{CaptureGroupID, GroupData, Range};

type MatchResult = Result<Option<usize>, ExecError>;

/// Index of a frame in the frame arena.
type FrameID = u32;

#[derive(Debug, Copy, Clone)]
enum FrameKind {
    /// One iteration of a quantifier body is in progress. `count` iterations
    /// were complete when it started at `entry`.
    Iteration {
        quant: NodeId,
        count: u32,
        entry: usize,
    },

    /// A lookahead body is in progress.
    Assertion,
}

/// A continuation: when the matcher reaches `stop`, the construct that pushed
/// the frame decides what happens next.
/// Frames are immutable. A frame stays in the arena as long as some backtrack
/// entry may resume inside it.
#[derive(Debug, Copy, Clone)]
struct Frame {
    stop: NodeId,
    kind: FrameKind,
    parent: Option<FrameID>,
}

/// Where matching proceeds: a node, an input position and the innermost
/// frame.
#[derive(Debug, Copy, Clone)]
struct State {
    id: NodeId,
    pos: usize,
    frame: Option<FrameID>,
}

#[derive(Debug, Clone)]
enum BacktrackInsn {
    /// Nothing more to backtrack.
    /// This "backstops" our stack; each lookahead body pushes its own.
    Exhausted,

    /// Resume at a saved state. `frames` is the arena length when it was
    /// saved.
    SetPosition { at: State, frames: usize },

    SetCaptureGroup {
        id: CaptureGroupID,
        data: GroupData,
    },

    /// A lazy quantifier took its continuation after `count` iterations.
    /// Backtracking runs one more iteration from `at.pos`.
    EnterNonGreedyLoop {
        quant: NodeId,
        count: u32,
        at: State,
        frames: usize,
    },

    /// A greedy single character loop is at `at.pos`; backtracking gives
    /// back one code unit, down to `min`.
    GreedyLoop1Char {
        at: State,
        frames: usize,
        min: usize,
        good_next: Option<u16>,
    },

    /// A lazy single character loop is at `at.pos`; backtracking takes one
    /// more code unit matching `body`, at most `remaining` more times.
    NonGreedyLoop1Char {
        at: State,
        frames: usize,
        body: NodeId,
        remaining: usize,
        good_next: Option<u16>,
    },
}

/// \return the node to run after \p node.
#[inline(always)]
fn continuation(node: &Node) -> NodeId {
    debug_assert!(node.next.is_some(), "node without a next");
    node.next.unwrap_or_default()
}

#[derive(Debug)]
pub(crate) struct MatchAttempter<'a> {
    re: &'a Program,

    input: &'a [u16],

    groups: Vec<GroupData>,

    bts: Vec<BacktrackInsn>,

    frames: Vec<Frame>,

    icase: bool,

    multiline: bool,

    /// Set when some attempt needed input beyond the end of the subject while
    /// still consistent with the pattern.
    hit_end: bool,
}

impl<'a> MatchAttempter<'a> {
    pub(crate) fn new(re: &'a Program, input: &'a [u16], multiline: bool) -> Self {
        Self {
            re,
            input,
            groups: vec![GroupData::new(); re.group_count as usize],
            bts: vec![BacktrackInsn::Exhausted],
            frames: Vec::new(),
            icase: re.flags.icase,
            multiline,
            hit_end: false,
        }
    }

    /// \return whether some attempt ran out of input.
    pub(crate) fn hit_end(&self) -> bool {
        self.hit_end
    }

    /// \return the captures of the most recent successful attempt.
    pub(crate) fn captures(&self) -> Vec<Option<Range>> {
        self.groups.iter().map(GroupData::as_range).collect()
    }

    #[inline(always)]
    fn unit_eq(&self, a: u16, b: u16) -> bool {
        a == b || (self.icase && folds::fold_equals(a, b))
    }

    /// Fail with BacktrackLimitExceeded if the backtrack stack and frame
    /// arena together have reached the pattern's limit.
    fn check_limit(&self) -> Result<(), ExecError> {
        let limit = self.re.config.backtrack_limit;
        if self.bts.len() + self.frames.len() < limit {
            return Ok(());
        }
        log::warn!(
            "Backtrack limit {} exceeded matching /{}/",
            limit,
            String::from_utf16_lossy(&self.re.source)
        );
        Err(ExecError::BacktrackLimitExceeded { limit })
    }

    fn push_backtrack(&mut self, bt: BacktrackInsn) -> Result<(), ExecError> {
        self.check_limit()?;
        self.bts.push(bt);
        Ok(())
    }

    fn push_frame(&mut self, frame: Frame) -> Result<FrameID, ExecError> {
        self.check_limit()?;
        self.frames.push(frame);
        Ok((self.frames.len() - 1) as FrameID)
    }

    fn set_group(&mut self, id: CaptureGroupID, data: GroupData) {
        let slot = &mut self.groups[id as usize];
        if *slot != data {
            let old = std::mem::replace(slot, data);
            self.bts.push(BacktrackInsn::SetCaptureGroup { id, data: old });
        }
    }

    /// Pop the backtrack stack down to \p len entries, restoring capture
    /// groups along the way.
    fn unwind(&mut self, len: usize) {
        while self.bts.len() > len {
            if let Some(BacktrackInsn::SetCaptureGroup { id, data }) = self.bts.pop() {
                self.groups[id as usize] = data;
            }
        }
    }

    /// Return to a saved state, dropping frames created after it was saved.
    #[inline]
    fn restore(&mut self, at: State, frames: usize) -> State {
        self.frames.truncate(frames);
        at
    }

    /// \return whether the one-character op \p op matches at \p pos.
    fn match_one(&mut self, op: &Op, pos: usize) -> bool {
        let c = match self.input.get(pos) {
            Some(&c) => c,
            None => {
                self.hit_end = true;
                return false;
            }
        };
        match op {
            Op::Dot => !is_line_terminator(c),
            Op::Class(cc) => cc.matches(&self.re.source, c, self.icase),
            Op::Digit => is_digit(c),
            Op::NonDigit => !is_digit(c),
            Op::Word => is_word_char(c),
            Op::NonWord => !is_word_char(c),
            Op::Space => is_space(c),
            Op::NonSpace => !is_space(c),
            Op::Flat1 { c: lit } => self.unit_eq(c, *lit),
            Op::Flat { start, len: 1 } => self.unit_eq(c, self.re.source[*start as usize]),
            _ => false,
        }
    }

    /// \return whether \p lit appears in the input at \p pos.
    fn match_literal(&mut self, lit: &[u16], pos: usize) -> bool {
        let input = self.input;
        let avail = &input[pos.min(input.len())..];
        let (prefix, complete) = if avail.len() < lit.len() {
            (&lit[..avail.len()], false)
        } else {
            (lit, true)
        };
        let head = &avail[..prefix.len()];
        let equal = if self.icase {
            folds::fold_equals_slice(head, prefix)
        } else {
            head == prefix
        };
        if equal && !complete {
            self.hit_end = true;
        }
        equal && complete
    }

    /// \return whether the literal \p good_next, if any, is at \p pos.
    #[inline]
    fn good_next_matches(&mut self, good_next: Option<u16>, pos: usize) -> bool {
        match (good_next, self.input.get(pos)) {
            (None, _) => true,
            (Some(_), None) => {
                self.hit_end = true;
                false
            }
            (Some(c), Some(&actual)) => self.unit_eq(actual, c),
        }
    }

    fn is_word_boundary(&self, pos: usize) -> bool {
        let before = pos > 0 && is_word_char(self.input[pos - 1]);
        let after = pos < self.input.len() && is_word_char(self.input[pos]);
        before != after
    }

    /// Attempt to backtrack.
    /// \return the state to resume at, or None if the stack is exhausted down
    /// to the nearest Exhausted entry, which is left in place.
    fn try_backtrack(&mut self) -> Result<Option<State>, ExecError> {
        let re = self.re;
        loop {
            if matches!(self.bts.last(), None | Some(BacktrackInsn::Exhausted)) {
                return Ok(None);
            }
            let bt = match self.bts.pop() {
                Some(bt) => bt,
                None => return Ok(None),
            };
            match bt {
                BacktrackInsn::Exhausted => return Ok(None),

                BacktrackInsn::SetPosition { at, frames } => {
                    return Ok(Some(self.restore(at, frames)));
                }

                BacktrackInsn::SetCaptureGroup { id, data } => {
                    self.groups[id as usize] = data;
                }

                BacktrackInsn::EnterNonGreedyLoop {
                    quant,
                    count,
                    at,
                    frames,
                } => {
                    let at = self.restore(at, frames);
                    if let Some((body, _, _)) = re.node(quant).op.repeat_bounds() {
                        return self
                            .enter_iteration(quant, body, count, at.pos, at.frame)
                            .map(Some);
                    }
                }

                BacktrackInsn::GreedyLoop1Char {
                    mut at,
                    frames,
                    min,
                    good_next,
                } => {
                    // The continuation failed at at.pos; give back one unit at a
                    // time until the literal after the loop lines up.
                    while at.pos > min {
                        at.pos -= 1;
                        if self.good_next_matches(good_next, at.pos) {
                            if at.pos > min {
                                self.bts.push(BacktrackInsn::GreedyLoop1Char {
                                    at,
                                    frames,
                                    min,
                                    good_next,
                                });
                            }
                            return Ok(Some(self.restore(at, frames)));
                        }
                    }
                }

                BacktrackInsn::NonGreedyLoop1Char {
                    mut at,
                    frames,
                    body,
                    mut remaining,
                    good_next,
                } => {
                    let op = &re.node(body).op;
                    while remaining > 0 && self.match_one(op, at.pos) {
                        at.pos += 1;
                        remaining -= 1;
                        if self.good_next_matches(good_next, at.pos) {
                            if remaining > 0 {
                                self.bts.push(BacktrackInsn::NonGreedyLoop1Char {
                                    at,
                                    frames,
                                    body,
                                    remaining,
                                    good_next,
                                });
                            }
                            return Ok(Some(self.restore(at, frames)));
                        }
                    }
                }
            }
        }
    }

    /// Run a lookahead body \p child at \p pos. The body ends when it reaches
    /// \p stop.
    /// \return whether the assertion holds. A positive lookahead keeps the
    /// captures of its body but none of its choice points.
    fn run_lookahead(
        &mut self,
        child: NodeId,
        stop: NodeId,
        pos: usize,
        negate: bool,
    ) -> Result<bool, ExecError> {
        let frames = self.frames.len();
        let base = self.bts.len();
        self.push_backtrack(BacktrackInsn::Exhausted)?;
        let assertion = self.push_frame(Frame {
            stop,
            kind: FrameKind::Assertion,
            parent: None,
        })?;
        let matched = self
            .try_at_pos(State {
                id: child,
                pos,
                frame: Some(assertion),
            })?
            .is_some();
        if matched && !negate {
            let body = self.bts.split_off(base + 1);
            self.bts.truncate(base);
            self.bts.extend(
                body.into_iter()
                    .filter(|bt| matches!(bt, BacktrackInsn::SetCaptureGroup { .. })),
            );
        } else {
            self.unwind(base);
        }
        self.frames.truncate(frames);
        Ok(matched != negate)
    }

    /// Start iteration \p count of \p quant at \p pos. Groups inside the body
    /// start out unset.
    fn enter_iteration(
        &mut self,
        quant: NodeId,
        body: &Repeat,
        count: u32,
        pos: usize,
        outer: Option<FrameID>,
    ) -> Result<State, ExecError> {
        for group in body.groups.clone() {
            self.set_group(group, GroupData::new());
        }
        let frame = self.push_frame(Frame {
            stop: continuation(self.re.node(quant)),
            kind: FrameKind::Iteration {
                quant,
                count,
                entry: pos,
            },
            parent: outer,
        })?;
        Ok(State {
            id: body.child,
            pos,
            frame: Some(frame),
        })
    }

    /// \p count iterations of \p quant are complete at \p pos; decide between
    /// another iteration and the continuation, leaving the other on the
    /// backtrack stack.
    fn iterate(
        &mut self,
        quant: NodeId,
        count: u32,
        pos: usize,
        outer: Option<FrameID>,
    ) -> Result<Option<State>, ExecError> {
        let re = self.re;
        let node = re.node(quant);
        let (body, min, max) = match node.op.repeat_bounds() {
            Some(bounds) => bounds,
            None => return Ok(None),
        };
        if count < min {
            return self.enter_iteration(quant, body, count, pos, outer).map(Some);
        }
        let exit = State {
            id: continuation(node),
            pos,
            frame: outer,
        };
        if max.map_or(false, |max| count >= max) {
            return Ok(Some(exit));
        }
        let frames = self.frames.len();
        if node.is_lazy() {
            self.push_backtrack(BacktrackInsn::EnterNonGreedyLoop {
                quant,
                count,
                at: exit,
                frames,
            })?;
            Ok(Some(exit))
        } else {
            self.push_backtrack(BacktrackInsn::SetPosition { at: exit, frames })?;
            self.enter_iteration(quant, body, count, pos, outer).map(Some)
        }
    }

    // Given a quantifier whose body is a single one-character node, run a
    // "single character loop". The body has no groups and no alternatives, so
    // backtracking just moves the end position by one code unit.
    fn run_single_char_loop(
        &mut self,
        node: &Node,
        body: &Repeat,
        (min, max): (u32, Option<u32>),
        pos: usize,
        frame: Option<FrameID>,
    ) -> Result<Option<State>, ExecError> {
        let re = self.re;
        let op = &re.node(body.child).op;
        let min = min as usize;
        let max = max.map_or(usize::MAX, |max| max as usize);

        // A literal which must appear where the continuation starts.
        let good_next = if node.flags.contains(NodeFlags::HAS_GOOD_NEXT) {
            match re.node(continuation(node)).op {
                Op::Flat1 { c } => Some(c),
                Op::Flat { start, .. } => Some(re.source[start as usize]),
                _ => None,
            }
        } else {
            None
        };

        let mut count = 0;
        while count < min {
            if !self.match_one(op, pos + count) {
                return Ok(None);
            }
            count += 1;
        }
        let frames = self.frames.len();

        if node.is_lazy() {
            let at = State {
                id: continuation(node),
                pos: pos + count,
                frame,
            };
            if count < max {
                self.push_backtrack(BacktrackInsn::NonGreedyLoop1Char {
                    at,
                    frames,
                    body: body.child,
                    remaining: max - count,
                    good_next,
                })?;
            }
            return Ok(self.good_next_matches(good_next, at.pos).then_some(at));
        }

        while count < max && self.match_one(op, pos + count) {
            count += 1;
        }
        let at = State {
            id: continuation(node),
            pos: pos + count,
            frame,
        };
        if count > min {
            self.push_backtrack(BacktrackInsn::GreedyLoop1Char {
                at,
                frames,
                min: pos + min,
                good_next,
            })?;
        }
        Ok(self.good_next_matches(good_next, at.pos).then_some(at))
    }

    /// Run from \p start until the match completes or the backtrack stack is
    /// exhausted. A match completes at the End node, or at the stop of the
    /// lookahead frame a body was started with.
    /// \return the end position of the match, or None. On failure every group
    /// change made along the way is undone.
    fn try_at_pos(&mut self, start: State) -> MatchResult {
        let re = self.re;
        let State {
            mut id,
            mut pos,
            mut frame,
        } = start;
        // These are not really loops, they are just labels that we effectively
        // 'goto' to.
        #[allow(clippy::never_loop)]
        'nextinsn: loop {
            'backtrack: loop {
                // Helper macro to continue at a state, or backtrack.
                macro_rules! goto_or_bt {
                    ($e:expr) => {
                        match $e {
                            Some(next) => {
                                id = next.id;
                                pos = next.pos;
                                frame = next.frame;
                                continue 'nextinsn;
                            }
                            None => break 'backtrack,
                        }
                    };
                }

                if let Some(fid) = frame {
                    let f = self.frames[fid as usize];
                    if f.stop == id {
                        match f.kind {
                            FrameKind::Assertion => return Ok(Some(pos)),
                            FrameKind::Iteration { quant, count, entry } => {
                                let node = re.node(quant);
                                let min = node.op.repeat_bounds().map_or(0, |(_, min, _)| min);
                                // Once the minimum is satisfied, an iteration
                                // that matched the empty string is rejected.
                                if pos == entry
                                    && count >= min
                                    && !node.flags.contains(NodeFlags::NON_EMPTY)
                                {
                                    break 'backtrack;
                                }
                                goto_or_bt!(self.iterate(quant, count + 1, pos, f.parent)?);
                            }
                        }
                    }
                }

                let node = re.node(id);
                match &node.op {
                    Op::End => return Ok(Some(pos)),

                    Op::Empty | Op::Jump | Op::NcOpen | Op::NcClose => {}

                    Op::Alt { child } => {
                        // Try the child; the next alternative is a choice point.
                        let frames = self.frames.len();
                        let next = State {
                            id: continuation(node),
                            pos,
                            frame,
                        };
                        self.push_backtrack(BacktrackInsn::SetPosition { at: next, frames })?;
                        id = *child;
                        continue 'nextinsn;
                    }

                    Op::Open { group } => {
                        let capture = self.groups[*group as usize].capture.clone();
                        self.set_group(
                            *group,
                            GroupData {
                                entry: Some(pos),
                                capture,
                            },
                        );
                    }

                    Op::Close { group } => {
                        let entry = self.groups[*group as usize].entry;
                        if let Some(entry) = entry {
                            self.set_group(
                                *group,
                                GroupData {
                                    entry: Some(entry),
                                    capture: Some(entry..pos),
                                },
                            );
                        }
                    }

                    Op::Bol => {
                        let ok =
                            pos == 0 || (self.multiline && is_line_terminator(self.input[pos - 1]));
                        if !ok {
                            break 'backtrack;
                        }
                    }

                    Op::Eol => {
                        let ok = pos == self.input.len()
                            || (self.multiline && is_line_terminator(self.input[pos]));
                        if !ok {
                            break 'backtrack;
                        }
                    }

                    Op::WordBoundary | Op::NonWordBoundary => {
                        let want = matches!(node.op, Op::WordBoundary);
                        if self.is_word_boundary(pos) != want {
                            break 'backtrack;
                        }
                    }

                    Op::Dot
                    | Op::Class(..)
                    | Op::Digit
                    | Op::NonDigit
                    | Op::Word
                    | Op::NonWord
                    | Op::Space
                    | Op::NonSpace
                    | Op::Flat1 { .. } => {
                        if !self.match_one(&node.op, pos) {
                            break 'backtrack;
                        }
                        pos += 1;
                    }

                    Op::Flat { start, len } => {
                        if !self.match_literal(re.flat(*start, *len), pos) {
                            break 'backtrack;
                        }
                        pos += *len as usize;
                    }

                    Op::BackRef { group } => {
                        let input = self.input;
                        let captured = match self.groups.get(*group as usize) {
                            Some(data) => data.capture.clone(),
                            None => {
                                return Err(ExecError::BadBackreference {
                                    group: *group as u32 + 1,
                                    group_count: re.group_count,
                                })
                            }
                        };
                        // An unset group matches the empty string.
                        if let Some(capture) = captured {
                            let len = capture.len();
                            if !self.match_literal(&input[capture], pos) {
                                break 'backtrack;
                            }
                            pos += len;
                        }
                    }

                    Op::Ahead { child } | Op::NegAhead { child } => {
                        let negate = matches!(node.op, Op::NegAhead { .. });
                        if !self.run_lookahead(*child, continuation(node), pos, negate)? {
                            break 'backtrack;
                        }
                    }

                    Op::Quant { .. } | Op::Star(..) | Op::Plus(..) | Op::Opt(..) => {
                        if let Some((body, min, max)) = node.op.repeat_bounds() {
                            if node.flags.contains(NodeFlags::SINGLE_CHAR) {
                                goto_or_bt!(self.run_single_char_loop(
                                    node,
                                    body,
                                    (min, max),
                                    pos,
                                    frame
                                )?);
                            }
                        }
                        goto_or_bt!(self.iterate(id, 0, pos, frame)?);
                    }
                }
                id = continuation(node);
                continue 'nextinsn;
            }

            // This after the backtrack loop.
            // A break 'backtrack will drop us here.
            match self.try_backtrack()? {
                Some(next) => {
                    id = next.id;
                    pos = next.pos;
                    frame = next.frame;
                }
                None => return Ok(None),
            }
        }
    }

    /// Attempt a match starting at exactly \p pos.
    /// \return the end of the match, or None.
    pub(crate) fn match_at(&mut self, pos: usize) -> MatchResult {
        for group in self.groups.iter_mut() {
            group.reset();
        }
        self.bts.clear();
        self.bts.push(BacktrackInsn::Exhausted);
        self.frames.clear();
        self.try_at_pos(State {
            id: self.re.start,
            pos,
            frame: None,
        })
    }

    /// Find the first match starting at or after \p start.
    pub(crate) fn search(&mut self, start: usize) -> Result<Option<Range>, ExecError> {
        let re = self.re;
        let len = self.input.len();
        if start > len {
            return Ok(None);
        }
        let first = re.node(re.start);
        if first.flags.contains(NodeFlags::ANCHORED) && !self.multiline {
            if start > 0 {
                return Ok(None);
            }
            return Ok(self.match_at(0)?.map(|end| 0..end));
        }

        // Skip ahead to the first literal, when there is one.
        let first_literal = match first.op {
            _ if re.flags.no_opt || self.icase => None,
            Op::Flat1 { c } => Some(c),
            Op::Flat { start, .. } => Some(re.source[start as usize]),
            _ => None,
        };

        let mut pos = start;
        while pos <= len {
            if let Some(c) = first_literal {
                pos = match self.input[pos..].iter().position(|&u| u == c) {
                    Some(offset) => pos + offset,
                    None => len,
                };
            }
            if let Some(end) = self.match_at(pos)? {
                return Ok(Some(pos..end));
            }
            pos += 1;
        }
        Ok(None)
    }
}
