//! Node graph for a compiled regex.
//!
//! A compiled pattern is an arena of Nodes addressed by NodeId. Each node
//! names the node to try after it succeeds through its `next` link;
//! alternations, quantifiers and lookaheads additionally own a `child`
//! sub-chain. Branch tails of alternations and the tails of quantifier and
//! lookahead bodies all link to the construct's own continuation, so a node
//! may be the target of several links (a join point) but the graph never
//! contains a cycle.

use crate::api::{Config, Flags};
use crate::bitmap::ClassBitmap;
use crate::folds;
use crate::parse;
use crate::types::CaptureGroupID;
use bitflags::bitflags;
use std::fmt;
use std::ops;
use std::sync::OnceLock;

/// Index of a node in its Program.
pub type NodeId = u32;

bitflags! {
    /// Per-node facts computed by the compiler.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// A `^` that starts the pattern; only offset 0 can match unless multiline.
        const ANCHORED = 1 << 0;
        /// The node always consumes exactly one code unit.
        const SINGLE_CHAR = 1 << 1;
        /// The node (or quantifier body) can never match the empty string.
        const NON_EMPTY = 1 << 2;
        /// Some node's `next` links here.
        const IS_NEXT_TARGET = 1 << 3;
        /// A quantifier whose continuation starts with a literal code unit.
        const HAS_GOOD_NEXT = 1 << 4;
        /// More than one node's `next` links here.
        const IS_JOIN_POINT = 1 << 5;
        /// A lazy (ungreedy) quantifier.
        const LAZY = 1 << 6;
    }
}

/// The body of a quantifier.
#[derive(Debug, Clone)]
pub struct Repeat {
    pub child: NodeId,

    /// Capture groups opened inside the body; cleared on every iteration.
    pub groups: ops::Range<CaptureGroupID>,
}

/// A bracketed character class like [a-z] or [^\d].
/// The class keeps its source span and builds its bitmap on first use.
#[derive(Debug)]
pub struct CharClass {
    /// Span of the class contents in the source, excluding brackets and ^.
    pub span: ops::Range<u32>,

    /// Whether the class is [^...].
    pub negated: bool,

    /// The largest code unit mentioned by the class.
    pub max: u16,

    bitmap: OnceLock<ClassBitmap>,
}

impl CharClass {
    pub fn new(span: ops::Range<u32>, negated: bool, max: u16) -> CharClass {
        CharClass {
            span,
            negated,
            max,
            bitmap: OnceLock::new(),
        }
    }

    /// \return the bitmap, building it if this is the first use.
    /// Building is idempotent: every build of the same span yields the same
    /// bitmap. With \p icase the bitmap also holds the fold of every member.
    pub fn bitmap(&self, source: &[u16], icase: bool) -> &ClassBitmap {
        self.bitmap.get_or_init(|| {
            let span = self.span.start as usize..self.span.end as usize;
            parse::build_class_bitmap(&source[span], self.max, icase)
        })
    }

    /// \return whether the bitmap has been built.
    #[cfg(test)]
    pub fn is_built(&self) -> bool {
        self.bitmap.get().is_some()
    }

    /// \return whether the code unit \p c matches this class, respecting
    /// negation. Ignoring case, \p c matches if some member has the same
    /// fold.
    #[inline]
    pub fn matches(&self, source: &[u16], c: u16, icase: bool) -> bool {
        let bm = self.bitmap(source, icase);
        let contained = bm.contains(c) || (icase && bm.contains(folds::fold(c)));
        contained != self.negated
    }
}

/// The operation performed by a node.
#[derive(Debug)]
pub enum Op {
    /// Matches the empty string.
    Empty,

    /// One alternative: try `child`, and on failure continue at `next`, which
    /// is the following alternative (or the last branch itself).
    Alt { child: NodeId },

    /// Ends a non-final alternation branch; continues at the shared
    /// continuation.
    Jump,

    /// A counted quantifier like x{2,5} or x{3,}.
    Quant {
        body: Repeat,
        min: u32,
        max: Option<u32>,
    },

    /// x*
    Star(Repeat),

    /// x+
    Plus(Repeat),

    /// x?
    Opt(Repeat),

    /// Entry to a capturing group.
    Open { group: CaptureGroupID },

    /// Exit from a capturing group.
    Close { group: CaptureGroupID },

    /// Entry to a (?:...) group.
    NcOpen,

    /// Exit from a (?:...) group.
    NcClose,

    /// ^
    Bol,

    /// $
    Eol,

    /// \b
    WordBoundary,

    /// \B
    NonWordBoundary,

    /// . (anything except a line terminator)
    Dot,

    /// A bracketed class.
    Class(Box<CharClass>),

    /// \d
    Digit,

    /// \D
    NonDigit,

    /// \w
    Word,

    /// \W
    NonWord,

    /// \s
    Space,

    /// \S
    NonSpace,

    /// A backreference to a group.
    BackRef { group: CaptureGroupID },

    /// A run of literal code units, stored as a span of the source.
    Flat { start: u32, len: u32 },

    /// A single literal code unit.
    Flat1 { c: u16 },

    /// (?=...)
    Ahead { child: NodeId },

    /// (?!...)
    NegAhead { child: NodeId },

    /// Reaching this node terminates the match successfully.
    End,
}

impl Op {
    /// \return the quantifier body and its (min, max) bounds, if this is a
    /// quantifier. A max of None means unbounded.
    pub fn repeat_bounds(&self) -> Option<(&Repeat, u32, Option<u32>)> {
        match self {
            Op::Quant { body, min, max } => Some((body, *min, *max)),
            Op::Star(body) => Some((body, 0, None)),
            Op::Plus(body) => Some((body, 1, None)),
            Op::Opt(body) => Some((body, 0, Some(1))),
            _ => None,
        }
    }

    /// \return the child sub-chain, if any.
    pub fn child(&self) -> Option<NodeId> {
        match self {
            Op::Alt { child } | Op::Ahead { child } | Op::NegAhead { child } => {
                Some(*child)
            }
            Op::Quant { body, .. } | Op::Star(body) | Op::Plus(body) | Op::Opt(body) => {
                Some(body.child)
            }
            _ => None,
        }
    }

    /// \return whether this op always consumes exactly one code unit.
    pub fn matches_exactly_one_char(&self) -> bool {
        match self {
            Op::Dot
            | Op::Class(..)
            | Op::Digit
            | Op::NonDigit
            | Op::Word
            | Op::NonWord
            | Op::Space
            | Op::NonSpace
            | Op::Flat1 { .. } => true,
            Op::Flat { len, .. } => *len == 1,
            _ => false,
        }
    }

    /// \return whether this op is a zero-width assertion.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Op::Bol
                | Op::Eol
                | Op::WordBoundary
                | Op::NonWordBoundary
                | Op::Ahead { .. }
                | Op::NegAhead { .. }
        )
    }
}

/// A node of the graph.
#[derive(Debug)]
pub struct Node {
    pub op: Op,

    /// What to try after this node succeeds. Only the End node has none.
    pub next: Option<NodeId>,

    pub flags: NodeFlags,
}

impl Node {
    pub fn new(op: Op) -> Node {
        Node {
            op,
            next: None,
            flags: NodeFlags::empty(),
        }
    }

    /// \return whether this node is a lazy quantifier.
    #[inline]
    pub fn is_lazy(&self) -> bool {
        self.flags.contains(NodeFlags::LAZY)
    }
}

/// A compiled regex: the node arena plus everything the matcher needs.
#[derive(Debug)]
pub struct Program {
    pub nodes: Vec<Node>,

    /// The first node to execute.
    pub start: NodeId,

    /// Number of capturing groups.
    pub group_count: CaptureGroupID,

    /// The pattern source as code units. Flat nodes and classes index into it.
    pub source: Vec<u16>,

    pub flags: Flags,

    pub config: Config,
}

impl Program {
    #[inline(always)]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// \return the code units of a Flat run.
    #[inline(always)]
    pub fn flat(&self, start: u32, len: u32) -> &[u16] {
        &self.source[start as usize..(start + len) as usize]
    }

    /// \return whether the graph is well formed: every node but End has a
    /// next, every link is in bounds, and there are no cycles.
    pub fn is_well_formed(&self) -> bool {
        let count = self.nodes.len();
        let mut indegree = vec![0u32; count];
        for node in &self.nodes {
            match (&node.op, node.next) {
                (Op::End, None) => {}
                (Op::End, Some(_)) | (_, None) => return false,
                _ => {}
            }
            for succ in node.next.into_iter().chain(node.op.child()) {
                if succ as usize >= count {
                    return false;
                }
                indegree[succ as usize] += 1;
            }
        }
        // Kahn's algorithm: a graph is acyclic iff every node can be removed.
        let mut ready: Vec<NodeId> = (0..count as NodeId)
            .filter(|&id| indegree[id as usize] == 0)
            .collect();
        let mut removed = 0;
        while let Some(id) = ready.pop() {
            removed += 1;
            let node = self.node(id);
            for succ in node.next.into_iter().chain(node.op.child()) {
                indegree[succ as usize] -= 1;
                if indegree[succ as usize] == 0 {
                    ready.push(succ);
                }
            }
        }
        removed == count
    }
}

fn display_op(program: &Program, op: &Op, f: &mut fmt::Formatter) -> fmt::Result {
    match op {
        Op::Flat { start, len } => {
            let text = String::from_utf16_lossy(program.flat(*start, *len));
            write!(f, "Flat {:?}", text)
        }
        Op::Flat1 { c } => write!(f, "Flat1 0x{:x}", c),
        Op::Class(cc) => {
            let span = cc.span.start as usize..cc.span.end as usize;
            let text = String::from_utf16_lossy(&program.source[span]);
            let sense = if cc.negated { "^" } else { "" };
            write!(f, "Class [{}{}] max=0x{:x}", sense, text, cc.max)
        }
        Op::Quant { body, min, max } => match max {
            Some(max) => write!(f, "Quant {{{},{}}} child={}", min, max, body.child),
            None => write!(f, "Quant {{{},}} child={}", min, body.child),
        },
        Op::Star(body) => write!(f, "Star child={}", body.child),
        Op::Plus(body) => write!(f, "Plus child={}", body.child),
        Op::Opt(body) => write!(f, "Opt child={}", body.child),
        Op::Alt { child } => write!(f, "Alt child={}", child),
        Op::Ahead { child } => write!(f, "Ahead child={}", child),
        Op::NegAhead { child } => write!(f, "NegAhead child={}", child),
        other => write!(f, "{:?}", other),
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, node) in self.nodes.iter().enumerate() {
            write!(f, "{}{}: ", if id as NodeId == self.start { ">" } else { " " }, id)?;
            display_op(self, &node.op, f)?;
            if let Some(next) = node.next {
                write!(f, " -> {}", next)?;
            }
            if !node.flags.is_empty() {
                write!(f, " {:?}", node.flags)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
