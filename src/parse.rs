//! Compiler from regex patterns to the node graph

use crate::api::{self, BackrefMode};
use crate::bitmap::ClassBitmap;
use crate::charclasses::CharacterClassType;
use crate::ir::{CharClass, Node, NodeFlags, NodeId, Op, Program, Repeat};
use crate::types::{CaptureGroupID, MAX_CAPTURE_GROUPS, MAX_REPEAT};
use crate::util::{decimal_value, hex_value, is_octal_digit, to_char_sat, unit};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::ops;

/// The category of a compile error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A flag character other than g, i or m.
    InvalidFlag,
    /// A '(' without its ')'.
    UnterminatedGroup,
    /// A ')' without its '('.
    UnmatchedParen,
    /// A (? that is not (?: (?= or (?!.
    InvalidGroup,
    /// A '[' without its ']'.
    UnterminatedClass,
    /// A {n, quantifier without its '}'.
    UnterminatedQuantifier,
    /// A quantifier with min > max or max == 0, or a quantifier following
    /// another quantifier.
    BadQuantifier,
    /// A quantifier count that does not fit in 16 bits.
    QuantifierOverflow,
    /// A quantifier with no atom (or an assertion) before it.
    NothingToRepeat,
    /// A backslash at the end of the pattern.
    TrailingBackslash,
    /// A decimal escape too large to name a group.
    OverlargeBackreference,
    /// A class range like [z-a].
    BadRange,
    /// More capture groups than can be numbered.
    TooManyGroups,
}

/// Represents an error encountered during regex compilation.
/// The text contains a human-readable error message naming the offending
/// source; the position is the code unit offset where it starts.
#[derive(Debug, Clone)]
pub struct Error {
    pub text: String,
    pub position: usize,
    pub kind: ErrorKind,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at position {}", self.text, self.position)
    }
}

impl std::error::Error for Error {}

fn error<S, T>(kind: ErrorKind, position: usize, text: S) -> Result<T, Error>
where
    S: ToString,
{
    Err(Error {
        text: text.to_string(),
        position,
        kind,
    })
}

/// One item of a bracket class.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassItem {
    Unit(u16),
    Range(u16, u16),
    Class(CharacterClassType, bool),
}

/// \return the largest code unit a class escape can contribute.
fn class_escape_max(class_type: CharacterClassType, positive: bool) -> u16 {
    if positive {
        class_type.intervals().last().map_or(0, |iv| iv.last)
    } else {
        0xFFFF
    }
}

/// \return the value of \p count hex digits starting at \p pos, if they are
/// all present.
fn hex_run(src: &[u16], pos: usize, count: usize) -> Option<u16> {
    let digits = src.get(pos..pos + count)?;
    digits
        .iter()
        .try_fold(0u32, |acc, &d| Some(acc * 16 + hex_value(d)?))
        .map(|v| v as u16)
}

/// Decode a legacy octal escape of up to three digits, not exceeding \377.
fn octal_escape(src: &[u16], pos: usize) -> (u16, usize) {
    let mut value = 0u32;
    let mut end = pos;
    while end < src.len() && end - pos < 3 && is_octal_digit(src[end]) {
        let next = value * 8 + (src[end] - unit('0')) as u32;
        if next > 0o377 {
            break;
        }
        value = next;
        end += 1;
    }
    (value as u16, end)
}

/// Decode a character escape. \p pos is the offset just past the backslash
/// and must be in bounds.
/// \return the code unit and the offset to resume parsing from.
fn character_escape(src: &[u16], pos: usize) -> (u16, usize) {
    let c = src[pos];
    match to_char_sat(c) {
        'f' => (0x0C, pos + 1),
        'n' => (0x0A, pos + 1),
        'r' => (0x0D, pos + 1),
        't' => (0x09, pos + 1),
        'v' => (0x0B, pos + 1),
        'c' => match src.get(pos + 1).map(|&l| to_char_sat(l)) {
            Some(l) if l.is_ascii_alphabetic() => ((l as u16) % 32, pos + 2),
            // \c without a letter is a literal backslash; the c is reparsed.
            _ => (unit('\\'), pos),
        },
        'x' => match hex_run(src, pos + 1, 2) {
            Some(v) => (v, pos + 3),
            None => (unit('x'), pos + 1),
        },
        'u' => match hex_run(src, pos + 1, 4) {
            Some(v) => (v, pos + 5),
            None => (unit('u'), pos + 1),
        },
        '0'..='7' => octal_escape(src, pos),
        _ => (c, pos + 1),
    }
}

/// Decode one class atom starting at \p pos.
fn class_atom(contents: &[u16], pos: usize) -> (ClassItem, usize) {
    if contents[pos] != unit('\\') {
        return (ClassItem::Unit(contents[pos]), pos + 1);
    }
    if pos + 1 >= contents.len() {
        return (ClassItem::Unit(unit('\\')), pos + 1);
    }
    let ec = to_char_sat(contents[pos + 1]);
    let class_type = match ec {
        'd' | 'D' => CharacterClassType::Digits,
        's' | 'S' => CharacterClassType::Spaces,
        'w' | 'W' => CharacterClassType::Words,
        // Backspace inside a class.
        'b' => return (ClassItem::Unit(0x08), pos + 2),
        _ => {
            let (c, end) = character_escape(contents, pos + 1);
            return (ClassItem::Unit(c), end);
        }
    };
    let positive = ec.is_ascii_lowercase();
    (ClassItem::Class(class_type, positive), pos + 2)
}

/// Decode the contents of a bracket class, without the brackets or a leading
/// ^, passing each item to \p sink.
/// \return the largest code unit the class can contain, or the error kind and
/// the offset within \p contents where it occurred.
pub fn scan_class<F>(contents: &[u16], mut sink: F) -> Result<u16, (ErrorKind, usize)>
where
    F: FnMut(ClassItem),
{
    let mut max: u16 = 0;
    let mut pos = 0;
    while pos < contents.len() {
        let atom_start = pos;
        let (first, after) = class_atom(contents, pos);
        pos = after;
        if let ClassItem::Unit(lo) = first {
            if pos + 1 < contents.len() && contents[pos] == unit('-') {
                let (second, after_second) = class_atom(contents, pos + 1);
                // A range with a class escape at either end is a literal dash.
                if let ClassItem::Unit(hi) = second {
                    if lo > hi {
                        return Err((ErrorKind::BadRange, atom_start));
                    }
                    max = max.max(hi);
                    sink(ClassItem::Range(lo, hi));
                    pos = after_second;
                    continue;
                }
            }
        }
        max = max.max(match first {
            ClassItem::Unit(c) => c,
            ClassItem::Range(_, hi) => hi,
            ClassItem::Class(class_type, positive) => class_escape_max(class_type, positive),
        });
        sink(first);
    }
    Ok(max)
}

/// Build the membership bitmap of a class from its source contents.
pub fn build_class_bitmap(contents: &[u16], max: u16, icase: bool) -> ClassBitmap {
    let mut bitmap = ClassBitmap::with_max(max);
    let scanned = scan_class(contents, |item| match item {
        ClassItem::Unit(c) => bitmap.add_range(c, c),
        ClassItem::Range(lo, hi) => bitmap.add_range(lo, hi),
        ClassItem::Class(class_type, positive) => bitmap.add_class(class_type, positive),
    });
    debug_assert!(scanned == Ok(max), "class contents changed since compile");
    if icase {
        bitmap.with_folds()
    } else {
        bitmap
    }
}

/// \return whether a char ends a run of literal characters.
fn is_syntax_char(c: char) -> bool {
    matches!(
        c,
        '^' | '$' | '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | '{' | '|'
    )
}

/// Count the capturing groups in a pattern without compiling it.
fn count_capture_groups(src: &[u16]) -> usize {
    let mut count = 0;
    let mut in_class = false;
    let mut pos = 0;
    while pos < src.len() {
        match to_char_sat(src[pos]) {
            '\\' => pos += 1,
            '[' => in_class = true,
            ']' => in_class = false,
            '(' if !in_class && src.get(pos + 1) != Some(&unit('?')) => count += 1,
            _ => {}
        }
        pos += 1;
    }
    count
}

type Tails = SmallVec<[NodeId; 4]>;

/// A compiled piece of the pattern whose tails are not yet linked.
struct Fragment {
    head: NodeId,

    /// Nodes whose next is the piece's continuation.
    tails: Tails,

    /// Whether every path through the piece consumes input.
    nonempty: bool,

    /// Whether the piece is a zero-width assertion.
    assertion: bool,
}

#[derive(Debug, Copy, Clone)]
struct Quantifier {
    min: u32,
    max: Option<u32>,
    lazy: bool,
}

/// Represents the state used to compile a regex.
struct Parser<'a> {
    /// The source, as code units.
    src: &'a [u16],

    /// Read cursor into src.
    pos: usize,

    flags: api::Flags,

    config: api::Config,

    /// Number of capturing groups opened so far.
    group_count: CaptureGroupID,

    /// Number of capturing groups in the whole pattern.
    total_groups: usize,

    nodes: Vec<Node>,

    /// Tails of lookahead bodies. Their next is where the lookahead started,
    /// not input that follows them.
    lookahead_tails: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    /// Peek at the next character.
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Peek \p offset characters ahead.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).map(|&c| to_char_sat(c))
    }

    /// \return the next character.
    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consume a character which is known to be next.
    fn consume(&mut self, c: char) {
        debug_assert!(self.peek() == Some(c), "char was not next");
        self.pos += 1;
    }

    /// If our contents begin with the char c, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// If our contents begin with the string \p s, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume_str(&mut self, s: &str) -> bool {
        let len = s.chars().count();
        if s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c)) {
            self.pos += len;
            true
        } else {
            false
        }
    }

    /// The source text in a range, for error messages.
    fn text(&self, range: ops::Range<usize>) -> String {
        let end = range.end.min(self.src.len());
        String::from_utf16_lossy(&self.src[range.start.min(end)..end])
    }

    /// \return whether a quantifier starts at the cursor.
    fn at_quantifier(&self) -> bool {
        match self.peek() {
            Some('*') | Some('+') | Some('?') => true,
            Some('{') => self.peek_at(1).map_or(false, |c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn push(&mut self, op: Op) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let mut node = Node::new(op);
        if node.op.matches_exactly_one_char() {
            node.flags |= NodeFlags::SINGLE_CHAR | NodeFlags::NON_EMPTY;
        } else if let Op::Flat { .. } = node.op {
            node.flags |= NodeFlags::NON_EMPTY;
        }
        self.nodes.push(node);
        id
    }

    /// Make a fragment of a single new node.
    fn single(&mut self, op: Op) -> Fragment {
        let assertion = op.is_assertion();
        let id = self.push(op);
        Fragment {
            head: id,
            tails: smallvec![id],
            nonempty: self.nodes[id as usize].flags.contains(NodeFlags::NON_EMPTY),
            assertion,
        }
    }

    /// Set the next of every node in \p tails to \p target.
    fn link(&mut self, tails: &[NodeId], target: NodeId) {
        for &tail in tails {
            let node = &mut self.nodes[tail as usize];
            debug_assert!(node.next.is_none(), "node linked twice");
            node.next = Some(target);
            let flags = &mut self.nodes[target as usize].flags;
            if flags.contains(NodeFlags::IS_NEXT_TARGET) {
                flags.insert(NodeFlags::IS_JOIN_POINT);
            } else {
                flags.insert(NodeFlags::IS_NEXT_TARGET);
            }
        }
    }

    fn try_parse(mut self) -> Result<Program, Error> {
        let body = self.consume_disjunction()?;
        if self.pos < self.src.len() {
            debug_assert!(self.peek() == Some(')'));
            return error(
                ErrorKind::UnmatchedParen,
                self.pos,
                format!("Unmatched ')' in {}", self.text(0..self.src.len())),
            );
        }
        let end = self.push(Op::End);
        self.link(&body.tails, end);
        Ok(self.finalize(body.head))
    }

    /// Compute the flags that need the whole graph, and package the program.
    fn finalize(mut self, start: NodeId) -> Program {
        if !self.flags.no_opt {
            for id in 0..self.nodes.len() {
                let node = &self.nodes[id];
                if node.op.repeat_bounds().is_none()
                    || !node.flags.contains(NodeFlags::SINGLE_CHAR)
                    || self.lookahead_tails.contains(&(id as NodeId))
                {
                    continue;
                }
                let good_next = match node.next.map(|next| &self.nodes[next as usize].op) {
                    Some(Op::Flat1 { .. }) | Some(Op::Flat { .. }) => true,
                    _ => false,
                };
                if good_next {
                    self.nodes[id].flags.insert(NodeFlags::HAS_GOOD_NEXT);
                }
            }
            if let Op::Bol = self.nodes[start as usize].op {
                self.nodes[start as usize].flags.insert(NodeFlags::ANCHORED);
            }
        }
        let program = Program {
            nodes: self.nodes,
            start,
            group_count: self.group_count,
            source: self.src.to_vec(),
            flags: self.flags,
            config: self.config,
        };
        debug_assert!(program.is_well_formed(), "malformed graph:\n{}", program);
        program
    }

    /// Disjunction: alternatives separated by '|'.
    /// Every branch but the last is wrapped in an Alt and ends with a Jump to
    /// the shared continuation. The last branch is the final fallback.
    fn consume_disjunction(&mut self) -> Result<Fragment, Error> {
        let mut branch = self.consume_term()?;
        let mut nonempty = branch.nonempty;
        let mut alts: Vec<NodeId> = Vec::new();
        let mut tails: Tails = SmallVec::new();
        while self.try_consume('|') {
            let jump = self.push(Op::Jump);
            self.link(&branch.tails, jump);
            tails.push(jump);
            alts.push(self.push(Op::Alt { child: branch.head }));
            branch = self.consume_term()?;
            nonempty &= branch.nonempty;
        }
        let head = match alts.first() {
            None => return Ok(branch),
            Some(&head) => head,
        };
        for pair in alts.windows(2) {
            self.link(&[pair[0]], pair[1]);
        }
        if let Some(&last_alt) = alts.last() {
            self.link(&[last_alt], branch.head);
        }
        tails.extend(branch.tails);
        Ok(Fragment {
            head,
            tails,
            nonempty,
            assertion: false,
        })
    }

    /// Alternative: a sequence of items.
    fn consume_term(&mut self) -> Result<Fragment, Error> {
        let mut result: Option<Fragment> = None;
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let item = self.consume_item()?;
            result = Some(match result {
                None => item,
                Some(prev) => {
                    self.link(&prev.tails, item.head);
                    Fragment {
                        head: prev.head,
                        tails: item.tails,
                        nonempty: prev.nonempty || item.nonempty,
                        assertion: false,
                    }
                }
            });
        }
        match result {
            Some(frag) => Ok(frag),
            None => Ok(self.single(Op::Empty)),
        }
    }

    /// An atom followed by an optional quantifier.
    fn consume_item(&mut self) -> Result<Fragment, Error> {
        if self.at_quantifier() {
            return error(
                ErrorKind::NothingToRepeat,
                self.pos,
                format!("Nothing to repeat before {}", self.text(self.pos..self.pos + 1)),
            );
        }
        let start_group = self.group_count;
        let atom = self.consume_atom()?;
        let quant_start = self.pos;
        let quant = match self.try_consume_quantifier()? {
            None => return Ok(atom),
            Some(quant) => quant,
        };
        if atom.assertion {
            return error(
                ErrorKind::NothingToRepeat,
                quant_start,
                format!(
                    "Nothing to repeat: quantifier {} follows an assertion",
                    self.text(quant_start..self.pos)
                ),
            );
        }
        if self.at_quantifier() {
            return error(
                ErrorKind::BadQuantifier,
                self.pos,
                format!("Invalid quantifier {}", self.text(self.pos..self.pos + 1)),
            );
        }
        Ok(self.quantify(atom, quant, start_group..self.group_count))
    }

    fn quantify(
        &mut self,
        atom: Fragment,
        quant: Quantifier,
        groups: ops::Range<CaptureGroupID>,
    ) -> Fragment {
        let single_char = atom.tails.as_slice() == [atom.head]
            && self.nodes[atom.head as usize].op.matches_exactly_one_char();
        let body = Repeat {
            child: atom.head,
            groups,
        };
        let op = match (quant.min, quant.max) {
            (0, None) => Op::Star(body),
            (1, None) => Op::Plus(body),
            (0, Some(1)) => Op::Opt(body),
            (min, max) => Op::Quant { body, min, max },
        };
        let q = self.push(op);
        let flags = &mut self.nodes[q as usize].flags;
        flags.set(NodeFlags::LAZY, quant.lazy);
        flags.set(NodeFlags::NON_EMPTY, atom.nonempty);
        flags.set(NodeFlags::SINGLE_CHAR, single_char && !self.flags.no_opt);

        let mut tails: Tails = smallvec![q];
        tails.extend(atom.tails);
        Fragment {
            head: q,
            tails,
            nonempty: quant.min > 0 && atom.nonempty,
            assertion: false,
        }
    }

    fn consume_atom(&mut self) -> Result<Fragment, Error> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(self.single(Op::Empty)),
        };
        match c {
            '^' => {
                self.consume('^');
                Ok(self.single(Op::Bol))
            }
            '$' => {
                self.consume('$');
                Ok(self.single(Op::Eol))
            }
            '.' => {
                self.consume('.');
                Ok(self.single(Op::Dot))
            }
            '\\' => self.consume_atom_escape(),
            '(' => self.consume_group(),
            '[' => self.consume_bracket(),
            '{' => {
                // Not a quantifier, which was checked before; a literal brace.
                self.consume('{');
                Ok(self.single(Op::Flat1 { c: unit('{') }))
            }
            _ => Ok(self.consume_literal_run()),
        }
    }

    /// A run of literal characters. The run stops before a character that is
    /// followed by a quantifier, so the quantifier applies to it alone.
    fn consume_literal_run(&mut self) -> Fragment {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_syntax_char(c) {
                break;
            }
            self.pos += 1;
        }
        if self.pos - start > 1 && self.at_quantifier() {
            self.pos -= 1;
        }
        let len = self.pos - start;
        debug_assert!(len > 0, "empty literal run");
        if len == 1 {
            self.single(Op::Flat1 { c: self.src[start] })
        } else {
            self.single(Op::Flat {
                start: start as u32,
                len: len as u32,
            })
        }
    }

    fn consume_group(&mut self) -> Result<Fragment, Error> {
        let open = self.pos;
        let frag = if self.try_consume_str("(?:") {
            let body = self.consume_disjunction()?;
            let nc_open = self.push(Op::NcOpen);
            let nc_close = self.push(Op::NcClose);
            self.link(&[nc_open], body.head);
            self.link(&body.tails, nc_close);
            Fragment {
                head: nc_open,
                tails: smallvec![nc_close],
                nonempty: body.nonempty,
                assertion: false,
            }
        } else if self.try_consume_str("(?=") || self.try_consume_str("(?!") {
            let negate = self.src[self.pos - 1] == unit('!');
            let body = self.consume_disjunction()?;
            self.lookahead_tails.extend_from_slice(&body.tails);
            let child = body.head;
            let la = self.push(if negate {
                Op::NegAhead { child }
            } else {
                Op::Ahead { child }
            });
            let mut tails: Tails = smallvec![la];
            tails.extend(body.tails);
            Fragment {
                head: la,
                tails,
                nonempty: false,
                assertion: true,
            }
        } else if self.peek_at(1) == Some('?') {
            return error(
                ErrorKind::InvalidGroup,
                open,
                format!("Invalid group {}", self.text(open..open + 3)),
            );
        } else {
            self.consume('(');
            if self.group_count as usize >= MAX_CAPTURE_GROUPS {
                return error(
                    ErrorKind::TooManyGroups,
                    open,
                    "Capture group count limit exceeded",
                );
            }
            let group = self.group_count;
            self.group_count += 1;
            let body = self.consume_disjunction()?;
            let open_node = self.push(Op::Open { group });
            let close_node = self.push(Op::Close { group });
            self.link(&[open_node], body.head);
            self.link(&body.tails, close_node);
            Fragment {
                head: open_node,
                tails: smallvec![close_node],
                nonempty: body.nonempty,
                assertion: false,
            }
        };
        if !self.try_consume(')') {
            return error(
                ErrorKind::UnterminatedGroup,
                open,
                format!("Unterminated group {}", self.text(open..self.src.len())),
            );
        }
        Ok(frag)
    }

    /// A bracket class. The contents are validated here; the bitmap is built
    /// on first use.
    fn consume_bracket(&mut self) -> Result<Fragment, Error> {
        let open = self.pos;
        self.consume('[');
        let negated = self.try_consume('^');
        let start = self.pos;
        loop {
            match self.next() {
                None => {
                    return error(
                        ErrorKind::UnterminatedClass,
                        open,
                        format!("Unterminated character class {}", self.text(open..self.pos)),
                    )
                }
                Some('\\') => {
                    if self.next().is_none() {
                        return error(
                            ErrorKind::UnterminatedClass,
                            open,
                            format!("Unterminated character class {}", self.text(open..self.pos)),
                        );
                    }
                }
                Some(']') => break,
                Some(_) => {}
            }
        }
        let end = self.pos - 1;
        let max = match scan_class(&self.src[start..end], |_| {}) {
            Ok(max) => max,
            Err((kind, offset)) => {
                return error(
                    kind,
                    start + offset,
                    format!("Invalid character range in {}", self.text(open..self.pos)),
                )
            }
        };
        let class = CharClass::new(start as u32..end as u32, negated, max);
        Ok(self.single(Op::Class(Box::new(class))))
    }

    fn consume_atom_escape(&mut self) -> Result<Fragment, Error> {
        let backslash = self.pos;
        self.consume('\\');
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return error(
                    ErrorKind::TrailingBackslash,
                    backslash,
                    "Trailing backslash at end of pattern",
                )
            }
        };
        let op = match c {
            'b' => Op::WordBoundary,
            'B' => Op::NonWordBoundary,
            'd' => Op::Digit,
            'D' => Op::NonDigit,
            'w' => Op::Word,
            'W' => Op::NonWord,
            's' => Op::Space,
            'S' => Op::NonSpace,
            '1'..='9' => return self.consume_decimal_escape(backslash),
            _ => {
                let (c, end) = character_escape(self.src, self.pos);
                self.pos = end;
                return Ok(self.single(Op::Flat1 { c }));
            }
        };
        self.consume(c);
        Ok(self.single(op))
    }

    /// A backreference, or an octal escape or literal digit if there are not
    /// enough groups.
    fn consume_decimal_escape(&mut self, backslash: usize) -> Result<Fragment, Error> {
        let start = self.pos;
        let value = self.consume_decimal_digits();
        if value as usize > MAX_CAPTURE_GROUPS {
            return error(
                ErrorKind::OverlargeBackreference,
                backslash,
                format!("Backreference {} too large", self.text(backslash..self.pos)),
            );
        }
        let limit = match self.config.backrefs {
            BackrefMode::Legacy => self.group_count as usize,
            BackrefMode::Ecma => self.total_groups,
        };
        if value as usize <= limit {
            let group = (value - 1) as CaptureGroupID;
            return Ok(self.single(Op::BackRef { group }));
        }
        let (c, end) = character_escape(self.src, start);
        self.pos = end;
        Ok(self.single(Op::Flat1 { c }))
    }

    /// Consume a run of decimal digits, saturating on overflow.
    fn consume_decimal_digits(&mut self) -> u32 {
        let mut result: u32 = 0;
        while let Some(digit) = self.src.get(self.pos).and_then(|&c| decimal_value(c)) {
            self.pos += 1;
            result = result.saturating_mul(10).saturating_add(digit);
        }
        result
    }

    fn try_consume_quantifier(&mut self) -> Result<Option<Quantifier>, Error> {
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some('*') => {
                self.consume('*');
                (0, None)
            }
            Some('+') => {
                self.consume('+');
                (1, None)
            }
            Some('?') => {
                self.consume('?');
                (0, Some(1))
            }
            Some('{') if self.at_quantifier() => {
                self.consume('{');
                let min = self.consume_decimal_digits();
                let max = if !self.try_consume(',') {
                    // Like {3}.
                    Some(min)
                } else if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    // Like {3,4}.
                    Some(self.consume_decimal_digits())
                } else {
                    // Like {3,}.
                    None
                };
                if !self.try_consume('}') {
                    return error(
                        ErrorKind::UnterminatedQuantifier,
                        start,
                        format!("Unterminated quantifier {}", self.text(start..self.pos)),
                    );
                }
                let text = self.text(start..self.pos);
                if min > MAX_REPEAT || max.map_or(false, |max| max > MAX_REPEAT) {
                    return error(
                        ErrorKind::QuantifierOverflow,
                        start,
                        format!("Quantifier count too large {}", text),
                    );
                }
                if let Some(max) = max {
                    if min > max || max == 0 {
                        return error(
                            ErrorKind::BadQuantifier,
                            start,
                            format!("Invalid quantifier {}", text),
                        );
                    }
                }
                (min, max)
            }
            _ => return Ok(None),
        };
        let lazy = self.try_consume('?');
        Ok(Some(Quantifier { min, max, lazy }))
    }
}

/// Try compiling a given pattern.
/// \return the compiled program, or an error.
pub fn try_parse(
    pattern: &[u16],
    flags: api::Flags,
    config: api::Config,
) -> Result<Program, Error> {
    let total_groups = match config.backrefs {
        BackrefMode::Ecma => count_capture_groups(pattern),
        BackrefMode::Legacy => 0,
    };
    let parser = Parser {
        src: pattern,
        pos: 0,
        flags,
        config,
        group_count: 0,
        total_groups,
        nodes: Vec::new(),
        lookahead_tails: Vec::new(),
    };
    parser.try_parse()
}

/// Compile \p text as a literal: every character matches itself.
pub fn compile_literal(text: &[u16], flags: api::Flags, config: api::Config) -> Program {
    let mut parser = Parser {
        src: text,
        pos: text.len(),
        flags,
        config,
        group_count: 0,
        total_groups: 0,
        nodes: Vec::new(),
        lookahead_tails: Vec::new(),
    };
    let body = match text.len() {
        0 => parser.single(Op::Empty),
        1 => parser.single(Op::Flat1 { c: text[0] }),
        len => parser.single(Op::Flat {
            start: 0,
            len: len as u32,
        }),
    };
    let end = parser.push(Op::End);
    parser.link(&body.tails, end);
    parser.finalize(body.head)
}
