// Character classes like \d or \S, over UTF-16 code units.

/// An inclusive range of code units.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    pub first: u16,
    pub last: u16,
}

impl Interval {
    #[inline(always)]
    pub const fn contains(self, c: u16) -> bool {
        self.first <= c && c <= self.last
    }
}

/// Construct an interval from an inclusive range of char.
const fn r(first: char, last: char) -> Interval {
    Interval {
        first: first as u16,
        last: last as u16,
    }
}

/// Construct an interval from a single char.
const fn r1(c: char) -> Interval {
    Interval {
        first: c as u16,
        last: c as u16,
    }
}

// Note all of these are sorted.

/// ES3 15.10.2.12 word characters.
pub const WORD_CHARS: [Interval; 4] = [r('0', '9'), r('A', 'Z'), r1('_'), r('a', 'z')];

/// ES3 15.10.2.12 decimal digits.
pub const DIGITS: [Interval; 1] = [r('0', '9')];

/// White space, excluding the line terminators.
pub const WHITESPACE: [Interval; 9] = [
    // <TAB> <VT> <FF>
    r('\u{0009}', '\u{000C}'),
    r1('\u{0020}'),
    r1('\u{00A0}'),
    r1('\u{1680}'),
    r('\u{2000}', '\u{200A}'),
    r1('\u{202F}'),
    r1('\u{205F}'),
    r1('\u{3000}'),
    // <ZWNBSP>
    r1('\u{FEFF}'),
];

/// ES3 7.3
pub const LINE_TERMINATOR: [Interval; 3] =
    [r1('\u{000A}'), r1('\u{000D}'), r('\u{2028}', '\u{2029}')];

/// The character class escapes, \d \w \s and their negations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CharacterClassType {
    Digits,
    Spaces,
    Words,
}

impl CharacterClassType {
    /// \return the positive intervals of this class.
    pub fn intervals(self) -> &'static [Interval] {
        match self {
            CharacterClassType::Digits => &DIGITS,
            CharacterClassType::Words => &WORD_CHARS,
            CharacterClassType::Spaces => &WHITESPACE,
        }
    }

    /// \return whether \p c is a member of the (positive) class.
    #[inline]
    pub fn contains(self, c: u16) -> bool {
        match self {
            CharacterClassType::Digits => is_digit(c),
            CharacterClassType::Words => is_word_char(c),
            CharacterClassType::Spaces => is_space(c),
        }
    }
}

#[inline(always)]
pub fn is_digit(c: u16) -> bool {
    DIGITS[0].contains(c)
}

#[inline(always)]
pub fn is_word_char(c: u16) -> bool {
    WORD_CHARS.iter().any(|iv| iv.contains(c))
}

#[inline(always)]
pub fn is_line_terminator(c: u16) -> bool {
    matches!(c, 0x000A | 0x000D | 0x2028 | 0x2029)
}

#[inline]
pub fn is_space(c: u16) -> bool {
    is_line_terminator(c) || WHITESPACE.iter().any(|iv| iv.contains(c))
}
