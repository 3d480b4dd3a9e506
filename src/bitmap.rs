//! Bitmaps for compiled character classes.

use crate::charclasses::{CharacterClassType, Interval};
use crate::folds;
use core::fmt;

/// A set of code units, one bit per code unit from 0 up to a maximum.
/// Code units above the maximum are never members.
#[derive(Clone, PartialEq, Eq)]
pub struct ClassBitmap {
    bits: Vec<u8>,
    max: u16,
}

impl ClassBitmap {
    /// Construct an empty bitmap covering code units 0..=max.
    pub fn with_max(max: u16) -> ClassBitmap {
        ClassBitmap {
            bits: vec![0; (max as usize >> 3) + 1],
            max,
        }
    }

    /// \return whether this bitmap contains a given code unit.
    #[inline(always)]
    pub fn contains(&self, c: u16) -> bool {
        if c > self.max {
            return false;
        }
        let byte = (c >> 3) as usize;
        let bit = c & 0x7;
        (self.bits[byte] & (1 << bit)) != 0
    }

    /// Set a bit in this bitmap.
    #[inline(always)]
    pub fn set(&mut self, c: u16) {
        debug_assert!(c <= self.max, "Code unit outside bitmap");
        let byte = (c >> 3) as usize;
        let bit = c & 0x7;
        self.bits[byte] |= 1 << bit;
    }

    /// Set every code unit of an inclusive range, clamped to our maximum.
    pub fn add_range(&mut self, first: u16, last: u16) {
        if first > self.max {
            return;
        }
        for c in first..=last.min(self.max) {
            self.set(c)
        }
    }

    /// Add a class escape. A negated escape adds everything up to our maximum
    /// which is not in the positive class.
    pub fn add_class(&mut self, class_type: CharacterClassType, positive: bool) {
        if positive {
            for &Interval { first, last } in class_type.intervals() {
                self.add_range(first, last)
            }
            if class_type == CharacterClassType::Spaces {
                for &Interval { first, last } in crate::charclasses::LINE_TERMINATOR.iter() {
                    self.add_range(first, last)
                }
            }
        } else {
            for c in 0..=self.max {
                if !class_type.contains(c) {
                    self.set(c)
                }
            }
        }
    }

    /// \return a copy of this bitmap which also contains the case fold of
    /// every member. The copy is widened when a fold lies above our maximum.
    pub fn with_folds(&self) -> ClassBitmap {
        let members = || (0..=self.max).filter(move |&c| self.contains(c));
        let max = members().map(folds::fold).fold(self.max, u16::max);
        let mut result = ClassBitmap::with_max(max);
        for c in members() {
            result.set(c);
            result.set(folds::fold(c));
        }
        result
    }

    /// Count number of set bits.
    pub fn count_bits(&self) -> u32 {
        self.bits.iter().map(|v| v.count_ones()).sum()
    }
}

impl fmt::Debug for ClassBitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ClassBitmap(max=0x{:x}, bits={})", self.max, self.count_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_contains() {
        let mut bm = ClassBitmap::with_max('z' as u16);
        bm.add_range('a' as u16, 'c' as u16);
        bm.set('z' as u16);
        assert!(bm.contains('a' as u16));
        assert!(bm.contains('c' as u16));
        assert!(!bm.contains('d' as u16));
        assert!(bm.contains('z' as u16));
        assert_eq!(bm.count_bits(), 4);
    }

    #[test]
    fn beyond_max_is_not_a_member() {
        let mut bm = ClassBitmap::with_max(0x7F);
        bm.add_range(0, 0x7F);
        assert!(bm.contains(0x7F));
        assert!(!bm.contains(0x80));
        assert!(!bm.contains(0xFFFF));
    }

    #[test]
    fn negated_class_escape() {
        let mut bm = ClassBitmap::with_max(0xFFFF);
        bm.add_class(CharacterClassType::Digits, false);
        assert!(!bm.contains('5' as u16));
        assert!(bm.contains('x' as u16));
        assert!(bm.contains(0xFFFF));
    }

    #[test]
    fn folds_widen_the_bitmap() {
        let mut bm = ClassBitmap::with_max(0xFF);
        bm.set('a' as u16);
        // y with diaeresis folds to U+0178.
        bm.set(0xFF);
        let folded = bm.with_folds();
        assert!(folded.contains('a' as u16));
        assert!(folded.contains('A' as u16));
        assert!(folded.contains(0xFF));
        assert!(folded.contains(0x178));
        assert!(!folded.contains('b' as u16));
        assert_eq!(folded.count_bits(), 4);
    }

    #[test]
    fn spaces_include_line_terminators() {
        let mut bm = ClassBitmap::with_max(0x3000);
        bm.add_class(CharacterClassType::Spaces, true);
        assert!(bm.contains('\n' as u16));
        assert!(bm.contains(' ' as u16));
        assert!(bm.contains(0x3000));
        assert!(!bm.contains('a' as u16));
    }
}
