//! Case folding for case-insensitive matching.
//!
//! Folding follows the ES3 Canonicalize operation: a code unit is mapped to
//! its upper case form, unless that form is more than one code unit, or would
//! map a non-ASCII code unit into ASCII.

/// Apply a simple case mapping to \p c, returning \p c if the mapping is not
/// a single BMP code unit or would cross into ASCII.
#[inline]
fn map_case<I: Iterator<Item = char>>(c: u16, mut mapped: I) -> u16 {
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => {
            let m = m as u32;
            if m > 0xFFFF || (c >= 128 && m < 128) {
                c
            } else {
                m as u16
            }
        }
        _ => c,
    }
}

/// \return the canonical (upper case) form of a code unit.
pub fn fold(c: u16) -> u16 {
    if c < 128 {
        return (c as u8).to_ascii_uppercase() as u16;
    }
    match char::from_u32(c as u32) {
        Some(ch) => map_case(c, ch.to_uppercase()),
        // Lone surrogates have no case.
        None => c,
    }
}

/// \return whether these two code units fold to the same value.
#[inline]
pub fn fold_equals(c1: u16, c2: u16) -> bool {
    c1 == c2 || fold(c1) == fold(c2)
}

/// \return whether two equal-length slices are equal, ignoring case.
pub fn fold_equals_slice(lhs: &[u16], rhs: &[u16]) -> bool {
    lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(&a, &b)| fold_equals(a, b))
}
