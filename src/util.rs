use std::rc::Rc;

// Helper function for matching code units against chars.
// Rust does not allow pattern-matching u16s against chars.
// Convert a u16 to a char; a lone surrogate becomes the largest char.
// Only use the result to pattern match against literals.
#[inline(always)]
pub fn to_char_sat(c: u16) -> char {
    char::from_u32(c as u32).unwrap_or(char::MAX)
}

/// \return the code unit for an ASCII char.
#[inline(always)]
pub const fn unit(c: char) -> u16 {
    c as u16
}

/// Encode a str as UTF-16 code units.
pub fn to_units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Encode a str as a shared UTF-16 buffer.
pub fn to_shared_units(s: &str) -> Rc<[u16]> {
    s.encode_utf16().collect::<Vec<u16>>().into()
}

/// Decode UTF-16 code units into a String, replacing unpaired surrogates.
pub fn units_to_string(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// \return the value of a hex digit code unit.
#[inline]
pub fn hex_value(c: u16) -> Option<u32> {
    to_char_sat(c).to_digit(16)
}

/// \return the value of a decimal digit code unit.
#[inline]
pub fn decimal_value(c: u16) -> Option<u32> {
    to_char_sat(c).to_digit(10)
}

/// \return whether a code unit is an octal digit.
#[inline]
pub fn is_octal_digit(c: u16) -> bool {
    (unit('0')..=unit('7')).contains(&c)
}
