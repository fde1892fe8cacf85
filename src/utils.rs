//! Byte-reading helpers shared by the EOF header and body parsers.

/// Reads a big-endian `u16` starting at `offset`.
///
/// # Panics
///
/// Panics if `offset + 2 > code.len()`. Callers are expected to have already
/// bounds-checked the read.
#[inline]
pub fn read_u16(code: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([code[offset], code[offset + 1]])
}

/// Reads a big-endian, two's-complement `i16` starting at `offset`.
///
/// # Panics
///
/// Panics if `offset + 2 > code.len()`.
#[inline]
pub fn read_i16(code: &[u8], offset: usize) -> i16 {
    read_u16(code, offset) as i16
}
