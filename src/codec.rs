//! Byte-level helpers shared by both reply formats.
//!
//! Every multi-byte integer on the wire is little-endian. Reads are bounds-checked against the end of the buffer and
//! never panic, whatever the input.

use crate::error::ParseError;

fn truncated(buf: &[u8], offset: usize, needed: usize) -> ParseError {
    ParseError::Truncated {
        offset,
        needed,
        available: buf.len().saturating_sub(offset),
    }
}

// Copies `N` bytes starting at `offset`, or reports how far short the buffer falls.
fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], ParseError> {
    offset
        .checked_add(N)
        .and_then(|end| buf.get(offset..end))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| truncated(buf, offset, N))
}

/// Reads one byte at `offset`.
pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, ParseError> {
    take::<1>(buf, offset).map(|[b]| b)
}

/// Reads a little-endian `u16` at `offset`.
pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16, ParseError> {
    take(buf, offset).map(u16::from_le_bytes)
}

/// Reads a little-endian `u32` at `offset`.
pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ParseError> {
    take(buf, offset).map(u32::from_le_bytes)
}

/// Reads four raw bytes at `offset`, without interpreting them as an integer.
pub fn read_octets(buf: &[u8], offset: usize) -> Result<[u8; 4], ParseError> {
    take(buf, offset)
}

/// Encodes a `u32` in wire order.
pub fn write_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Returns the bytes of the null-terminated string starting at `offset`, without the terminator.
///
/// The caller advances by `len + 1` to step over the terminator. Running off the end of the buffer before a zero
/// byte is found is an error, never a clamped string.
pub fn asciiz(buf: &[u8], offset: usize) -> Result<&[u8], ParseError> {
    let rest = buf.get(offset..).ok_or_else(|| truncated(buf, offset, 1))?;
    rest.iter()
        .position(|&b| b == 0)
        .map(|len| &rest[..len])
        .ok_or(ParseError::Unterminated { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_little_endian() {
        let buf = [0xa3, 0xdb, 0x0b, 0x00, 0x1f, 0x90];
        assert_eq!(read_u32(&buf, 0), Ok(777_123));
        assert_eq!(read_u16(&buf, 4), Ok(0x901f));
        assert_eq!(read_u8(&buf, 5), Ok(0x90));
    }

    #[test]
    fn challenge_encodes_low_byte_first() {
        assert_eq!(write_u32(777_123), [0xa3, 0xdb, 0x0b, 0x00]);
        assert_eq!(write_u32(5_560_020), [0xd4, 0xd6, 0x54, 0x00]);
    }

    #[test]
    fn short_reads_report_offset_and_shortfall() {
        let buf = [1, 2, 3];
        assert_eq!(
            read_u32(&buf, 0),
            Err(ParseError::Truncated {
                offset: 0,
                needed: 4,
                available: 3
            })
        );
        assert_eq!(
            read_u16(&buf, 2),
            Err(ParseError::Truncated {
                offset: 2,
                needed: 2,
                available: 1
            })
        );
        assert_eq!(
            read_u8(&buf, 10),
            Err(ParseError::Truncated {
                offset: 10,
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn offsets_near_usize_max_do_not_overflow() {
        assert!(matches!(
            read_u32(&[0; 8], usize::MAX - 1),
            Err(ParseError::Truncated { .. })
        ));
    }

    #[test]
    fn asciiz_stops_at_first_zero() {
        let buf = b"ab\0cd\0";
        assert_eq!(asciiz(buf, 0), Ok(&b"ab"[..]));
        assert_eq!(asciiz(buf, 3), Ok(&b"cd"[..]));
        assert_eq!(asciiz(buf, 2), Ok(&b""[..]));
    }

    #[test]
    fn asciiz_without_terminator_fails() {
        assert_eq!(
            asciiz(b"abc", 0),
            Err(ParseError::Unterminated { offset: 0 })
        );
        assert_eq!(asciiz(b"abc", 3), Err(ParseError::Unterminated { offset: 3 }));
        assert!(matches!(
            asciiz(b"abc", 4),
            Err(ParseError::Truncated { offset: 4, .. })
        ));
    }
}
