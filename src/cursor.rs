//! A bounds-checked read cursor over a received datagram.

use crate::codec;
use crate::error::ParseError;

/// Walks the fields of a reply front to back.
///
/// Every read is checked against the end of the buffer. A failed read leaves the offset where it was.
#[derive(Debug, Clone)]
pub struct PacketCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> PacketCursor<'a> {
    /// Starts a cursor at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        PacketCursor { buf, offset: 0 }
    }

    /// Current offset into the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes not read yet.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    /// Reads the leading magic and checks it against `expected`.
    ///
    /// A buffer too short to hold the magic is `Truncated`, not a mismatch.
    pub fn expect_magic(&mut self, expected: u32) -> Result<(), ParseError> {
        let found = codec::read_u32(self.buf, self.offset)?;
        if found != expected {
            return Err(ParseError::MagicMismatch { expected, found });
        }
        self.offset += 4;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        let value = codec::read_u8(self.buf, self.offset)?;
        self.offset += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        let value = codec::read_u16(self.buf, self.offset)?;
        self.offset += 2;
        Ok(value)
    }

    pub fn read_octets(&mut self) -> Result<[u8; 4], ParseError> {
        let value = codec::read_octets(self.buf, self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Reads a null-terminated string and steps past its terminator.
    pub fn read_asciiz(&mut self) -> Result<&'a [u8], ParseError> {
        let bytes = codec::asciiz(self.buf, self.offset)?;
        self.offset += bytes.len() + 1;
        Ok(bytes)
    }

    /// Like [`read_asciiz`](Self::read_asciiz), decoding the bytes as UTF-8 and replacing invalid sequences.
    pub fn read_string(&mut self) -> Result<String, ParseError> {
        self.read_asciiz()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_mixed_fields() {
        let buf = [
            0xd4, 0xd6, 0x54, 0x00, b'h', b'i', 0, 7, 0x39, 0x30, 10, 0, 0, 1,
        ];
        let mut cursor = PacketCursor::new(&buf);
        cursor.expect_magic(5_560_020).unwrap();
        assert_eq!(cursor.read_asciiz().unwrap(), b"hi");
        assert_eq!(cursor.offset(), 7);
        assert_eq!(cursor.read_u8().unwrap(), 7);
        assert_eq!(cursor.read_u16().unwrap(), 12345);
        assert_eq!(cursor.read_octets().unwrap(), [10, 0, 0, 1]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn failed_read_does_not_advance() {
        let buf = [1, 2, 3];
        let mut cursor = PacketCursor::new(&buf);
        cursor.read_u8().unwrap();
        assert!(cursor.read_octets().is_err());
        assert_eq!(cursor.offset(), 1);
        assert!(cursor.read_asciiz().is_err());
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.read_u16().unwrap(), 0x0302);
    }

    #[test]
    fn magic_mismatch_is_distinct_from_truncation() {
        let mut cursor = PacketCursor::new(&[0, 0, 0, 0, 9]);
        assert_eq!(
            cursor.expect_magic(777_123),
            Err(ParseError::MagicMismatch {
                expected: 777_123,
                found: 0
            })
        );
        assert_eq!(cursor.offset(), 0);

        let mut cursor = PacketCursor::new(&[0xa3, 0xdb, 0x0b]);
        assert!(matches!(
            cursor.expect_magic(777_123),
            Err(ParseError::Truncated { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut cursor = PacketCursor::new(b"a\xffb\0");
        assert_eq!(cursor.read_string().unwrap(), "a\u{fffd}b");
        assert_eq!(cursor.remaining(), 0);
    }
}
