//! Low-level length-tag-value primitives shared by the canonical block
//! encoding and the protocol payload encodings.
//!
//! Integers are fixed-width big-endian. Strings are UTF-8 with a 4-byte
//! big-endian length prefix. Byte strings are a 4-byte big-endian length
//! prefix followed by the raw bytes.

use crate::error::DecodeError;

pub fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

pub fn write_bytes(buf: &mut Vec<u8>, b: &[u8]) {
    write_u32(buf, b.len() as u32);
    buf.extend_from_slice(b);
}

/// A forward-only cursor over a byte slice, used to decode the canonical
/// encodings produced by the `write_*` helpers above.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.data.get(self.pos).ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 4;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_u32()? as usize;
        Ok(self.read_exact(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Fails if any bytes remain unconsumed. Canonical encodings are exact:
    /// nothing in this protocol pads or appends trailing data.
    pub fn expect_exhausted(&self) -> Result<(), DecodeError> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_string_and_bytes() {
        let mut buf = Vec::new();
        write_string(&mut buf, "hello");
        write_bytes(&mut buf, &[1, 2, 3]);
        write_u32(&mut buf, 42);

        let mut cur = Cursor::new(&buf);
        assert_eq!(cur.read_string().unwrap(), "hello");
        assert_eq!(cur.read_bytes().unwrap(), vec![1, 2, 3]);
        assert_eq!(cur.read_u32().unwrap(), 42);
        cur.expect_exhausted().unwrap();
    }

    #[test]
    fn truncated_input_is_eof() {
        let buf = vec![0, 0, 0, 5, b'h', b'i'];
        let mut cur = Cursor::new(&buf);
        assert!(matches!(cur.read_string(), Err(DecodeError::UnexpectedEof)));
    }
}
