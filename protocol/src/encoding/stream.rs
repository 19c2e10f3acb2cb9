//! Bounds-checked byte reader and the CompactSize / byte-string helpers
//! shared by every component codec.
//!
//! `bytes::Buf` panics when asked for more bytes than it holds, so the
//! [`Reader`] checks `remaining()` before every fixed-size read and
//! surfaces [`DecodeError::Truncated`] instead.

use bytes::{Buf, BufMut};

use super::error::{DecodeError, EncodeError};
use super::params::SerializeParams;
use super::{Decodable, Encodable};
use crate::config::{DecodeLimits, MAX_SIZE};

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an untrusted byte slice that carries the caller's
/// [`DecodeLimits`].
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    limits: DecodeLimits,
}

impl<'a> Reader<'a> {
    /// Wraps `bytes` with the given limits.
    pub fn new(bytes: &'a [u8], limits: DecodeLimits) -> Self {
        Self { buf: bytes, limits }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// The limits this reader enforces.
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(DecodeError::Truncated { needed, remaining });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn read_i64_le(&mut self) -> Result<i64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64_le())
    }

    pub fn read_i64_be(&mut self) -> Result<i64, DecodeError> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    /// Reads exactly `N` raw bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Reads a Bitcoin CompactSize, rejecting non-minimal encodings and
    /// values above [`MAX_SIZE`].
    pub fn read_compact_size(&mut self) -> Result<u64, DecodeError> {
        let marker = self.read_u8()?;
        let value = match marker {
            0xFD => {
                let v = u64::from(self.read_u16_le()?);
                if v < 0xFD {
                    return Err(DecodeError::NonCanonicalCompactSize(v));
                }
                v
            }
            0xFE => {
                let v = u64::from(self.read_u32_le()?);
                if v < 0x1_0000 {
                    return Err(DecodeError::NonCanonicalCompactSize(v));
                }
                v
            }
            0xFF => {
                let v = self.read_u64_le()?;
                if v < 0x1_0000_0000 {
                    return Err(DecodeError::NonCanonicalCompactSize(v));
                }
                v
            }
            small => u64::from(small),
        };
        if value > MAX_SIZE {
            return Err(DecodeError::NonCanonicalCompactSize(value));
        }
        Ok(value)
    }

    /// Reads a vector length prefix and checks it against the element limit.
    /// Nothing is allocated until this returns.
    pub fn read_vec_len(&mut self) -> Result<usize, DecodeError> {
        let len = self.read_compact_size()?;
        if len > self.limits.max_vector_len {
            return Err(DecodeError::OversizedVector {
                len,
                max: self.limits.max_vector_len,
            });
        }
        Ok(len as usize)
    }

    /// Reads a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_compact_size()?;
        if len > self.limits.max_buffer_len {
            return Err(DecodeError::OversizedBuffer {
                len,
                max: self.limits.max_buffer_len,
            });
        }
        let len = len as usize;
        self.ensure(len)?;
        let mut out = vec![0u8; len];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Reads a length-prefixed list of `T`.
    pub fn read_list<T: Decodable>(
        &mut self,
        params: SerializeParams,
    ) -> Result<Vec<T>, DecodeError> {
        let len = self.read_vec_len()?;
        // Every element takes at least one byte, so the remaining input
        // bounds the reservation even when the limit is generous.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(T::decode(self, params)?);
        }
        Ok(items)
    }

    /// Consumes the reader, failing if any bytes are left.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Number of bytes the CompactSize encoding of `n` occupies.
pub fn compact_size_len(n: u64) -> usize {
    match n {
        0..=0xFC => 1,
        0xFD..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

/// Writes `n` as a minimal CompactSize.
pub fn write_compact_size<B: BufMut>(buf: &mut B, n: u64) {
    match compact_size_len(n) {
        1 => buf.put_u8(n as u8),
        3 => {
            buf.put_u8(0xFD);
            buf.put_u16_le(n as u16);
        }
        5 => {
            buf.put_u8(0xFE);
            buf.put_u32_le(n as u32);
        }
        _ => {
            buf.put_u8(0xFF);
            buf.put_u64_le(n);
        }
    }
}

/// Writes a length-prefixed byte string.
pub fn write_bytes<B: BufMut>(buf: &mut B, bytes: &[u8]) {
    write_compact_size(buf, bytes.len() as u64);
    buf.put_slice(bytes);
}

/// Writes a length-prefixed list of `T`.
pub fn write_list<T: Encodable, B: BufMut>(
    buf: &mut B,
    items: &[T],
    params: SerializeParams,
) -> Result<(), EncodeError> {
    write_compact_size(buf, items.len() as u64);
    for item in items {
        item.encode(buf, params)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> Reader<'_> {
        Reader::new(bytes, DecodeLimits::default())
    }

    #[test]
    fn test_compact_size_boundaries() {
        for (value, expected) in [
            (0u64, "00"),
            (0xFC, "fc"),
            (0xFD, "fdfd00"),
            (0xFFFF, "fdffff"),
            (0x1_0000, "fe00000100"),
            (0x0200_0000, "fe00000002"),
        ] {
            let mut buf = Vec::new();
            write_compact_size(&mut buf, value);
            assert_eq!(hex::encode(&buf), expected);
            assert_eq!(buf.len(), compact_size_len(value));
            assert_eq!(reader(&buf).read_compact_size().unwrap(), value);
        }
    }

    #[test]
    fn test_compact_size_rejects_non_minimal() {
        let bytes = hex::decode("fd1000").unwrap();
        assert_eq!(
            reader(&bytes).read_compact_size(),
            Err(DecodeError::NonCanonicalCompactSize(0x10))
        );
        let bytes = hex::decode("fe00010000").unwrap();
        assert_eq!(
            reader(&bytes).read_compact_size(),
            Err(DecodeError::NonCanonicalCompactSize(0x100))
        );
    }

    #[test]
    fn test_compact_size_rejects_above_max_size() {
        let bytes = hex::decode("fe01000002").unwrap();
        assert!(matches!(
            reader(&bytes).read_compact_size(),
            Err(DecodeError::NonCanonicalCompactSize(_))
        ));
    }

    #[test]
    fn test_truncated_fixed_width_read() {
        let mut r = reader(&[0x01, 0x02]);
        assert_eq!(
            r.read_u32_le(),
            Err(DecodeError::Truncated { needed: 4, remaining: 2 })
        );
    }

    #[test]
    fn test_read_bytes_checks_limit_before_allocating() {
        let limits = DecodeLimits {
            max_buffer_len: 4,
            ..DecodeLimits::default()
        };
        // Prefix claims 0x10000 bytes; only the prefix is present.
        let bytes = hex::decode("fe00000100").unwrap();
        let mut r = Reader::new(&bytes, limits);
        assert_eq!(
            r.read_bytes(),
            Err(DecodeError::OversizedBuffer { len: 0x1_0000, max: 4 })
        );
    }

    #[test]
    fn test_read_bytes_truncated_payload() {
        let mut r = reader(&[0x03, 0xAA]);
        assert_eq!(
            r.read_bytes(),
            Err(DecodeError::Truncated { needed: 3, remaining: 1 })
        );
    }

    #[test]
    fn test_vec_len_limit() {
        let limits = DecodeLimits {
            max_vector_len: 2,
            ..DecodeLimits::default()
        };
        let mut r = Reader::new(&[0x03], limits);
        assert_eq!(
            r.read_vec_len(),
            Err(DecodeError::OversizedVector { len: 3, max: 2 })
        );
    }

    #[test]
    fn test_finish_reports_trailing_bytes() {
        let mut r = reader(&[0x01, 0x02, 0x03]);
        r.read_u8().unwrap();
        assert_eq!(r.finish(), Err(DecodeError::TrailingBytes(2)));
    }

    #[test]
    fn test_write_bytes_prefixes_length() {
        let mut buf = Vec::new();
        write_bytes(&mut buf, &[0xDE, 0xAD]);
        assert_eq!(buf, vec![0x02, 0xDE, 0xAD]);
        assert_eq!(reader(&buf).read_bytes().unwrap(), vec![0xDE, 0xAD]);
    }
}
