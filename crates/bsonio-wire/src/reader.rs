use crate::error::ReadError;
use crate::pool::BufferPool;
use crate::source::ByteSource;
use crate::utf8::{self, StringLength};

/// Little-endian primitive reader over a [`ByteSource`].
///
/// Every multi-byte value is assembled from individual byte reads in
/// wire order, so the result never depends on the host's or the source's
/// native byte order:
///
/// ```text
///   i32:  b0 | b1 << 8 | b2 << 16 | b3 << 24
///   i64:  b0 | b1 << 8 | ... | b7 << 56
///   f32:  bits of the i32 read
///   f64:  bits of the i64 read
/// ```
///
/// The reader keeps a running count of bytes consumed by successful reads
/// (primitives, byte runs, strings and skips). A BSON parser compares it
/// against a document's declared length. A read that fails outright does
/// not move the count.
///
/// Not reentrant: one logical caller drives one reader at a time.
#[derive(Debug)]
pub struct PrimitiveReader<S> {
    source: S,
    total: u64,
}

impl<S: ByteSource> PrimitiveReader<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source, total: 0 }
    }

    /// Bytes consumed by successful reads since construction.
    #[must_use]
    pub fn total_bytes_read(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source. Bytes read through it directly are
    /// not counted.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Roll the count back to `total` after a multi-step read failed.
    pub(crate) fn rewind_count(&mut self, total: u64) {
        self.total = total;
    }

    fn end_of_stream(&self) -> ReadError {
        ReadError::EndOfStream { offset: self.total }
    }

    /// Read `N` bytes one at a time, committing them to the count only once
    /// all of them arrived.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut bytes = [0u8; N];
        for slot in &mut bytes {
            match self.source.read_byte()? {
                Some(b) => *slot = b,
                None => return Err(self.end_of_stream()),
            }
        }
        self.total += N as u64;
        Ok(bytes)
    }

    /// Read one unsigned byte.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if the source is exhausted, or
    /// [`ReadError::Io`] if it fails.
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let byte = self
            .source
            .read_byte()?
            .ok_or_else(|| self.end_of_stream())?;
        self.total += 1;
        Ok(byte)
    }

    /// Read one signed byte.
    ///
    /// # Errors
    ///
    /// Same as [`read_u8`](Self::read_u8).
    pub fn read_i8(&mut self) -> Result<i8, ReadError> {
        Ok(i8::from_le_bytes([self.read_u8()?]))
    }

    /// Read a one-byte boolean: zero is `false`, anything else `true`.
    ///
    /// # Errors
    ///
    /// Same as [`read_u8`](Self::read_u8).
    pub fn read_bool(&mut self) -> Result<bool, ReadError> {
        Ok(self.read_u8()? != 0)
    }

    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 2 bytes remain.
    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian UTF-16 code unit.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 2 bytes remain.
    pub fn read_utf16_unit(&mut self) -> Result<u16, ReadError> {
        self.read_u16()
    }

    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, ReadError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 8 bytes remain.
    pub fn read_i64(&mut self) -> Result<i64, ReadError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Read an IEEE-754 single from the bits of a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read an IEEE-754 double from the bits of a little-endian `u64`.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64, ReadError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Fill `buf` completely, looping over partial reads from the source.
    ///
    /// Callers wanting "`len` bytes at `off`" pass `&mut buf[off..off + len]`.
    /// An empty `buf` succeeds without touching the source.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if the source runs out first. The bytes
    /// already pulled are lost and not counted.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.source.read_into(&mut buf[filled..])?;
            if n == 0 {
                return Err(self.end_of_stream());
            }
            filled += n;
        }
        self.total += buf.len() as u64;
        Ok(())
    }

    /// Skip up to `n` bytes and return how many were skipped.
    ///
    /// Best effort: near the end of the stream this may skip fewer than
    /// `n` bytes without failing. `n == 0` does not touch the source.
    ///
    /// # Errors
    ///
    /// [`ReadError::Io`] if the source fails.
    pub fn skip(&mut self, n: usize) -> Result<usize, ReadError> {
        if n == 0 {
            return Ok(0);
        }
        let skipped = self.source.skip(n)?;
        self.total += skipped as u64;
        Ok(skipped)
    }

    /// BSON has no line-oriented text; this always fails.
    ///
    /// # Errors
    ///
    /// Always [`ReadError::UnsupportedOperation`].
    #[allow(clippy::unused_self)]
    pub fn read_line(&mut self) -> Result<String, ReadError> {
        Err(ReadError::UnsupportedOperation {
            operation: "read_line",
        })
    }

    /// Read a UTF-8 string, using the calling thread's scratch buffers.
    ///
    /// `StringLength::Exact(n)` reads exactly `n` bytes;
    /// `StringLength::NulTerminated` reads up to and including the next
    /// zero byte, which is not part of the result.
    ///
    /// # Errors
    ///
    /// [`ReadError::EndOfStream`] if the source runs out and
    /// [`ReadError::InvalidEncoding`] if the bytes are not UTF-8. Either
    /// way the count is left where it was before the call.
    pub fn read_string(&mut self, length: StringLength) -> Result<String, ReadError> {
        BufferPool::with_local(|pool| utf8::decode_utf8(self, pool, length))
    }

    /// [`read_string`](Self::read_string) with an explicitly supplied pool.
    ///
    /// # Errors
    ///
    /// Same as [`read_string`](Self::read_string).
    pub fn read_string_with_pool(
        &mut self,
        pool: &mut BufferPool,
        length: StringLength,
    ) -> Result<String, ReadError> {
        utf8::decode_utf8(self, pool, length)
    }

    /// Read a C-style, zero-terminated string (a BSON `cstring`).
    ///
    /// # Errors
    ///
    /// Same as [`read_string`](Self::read_string).
    pub fn read_cstring(&mut self) -> Result<String, ReadError> {
        self.read_string(StringLength::NulTerminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> PrimitiveReader<&[u8]> {
        PrimitiveReader::new(bytes)
    }

    #[test]
    fn reads_little_endian_integers() {
        let mut r = reader(&[
            0x34, 0x12, // u16
            0x78, 0x56, 0x34, 0x12, // u32
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
        ]);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(r.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.total_bytes_read(), 14);
    }

    #[test]
    fn reads_signed_values() {
        let mut r = reader(&[0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(r.read_i8().unwrap(), -1);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_i32().unwrap(), 0x7FFF_FFFF);
    }

    #[test]
    fn i64_uses_all_eight_bytes() {
        let mut r = reader(&[0, 0, 0, 0, 0, 0, 0, 0x80]);
        assert_eq!(r.read_i64().unwrap(), i64::MIN);
    }

    #[test]
    fn bool_is_any_nonzero() {
        let mut r = reader(&[0x00, 0x01, 0x7F]);
        assert!(!r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
    }

    #[test]
    fn floats_reinterpret_integer_bits() {
        let mut bytes = 1.5f32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&(-0.25f64).to_le_bytes());
        let mut r = reader(&bytes);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), -0.25);
        assert_eq!(r.total_bytes_read(), 12);
    }

    #[test]
    fn utf16_unit_is_little_endian() {
        let mut r = reader(&[0xAC, 0x20]);
        assert_eq!(r.read_utf16_unit().unwrap(), 0x20AC);
    }

    #[test]
    fn truncated_int_fails_without_counting() {
        let mut r = reader(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(r.read_u32().unwrap(), 0x0403_0201);
        let err = r.read_i32().unwrap_err();
        assert!(matches!(err, ReadError::EndOfStream { offset: 4 }));
        assert_eq!(r.total_bytes_read(), 4);
    }

    #[test]
    fn read_u8_on_empty_source() {
        let mut r = reader(&[]);
        assert!(r.read_u8().unwrap_err().is_end_of_stream());
        assert_eq!(r.total_bytes_read(), 0);
    }

    #[test]
    fn read_exact_fills_subrange() {
        let mut r = reader(b"abcdef");
        let mut buf = [0u8; 8];
        r.read_exact(&mut buf[2..6]).unwrap();
        assert_eq!(&buf, b"\0\0abcd\0\0");
        assert_eq!(r.total_bytes_read(), 4);
    }

    #[test]
    fn read_exact_zero_len_is_noop() {
        let mut r = reader(&[]);
        r.read_exact(&mut []).unwrap();
        assert_eq!(r.total_bytes_read(), 0);
    }

    #[test]
    fn read_exact_short_source() {
        let mut r = reader(b"ab");
        let mut buf = [0u8; 3];
        let err = r.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, ReadError::EndOfStream { offset: 0 }));
        assert_eq!(r.total_bytes_read(), 0);
    }

    #[test]
    fn skip_counts_actual_bytes() {
        let mut r = reader(&[1, 2, 3, 4, 5]);
        assert_eq!(r.skip(0).unwrap(), 0);
        assert_eq!(r.skip(2).unwrap(), 2);
        assert_eq!(r.read_u8().unwrap(), 3);
        assert_eq!(r.skip(10).unwrap(), 2);
        assert_eq!(r.total_bytes_read(), 5);
    }

    #[test]
    fn read_line_is_unsupported() {
        let mut r = reader(b"line\n");
        assert!(matches!(
            r.read_line(),
            Err(ReadError::UnsupportedOperation {
                operation: "read_line"
            })
        ));
        assert_eq!(r.total_bytes_read(), 0);
        assert_eq!(r.into_inner(), b"line\n");
    }

    #[test]
    fn strings_count_toward_total() {
        let mut r = reader(b"\x02\x00\x00\x00hi\x00tail\x00");
        let len = r.read_i32().unwrap();
        let s = r.read_string(StringLength::Exact(len as usize)).unwrap();
        assert_eq!(s, "hi");
        assert_eq!(r.read_u8().unwrap(), 0);
        assert_eq!(r.read_cstring().unwrap(), "tail");
        assert_eq!(r.total_bytes_read(), 12);
        assert!(r.get_ref().is_empty());
    }
}
