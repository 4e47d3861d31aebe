use std::io::{self, ErrorKind, Read};

/// The byte-producing capability a [`PrimitiveReader`](crate::PrimitiveReader)
/// sits on.
///
/// End of stream is a value, not an error: `read_byte` yields `Ok(None)`
/// and `read_into` yields `Ok(0)`. The reader turns those into
/// [`ReadError::EndOfStream`](crate::ReadError::EndOfStream) with the
/// offset it is tracking. Reads block until data or end of stream is
/// available; a source never reports "zero bytes right now".
///
/// Every [`std::io::Read`] is a `ByteSource`, so byte slices, cursors,
/// files and sockets can be handed to the reader directly.
pub trait ByteSource {
    /// Read a single byte, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns the source's I/O error if it fails for any other reason.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Read up to `buf.len()` bytes, returning how many were written.
    ///
    /// A return of `0` for a non-empty `buf` means end of stream. Partial
    /// reads are allowed; callers loop.
    ///
    /// # Errors
    ///
    /// Returns the source's I/O error if it fails for any other reason.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_byte()? {
                Some(b) => {
                    buf[filled] = b;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }

    /// Skip up to `n` bytes, returning how many were actually skipped.
    ///
    /// Best effort: near the end of the stream fewer than `n` bytes may be
    /// skipped, and that is not an error.
    ///
    /// # Errors
    ///
    /// Returns the source's I/O error if it fails for any other reason.
    fn skip(&mut self, n: usize) -> io::Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            if self.read_byte()?.is_none() {
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }
}

impl<R: Read> ByteSource for R {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.read(buf) {
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                other => return other,
            }
        }
    }

    fn skip(&mut self, n: usize) -> io::Result<usize> {
        let copied = io::copy(&mut self.by_ref().take(n as u64), &mut io::sink())?;
        #[allow(clippy::cast_possible_truncation)]
        Ok(copied as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out one byte per `read` call and fails every other call with
    /// `Interrupted`.
    struct Stutter<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Stutter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(ErrorKind::Interrupted.into());
            }
            if self.data.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[0];
            self.data = &self.data[1..];
            Ok(1)
        }
    }

    #[test]
    fn slice_read_byte_until_eof() {
        let mut src: &[u8] = &[0x01, 0x02];
        assert_eq!(src.read_byte().unwrap(), Some(0x01));
        assert_eq!(src.read_byte().unwrap(), Some(0x02));
        assert_eq!(src.read_byte().unwrap(), None);
    }

    #[test]
    fn slice_skip_is_best_effort() {
        let mut src: &[u8] = &[1, 2, 3];
        assert_eq!(ByteSource::skip(&mut src, 2).unwrap(), 2);
        assert_eq!(src, &[3]);
        assert_eq!(ByteSource::skip(&mut src, 10).unwrap(), 1);
        assert!(src.is_empty());
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut src = Stutter {
            data: &[0xAA, 0xBB],
            interrupt: false,
        };
        assert_eq!(src.read_byte().unwrap(), Some(0xAA));
        let mut buf = [0u8; 4];
        assert_eq!(src.read_into(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0xBB);
        assert_eq!(src.read_byte().unwrap(), None);
    }

    #[test]
    fn default_read_into_stops_at_eof() {
        // Not an io::Read, so only the provided methods are in play.
        struct Manual(Vec<u8>);
        impl ByteSource for Manual {
            fn read_byte(&mut self) -> io::Result<Option<u8>> {
                if self.0.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(self.0.remove(0)))
                }
            }
        }

        let mut src = Manual(vec![7, 8, 9]);
        let mut buf = [0u8; 2];
        assert_eq!(src.read_into(&mut buf).unwrap(), 2);
        assert_eq!(buf, [7, 8]);
        assert_eq!(src.skip(5).unwrap(), 1);
        assert_eq!(src.read_into(&mut buf).unwrap(), 0);
    }
}
