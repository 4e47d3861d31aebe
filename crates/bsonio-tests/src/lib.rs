//! Shared fixtures for the bsonio integration tests and benches.
//!
//! [`read_document`] is a deliberately small BSON document walker: it owns
//! the field-type dispatch that the wire crate leaves to its caller, and
//! checks each document's declared length against
//! [`PrimitiveReader::total_bytes_read`]. The sources below shape how bytes
//! reach the reader, to exercise partial reads.

use std::io::{self, Read};

use bsonio_wire::{ByteSource, PrimitiveReader, ReadError, StringLength};

/// `{"hello": "world"}` from bsonspec.org.
pub const HELLO_WORLD_HEX: &str = "160000000268656c6c6f0006000000776f726c640000";

/// `{"BSON": ["awesome", 5.05, 1986]}` from bsonspec.org.
pub const AWESOME_HEX: &str =
    "310000000442534f4e002600000002300008000000617765736f6d65000131003333333333331440103200c20700000000";

/// Decode a hex fixture, panicking with the offending text on bad input.
#[must_use]
pub fn fixture(hex_text: &str) -> Vec<u8> {
    hex::decode(hex_text).unwrap_or_else(|e| panic!("bad hex fixture {hex_text:?}: {e}"))
}

/// A reader that hands out at most `chunk` bytes per `read` call.
pub struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> Trickle<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        Self {
            data,
            chunk: chunk.max(1),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// A BSON value, as far as the walker understands the format.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Double(f64),
    String(String),
    Document(Vec<(String, Value)>),
    Array(Vec<Value>),
    Binary { subtype: u8, bytes: Vec<u8> },
    Bool(bool),
    DateTime(i64),
    Null,
    Int32(i32),
    Int64(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("unknown element type {tag:#04X} at offset {offset}")]
    UnknownType { tag: u8, offset: u64 },

    #[error("invalid length {length} at offset {offset}")]
    InvalidLength { length: i32, offset: u64 },

    #[error("document declared {declared} bytes but used {actual}")]
    LengthMismatch { declared: i32, actual: u64 },

    #[error("string at offset {offset} is missing its terminator")]
    MissingTerminator { offset: u64 },

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Read one document and all of its nested values.
///
/// # Errors
///
/// Any [`ReadError`] from the wire layer, or a [`WalkError`] when the
/// document's structure does not add up.
pub fn read_document<S: ByteSource>(
    reader: &mut PrimitiveReader<S>,
) -> Result<Vec<(String, Value)>, WalkError> {
    let start = reader.total_bytes_read();
    let declared = reader.read_i32()?;
    let mut fields = Vec::new();
    loop {
        let offset = reader.total_bytes_read();
        let tag = reader.read_u8()?;
        if tag == 0x00 {
            break;
        }
        let key = reader.read_cstring()?;
        let value = match tag {
            0x01 => Value::Double(reader.read_f64()?),
            0x02 => Value::String(read_string(reader)?),
            0x03 => Value::Document(read_document(reader)?),
            0x04 => Value::Array(read_document(reader)?.into_iter().map(|(_, v)| v).collect()),
            0x05 => read_binary(reader)?,
            0x08 => Value::Bool(reader.read_bool()?),
            0x09 => Value::DateTime(reader.read_i64()?),
            0x0A => Value::Null,
            0x10 => Value::Int32(reader.read_i32()?),
            0x12 => Value::Int64(reader.read_i64()?),
            other => return Err(WalkError::UnknownType { tag: other, offset }),
        };
        fields.push((key, value));
    }

    let actual = reader.total_bytes_read() - start;
    if u64::try_from(declared).ok() != Some(actual) {
        return Err(WalkError::LengthMismatch { declared, actual });
    }
    Ok(fields)
}

/// Skip a whole document using only its length prefix, returning the
/// number of bytes skipped after the prefix.
///
/// # Errors
///
/// [`WalkError::InvalidLength`] for a prefix smaller than itself.
pub fn skip_document<S: ByteSource>(reader: &mut PrimitiveReader<S>) -> Result<usize, WalkError> {
    let offset = reader.total_bytes_read();
    let length = reader.read_i32()?;
    let body = usize::try_from(length)
        .ok()
        .and_then(|len| len.checked_sub(4))
        .ok_or(WalkError::InvalidLength { length, offset })?;
    Ok(reader.skip(body)?)
}

/// A length-prefixed BSON string: the prefix counts the trailing zero byte.
fn read_string<S: ByteSource>(reader: &mut PrimitiveReader<S>) -> Result<String, WalkError> {
    let offset = reader.total_bytes_read();
    let length = reader.read_i32()?;
    let text_len = usize::try_from(length)
        .ok()
        .and_then(|len| len.checked_sub(1))
        .ok_or(WalkError::InvalidLength { length, offset })?;
    let text = reader.read_string(StringLength::Exact(text_len))?;
    if reader.read_u8()? != 0x00 {
        return Err(WalkError::MissingTerminator { offset });
    }
    Ok(text)
}

fn read_binary<S: ByteSource>(reader: &mut PrimitiveReader<S>) -> Result<Value, WalkError> {
    let offset = reader.total_bytes_read();
    let length = reader.read_i32()?;
    let len = usize::try_from(length).map_err(|_| WalkError::InvalidLength { length, offset })?;
    let subtype = reader.read_u8()?;
    // The declared length is untrusted; grow only as bytes actually arrive.
    let mut bytes = Vec::new();
    let mut chunk = [0u8; 4096];
    while bytes.len() < len {
        let n = (len - bytes.len()).min(chunk.len());
        reader.read_exact(&mut chunk[..n])?;
        bytes.extend_from_slice(&chunk[..n]);
    }
    Ok(Value::Binary { subtype, bytes })
}
