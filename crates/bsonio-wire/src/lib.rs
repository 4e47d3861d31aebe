//! Little-endian primitive and UTF-8 string reader for the BSON wire
//! encoding.
//!
//! ```text
//!   caller ──► PrimitiveReader ──► ByteSource
//!                    │
//!                    └─ read_string ──► utf8::decode_utf8 ──► BufferPool
//! ```
//!
//! The document model and field-type dispatch live above this crate; it
//! only turns bytes into numbers and strings and counts what it consumed.

#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod pool;
pub mod reader;
pub mod source;
pub mod utf8;

pub use config::PoolConfig;
pub use error::ReadError;
pub use pool::{BufferPool, PoolStats, ScratchBuffers};
pub use reader::PrimitiveReader;
pub use source::ByteSource;
pub use utf8::{DecodeSession, StringLength, decode_utf8};
