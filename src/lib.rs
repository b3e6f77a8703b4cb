//! # LZW text compression over a chained dictionary
//!
//! This crate provides an `Encoder` and a `Decoder` for a greedy LZW variant on text. Codes are
//! not bit-packed. Every code is written as a 32-bit big-endian integer and the stream carries
//! no header, length prefix or end marker. The end of the code stream is the end of its source.
//!
//! Both sides start from the same fixed literal table (see [`literal`]):
//!
//!  * ASCII `32..=127` map to the codes of the same value,
//!  * `\n`, `\t`, `\r` and `\r\n` map to `128..=131`,
//!  * the first learned pattern gets code `132`, every further one the next integer.
//!
//! The encoder keeps its patterns in a [`ChainedDictionary`], a hash table of collision chains
//! with prime capacities. The decoder never sees that table. It rebuilds the same assignments
//! from the order in which codes arrive.
//!
//! Exemplary use of the encoder:
//!
//! ```
//! use lzwchain::encode::Encoder;
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let mut compressed = vec![];
//!
//! let mut enc = Encoder::new();
//! let result = enc.into_stream(&mut compressed).encode_all(&data[..]);
//! result.status.unwrap();
//! assert_eq!(compressed.len() % 4, 0);
//! ```
//!
//! And of the decoder:
//!
//! ```
//! use lzwchain::{decode::Decoder, encode::Encoder};
//! let data = b"ABABABA";
//! let mut compressed = vec![];
//! Encoder::new().into_stream(&mut compressed).encode_all(&data[..]).status.unwrap();
//!
//! let mut decompressed = vec![];
//! let mut dec = Decoder::new();
//! dec.into_stream(&mut decompressed).decode_all(compressed.as_slice()).status.unwrap();
//! assert_eq!(decompressed, data);
//! ```

/// Alias for a code point of the compressed stream.
pub type Code = u32;

/// The number of bytes each code occupies in the compressed stream.
pub const CODE_BYTES: usize = core::mem::size_of::<Code>();

pub mod decode;
pub mod dictionary;
pub mod encode;
mod error;
pub mod literal;
pub mod report;

pub use crate::dictionary::ChainedDictionary;
pub use crate::error::{Error, LzwError};

/// The progress of one call into the streaming interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwStatus {
    /// Some input was consumed or some output produced.
    Ok,
    /// Neither input was consumed nor output produced.
    ///
    /// Usually the output buffer is too small to hold the next code or pattern byte.
    NoProgress,
    /// All input was marked as finished and everything has been flushed.
    Done,
}

/// The result of a call to `encode_bytes` or `decode_bytes`.
#[derive(Debug)]
pub struct StreamResult {
    /// The number of bytes consumed from the input buffer.
    pub consumed_in: usize,
    /// The number of bytes written into the output buffer.
    pub consumed_out: usize,
    /// The status after returning from the call.
    pub status: Result<LzwStatus, LzwError>,
}

/// The result of draining a reader into a writer.
#[derive(Debug)]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The wall time spent coding, including reads and writes.
    pub elapsed: std::time::Duration,
    /// The final status of the run.
    pub status: Result<(), Error>,
}

/// Write one code into the front of `out` and advance it.
///
/// The caller must have checked that at least `CODE_BYTES` remain.
pub(crate) fn put_code(out: &mut &mut [u8], code: Code) {
    let (bytes, tail) = core::mem::take(out).split_at_mut(CODE_BYTES);
    bytes.copy_from_slice(&code.to_be_bytes());
    *out = tail;
}
