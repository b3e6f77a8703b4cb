//! A module for all encoding needs.
use crate::dictionary::{self, ChainedDictionary};
use crate::literal;
use crate::report::{Direction, RunStats};
use crate::{put_code, AllResult, Code, Error, LzwError, LzwStatus, StreamResult, CODE_BYTES};

use std::io::{self, BufRead, Write};
use std::time::Instant;

/// The state of one compression run.
///
/// An encoder is meant for exactly one input. Its dictionary only grows, and the codes it has
/// assigned are what a fresh decoder will reconstruct.
pub struct Encoder {
    /// The pattern dictionary, seeded with the literal table.
    dictionary: ChainedDictionary<Code>,
    /// The longest matched pattern so far. Empty before the first byte.
    prefix: Vec<u8>,
    /// The code the next learned pattern gets.
    next_code: Code,
    /// If the input has been marked as complete.
    has_ended: bool,
    /// If the trailing code has been written.
    is_done: bool,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

impl Encoder {
    /// An encoder with the default starting capacity.
    pub fn new() -> Self {
        Self::for_input_len(0)
    }

    /// An encoder whose dictionary starts with at least `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_dictionary(ChainedDictionary::seeded(capacity))
    }

    /// An encoder sized for an input of `len` bytes.
    pub fn for_input_len(len: u64) -> Self {
        Self::with_capacity(dictionary::capacity_for_input(len))
    }

    /// An encoder that continues with a caller supplied dictionary.
    ///
    /// New codes start after the highest code present, and never below `FIRST_FREE_CODE`. Use
    /// [`ChainedDictionary::seeded`] unless the dictionary is meant to differ from the literal
    /// table, in which case no `Decoder` will reproduce the input.
    pub fn with_dictionary(dictionary: ChainedDictionary<Code>) -> Self {
        let next_code = dictionary
            .iter()
            .map(|(_, &code)| code.saturating_add(1))
            .max()
            .unwrap_or(0)
            .max(literal::FIRST_FREE_CODE);

        Encoder {
            dictionary,
            prefix: Vec::new(),
            next_code,
            has_ended: false,
            is_done: false,
        }
    }

    /// Encode some bytes from `inp` into `out`.
    ///
    /// Input is only consumed while `out` has room for another code, so a code is never split
    /// across calls. See [`into_stream`] for the high-level interface and [`finish`] for marking
    /// the input data as complete.
    ///
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.advance(inp, out)
    }

    /// Construct an encoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Mark the encoding as finished.
    ///
    /// Once all of the remaining input has been consumed, the next call to `encode_bytes` writes
    /// the code of the pattern still being matched and returns `Done`.
    pub fn finish(&mut self) {
        self.has_ended = true;
    }

    /// The number of patterns in the dictionary, literals included.
    pub fn entries(&self) -> usize {
        self.dictionary.len()
    }

    /// How often the dictionary has been rehashed.
    pub fn rehashes(&self) -> usize {
        self.dictionary.rehashes()
    }

    /// The current slot count of the dictionary.
    pub fn capacity(&self) -> usize {
        self.dictionary.capacity()
    }

    /// The code that will be assigned to the next learned pattern.
    pub fn next_code(&self) -> Code {
        self.next_code
    }

    pub fn dictionary(&self) -> &ChainedDictionary<Code> {
        &self.dictionary
    }

    /// Collect the statistics of a finished run.
    pub fn run_stats(&self, result: &AllResult) -> RunStats {
        RunStats {
            direction: Direction::Compression,
            entries: self.entries(),
            resizes: self.rehashes(),
            elapsed: result.elapsed,
            bytes_in: result.bytes_read as u64,
            bytes_out: result.bytes_written as u64,
        }
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        let c_in = inp.len();
        let c_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        while let Some((&byte, tail)) = inp.split_first() {
            if out.len() < CODE_BYTES {
                break;
            }

            if !literal::is_supported(byte) {
                status = Err(LzwError::UnsupportedByte { byte });
                break;
            }

            inp = tail;
            if let Some(code) = self.push_byte(byte) {
                put_code(&mut out, code);
            }
        }

        if status.is_ok() && inp.is_empty() && self.has_ended {
            if !self.is_done && out.len() >= CODE_BYTES {
                if let Some(code) = self.take_prefix() {
                    put_code(&mut out, code);
                }
                self.is_done = true;
            }

            if self.is_done {
                status = Ok(LzwStatus::Done);
            }
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        if let Ok(LzwStatus::Ok) = status {
            if consumed_in == 0 && consumed_out == 0 {
                status = Ok(LzwStatus::NoProgress);
            }
        }

        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    /// Extend the match by one byte, returning the code to emit when the match ends.
    fn push_byte(&mut self, byte: u8) -> Option<Code> {
        if self.prefix.is_empty() {
            self.prefix.push(byte);
            return None;
        }

        self.prefix.push(byte);
        if self.dictionary.get(&self.prefix).is_some() {
            return None;
        }

        let new_code = self.issue_code();
        self.prefix.pop();
        let emitted = match self.dictionary.get(&self.prefix).copied() {
            Some(code) => {
                self.prefix.push(byte);
                self.dictionary.put(&self.prefix, new_code);
                Some(code)
            }
            // The prefix itself is unknown. Only possible when the dictionary lacks a literal.
            None => {
                self.dictionary.put(&self.prefix, new_code);
                None
            }
        };

        self.prefix.clear();
        self.prefix.push(byte);
        emitted
    }

    /// End the match in flight, returning its code if it has one.
    fn take_prefix(&mut self) -> Option<Code> {
        if self.prefix.is_empty() {
            return None;
        }

        let code = self.dictionary.get(&self.prefix).copied();
        if code.is_none() {
            tracing::warn!(len = self.prefix.len(), "trailing pattern has no code, dropped");
        }

        self.prefix.clear();
        code
    }

    fn issue_code(&mut self) -> Code {
        let code = self.next_code;
        self.next_code += 1;
        code
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not write the code of the last pattern, as
    /// more data may follow in a later call.
    pub fn encode(&mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, false)
    }

    /// Encode all data from a reader, including the code of the last pattern.
    pub fn encode_all(mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, true)
    }

    fn encode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { encoder, writer } = self;
        enum Progress {
            Ok,
            Done,
        }

        let start = Instant::now();
        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut outbuf = vec![0; 1 << 16];
        let once = move || -> Result<Progress, Error> {
            let data = read.fill_buf()?;

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    return Ok(Progress::Done);
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            // Codes produced before an error are still part of the output.
            writer.write_all(&outbuf[..result.consumed_out])?;

            match result.status? {
                LzwStatus::Ok => Ok(Progress::Ok),
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "encoder made no progress",
                )
                .into()),
            }
        };

        let status = core::iter::repeat_with(once)
            // scan+fuse can be replaced with map_while
            .scan((), |(), result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .fuse()
            .collect();

        AllResult {
            bytes_read,
            bytes_written,
            elapsed: start.elapsed(),
            status,
        }
    }
}
