//! A module for all decoding needs.
use crate::literal;
use crate::report::{Direction, RunStats};
use crate::{AllResult, Code, Error, LzwError, LzwStatus, StreamResult, CODE_BYTES};

use std::io::{self, BufRead, Write};
use std::time::Instant;

/// The notional table size the growth counter starts from.
const NOTIONAL_CAPACITY: usize = 101;

/// The state of one decompression run.
pub struct Decoder {
    /// The table of decoded codes.
    table: Table,

    /// The buffer of decoded data.
    buffer: Buffer,

    /// The code decoded before the current one.
    last: Option<Code>,

    /// The code the next inferred pattern gets.
    next_code: Code,

    /// The bytes of a code that was split between two input slices.
    partial: [u8; CODE_BYTES],
    partial_len: usize,

    /// Reporting only, never resizes anything.
    growth: Growth,

    has_ended: bool,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

#[derive(Clone, Copy)]
struct Link {
    /// The code of the pattern this one extends. `None` for a single byte.
    prefix: Option<Code>,
    /// The last byte of the pattern.
    byte: u8,
}

struct Table {
    /// Indexed by code. Codes without a pattern are `None`.
    inner: Vec<Option<Link>>,
    /// The length of the pattern of each code.
    depths: Vec<usize>,
    /// The number of codes with a pattern.
    len: usize,
}

struct Buffer {
    bytes: Vec<u8>,
    read_mark: usize,
}

/// Counts how often a table holding all entries would have doubled at a load of 3/4.
struct Growth {
    capacity: usize,
    events: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            table: Table::seeded(),
            buffer: Buffer::new(),
            last: None,
            next_code: literal::FIRST_FREE_CODE,
            partial: [0; CODE_BYTES],
            partial_len: 0,
            growth: Growth::new(),
            has_ended: false,
        }
    }

    /// Decode some bytes from `inp` and write the result to `out`.
    ///
    /// Codes may be split arbitrarily between calls. Decoded data that does not fit into `out`
    /// is held back and written by the following calls, before any further input is consumed.
    pub fn decode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.advance(inp, out)
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Mark the code stream as complete.
    ///
    /// Once all decoded data has been written, the next call to `decode_bytes` with empty input
    /// returns `Done`, or an error if the stream stopped within a code.
    pub fn finish(&mut self) {
        self.has_ended = true;
    }

    pub fn has_ended(&self) -> bool {
        self.has_ended
    }

    /// The number of codes with a known pattern, literals included.
    pub fn entries(&self) -> usize {
        self.table.len
    }

    /// How often the notional table would have doubled.
    pub fn growth_events(&self) -> usize {
        self.growth.events
    }

    /// The code that will be assigned to the next inferred pattern.
    pub fn next_code(&self) -> Code {
        self.next_code
    }

    /// The pattern currently known for `code`.
    pub fn pattern(&self, code: Code) -> Option<Vec<u8>> {
        if !self.table.contains(code) {
            return None;
        }

        let mut pattern = Vec::new();
        self.table.reconstruct(code, &mut pattern);
        Some(pattern)
    }

    /// Collect the statistics of a finished run.
    pub fn run_stats(&self, result: &AllResult) -> RunStats {
        RunStats {
            direction: Direction::Decompression,
            entries: self.entries(),
            resizes: self.growth_events(),
            elapsed: result.elapsed,
            bytes_in: result.bytes_read as u64,
            bytes_out: result.bytes_written as u64,
        }
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        let o_in = inp.len();
        let o_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        loop {
            self.buffer.drain_into(&mut out);
            if !self.buffer.is_empty() {
                break;
            }

            let take = (CODE_BYTES - self.partial_len).min(inp.len());
            let (head, tail) = inp.split_at(take);
            self.partial[self.partial_len..][..take].copy_from_slice(head);
            self.partial_len += take;
            inp = tail;

            if self.partial_len < CODE_BYTES {
                break;
            }

            self.partial_len = 0;
            let code = Code::from_be_bytes(self.partial);
            if let Err(err) = self.step(code) {
                status = Err(err);
                break;
            }
        }

        if status.is_ok() && self.has_ended && inp.is_empty() && self.buffer.is_empty() {
            status = match self.partial_len {
                0 => Ok(LzwStatus::Done),
                trailing => Err(LzwError::TruncatedCode { trailing }),
            };
        }

        let consumed_in = o_in - inp.len();
        let consumed_out = o_out - out.len();
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

    /// Decode one code into the buffer.
    fn step(&mut self, code: Code) -> Result<(), LzwError> {
        let prev = match self.last {
            Some(prev) => prev,
            None => {
                if !self.table.contains(code) {
                    return Err(self.violation(code));
                }

                self.table.reconstruct(code, &mut self.buffer.bytes);
                self.last = Some(code);
                return Ok(());
            }
        };

        let start = self.buffer.bytes.len();
        if self.table.contains(code) {
            self.table.reconstruct(code, &mut self.buffer.bytes);
        } else if code == self.next_code {
            // The encoder learned this pattern right before emitting it: the previous pattern
            // extended by its own first byte.
            self.table.reconstruct(prev, &mut self.buffer.bytes);
            let first = self.buffer.bytes[start];
            self.buffer.bytes.push(first);
        } else {
            return Err(self.violation(code));
        }

        let first = self.buffer.bytes[start];
        self.table.derive(self.next_code, prev, first);
        self.next_code += 1;
        self.growth.observe(self.table.len);
        self.last = Some(code);
        Ok(())
    }

    fn violation(&self, code: Code) -> LzwError {
        LzwError::ProtocolViolation {
            code,
            expected: self.next_code,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode data from a reader.
    ///
    /// This will drain the supplied reader. An incomplete code at the end is kept for a later
    /// call.
    pub fn decode(&mut self, read: impl BufRead) -> AllResult {
        self.decode_part(read, false)
    }

    /// Decode data from a reader, requiring it to end on a code boundary.
    pub fn decode_all(mut self, read: impl BufRead) -> AllResult {
        self.decode_part(read, true)
    }

    fn decode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { decoder, writer } = self;
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
                    decoder.finish();
                } else if decoder.buffer.is_empty() {
                    return Ok(Progress::Done);
                }
            }

            let result = decoder.decode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            writer.write_all(&outbuf[..result.consumed_out])?;

            match result.status? {
                LzwStatus::Ok => Ok(Progress::Ok),
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "no more data but the code stream is not complete",
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

impl Table {
    fn seeded() -> Self {
        let first_free = literal::FIRST_FREE_CODE as usize;
        let mut table = Table {
            inner: vec![None; first_free],
            depths: vec![0; first_free],
            len: 0,
        };

        for (pattern, code) in literal::seeds() {
            let (&byte, init) = match pattern.split_last() {
                Some(split) => split,
                None => continue,
            };
            // Multi-byte literals (only `\r\n`) extend the literal of their first byte.
            debug_assert!(init.len() <= 1);
            let prefix = init.first().and_then(|&head| literal::code_of(head));

            let index = code as usize;
            table.inner[index] = Some(Link { prefix, byte });
            table.depths[index] = pattern.len();
            table.len += 1;
        }

        table
    }

    fn get(&self, code: Code) -> Option<&Link> {
        self.inner.get(code as usize).and_then(Option::as_ref)
    }

    fn contains(&self, code: Code) -> bool {
        self.get(code).is_some()
    }

    /// Register `code` as the pattern of `prev` followed by `byte`.
    fn derive(&mut self, code: Code, prev: Code, byte: u8) {
        debug_assert_eq!(code as usize, self.inner.len());
        let depth = self.depths[prev as usize] + 1;
        self.inner.push(Some(Link {
            prefix: Some(prev),
            byte,
        }));
        self.depths.push(depth);
        self.len += 1;
    }

    /// Append the pattern of a known `code` to `out`.
    fn reconstruct(&self, code: Code, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + self.depths[code as usize], 0);

        let mut at = out.len();
        let mut next = self.get(code);
        while let Some(link) = next {
            at -= 1;
            out[at] = link.byte;
            next = link.prefix.and_then(|prefix| self.get(prefix));
        }

        debug_assert_eq!(at, start);
    }
}

impl Buffer {
    fn new() -> Self {
        Buffer {
            bytes: Vec::new(),
            read_mark: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.read_mark == self.bytes.len()
    }

    fn drain_into(&mut self, out: &mut &mut [u8]) {
        let pending = &self.bytes[self.read_mark..];
        let count = pending.len().min(out.len());
        let (into, tail) = core::mem::take(out).split_at_mut(count);
        into.copy_from_slice(&pending[..count]);
        *out = tail;

        self.read_mark += count;
        if self.is_empty() {
            self.bytes.clear();
            self.read_mark = 0;
        }
    }
}

impl Growth {
    fn new() -> Self {
        Growth {
            capacity: NOTIONAL_CAPACITY,
            events: 0,
        }
    }

    fn observe(&mut self, entries: usize) {
        if entries.saturating_mul(4) > self.capacity.saturating_mul(3) {
            self.events += 1;
            self.capacity = self.capacity.saturating_mul(2);
        }
    }
}
