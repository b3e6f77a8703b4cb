//! Compresses the input from stdin and writes the result to stdout.

use std::io::{self, BufWriter};

fn main() {
    match (|| -> Result<(), lzwchain::Error> {
        let mut encoder = lzwchain::encode::Encoder::new();
        let stdin = io::stdin();
        let stdin = stdin.lock();
        let stdout = io::stdout();
        let stdout = BufWriter::new(stdout.lock());
        let result = encoder.into_stream(stdout).encode_all(stdin);
        result.status?;
        eprintln!(
            "{} bytes in, {} codes out, {} dictionary entries",
            result.bytes_read,
            result.bytes_written / lzwchain::CODE_BYTES,
            encoder.entries()
        );
        Ok(())
    })() {
        Ok(()) => (),
        Err(err) => eprintln!("{}", err),
    }
}
