//! Statistics of a finished run, and the collaborators that record them.
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compression,
    Decompression,
}

/// What a coder exposes once a run is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub direction: Direction,
    /// Dictionary entries at the end of the run, literals included.
    pub entries: usize,
    /// Rehashes when compressing, growth events when decompressing.
    pub resizes: usize,
    pub elapsed: Duration,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Something that records the statistics of a run over the input called `name`.
pub trait Reporter {
    fn report(&mut self, name: &str, stats: &RunStats) -> io::Result<()>;
}

/// Emits one structured `info` event per run.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

/// Writes the human-readable report into a writer, usually a `.log` file.
pub struct LogWriter<W> {
    writer: W,
}

/// The human-readable report of a run.
pub struct Summary<'a> {
    pub name: &'a str,
    pub stats: &'a RunStats,
}

struct Size(u64);

struct Elapsed(Duration);

impl Reporter for TracingReporter {
    fn report(&mut self, name: &str, stats: &RunStats) -> io::Result<()> {
        tracing::info!(
            input = name,
            direction = ?stats.direction,
            entries = stats.entries,
            resizes = stats.resizes,
            elapsed_us = stats.elapsed.as_micros() as u64,
            bytes_in = stats.bytes_in,
            bytes_out = stats.bytes_out,
            "run complete"
        );
        Ok(())
    }
}

impl<W: Write> LogWriter<W> {
    pub fn new(writer: W) -> Self {
        LogWriter { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for LogWriter<W> {
    fn report(&mut self, name: &str, stats: &RunStats) -> io::Result<()> {
        write!(self.writer, "{}", Summary { name, stats })?;
        self.writer.flush()
    }
}

impl Direction {
    fn noun(self) -> &'static str {
        match self {
            Direction::Compression => "Compression",
            Direction::Decompression => "Decompression",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Direction::Compression => "Compressed",
            Direction::Decompression => "Decompressed",
        }
    }

    fn resize(self) -> &'static str {
        match self {
            Direction::Compression => "rehashed",
            Direction::Decompression => "doubled",
        }
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Summary { name, stats } = self;
        let direction = stats.direction;
        writeln!(f, "{} of {}", direction.noun(), name)?;
        writeln!(
            f,
            "{} from {} to {}",
            direction.verb(),
            Size(stats.bytes_in),
            Size(stats.bytes_out)
        )?;
        writeln!(f, "{} took {}", direction.noun(), Elapsed(stats.elapsed))?;
        writeln!(f, "The dictionary contains {} total entries", stats.entries)?;
        writeln!(f, "The table was {} {} times", direction.resize(), stats.resizes)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 / 1024 > 1 {
            write!(f, "{} kilobytes", self.0 / 1024)
        } else {
            write!(f, "{} bytes", self.0)
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos > 1_000_000_000 {
            write!(f, "{:.2} seconds", self.0.as_secs_f64())
        } else if nanos > 1_000_000 {
            write!(f, "{:.2} milliseconds", nanos as f64 / 1e6)
        } else {
            write!(f, "{} nanoseconds", nanos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(direction: Direction, elapsed: Duration) -> RunStats {
        RunStats {
            direction,
            entries: 4242,
            resizes: 3,
            elapsed,
            bytes_in: 50_000,
            bytes_out: 900,
        }
    }

    #[test]
    fn compression_log() {
        let mut log = LogWriter::new(Vec::<u8>::new());
        let run = stats(Direction::Compression, Duration::from_millis(1500));
        log.report("notes.txt", &run).unwrap();

        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(
            text,
            "Compression of notes.txt\n\
             Compressed from 48 kilobytes to 900 bytes\n\
             Compression took 1.50 seconds\n\
             The dictionary contains 4242 total entries\n\
             The table was rehashed 3 times\n"
        );
    }

    #[test]
    fn decompression_log() {
        let mut run = stats(Direction::Decompression, Duration::from_nanos(2_500_000));
        run.bytes_in = 900;
        run.bytes_out = 50_000;
        let text = Summary { name: "notes.txt.zzz", stats: &run }.to_string();

        assert!(text.starts_with("Decompression of notes.txt.zzz\n"), "{}", text);
        assert!(text.contains("Decompressed from 900 bytes to 48 kilobytes\n"), "{}", text);
        assert!(text.contains("Decompression took 2.50 milliseconds\n"), "{}", text);
        assert!(text.ends_with("The table was doubled 3 times\n"), "{}", text);
    }

    #[test]
    fn units() {
        assert_eq!(Elapsed(Duration::from_nanos(999)).to_string(), "999 nanoseconds");
        assert_eq!(Elapsed(Duration::from_secs(3)).to_string(), "3.00 seconds");
        assert_eq!(Size(2047).to_string(), "2047 bytes");
        assert_eq!(Size(2048).to_string(), "2 kilobytes");
    }
}
