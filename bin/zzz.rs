#![forbid(unsafe_code)]
use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::{env, ffi, fs, io, process};

use lzwchain::report::{LogWriter, Reporter, RunStats, TracingReporter};
use lzwchain::{decode::Decoder, encode::Encoder, Error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The extension of compressed files.
const EXTENSION: &str = "zzz";

fn main() -> CodingResult {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zzz=info,lzwchain=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        run_coding(flags)
    })
}

fn run_coding(flags: Flags) -> Result<(), Error> {
    let mut input = flags.input.clone();

    loop {
        match input {
            Input::Stdin => return run_stdio(flags.operation),
            Input::File(path) => {
                let path = locate(&path, flags.retries)?;
                match flags.operation {
                    Operation::Encode => compress_file(&path, flags.keep)?,
                    Operation::Decode => decompress_file(&path, flags.keep)?,
                }
            }
        }

        if !flags.interactive {
            return Ok(());
        }

        match prompt_another(flags.operation)? {
            Some(path) => input = Input::File(path),
            None => return Ok(()),
        }
    }
}

fn run_stdio(operation: Operation) -> Result<(), Error> {
    let input = io::BufReader::with_capacity(1 << 20, io::stdin().lock());
    let mut out = io::BufWriter::new(io::stdout().lock());

    let stats = match operation {
        Operation::Encode => {
            let mut encoder = Encoder::new();
            let result = encoder.into_stream(&mut out).encode_all(input);
            let stats = encoder.run_stats(&result);
            result.status?;
            stats
        }
        Operation::Decode => {
            let mut decoder = Decoder::new();
            let result = decoder.into_stream(&mut out).decode_all(input);
            let stats = decoder.run_stats(&result);
            result.status?;
            stats
        }
    };

    out.flush()?;
    TracingReporter.report("-", &stats)?;
    Ok(())
}

/// Compress `path` into `path.zzz`, leaving the report in `path.zzz.log`.
fn compress_file(path: &Path, keep: bool) -> Result<(), Error> {
    let target = with_suffix(path, EXTENSION);
    let source = fs::File::open(path)?;
    let len = source.metadata()?.len();

    let mut encoder = Encoder::for_input_len(len);
    let mut output = io::BufWriter::new(fs::File::create(&target)?);
    let result = encoder
        .into_stream(&mut output)
        .encode_all(io::BufReader::with_capacity(1 << 20, source));
    let stats = encoder.run_stats(&result);
    result.status?;
    output.flush()?;
    drop(output);

    report(path, &stats, &with_suffix(&target, "log"))?;

    if !keep {
        fs::remove_file(path)?;
    }

    Ok(())
}

/// Decompress `path`, which must end in `.zzz`, next to it.
fn decompress_file(path: &Path, keep: bool) -> Result<(), Error> {
    let target = match path.extension() {
        Some(ext) if ext == EXTENSION => path.with_extension(""),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} does not end in .{}", path.display(), EXTENSION),
            )
            .into())
        }
    };

    let source = fs::File::open(path)?;
    let mut decoder = Decoder::new();
    let mut output = io::BufWriter::new(fs::File::create(&target)?);
    let result = decoder
        .into_stream(&mut output)
        .decode_all(io::BufReader::with_capacity(1 << 20, source));
    let stats = decoder.run_stats(&result);
    result.status?;
    output.flush()?;
    drop(output);

    report(path, &stats, &with_suffix(&target, "log"))?;

    if !keep {
        fs::remove_file(path)?;
        // The report written when this file was compressed.
        match fs::remove_file(with_suffix(path, "log")) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err.into()),
            _ => {}
        }
    }

    Ok(())
}

fn report(path: &Path, stats: &RunStats, log: &Path) -> io::Result<()> {
    let name = path.display().to_string();
    TracingReporter.report(&name, stats)?;
    LogWriter::new(io::BufWriter::new(fs::File::create(log)?)).report(&name, stats)
}

/// Find an existing input file, asking for another name at most `retries` times.
fn locate(path: &Path, retries: u32) -> io::Result<PathBuf> {
    let mut candidate = path.to_path_buf();
    let mut tries_left = retries;

    while !candidate.is_file() {
        if tries_left == 0 {
            return Err(not_found(&candidate));
        }

        tries_left -= 1;
        eprintln!("File not found: {}", candidate.display());
        eprintln!("Tries left: {}", tries_left);
        candidate = match prompt("Enter filename: ")? {
            Some(line) => PathBuf::from(line),
            None => return Err(not_found(&candidate)),
        };
    }

    Ok(candidate)
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: file not found", path.display()),
    )
}

fn prompt_another(operation: Operation) -> io::Result<Option<PathBuf>> {
    let verb = match operation {
        Operation::Encode => "compress",
        Operation::Decode => "decompress",
    };

    let answer = prompt(&format!("Would you like to {} another file? [y/N] ", verb))?;
    match answer {
        Some(answer) if answer.eq_ignore_ascii_case("y") => {
            Ok(prompt("Enter filename: ")?.map(PathBuf::from))
        }
        _ => Ok(None),
    }
}

/// Ask on stderr, read one line from stdin. `None` at the end of stdin.
fn prompt(question: &str) -> io::Result<Option<String>> {
    eprint!("{}", question);
    io::stderr().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_owned()))
}

/// `path` with `.suffix` appended to its full name.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

struct Flags {
    input: Input,
    operation: Operation,
    keep: bool,
    interactive: bool,
    retries: u32,
}

struct ParamError;

#[derive(Debug, Clone)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Encode,
    Decode,
}

fn explain<T>() -> T {
    println!(
        "Usage: zzz [-e|-d] [-k] [-i] [-r <retries>] <file>\n\
        Arguments:\n\
        -e\t operation encode, writes <file>.zzz\n\
        -d\t operation decode, <file> must end in .zzz\n\
        -k\t keep the input file\n\
        -i\t ask for further files when done\n\
        -r\t how often to ask again for a missing file (default 3)\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            operation: Operation::Encode,
            keep: false,
            interactive: false,
            retries: 3,
        }
    }
}

fn command() -> clap::Command {
    use clap::{Arg, ArgAction, ArgGroup};

    clap::Command::new("zzz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress text files with an LZW dictionary coder")
        .arg(
            Arg::new("decode")
                .short('d')
                .long("decode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("encode")
                .short('e')
                .long("encode")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("operation")
                .args(["decode", "encode"])
                .multiple(false)
                .required(true),
        )
        .arg(
            Arg::new("keep")
                .short('k')
                .long("keep")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("retries")
                .short('r')
                .long("retries")
                .default_value("3")
                .value_parser(clap::value_parser!(u32).range(0..=16)),
        )
        .arg(
            Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command().get_matches_from(args.by_ref());

        if matches.get_flag("decode") {
            flags.operation = Operation::Decode;
        } else if matches.get_flag("encode") {
            flags.operation = Operation::Encode;
        }

        flags.keep = matches.get_flag("keep");
        flags.interactive = matches.get_flag("interactive");

        if let Some(&retries) = matches.get_one::<u32>("retries") {
            flags.retries = retries;
        }

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        // Prompts read from stdin, which then cannot also carry the data.
        if flags.interactive {
            if let Input::Stdin = flags.input {
                return Err(ParamError);
            }
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
