use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bit_text::{Decoder, Dumper, Encoder};
use clap::Parser;

mod logger;

/// Converts data to and from `0`/`1` text, or renders it as a bit dump.
#[derive(Debug, Parser)]
struct Cli {
    /// The file to read.
    ///
    /// Reads standard input if omitted or `-`.
    input: Option<PathBuf>,

    /// The file to write to.
    ///
    /// Writes to standard output if omitted. The file is created or
    /// truncated.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Encode the input as a plain bit-string instead of dumping it.
    #[arg(short, long, conflicts_with = "decode")]
    encode: bool,

    /// Decode a plain bit-string back into bytes.
    ///
    /// The input may only consist of `0` and `1` characters. Whitespace,
    /// including a final line break, is rejected.
    #[arg(short, long)]
    decode: bool,

    /// Override whether this program outputs color.
    ///
    /// Auto-detection is performed, but in case it is wrong, you may use this
    /// to override the default.
    #[arg(long)]
    color: Option<bool>,

    /// Log more details. May be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Dump,
    Encode,
    Decode,
}

impl Mode {
    fn verb(self) -> &'static str {
        match self {
            Self::Dump => "dump",
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.encode {
            Mode::Encode
        } else if self.decode {
            Mode::Decode
        } else {
            Mode::Dump
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.color, cli.verbose)?;

    let mode = cli.mode();
    let input_name = cli.input.as_deref().map_or("<stdin>".into(), Path::to_string_lossy);
    log::debug!("Running {mode:?} on `{input_name}`.");

    let input = open_input(cli.input.as_deref())?;
    let output = open_output(cli.out.as_deref())?;

    let count = match mode {
        Mode::Dump => dump(input, output),
        Mode::Encode => encode(input, output),
        Mode::Decode => decode(input, output),
    }
    .with_context(|| format!("failed to {} `{input_name}`", mode.verb()))?;

    log::info!("Processed {count} bytes.");
    Ok(())
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn Read>> {
    Ok(match path {
        None => Box::new(io::stdin().lock()),
        Some(path) if path == Path::new("-") => Box::new(io::stdin().lock()),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open `{}`", path.display()))?;
            Box::new(file)
        },
    })
}

fn open_output(path: Option<&Path>) -> anyhow::Result<BufWriter<Box<dyn Write>>> {
    let inner: Box<dyn Write> = match path {
        None => Box::new(io::stdout().lock()),
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create `{}`", path.display()))?;
            Box::new(file)
        },
    };

    Ok(BufWriter::new(inner))
}

/// Each mode returns the amount of raw bytes processed.
fn dump<R: Read, W: Write>(mut input: R, output: W) -> io::Result<u64> {
    let mut dumper = Dumper::new(output);
    let count = io::copy(&mut input, &mut dumper)?;
    dumper.finish()?.flush()?;
    Ok(count)
}

fn encode<R: Read, W: Write>(mut input: R, output: W) -> io::Result<u64> {
    let mut encoder = Encoder::new(output);
    let count = io::copy(&mut input, &mut encoder)?;
    encoder.flush()?;
    Ok(count)
}

fn decode<R: Read, W: Write>(input: R, mut output: W) -> io::Result<u64> {
    let mut decoder = Decoder::new(input);
    let count = io::copy(&mut decoder, &mut output)?;
    output.flush()?;
    Ok(count)
}
