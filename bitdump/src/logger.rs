//! Sets up [`log4rs`] to print records to standard error.
//!
//! The console appender shipped with [`log4rs`] decides on colors by itself,
//! so this provides one that honors `--color` instead.

use std::io::{self, IsTerminal as _, Write as _};

use log::{LevelFilter, Record};
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::{self, Color, Encode, Style};

const PATTERN: &str = "[{d(%Y-%m-%d %H:%M:%S)(utc)} {h({l:<5})}] {m}{n}";

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Installs the logger.
///
/// `color` overrides terminal detection. Each level of `verbose` lowers the
/// level filter by one, starting at [`LevelFilter::Warn`].
pub fn init(color: Option<bool>, verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let appender = StderrAppender {
        encoder: Box::new(PatternEncoder::new(PATTERN)),
        color: color.unwrap_or_else(stderr_wants_color),
    };

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(appender)))
        .build(Root::builder().appender("stderr").build(level))?;

    log4rs::init_config(config)?;
    Ok(())
}

#[derive(Debug)]
struct StderrAppender {
    encoder: Box<dyn Encode>,
    color: bool,
}

impl Append for StderrAppender {
    fn append(&self, record: &Record<'_>) -> anyhow::Result<()> {
        // one write per record so lines don't interleave
        let mut line = StyledLine {
            color: self.color,
            buf: Vec::new(),
        };

        self.encoder.encode(&mut line, record)?;
        io::stderr().lock().write_all(&line.buf)?;
        Ok(())
    }

    fn flush(&self) {
        _ = io::stderr().flush();
    }
}

/// A single formatted record, styled with ANSI escapes if `color` is set.
#[derive(Debug)]
struct StyledLine {
    color: bool,
    buf: Vec<u8>,
}

impl io::Write for StyledLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl encode::Write for StyledLine {
    fn set_style(&mut self, style: &Style) -> io::Result<()> {
        if !self.color {
            return Ok(());
        }

        self.write_all(RESET.as_bytes())?;
        if let Some(text) = style.text {
            write!(self, "\x1b[38;5;{}m", palette(text))?;
        }

        if let Some(background) = style.background {
            write!(self, "\x1b[48;5;{}m", palette(background))?;
        }

        if style.intense == Some(true) {
            self.write_all(BOLD.as_bytes())?;
        }

        Ok(())
    }
}

/// 256-color palette index, using the bright variants.
fn palette(color: Color) -> u8 {
    match color {
        Color::Black => 8,
        Color::Red => 9,
        Color::Green => 10,
        Color::Yellow => 11,
        Color::Blue => 12,
        Color::Magenta => 13,
        Color::Cyan => 14,
        Color::White => 15,
    }
}

/// Whether standard error should be colored when `--color` isn't given.
///
/// Follows `NO_COLOR`, `CLICOLOR` and `CLICOLOR_FORCE`.
fn stderr_wants_color() -> bool {
    use anstyle_query::{clicolor, clicolor_force, is_ci, no_color, term_supports_color};

    if no_color() {
        return false;
    }

    if clicolor_force() {
        return true;
    }

    let terminal = io::stderr().is_terminal();
    match clicolor() {
        Some(enabled) => enabled && terminal,
        None => terminal && (term_supports_color() || is_ci()),
    }
}

#[cfg(test)]
mod test {
    use std::io::Write as _;

    use log4rs::encode::Write as _;

    use super::*;

    fn red() -> Style {
        let mut style = Style::new();
        style.text(Color::Red).intense(true);
        style
    }

    #[test]
    fn styles_when_colored() {
        let mut line = StyledLine {
            color: true,
            buf: Vec::new(),
        };

        line.set_style(&red()).expect("Vec cannot fail");
        line.write_all(b"ERROR").expect("Vec cannot fail");
        line.set_style(&Style::new()).expect("Vec cannot fail");

        assert_eq!(line.buf, b"\x1b[0m\x1b[38;5;9m\x1b[1mERROR\x1b[0m");
    }

    #[test]
    fn plain_without_color() {
        let mut line = StyledLine {
            color: false,
            buf: Vec::new(),
        };

        line.set_style(&red()).expect("Vec cannot fail");
        line.write_all(b"ERROR").expect("Vec cannot fail");
        line.set_style(&Style::new()).expect("Vec cannot fail");

        assert_eq!(line.buf, b"ERROR");
    }
}
