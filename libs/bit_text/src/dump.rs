//! Renders bytes as an annotated bit dump, similar to `xxd -b`.
//!
//! Each line covers 6 bytes and looks like this:
//!
//! ```text
//! 00000000: 01100111 01101111 01110000 01101000 01100101 01110010  gopher
//! ```
//!
//! - The offset of the line's first byte as 8 lowercase hex digits, followed
//!   by `: `.
//! - One bit group per byte, each followed by a space.
//! - One more space after the last group.
//! - The bytes as ASCII text, with bytes outside of `0x20` to `0x7E` replaced
//!   by `.`, and a line break.
//!
//! The last line may be shorter. Its missing groups are replaced by spaces so
//! the text column lines up with the lines above it.

use std::io::{self, Write as _};
use std::mem::take;

use arrayvec::ArrayVec;

use crate::codec::{self, GROUP_LEN};
use crate::error::Error;

/// Amount of bytes per line.
const LINE_BYTES: usize = 6;

/// Length of a full line, including the line break.
const LINE_LEN: usize = 10 + LINE_BYTES * (GROUP_LEN + 1) + 1 + LINE_BYTES + 1;

/// Spaces used to pad the missing groups of the last line.
const BLANK: [u8; GROUP_LEN + 2] = [b' '; GROUP_LEN + 2];

/// Renders bytes as a bit dump, returning a [`String`] with the result.
///
/// This is equivalent to writing all bytes to a [`Dumper`] and closing it.
/// Empty input results in an empty string.
///
/// # Examples
///
/// ```
/// let dump = bit_text::dump(b"dump test");
/// assert_eq!(
///     dump,
///     "00000000: 01100100 01110101 01101101 01110000 00100000 01110100  dump t\n\
///      00000006: 01100101 01110011 01110100                             est\n",
/// );
/// ```
#[must_use]
pub fn dump(bytes: &[u8]) -> String {
    let lines = bytes.len().div_ceil(LINE_BYTES);
    let mut dumper = Dumper::new(Vec::with_capacity(lines * LINE_LEN));

    dumper
        .write_all(bytes)
        .and_then(|()| dumper.close())
        .expect("write to Vec cannot fail");

    String::from_utf8(dumper.into_inner()).expect("dump output is always ASCII")
}

/// Wraps an [`io::Write`] so bytes written to it are rendered as a bit dump.
///
/// See the [module docs](self) for the format.
///
/// Lines are written as soon as their bytes are known. The last line is only
/// completed by [`close`](Self::close), which has to be called explicitly;
/// dropping a [`Dumper`] does not close it.
#[derive(Debug)]
pub struct Dumper<W> {
    inner: W,
    offset: u64,
    // text column of the current line
    text: ArrayVec<u8, LINE_BYTES>,
    closed: bool,
}

impl<W> Dumper<W> {
    /// Creates a new dumper.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            offset: 0,
            text: ArrayVec::new(),
            closed: false,
        }
    }

    /// Gets a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Gets a mutable reference to the inner writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwraps this dumper without closing it, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<W: io::Write> Dumper<W> {
    /// Completes the last line, if there is one.
    ///
    /// Closing more than once does nothing. Writing after closing fails with
    /// [`Error::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the inner writer does so.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }

        self.closed = true;
        if self.text.is_empty() {
            return Ok(());
        }

        for slot in self.text.len()..LINE_BYTES {
            self.inner.write_all(&BLANK[..cell_len(slot)])?;
        }

        self.end_line()
    }

    /// Closes this dumper, then returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the inner writer does so.
    pub fn finish(mut self) -> io::Result<W> {
        self.close()?;
        Ok(self.inner)
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if self.text.is_empty() {
            let offset = self.offset;
            write!(self.inner, "{offset:08x}: ")?;
        }

        let mut cell = BLANK;
        cell[..GROUP_LEN].copy_from_slice(&codec::encode_byte(byte));
        self.inner.write_all(&cell[..cell_len(self.text.len())])?;

        self.text.push(printable(byte));
        self.offset += 1;

        if self.text.is_full() {
            self.end_line()?;
        }

        Ok(())
    }

    fn end_line(&mut self) -> io::Result<()> {
        let text = take(&mut self.text);
        self.inner.write_all(&text)?;
        self.inner.write_all(b"\n")
    }
}

impl<W: io::Write> io::Write for Dumper<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Error::Closed.into());
        }

        for (index, &byte) in buf.iter().enumerate() {
            if let Err(err) = self.write_byte(byte) {
                return if index == 0 { Err(err) } else { Ok(index) };
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Length of the group cell in `slot`, including the trailing spaces.
///
/// The last group of a line gets an extra space to separate it from the text.
fn cell_len(slot: usize) -> usize {
    if slot == LINE_BYTES - 1 {
        GROUP_LEN + 2
    } else {
        GROUP_LEN + 1
    }
}

fn printable(byte: u8) -> u8 {
    if matches!(byte, 0x20..=0x7E) { byte } else { b'.' }
}
