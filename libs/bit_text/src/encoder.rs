use std::io;

use crate::DEFAULT_BUF_LEN;
use crate::codec::{self, GROUP_LEN};
use crate::error::Sticky;

/// Wraps an [`io::Write`] so bytes written to it are encoded as a bit-string.
///
/// Input is encoded in chunks of `N / 8` bytes through a buffer of `N`
/// characters, so the output does not depend on how the input is split
/// across calls.
///
/// The first failure returned by the inner writer is kept. Once a failure
/// was recorded, every further call consumes no input and returns that
/// failure again. If a call already consumed some input before the failure,
/// it returns the amount consumed and the failure is returned by the next
/// call instead.
///
/// # Examples
///
/// ```
/// use std::io::Write as _;
///
/// let mut encoder = bit_text::Encoder::new(Vec::new());
/// encoder.write_all(b"ok").expect("Vec cannot fail");
///
/// assert_eq!(encoder.into_inner(), b"0110111101101011");
/// ```
#[derive(Debug)]
pub struct Encoder<W, const N: usize = DEFAULT_BUF_LEN> {
    inner: W,
    sticky: Sticky,
    buf: [u8; N],
}

impl<W> Encoder<W> {
    /// Creates a new encoder with the default buffer size.
    pub fn new(inner: W) -> Self {
        Self::with_buffer(inner)
    }
}

impl<W, const N: usize> Encoder<W, N> {
    /// Amount of source bytes encoded at once.
    const CHUNK: usize = N / GROUP_LEN;

    /// Creates a new encoder with a buffer of `N` characters.
    ///
    /// `N` must be at least 8.
    pub fn with_buffer(inner: W) -> Self {
        const { assert!(N >= GROUP_LEN, "buffer must fit at least one group") };

        Self {
            inner,
            sticky: Sticky::default(),
            buf: [0u8; N],
        }
    }

    /// Gets a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Gets a mutable reference to the inner writer.
    ///
    /// Writing to it directly will interleave with the encoded output.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwraps this encoder, returning the inner writer.
    ///
    /// Nothing is buffered between calls, so no data is lost.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write, const N: usize> Encoder<W, N> {
    /// Writes the first `len` buffered characters to the inner writer,
    /// returning how many made it.
    fn write_buf(&mut self, len: usize) -> usize {
        let mut written = 0;
        while written < len {
            match self.inner.write(&self.buf[written..len]) {
                Ok(0) => {
                    self.sticky.set(io::ErrorKind::WriteZero.into());
                    break;
                },
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {},
                Err(err) => {
                    self.sticky.set(err);
                    break;
                },
            }
        }

        written
    }
}

impl<W: io::Write, const N: usize> io::Write for Encoder<W, N> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut consumed = 0;
        for chunk in buf.chunks(Self::CHUNK) {
            if self.sticky.is_set() {
                break;
            }

            let len = codec::encode(&mut self.buf, chunk);
            // only count bytes whose whole group was written
            consumed += self.write_buf(len) / GROUP_LEN;
        }

        match self.sticky.replay() {
            Some(err) if consumed == 0 => Err(err),
            _ => Ok(consumed),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sticky.replay() {
            Some(err) => Err(err),
            None => self.inner.flush(),
        }
    }
}
