use std::io;

use crate::DEFAULT_BUF_LEN;
use crate::codec::{self, GROUP_LEN};
use crate::error::{Error, Sticky};

/// Wraps an [`io::Read`] holding a bit-string so reading from it yields the
/// decoded bytes.
///
/// Characters are read into a buffer of `N` characters. Characters that don't
/// form a full group yet are kept until more data arrives, so the output does
/// not depend on how the inner reader splits its data.
///
/// Failures are kept and reported on every further call. All bytes decoded
/// before a failure are returned first; the failure itself is returned by the
/// first call that has nothing left to produce.
///
/// If the inner reader ends with an incomplete group, the failure is
/// [`Error::InvalidChar`] if that group contains an invalid character and
/// [`Error::UnexpectedEnd`] otherwise. Use [`Error::from_io`] to inspect it.
///
/// # Examples
///
/// ```
/// use std::io::Read as _;
///
/// let mut decoder = bit_text::Decoder::new(&b"0110111101101011"[..]);
/// let mut out = Vec::new();
/// decoder.read_to_end(&mut out).expect("input is valid");
///
/// assert_eq!(out, b"ok");
/// ```
#[derive(Debug)]
pub struct Decoder<R, const N: usize = DEFAULT_BUF_LEN> {
    inner: R,
    sticky: Sticky,
    eof: bool,
    buf: [u8; N],
    // leftover characters are `buf[start..end]`
    start: usize,
    end: usize,
}

impl<R> Decoder<R> {
    /// Creates a new decoder with the default buffer size.
    pub fn new(inner: R) -> Self {
        Self::with_buffer(inner)
    }
}

impl<R, const N: usize> Decoder<R, N> {
    /// Creates a new decoder with a buffer of `N` characters.
    ///
    /// `N` must be at least 8.
    pub fn with_buffer(inner: R) -> Self {
        const { assert!(N >= GROUP_LEN, "buffer must fit at least one group") };

        Self {
            inner,
            sticky: Sticky::default(),
            eof: false,
            buf: [0u8; N],
            start: 0,
            end: 0,
        }
    }

    /// Gets a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Gets a mutable reference to the inner reader.
    ///
    /// Reading from it directly will skip over data this decoder hasn't seen.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwraps this decoder, returning the inner reader.
    ///
    /// Any buffered characters are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn leftover(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn discard(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Handles the inner reader ending with `leftover` not being a full group.
    fn check_end(&mut self) {
        let rest = self.leftover();
        if rest.is_empty() {
            return;
        }

        let error = match codec::first_invalid(rest) {
            Some(c) => Error::InvalidChar(c),
            None => Error::UnexpectedEnd,
        };

        self.discard();
        self.sticky.set(error.into());
    }
}

impl<R: io::Read, const N: usize> Decoder<R, N> {
    /// Reads until at least one group is buffered, the inner reader ends, or
    /// it fails.
    ///
    /// Only [`io::ErrorKind::Interrupted`] is returned; other failures are
    /// recorded.
    fn fill(&mut self) -> io::Result<()> {
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;

        while self.end < GROUP_LEN && !self.eof && !self.sticky.is_set() {
            match self.inner.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    self.check_end();
                },
                Ok(n) => self.end += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => return Err(err),
                Err(err) => self.sticky.set(err),
            }
        }

        Ok(())
    }
}

impl<R: io::Read, const N: usize> io::Read for Decoder<R, N> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return self.sticky.replay().map_or(Ok(0), Err);
        }

        if self.leftover().len() < GROUP_LEN {
            self.fill()?;
        }

        let count = out.len().min(codec::decoded_len(self.leftover().len()));
        let src = &self.buf[self.start..self.start + codec::encoded_len(count)];
        let decoded = match codec::decode(&mut out[..count], src) {
            Ok(decoded) => {
                self.start += codec::encoded_len(decoded);
                decoded
            },
            Err(err) => {
                // a malformed group is never retried
                self.discard();
                self.sticky.set(err.error().into());
                *err.decoded()
            },
        };

        if decoded == 0
            && let Some(err) = self.sticky.replay()
        {
            return Err(err);
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod test {
    use std::io::Read as _;

    use super::*;

    /// Hands out the data `step` bytes at a time, interrupting once before
    /// every read.
    struct Interrupting<'a> {
        data: &'a [u8],
        step: usize,
        interrupt: bool,
    }

    impl io::Read for Interrupting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }

            let len = buf.len().min(self.step).min(self.data.len());
            let (head, rest) = self.data.split_at(len);
            buf[..len].copy_from_slice(head);
            self.data = rest;
            Ok(len)
        }
    }

    #[test]
    fn interrupted_is_not_sticky() {
        let input = codec::to_string(b"interrupt");
        let reader = Interrupting {
            data: input.as_bytes(),
            step: 3,
            interrupt: false,
        };

        // `read_to_end` retries on `Interrupted`
        let mut out = Vec::new();
        Decoder::new(reader)
            .read_to_end(&mut out)
            .expect("interrupts are retried");

        assert_eq!(out, b"interrupt");
    }

    #[test]
    fn small_buffer_keeps_leftover() {
        let input = codec::to_string(b"leftover");
        let mut decoder = Decoder::<_, 11>::with_buffer(input.as_bytes());

        let mut out = Vec::new();
        decoder.read_to_end(&mut out).expect("input is valid");
        assert_eq!(out, b"leftover");
    }

    #[test]
    fn errors_after_valid_data() {
        let mut decoder = Decoder::new(&b"0110000101100010x"[..]);

        let mut out = [0u8; 1];
        assert_eq!(decoder.read(&mut out).expect("first group"), 1);
        assert_eq!(out, *b"a");
        assert_eq!(decoder.read(&mut out).expect("second group"), 1);
        assert_eq!(out, *b"b");

        for _ in 0..3 {
            let err = decoder.read(&mut out).expect_err("must fail");
            assert_eq!(Error::from_io(&err), Some(Error::InvalidChar(b'x')));
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        }
    }

    #[test]
    fn unexpected_end_kind() {
        let mut decoder = Decoder::new(&b"0110000"[..]);
        let err = decoder.read(&mut [0u8; 4]).expect_err("must fail");

        assert_eq!(Error::from_io(&err), Some(Error::UnexpectedEnd));
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn empty_read_reports_failure() {
        let mut decoder = Decoder::new(&b"1111111"[..]);
        assert_eq!(decoder.read(&mut []).expect("nothing failed yet"), 0);

        let err = decoder.read(&mut [0u8; 4]).expect_err("must fail");
        assert_eq!(Error::from_io(&err), Some(Error::UnexpectedEnd));

        let again = decoder.read(&mut []).expect_err("failure is sticky");
        assert_eq!(Error::from_io(&again), Some(Error::UnexpectedEnd));
        assert_eq!(again.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn no_read_after_end() {
        struct CountReads<'a>(&'a [u8], usize);

        impl io::Read for CountReads<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                self.1 += 1;
                self.0.read(buf)
            }
        }

        let mut decoder = Decoder::new(CountReads(b"0000000100000010", 0));
        let mut out = [0u8; 1];

        assert_eq!(decoder.read(&mut out).expect("valid"), 1);
        assert_eq!(decoder.read(&mut out).expect("valid"), 1);
        assert_eq!(decoder.read(&mut out).expect("end"), 0);
        assert_eq!(decoder.read(&mut out).expect("end"), 0);
        // one read with data, one observing the end
        assert_eq!(decoder.get_ref().1, 2);
    }
}
