use std::{fmt, io};

/// Error encoding or decoding bit-string data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A character other than `0` or `1` was found.
    #[error("invalid bit character {:?}", char::from(*.0))]
    InvalidChar(u8),
    /// The input length was not a multiple of 8.
    #[error("bit-string length is not a multiple of 8")]
    LenMismatch,
    /// The underlying reader ended in the middle of a group.
    #[error("bit stream ended in the middle of a group")]
    UnexpectedEnd,
    /// The [`Dumper`](crate::Dumper) was written to after being closed.
    #[error("dumper is closed")]
    Closed,
}

impl Error {
    /// Gets the [`Error`] wrapped by an [`io::Error`], if there is one.
    ///
    /// The stream types in this crate report their failures as [`io::Error`]
    /// values. This recovers the original error.
    #[must_use]
    pub fn from_io(err: &io::Error) -> Option<Self> {
        err.get_ref()?.downcast_ref::<Self>().copied()
    }

    fn io_kind(self) -> io::ErrorKind {
        match self {
            Self::InvalidChar(_) | Self::LenMismatch => io::ErrorKind::InvalidData,
            Self::UnexpectedEnd => io::ErrorKind::UnexpectedEof,
            Self::Closed => io::ErrorKind::Other,
        }
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        Self::new(value.io_kind(), value)
    }
}

/// Error returned when decoding fails part-way through.
///
/// Decoding stops at the first error, but everything decoded before that
/// point is kept. `T` holds that decoded prefix: a byte count for
/// [`decode`](crate::codec::decode), the output itself for the other
/// functions.
pub struct DecodeError<T = usize> {
    decoded: T,
    error: Error,
}

impl<T> DecodeError<T> {
    pub(crate) fn new(decoded: T, error: Error) -> Self {
        Self { decoded, error }
    }

    /// The reason decoding stopped.
    #[must_use]
    pub fn error(&self) -> Error {
        self.error
    }

    /// The data decoded before the error.
    #[must_use]
    pub fn decoded(&self) -> &T {
        &self.decoded
    }

    /// Consumes the error, returning the data decoded before it.
    #[must_use]
    pub fn into_decoded(self) -> T {
        self.decoded
    }
}

impl<T: fmt::Debug> fmt::Debug for DecodeError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeError")
            .field("decoded", &self.decoded)
            .field("error", &self.error)
            .finish()
    }
}

impl<T> fmt::Display for DecodeError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<T: fmt::Debug> std::error::Error for DecodeError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A failure that, once recorded, is reported on every later call.
#[derive(Debug, Default)]
pub(crate) struct Sticky(Option<io::Error>);

impl Sticky {
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Records `err` unless a failure was recorded already.
    pub fn set(&mut self, err: io::Error) {
        if self.0.is_none() {
            log::debug!("Bit stream failed: {err}");
            self.0 = Some(err);
        }
    }

    /// Returns an equivalent of the recorded failure, if any.
    pub fn replay(&self) -> Option<io::Error> {
        self.0.as_ref().map(replay)
    }
}

// io::Error isn't Clone, so rebuild it from whatever it carries.
fn replay(err: &io::Error) -> io::Error {
    if let Some(code) = err.raw_os_error() {
        return io::Error::from_raw_os_error(code);
    }

    if let Some(error) = Error::from_io(err) {
        return error.into();
    }

    match err.get_ref() {
        Some(inner) => io::Error::new(err.kind(), inner.to_string()),
        None => io::Error::from(err.kind()),
    }
}
