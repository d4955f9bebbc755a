//! Encodes binary data as text made up of `0` and `1` characters and converts
//! such text back into binary data.
//!
//! Every byte is written as 8 characters, most-significant bit first, with no
//! separators. So `b"g"` becomes `"01100111"`.
//!
//! The crate provides:
//!
//! - [`codec`]: one-shot `encode` and `decode` functions over slices, plus
//!   `to_string` and `from_str` convenience functions.
//! - [`Encoder`]: an [`io::Write`](std::io::Write) adapter that encodes
//!   everything written to it into an inner writer.
//! - [`Decoder`]: an [`io::Read`](std::io::Read) adapter that decodes the
//!   bit-string read from an inner reader.
//! - [`dump`]: a line-oriented dump format in the spirit of `xxd -b`.
//!
//! # Examples
//!
//! ```
//! let text = bit_text::codec::to_string(b"Hi");
//! assert_eq!(text, "0100100001101001");
//!
//! let back = bit_text::codec::from_str(&text).expect("input is valid");
//! assert_eq!(back, b"Hi");
//! ```

// for benchmarks
#[cfg(test)]
use criterion as _;

pub mod codec;
mod decoder;
pub mod dump;
mod encoder;
mod error;

pub use decoder::Decoder;
pub use dump::{Dumper, dump};
pub use encoder::Encoder;
pub use error::{DecodeError, Error};

/// Default capacity, in characters, of the buffers used by [`Encoder`] and
/// [`Decoder`].
pub const DEFAULT_BUF_LEN: usize = 1024;
