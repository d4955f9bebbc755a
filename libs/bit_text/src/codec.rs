//! One-shot conversion between bytes and bit-strings.
//!
//! The format is as follows:
//!
//! - Each byte becomes a group of 8 characters.
//! - The first character of a group is the most significant bit of the byte.
//! - A cleared bit is written as `0`, a set bit as `1`.
//!
//! There are no delimiters or separators. Decoding applies these rules in
//! reverse, only accepting input made up of full groups of `0` and `1`.
//!
//! When decoding fails, the bytes decoded before the failing position are
//! kept and returned as part of the [`DecodeError`]. If the input has both an
//! invalid character and a trailing partial group, the invalid character is
//! reported.

use crate::error::{DecodeError, Error};

/// Amount of characters a single byte is encoded as.
pub const GROUP_LEN: usize = 8;

/// Characters for a cleared and a set bit.
const BIT_TABLE: [u8; 2] = *b"01";

/// The length of the encoding of `n` bytes.
///
/// This is always `n * 8`.
#[must_use]
pub const fn encoded_len(n: usize) -> usize {
    n * GROUP_LEN
}

/// The amount of bytes `n` characters decode to.
///
/// This does not check that `n` is a multiple of 8; a trailing partial group
/// is simply not counted.
#[must_use]
pub const fn decoded_len(n: usize) -> usize {
    n / GROUP_LEN
}

/// Encodes a single byte as one group.
#[must_use]
pub const fn encode_byte(byte: u8) -> [u8; GROUP_LEN] {
    let mut group = [0u8; GROUP_LEN];
    let mut index = 0;
    while index < GROUP_LEN {
        let bit = (byte >> (GROUP_LEN - 1 - index)) & 1;
        group[index] = BIT_TABLE[bit as usize];
        index += 1;
    }

    group
}

/// Encodes `src` into the first [`encoded_len`] bytes of `dst`.
///
/// Returns the amount of bytes written, which is always
/// `encoded_len(src.len())`.
///
/// # Panics
///
/// Panics if `dst` is shorter than `encoded_len(src.len())`.
pub fn encode(dst: &mut [u8], src: &[u8]) -> usize {
    let len = encoded_len(src.len());
    assert!(
        dst.len() >= len,
        "dst must be at least `encoded_len(src.len())` bytes long"
    );

    let (groups, _) = dst[..len].as_chunks_mut::<GROUP_LEN>();
    for (group, &byte) in groups.iter_mut().zip(src) {
        *group = encode_byte(byte);
    }

    len
}

/// Encodes bytes as a bit-string, returning a [`String`] with the result.
///
/// Use [`from_str`] to reverse the operation.
#[must_use]
pub fn to_string(bytes: &[u8]) -> String {
    let mut result = vec![0u8; encoded_len(bytes.len())];
    encode(&mut result, bytes);

    String::from_utf8(result).expect("bit-strings are always ASCII")
}

/// Decodes `src` into `dst`, returning the amount of bytes written.
///
/// `dst` and `src` cannot overlap here. Use [`decode_in_place`] to decode a
/// buffer into itself.
///
/// # Errors
///
/// Returns [`Err`] if `src` contains a character other than `0` or `1`, or
/// its length is not a multiple of 8. The error holds the amount of bytes
/// written to `dst` before the failure.
///
/// # Panics
///
/// Panics if `dst` is shorter than `decoded_len(src.len())`.
pub fn decode(dst: &mut [u8], src: &[u8]) -> Result<usize, DecodeError> {
    let (groups, tail) = src.as_chunks::<GROUP_LEN>();
    assert!(
        dst.len() >= groups.len(),
        "dst must be at least `decoded_len(src.len())` bytes long"
    );

    for (index, (out, group)) in dst.iter_mut().zip(groups).enumerate() {
        *out = decode_group(group).map_err(|error| DecodeError::new(index, error))?;
    }

    check_tail(tail).map_err(|error| DecodeError::new(groups.len(), error))?;
    Ok(groups.len())
}

/// Decodes a bit-string in place, reusing its storage for the output.
///
/// On success, returns the prefix of `buf` that holds the decoded bytes.
/// Bytes past that prefix are left in an unspecified state.
///
/// # Errors
///
/// Fails in the same cases as [`decode`]. The error holds the prefix of `buf`
/// decoded before the failure.
pub fn decode_in_place(buf: &mut [u8]) -> Result<&mut [u8], DecodeError<&mut [u8]>> {
    let mut view = InPlace::new(buf);
    let result = loop {
        let Some(group) = view.next_group() else {
            break check_tail(view.tail());
        };

        match decode_group(&group) {
            Ok(byte) => view.push(byte),
            Err(error) => break Err(error),
        }
    };

    let decoded = view.finish();
    match result {
        Ok(()) => Ok(decoded),
        Err(error) => Err(DecodeError::new(decoded, error)),
    }
}

/// Decodes a bit-string, returning a [`Vec`] with the bytes.
///
/// # Errors
///
/// Fails in the same cases as [`decode`]. The error holds the bytes decoded
/// before the failure.
pub fn from_str(input: &str) -> Result<Vec<u8>, DecodeError<Vec<u8>>> {
    let mut result = input.as_bytes().to_vec();

    let (len, error) = match decode_in_place(&mut result) {
        Ok(decoded) => (decoded.len(), None),
        Err(err) => (err.decoded().len(), Some(err.error())),
    };

    result.truncate(len);
    match error {
        None => Ok(result),
        Some(error) => Err(DecodeError::new(result, error)),
    }
}

/// Whether `c` is `0` or `1`.
#[must_use]
pub const fn is_bit_char(c: u8) -> bool {
    matches!(c, b'0' | b'1')
}

/// Finds the first character that isn't `0` or `1`.
pub(crate) fn first_invalid(chars: &[u8]) -> Option<u8> {
    chars.iter().copied().find(|&c| !is_bit_char(c))
}

fn decode_bit(c: u8) -> Result<u8, Error> {
    match c {
        b'0' => Ok(0),
        b'1' => Ok(1),
        _ => Err(Error::InvalidChar(c)),
    }
}

fn decode_group(group: &[u8; GROUP_LEN]) -> Result<u8, Error> {
    group
        .iter()
        .try_fold(0u8, |acc, &c| Ok((acc << 1) | decode_bit(c)?))
}

/// Validates the characters after the last full group.
///
/// Invalid characters take precedence over the length being wrong.
fn check_tail(tail: &[u8]) -> Result<(), Error> {
    if let Some(c) = first_invalid(tail) {
        Err(Error::InvalidChar(c))
    } else if tail.is_empty() {
        Ok(())
    } else {
        Err(Error::LenMismatch)
    }
}

/// Read and write cursors over a single buffer used for in-place decoding.
///
/// Each group read yields one byte written, so the write cursor advances at
/// an eighth of the speed of the read cursor and never reaches data that
/// hasn't been read yet.
struct InPlace<'a> {
    buf: &'a mut [u8],
    read: usize,
    write: usize,
}

impl<'a> InPlace<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            read: 0,
            write: 0,
        }
    }

    fn next_group(&mut self) -> Option<[u8; GROUP_LEN]> {
        let group = *self.buf.get(self.read..)?.first_chunk::<GROUP_LEN>()?;
        self.read += GROUP_LEN;
        Some(group)
    }

    fn push(&mut self, byte: u8) {
        debug_assert!(
            self.write < self.read,
            "write cursor must stay behind the read cursor"
        );
        self.buf[self.write] = byte;
        self.write += 1;
    }

    fn tail(&self) -> &[u8] {
        &self.buf[self.read..]
    }

    fn finish(self) -> &'a mut [u8] {
        let Self { buf, write, .. } = self;
        &mut buf[..write]
    }
}
