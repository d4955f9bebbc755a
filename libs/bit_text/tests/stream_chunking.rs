#![allow(unused_crate_dependencies)]
//! Checks that the streaming types produce the same output as the one-shot
//! functions no matter how the data is split up.

use std::io::{self, Read as _, Write as _};

use bit_text::{Decoder, Encoder, Error, codec};

/// Hands out at most `step` bytes per read.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl io::Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.step).min(self.data.len());
        let (head, rest) = self.data.split_at(len);
        buf[..len].copy_from_slice(head);
        self.data = rest;
        Ok(len)
    }
}

/// Accepts at most `step` bytes per write.
struct Narrow {
    out: Vec<u8>,
    step: usize,
}

impl io::Write for Narrow {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(self.step);
        self.out.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Deterministic data with every byte value and some repetition.
fn sample(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_le_bytes()[1]
        })
        .collect()
}

#[test]
fn encoder_split_anywhere() {
    let data = sample(1500);
    let expected = codec::to_string(&data);

    for split in [1, 2, 3, 7, 8, 127, 128, 129, 512, 1499, 1500] {
        let mut encoder = Encoder::new(Vec::new());
        for chunk in data.chunks(split) {
            encoder.write_all(chunk).expect("Vec cannot fail");
        }

        assert_eq!(
            encoder.into_inner(),
            expected.as_bytes(),
            "split at {split}"
        );
    }
}

#[test]
fn encoder_narrow_sink() {
    let data = sample(300);
    let expected = codec::to_string(&data);

    for step in [1, 5, 8, 13, 64] {
        let sink = Narrow {
            out: Vec::new(),
            step,
        };

        let mut encoder = Encoder::<_, 24>::with_buffer(sink);
        encoder.write_all(&data).expect("sink accepts everything");
        encoder.flush().expect("sink accepts everything");

        assert_eq!(
            encoder.into_inner().out,
            expected.as_bytes(),
            "sink step {step}"
        );
    }
}

#[test]
fn decoder_any_read_size() {
    let data = sample(700);
    let encoded = codec::to_string(&data);

    for step in [1, 2, 3, 7, 8, 9, 15, 16, 17, 100, 1024, 10_000] {
        for out_len in [1, 3, 64, 4096] {
            let reader = Trickle {
                data: encoded.as_bytes(),
                step,
            };

            let mut decoder = Decoder::new(reader);
            let mut decoded = Vec::new();
            let mut buf = vec![0u8; out_len];
            loop {
                let n = decoder.read(&mut buf).expect("input is valid");
                if n == 0 {
                    break;
                }

                decoded.extend_from_slice(&buf[..n]);
            }

            assert_eq!(decoded, data, "read step {step}, output {out_len}");
        }
    }
}

#[test]
fn decoder_small_buffer() {
    let data = sample(100);
    let encoded = codec::to_string(&data);

    let reader = Trickle {
        data: encoded.as_bytes(),
        step: 5,
    };

    let mut decoded = Vec::new();
    Decoder::<_, 8>::with_buffer(reader)
        .read_to_end(&mut decoded)
        .expect("input is valid");

    assert_eq!(decoded, data);
}

#[test]
fn decoder_malformed_tail_any_read_size() {
    const CASES: &[(&str, &[u8], Error)] = &[
        ("1111111", b"", Error::UnexpectedEnd),
        ("111111110", b"\xFF", Error::UnexpectedEnd),
        ("11111111z", b"\xFF", Error::InvalidChar(b'z')),
        ("11111111gg", b"\xFF", Error::InvalidChar(b'g')),
        ("11111111g0", b"\xFF", Error::InvalidChar(b'g')),
        ("0000000\x01", b"", Error::InvalidChar(0x01)),
        ("000000010000001x00000011", b"\x01", Error::InvalidChar(b'x')),
    ];

    for &(input, output, error) in CASES {
        for step in 1..=input.len() {
            let reader = Trickle {
                data: input.as_bytes(),
                step,
            };

            let mut decoder = Decoder::new(reader);
            let mut out = Vec::new();
            let err = decoder
                .read_to_end(&mut out)
                .expect_err("input is malformed");

            assert_eq!(out, output, "{input:?} with step {step}");
            assert_eq!(Error::from_io(&err), Some(error), "{input:?} with step {step}");

            // and it stays that way
            let again = decoder.read(&mut [0u8; 8]).expect_err("failure is sticky");
            assert_eq!(Error::from_io(&again), Some(error));
        }
    }
}

#[test]
fn round_trip_through_both() {
    let data = sample(4096);

    let mut encoder = Encoder::<_, 64>::with_buffer(Vec::new());
    encoder.write_all(&data).expect("Vec cannot fail");
    let encoded = encoder.into_inner();

    let mut decoded = Vec::new();
    Decoder::<_, 40>::with_buffer(encoded.as_slice())
        .read_to_end(&mut decoded)
        .expect("input is valid");

    assert_eq!(decoded, data);
}
