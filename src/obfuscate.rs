//! Two-pass XOR stream obfuscator.
//!
//! The compressed body of an archive is masked in place by two XOR passes
//! drawn from a keystream seeded with the CRC-32 of the key itself:
//!
//! 1. a dense pass cycling a short pad (128–255 bytes) over the whole
//!    payload, and
//! 2. a sparse pass touching one byte every 8192–16383 positions, where
//!    the pad index depends on both the key and the position.
//!
//! XOR is self-inverse and the keystream is a pure function of the key, so
//! the transform is an involution: applying it twice restores the input.

use crate::common::KEY_LEN;
use crate::crc32::crc32;
use crate::random::Prng;

/// Largest dense-pass pad: `(x & 0x7F) + 0x80`.
const DENSE_PAD_MAX: usize = 0xFF;

/// Largest sparse-pass pad: `(x & 0x0F) + 0x11`.
const SPARSE_PAD_MAX: usize = 0x20;

/// Mask or unmask `data` in place with the pads derived from `key`.
///
/// Empty payloads are left untouched; the sparse pass has no defined
/// starting position on a zero-length buffer.
pub fn obfuscate(data: &mut [u8], key: &[u8; KEY_LEN]) {
    if data.is_empty() {
        return;
    }

    let mut rng = Prng::new(crc32(key));

    // Dense pass: every byte, short rotating pad.
    let dense_len = ((rng.next() & 0x7F) + 0x80) as usize;
    let mut dense_pad = [0u8; DENSE_PAD_MAX];
    rng.fill(&mut dense_pad[..dense_len]);
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= dense_pad[i % dense_len];
    }

    // Sparse pass: selected bytes at a pseudo-random stride.
    let sparse_len = ((rng.next() & 0x0F) + 0x11) as usize;
    let mut sparse_pad = [0u8; SPARSE_PAD_MAX];
    rng.fill(&mut sparse_pad[..sparse_len]);

    let start = rng.next() as usize % data.len();
    let stride = ((rng.next() & 0x1FFF) + 0x2000) as usize;
    let mut i = start;
    while i < data.len() {
        let index = (key[i % KEY_LEN] ^ i as u8) as usize % sparse_len;
        data[i] ^= sparse_pad[index];
        i += stride;
    }
}
