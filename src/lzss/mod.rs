//! LZSS ring-dictionary compression.
//!
//! Both directions share one dictionary model: a 1024-byte ring pre-filled
//! with spaces (`0x20`), written as bytes are produced or consumed, with
//! the cursor starting at `0x3F0`. The wire format is packets of eight
//! items behind a command byte whose bits — least significant first — mark
//! each item as a one-byte literal (1) or a two-byte back-reference (0).
//! A back-reference packs a 12-bit dictionary offset and a length of
//! 3 to 18 as `(offset & 0xFF, (offset >> 4 & 0xF0) | (length - 3))`.

mod decoder;
mod encoder;

pub use decoder::decompress;
pub use encoder::{compress, Encoder};

/// Worst-case compressed size for `input_len` bytes: all-literal packets,
/// nine bytes per eight input bytes.
pub fn max_compressed_len(input_len: usize) -> usize {
    input_len.div_ceil(8) * 9
}
