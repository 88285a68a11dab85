//! s2codec - codec for the ADK/DNG game archive format
//!
//! Archives of the two supported game titles store a single payload that
//! has been LZSS-compressed over a 1024-byte ring dictionary, masked by two
//! keyed XOR passes, and wrapped in a 20-byte header carrying checksums,
//! the payload size, and a type tag. This crate transforms losslessly in
//! both directions and produces output the games accept.
//!
//! # Example - Decrypt
//!
//! ```no_run
//! use s2codec::decode_auto;
//!
//! let bytes = std::fs::read("world.cmp.dat")?;
//! let decoded = decode_auto(&bytes, "world.dat")?;
//! if !decoded.crc_ok() {
//!     eprintln!("payload checksum mismatch, data may be garbled");
//! }
//! std::fs::write("world.adk.dat", &decoded.data)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Example - Encrypt
//!
//! ```no_run
//! use s2codec::{encode, Game};
//!
//! let payload = std::fs::read("world.adk.dat")?;
//! let archive = encode(&payload, "world.dat", Game::Adk);
//! std::fs::write("world.cmp.dat", &archive)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Filenames matter: unless the outer extension is `s2m`/`sav`, the XOR
//! key is derived from the (lowercased) base name, so an archive decrypts
//! only under the name it was encrypted for.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod archive;
pub mod common;
pub mod crc32;
pub mod error;
pub mod key;
pub mod lzss;
pub mod obfuscate;
pub mod random;

// Re-export the public surface
pub use archive::{
    cleartext_name, compressed_name, decode, decode_auto, encode, split_game_tag, tagged_name,
    ArchiveHeader, Decoded,
};
pub use common::{ArchiveError, Game, Result, HEADER_LEN, MAGIC};
pub use crc32::crc32;
