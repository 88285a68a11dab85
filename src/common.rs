//! Common types and constants shared by the codec pipeline.
//!
//! This module defines the game variants, the wire-format constants, the
//! dictionary parameters used by both LZSS directions, and the error type
//! used throughout the crate.

use thiserror::Error;

/// Magic constant at offset 0 of every archive.
pub const MAGIC: u32 = 0x0609_1812;

/// Length of the archive header in bytes.
pub const HEADER_LEN: usize = 20;

/// Size of the LZSS ring dictionary.
pub const DICT_SIZE: usize = 0x400;

/// Index mask for the ring dictionary.
pub const DICT_MASK: usize = DICT_SIZE - 1;

/// Byte the dictionary is pre-filled with. Part of the format.
pub const DICT_FILL: u8 = 0x20;

/// Initial write cursor into the dictionary.
pub const DICT_START: usize = DICT_SIZE - MAX_MATCH;

/// Longest match the encoder will emit.
pub const MAX_MATCH: usize = 0x10;

/// Shortest match worth a back-reference; anything below is a literal.
pub const MIN_MATCH: usize = 3;

/// XOR key length in bytes.
pub const KEY_LEN: usize = 16;

const ADK_KEY: [u8; KEY_LEN] = [
    0xBD, 0x8C, 0xC2, 0xBD, 0x30, 0x67, 0x4B, 0xF8, 0xB4, 0x9B, 0x1B, 0xF9,
    0xF6, 0x82, 0x2E, 0xF4,
];

const DNG_KEY: [u8; KEY_LEN] = [
    0xC9, 0x59, 0x46, 0xCA, 0xD9, 0xF0, 0x4F, 0x0A, 0xA1, 0x00, 0xAA, 0xB8,
    0xCB, 0xE8, 0xDB, 0x6B,
];

/// The two supported game titles, distinguished by header type tag and
/// key constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    /// "sadk" archives.
    Adk,
    /// "rc00" archives.
    Dng,
}

impl Game {
    /// Type tag stored at offset 4 of the header.
    pub fn type_tag(self) -> u32 {
        match self {
            Game::Adk => u32::from_le_bytes(*b"sadk"),
            Game::Dng => u32::from_le_bytes(*b"rc00"),
        }
    }

    /// Map a header type tag back to the game, if known.
    pub fn from_type_tag(tag: u32) -> Option<Self> {
        if tag == Game::Adk.type_tag() {
            Some(Game::Adk)
        } else if tag == Game::Dng.type_tag() {
            Some(Game::Dng)
        } else {
            None
        }
    }

    /// The constant XOR key for this game.
    pub fn key(self) -> &'static [u8; KEY_LEN] {
        match self {
            Game::Adk => &ADK_KEY,
            Game::Dng => &DNG_KEY,
        }
    }

    /// Inner filename tag marking unpacked files of this game.
    pub fn name_tag(self) -> &'static str {
        match self {
            Game::Adk => "adk",
            Game::Dng => "dng",
        }
    }
}

/// Error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Input shorter than a header.
    #[error("archive truncated: {0} bytes, need at least {HEADER_LEN}")]
    TooShort(usize),

    /// Magic constant absent.
    #[error("bad magic: {0:#010X}")]
    BadMagic(u32),

    /// Type tag matches no known game.
    #[error("unknown type tag: {0:#010X}")]
    UnknownTypeTag(u32),

    /// Derived key disagrees with the header. Usually a misnamed file or
    /// the wrong game.
    #[error("key CRC mismatch: header says {expected:08X}, derived key has {actual:08X}")]
    KeyCrcMismatch {
        /// CRC stored in the header.
        expected: u32,
        /// CRC of the key derived from the filename.
        actual: u32,
    },

    /// The compressed stream expanded to the wrong number of bytes.
    #[error("payload size mismatch: header says {expected} bytes, stream produced {actual}")]
    PayloadSizeMismatch {
        /// Size stored in the header.
        expected: usize,
        /// Bytes the stream actually expanded to.
        actual: usize,
    },

    /// Decoded payload fails its checksum.
    #[error("payload CRC mismatch: header says {expected:08X}, payload has {actual:08X}")]
    PayloadCrcMismatch {
        /// CRC stored in the header.
        expected: u32,
        /// CRC of the decoded payload.
        actual: u32,
    },

    /// Filename carries neither or both of the `.adk`/`.dng` tags.
    #[error("cannot determine game from file name {0:?}")]
    AmbiguousFileType(String),

    /// I/O error from the surrounding file handling.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
