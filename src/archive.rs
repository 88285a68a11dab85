//! Archive header, top-level pipelines, and filename conventions.
//!
//! An archive is a 20-byte little-endian header followed by the
//! obfuscated, LZSS-compressed payload:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0      | 4    | magic `0x06091812` |
//! | 4      | 4    | type tag (`"sadk"` or `"rc00"`) |
//! | 8      | 4    | CRC-32 of the uncompressed payload |
//! | 12     | 4    | CRC-32 of the derived 16-byte key |
//! | 16     | 4    | uncompressed payload size |

use crate::common::{ArchiveError, Game, Result, HEADER_LEN, MAGIC};
use crate::crc32::crc32;
use crate::key::make_key;
use crate::lzss;
use crate::obfuscate::obfuscate;

/// Parsed archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Game the archive belongs to, from the type tag.
    pub game: Game,
    /// CRC-32 of the uncompressed payload.
    pub payload_crc: u32,
    /// CRC-32 of the derived key.
    pub key_crc: u32,
    /// Uncompressed payload size in bytes.
    pub size: u32,
}

impl ArchiveHeader {
    /// Parse the first [`HEADER_LEN`] bytes of an archive.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ArchiveError::TooShort(bytes.len()));
        }
        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

        let magic = word(0);
        if magic != MAGIC {
            return Err(ArchiveError::BadMagic(magic));
        }
        let tag = word(4);
        let game = Game::from_type_tag(tag).ok_or(ArchiveError::UnknownTypeTag(tag))?;

        Ok(ArchiveHeader {
            game,
            payload_crc: word(8),
            key_crc: word(12),
            size: word(16),
        })
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&self.game.type_tag().to_le_bytes());
        out[8..12].copy_from_slice(&self.payload_crc.to_le_bytes());
        out[12..16].copy_from_slice(&self.key_crc.to_le_bytes());
        out[16..20].copy_from_slice(&self.size.to_le_bytes());
        out
    }
}

/// Outcome of a successful decrypt.
///
/// The payload is returned even when its checksum disagrees with the
/// header — a corrupted file is often still mostly salvageable. Callers
/// that want the strict contract use [`Decoded::verified`].
#[derive(Debug)]
pub struct Decoded {
    /// The decompressed cleartext payload.
    pub data: Vec<u8>,
    /// Payload CRC stored in the header.
    pub stored_crc: u32,
    /// CRC computed over `data`.
    pub computed_crc: u32,
}

impl Decoded {
    /// Whether the payload checksum matches the header.
    pub fn crc_ok(&self) -> bool {
        self.stored_crc == self.computed_crc
    }

    /// Return the payload, or [`ArchiveError::PayloadCrcMismatch`] when the
    /// checksum disagrees.
    pub fn verified(self) -> Result<Vec<u8>> {
        if self.crc_ok() {
            Ok(self.data)
        } else {
            Err(ArchiveError::PayloadCrcMismatch {
                expected: self.stored_crc,
                actual: self.computed_crc,
            })
        }
    }
}

/// Decrypt an archive.
///
/// `filename` is the cleartext base name: the `.cmp` marker (and any game
/// tag) already stripped — see [`cleartext_name`]. The key is derived from
/// it and checked against the header before anything is decompressed.
pub fn decode(bytes: &[u8], filename: &str, game: Game) -> Result<Decoded> {
    let header = ArchiveHeader::parse(bytes)?;

    let key = make_key(filename, key_is_randomized(filename), game);
    let key_crc = crc32(&key);
    if key_crc != header.key_crc {
        return Err(ArchiveError::KeyCrcMismatch {
            expected: header.key_crc,
            actual: key_crc,
        });
    }

    let mut body = bytes[HEADER_LEN..].to_vec();
    obfuscate(&mut body, &key);

    let data = lzss::decompress(&body, header.size as usize)?;
    let computed_crc = crc32(&data);

    Ok(Decoded {
        data,
        stored_crc: header.payload_crc,
        computed_crc,
    })
}

/// Decrypt an archive, taking the game from the header's type tag.
pub fn decode_auto(bytes: &[u8], filename: &str) -> Result<Decoded> {
    let header = ArchiveHeader::parse(bytes)?;
    decode(bytes, filename, header.game)
}

/// Encrypt a payload into a complete archive.
///
/// `filename` is the base name the archive will be stored under, without
/// the `.cmp` marker or game tag. Infallible: any payload encrypts.
pub fn encode(bytes: &[u8], filename: &str, game: Game) -> Vec<u8> {
    let key = make_key(filename, key_is_randomized(filename), game);

    let header = ArchiveHeader {
        game,
        payload_crc: crc32(bytes),
        key_crc: crc32(&key),
        size: bytes.len() as u32,
    };

    let mut body = lzss::compress(bytes);
    obfuscate(&mut body, &key);

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&body);
    out
}

/// Whether key randomization applies to this filename.
///
/// Map and savegame files (outer extension `s2m`/`sav`) use the game
/// constant verbatim; everything else gets a filename-derived key.
pub fn key_is_randomized(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            !ext.eq_ignore_ascii_case("s2m") && !ext.eq_ignore_ascii_case("sav")
        }
        None => true,
    }
}

/// Drop the first `.cmp` marker from an archive filename, yielding the
/// base name the key was derived from. Names without the marker pass
/// through unchanged.
pub fn cleartext_name(filename: &str) -> String {
    match find_marker(filename, "cmp") {
        Some(at) => remove_marker(filename, at),
        None => filename.to_owned(),
    }
}

/// Insert the `.cmp` marker before the outer extension:
/// `stem.ext` becomes `stem.cmp.ext`.
pub fn compressed_name(filename: &str) -> String {
    insert_marker(filename, "cmp")
}

/// Insert the game tag before the outer extension:
/// `stem.ext` becomes `stem.adk.ext` / `stem.dng.ext`.
pub fn tagged_name(filename: &str, game: Game) -> String {
    insert_marker(filename, game.name_tag())
}

/// Split the game tag out of an unpacked filename: `stem.adk.ext` yields
/// `(Game::Adk, "stem.ext")`. Tags are matched case-insensitively. A name
/// carrying neither tag — or both — is rejected.
pub fn split_game_tag(filename: &str) -> Result<(Game, String)> {
    let adk = find_marker(filename, Game::Adk.name_tag());
    let dng = find_marker(filename, Game::Dng.name_tag());
    match (adk, dng) {
        (Some(at), None) => Ok((Game::Adk, remove_marker(filename, at))),
        (None, Some(at)) => Ok((Game::Dng, remove_marker(filename, at))),
        _ => Err(ArchiveError::AmbiguousFileType(filename.to_owned())),
    }
}

/// Locate `.marker` in `name`, case-insensitively. Returns the byte offset
/// of the leading dot.
fn find_marker(name: &str, marker: &str) -> Option<usize> {
    let lowered = name.to_ascii_lowercase();
    let needle = format!(".{marker}");
    lowered.find(&needle)
}

fn remove_marker(name: &str, at: usize) -> String {
    // Marker is ".xxx": one dot plus three characters.
    let mut out = String::with_capacity(name.len() - 4);
    out.push_str(&name[..at]);
    out.push_str(&name[at + 4..]);
    out
}

fn insert_marker(name: &str, marker: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{marker}.{ext}"),
        None => format!("{name}.{marker}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = ArchiveHeader {
            game: Game::Dng,
            payload_crc: 0x1234_5678,
            key_crc: 0x9ABC_DEF0,
            size: 42,
        };
        let bytes = header.to_bytes();
        assert_eq!(ArchiveHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_layout() {
        let header = ArchiveHeader {
            game: Game::Adk,
            payload_crc: 0,
            key_crc: 0,
            size: 0x0102_0304,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &[0x12, 0x18, 0x09, 0x06]);
        assert_eq!(&bytes[4..8], b"sadk");
        assert_eq!(&bytes[16..20], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_header_rejects_garbage() {
        assert!(matches!(
            ArchiveHeader::parse(&[0u8; 10]),
            Err(ArchiveError::TooShort(10))
        ));
        assert!(matches!(
            ArchiveHeader::parse(&[0u8; 20]),
            Err(ArchiveError::BadMagic(0))
        ));
        let mut bytes = [0u8; 20];
        bytes[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        bytes[4..8].copy_from_slice(b"xxxx");
        assert!(matches!(
            ArchiveHeader::parse(&bytes),
            Err(ArchiveError::UnknownTypeTag(_))
        ));
    }

    #[test]
    fn test_randomization_predicate() {
        assert!(key_is_randomized("data.bin"));
        assert!(key_is_randomized("noext"));
        assert!(!key_is_randomized("map.s2m"));
        assert!(!key_is_randomized("game.sav"));
        assert!(!key_is_randomized("GAME.SAV"));
        assert!(key_is_randomized("save.sav.bak"));
    }

    #[test]
    fn test_name_markers() {
        assert_eq!(cleartext_name("data.cmp.bin"), "data.bin");
        assert_eq!(cleartext_name("data.bin"), "data.bin");
        assert_eq!(compressed_name("data.bin"), "data.cmp.bin");
        assert_eq!(compressed_name("data"), "data.cmp");
        assert_eq!(tagged_name("data.bin", Game::Adk), "data.adk.bin");
        assert_eq!(tagged_name("data.bin", Game::Dng), "data.dng.bin");
    }

    #[test]
    fn test_split_game_tag() {
        let (game, base) = split_game_tag("world.adk.dat").unwrap();
        assert_eq!(game, Game::Adk);
        assert_eq!(base, "world.dat");

        let (game, base) = split_game_tag("World.DNG.dat").unwrap();
        assert_eq!(game, Game::Dng);
        assert_eq!(base, "World.dat");

        assert!(split_game_tag("plain.dat").is_err());
        assert!(split_game_tag("both.adk.dng.dat").is_err());
    }
}
