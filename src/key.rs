//! XOR key derivation.
//!
//! Every archive is obfuscated with a 16-byte key. The key starts from a
//! per-game constant and, for most files, is then XOR-mixed with keystream
//! bytes seeded by the CRC-32 of the ASCII-lowercased filename — so the
//! same payload stored under two names yields two unrelated ciphertexts.
//! Map and savegame files (`.s2m`/`.sav`) skip the mixing and use the
//! constant verbatim, since the game may rename them.

use crate::common::{Game, KEY_LEN};
use crate::crc32::crc32;
use crate::random::Prng;

/// Derive the 16-byte key for `filename`.
///
/// `filename` is the base name of the cleartext file: no `.cmp` marker and
/// no `.adk`/`.dng` tag. Only ASCII letters are folded when lowercasing;
/// other bytes pass through unchanged.
pub fn make_key(filename: &str, randomize: bool, game: Game) -> [u8; KEY_LEN] {
    let mut key = *game.key();
    if !randomize {
        return key;
    }

    let lowered = filename.to_ascii_lowercase();
    let mut rng = Prng::new(crc32(lowered.as_bytes()));
    for byte in &mut key {
        *byte ^= rng.next() as u8;
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_key_is_game_constant() {
        assert_eq!(make_key("save.s2m", false, Game::Adk), *Game::Adk.key());
        assert_eq!(make_key("save.sav", false, Game::Dng), *Game::Dng.key());
    }

    #[test]
    fn test_randomized_key_differs_from_constant() {
        let key = make_key("data.bin", true, Game::Adk);
        assert_ne!(key, *Game::Adk.key());
    }

    #[test]
    fn test_lowercase_folding() {
        // Same name in different cases must derive the same key.
        let a = make_key("Data.BIN", true, Game::Dng);
        let b = make_key("data.bin", true, Game::Dng);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_depends_on_name_and_game() {
        let a = make_key("a.bin", true, Game::Adk);
        let b = make_key("b.bin", true, Game::Adk);
        let c = make_key("a.bin", true, Game::Dng);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mixing_is_prng_bytes() {
        // The mix is a plain XOR, so unmixing with the same stream must
        // restore the constant.
        let name = "terrain.dat";
        let mut key = make_key(name, true, Game::Adk);
        let mut rng = Prng::new(crc32(name.as_bytes()));
        for byte in &mut key {
            *byte ^= rng.next() as u8;
        }
        assert_eq!(key, *Game::Adk.key());
    }
}
