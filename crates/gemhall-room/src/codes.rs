//! Identifier and alias generation.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Uppercase letters and digits without the look-alikes I, O, 0 and 1.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub(crate) const ROOM_ID_LEN: usize = 6;
pub(crate) const PLAYER_ID_LEN: usize = 8;

const ALIAS_ATTEMPTS: usize = 256;

const ALIAS_WORDS: &[&str] = &[
    "apple", "beach", "bread", "cloud", "coffee", "dance", "dream", "earth", "flame", "forest",
    "garden", "globe", "grape", "green", "happy", "honey", "hotel", "house", "island", "jelly",
    "juice", "light", "lucky", "magic", "mango", "maple", "melon", "metal", "money", "moon",
    "music", "night", "ocean", "olive", "party", "pearl", "piano", "pilot", "pizza", "plain",
    "plant", "queen", "quick", "radio", "river", "robot", "salad", "scale", "sheep", "smile",
    "snow", "sound", "spark", "spice", "sport", "star", "stone", "storm", "sugar", "sunny",
    "sweet", "table", "tiger", "toast", "tower", "train", "tree", "union", "urban", "vivid",
    "water", "whale", "white", "wind", "world", "yacht", "young", "zebra",
];

/// A random string of `len` characters from [`CODE_ALPHABET`].
pub(crate) fn random_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Generates a code not rejected by `taken`, retrying on collision.
pub(crate) fn unique_code(len: usize, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let code = random_code(len);
        if !taken(&code) {
            return code;
        }
    }
}

/// Picks an unused word alias, falling back to `room` plus four random
/// lowercase characters once the word list keeps colliding.
pub(crate) fn mnemonic_alias(taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::rng();
    for _ in 0..ALIAS_ATTEMPTS {
        if let Some(word) = ALIAS_WORDS.choose(&mut rng) {
            if !taken(word) {
                return (*word).to_string();
            }
        }
    }
    let suffix = unique_code(4, |suffix| taken(&format!("room{}", suffix.to_lowercase())));
    format!("room{}", suffix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_uses_unambiguous_alphabet() {
        let code = random_code(64);
        assert_eq!(code.len(), 64);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert!(!code.contains(['I', 'O', '0', '1']));
    }

    #[test]
    fn test_mnemonic_alias_comes_from_word_list() {
        let alias = mnemonic_alias(|_| false);
        assert!(ALIAS_WORDS.contains(&alias.as_str()));
    }

    #[test]
    fn test_mnemonic_alias_falls_back_when_words_exhausted() {
        let alias = mnemonic_alias(|candidate| ALIAS_WORDS.contains(&candidate));
        assert!(alias.starts_with("room"));
        assert_eq!(alias.len(), 8);
        assert_eq!(alias, alias.to_lowercase());
    }

    #[test]
    fn test_unique_code_skips_taken() {
        let first = random_code(ROOM_ID_LEN);
        let next = unique_code(ROOM_ID_LEN, |c| c == first);
        assert_ne!(next, first);
    }
}
