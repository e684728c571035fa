//! Gem kinds and per-kind token counts.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gem
// ---------------------------------------------------------------------------

/// One of the six token kinds. `Gold` is the wildcard: it pays for any
/// colored shortfall but is never a card bonus or noble requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gem {
    White,
    Blue,
    Green,
    Red,
    Black,
    Gold,
}

impl Gem {
    /// The five colored kinds, in canonical order.
    pub const COLORED: [Gem; 5] = [Gem::White, Gem::Blue, Gem::Green, Gem::Red, Gem::Black];

    /// Every kind, gold last.
    pub const ALL: [Gem; 6] = [
        Gem::White,
        Gem::Blue,
        Gem::Green,
        Gem::Red,
        Gem::Black,
        Gem::Gold,
    ];

    /// Parses a client-supplied color name. Surrounding whitespace and case
    /// are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|gem| gem.as_str().eq_ignore_ascii_case(raw))
    }

    /// Returns `true` for every kind except gold.
    pub fn is_colored(self) -> bool {
        self != Gem::Gold
    }

    /// The lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Gem::White => "white",
            Gem::Blue => "blue",
            Gem::Green => "green",
            Gem::Red => "red",
            Gem::Black => "black",
            Gem::Gold => "gold",
        }
    }
}

impl fmt::Display for Gem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TokenSet
// ---------------------------------------------------------------------------

/// A count per gem kind.
///
/// Used for the bank, player hands, card costs, bonuses, and noble
/// requirements. Counts are unsigned, so "negative" can only be reached
/// by asking [`try_remove`](Self::try_remove) for more than is there, which
/// it refuses without touching the set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSet {
    pub white: u32,
    pub blue: u32,
    pub green: u32,
    pub red: u32,
    pub black: u32,
    pub gold: u32,
}

impl TokenSet {
    /// A set with only colored counts, in `[white, blue, green, red, black]`
    /// order.
    pub const fn colored(counts: [u32; 5]) -> Self {
        Self {
            white: counts[0],
            blue: counts[1],
            green: counts[2],
            red: counts[3],
            black: counts[4],
            gold: 0,
        }
    }

    /// Same count of every colored kind plus a separate gold count.
    pub const fn uniform(colored: u32, gold: u32) -> Self {
        Self {
            white: colored,
            blue: colored,
            green: colored,
            red: colored,
            black: colored,
            gold,
        }
    }

    pub fn get(&self, gem: Gem) -> u32 {
        match gem {
            Gem::White => self.white,
            Gem::Blue => self.blue,
            Gem::Green => self.green,
            Gem::Red => self.red,
            Gem::Black => self.black,
            Gem::Gold => self.gold,
        }
    }

    fn slot(&mut self, gem: Gem) -> &mut u32 {
        match gem {
            Gem::White => &mut self.white,
            Gem::Blue => &mut self.blue,
            Gem::Green => &mut self.green,
            Gem::Red => &mut self.red,
            Gem::Black => &mut self.black,
            Gem::Gold => &mut self.gold,
        }
    }

    pub fn add(&mut self, gem: Gem, n: u32) {
        *self.slot(gem) += n;
    }

    /// Removes `n` tokens of `gem`. Returns `false`, leaving the set as it
    /// was, when fewer than `n` are held.
    #[must_use]
    pub fn try_remove(&mut self, gem: Gem, n: u32) -> bool {
        let slot = self.slot(gem);
        match slot.checked_sub(n) {
            Some(left) => {
                *slot = left;
                true
            }
            None => false,
        }
    }

    /// Sum over all six kinds.
    pub fn total(&self) -> u32 {
        Gem::ALL.into_iter().map(|gem| self.get(gem)).sum()
    }

    /// Returns `true` if every colored count in `self` reaches the matching
    /// count in `requirement`. Gold is ignored on both sides.
    pub fn covers(&self, requirement: &TokenSet) -> bool {
        Gem::COLORED
            .into_iter()
            .all(|gem| self.get(gem) >= requirement.get(gem))
    }

    /// Iterates over the kinds with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = (Gem, u32)> + '_ {
        Gem::ALL
            .into_iter()
            .map(|gem| (gem, self.get(gem)))
            .filter(|&(_, n)| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gem_parse_is_trimmed_and_case_insensitive() {
        assert_eq!(Gem::parse("  Red "), Some(Gem::Red));
        assert_eq!(Gem::parse("GOLD"), Some(Gem::Gold));
        assert_eq!(Gem::parse("purple"), None);
        assert_eq!(Gem::parse(""), None);
    }

    #[test]
    fn test_gem_serializes_lowercase() {
        let json = serde_json::to_string(&Gem::Black).unwrap();
        assert_eq!(json, "\"black\"");
    }

    #[test]
    fn test_token_set_try_remove_refuses_overdraw() {
        let mut set = TokenSet::colored([1, 0, 0, 0, 0]);
        assert!(!set.try_remove(Gem::White, 2));
        assert_eq!(set.white, 1);
        assert!(set.try_remove(Gem::White, 1));
        assert_eq!(set.white, 0);
    }

    #[test]
    fn test_token_set_total_includes_gold() {
        let set = TokenSet::uniform(2, 3);
        assert_eq!(set.total(), 13);
    }

    #[test]
    fn test_token_set_covers_ignores_gold() {
        let bonuses = TokenSet::colored([4, 4, 0, 0, 0]);
        let mut requirement = TokenSet::colored([4, 4, 0, 0, 0]);
        requirement.gold = 9;
        assert!(bonuses.covers(&requirement));
        assert!(!bonuses.covers(&TokenSet::colored([4, 4, 1, 0, 0])));
    }

    #[test]
    fn test_token_set_json_shape() {
        let json: serde_json::Value =
            serde_json::to_value(TokenSet::colored([1, 2, 3, 4, 5])).unwrap();
        assert_eq!(json["white"], 1);
        assert_eq!(json["black"], 5);
        assert_eq!(json["gold"], 0);
    }
}
