//! The fixed card and noble catalog.
//!
//! Built once on first use and shared read-only by every engine in the
//! process. Engines clone the entries they deal, so nothing here is ever
//! mutated.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::{Gem, TokenSet};

/// Points awarded by every noble.
pub const NOBLE_POINTS: u32 = 3;

/// A development card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub tier: u8,
    pub bonus: Gem,
    pub points: u32,
    pub cost: TokenSet,
}

/// A noble tile, claimed automatically once a player's bonuses cover its
/// requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noble {
    pub id: String,
    pub points: u32,
    pub requirement: TokenSet,
}

/// Every card in the game, tier 1 first.
pub fn cards() -> &'static [Card] {
    &CARDS
}

/// Every noble in the game, in catalog order.
pub fn nobles() -> &'static [Noble] {
    &NOBLES
}

static CARDS: LazyLock<Vec<Card>> = LazyLock::new(|| {
    CARD_TABLE
        .iter()
        .map(|&(id, tier, bonus, points, cost)| Card {
            id: id.to_string(),
            tier,
            bonus,
            points,
            cost: TokenSet::colored(cost),
        })
        .collect()
});

static NOBLES: LazyLock<Vec<Noble>> = LazyLock::new(|| {
    NOBLE_TABLE
        .iter()
        .map(|&(id, requirement)| Noble {
            id: id.to_string(),
            points: NOBLE_POINTS,
            requirement: TokenSet::colored(requirement),
        })
        .collect()
});

// Costs and requirements are `[white, blue, green, red, black]`.

const NOBLE_TABLE: [(&str, [u32; 5]); 10] = [
    ("n1", [4, 4, 0, 0, 0]),
    ("n2", [4, 0, 4, 0, 0]),
    ("n3", [4, 0, 0, 4, 0]),
    ("n4", [4, 0, 0, 0, 4]),
    ("n5", [0, 4, 4, 0, 0]),
    ("n6", [0, 4, 0, 4, 0]),
    ("n7", [0, 4, 0, 0, 4]),
    ("n8", [0, 0, 4, 4, 0]),
    ("n9", [0, 0, 4, 0, 4]),
    ("n10", [0, 0, 0, 4, 4]),
];

#[rustfmt::skip]
const CARD_TABLE: [(&str, u8, Gem, u32, [u32; 5]); 90] = [
    ("1_black_01", 1, Gem::Black, 0, [1, 1, 1, 1, 0]),
    ("1_black_02", 1, Gem::Black, 0, [1, 2, 1, 1, 0]),
    ("1_black_03", 1, Gem::Black, 0, [2, 2, 0, 1, 0]),
    ("1_black_04", 1, Gem::Black, 0, [0, 0, 1, 3, 1]),
    ("1_black_05", 1, Gem::Black, 0, [0, 0, 2, 1, 0]),
    ("1_black_06", 1, Gem::Black, 0, [2, 0, 2, 0, 0]),
    ("1_black_07", 1, Gem::Black, 0, [0, 0, 3, 0, 0]),
    ("1_black_08", 1, Gem::Black, 1, [0, 4, 0, 0, 0]),
    ("1_blue_01", 1, Gem::Blue, 0, [1, 0, 1, 1, 1]),
    ("1_blue_02", 1, Gem::Blue, 0, [1, 0, 1, 2, 1]),
    ("1_blue_03", 1, Gem::Blue, 0, [1, 0, 2, 2, 0]),
    ("1_blue_04", 1, Gem::Blue, 0, [0, 1, 3, 1, 0]),
    ("1_blue_05", 1, Gem::Blue, 0, [1, 0, 0, 0, 2]),
    ("1_blue_06", 1, Gem::Blue, 0, [0, 0, 2, 0, 2]),
    ("1_blue_07", 1, Gem::Blue, 0, [0, 0, 0, 0, 3]),
    ("1_blue_08", 1, Gem::Blue, 1, [0, 0, 0, 4, 0]),
    ("1_white_01", 1, Gem::White, 0, [0, 1, 1, 1, 1]),
    ("1_white_02", 1, Gem::White, 0, [0, 1, 2, 1, 1]),
    ("1_white_03", 1, Gem::White, 0, [0, 2, 2, 0, 1]),
    ("1_white_04", 1, Gem::White, 0, [3, 1, 0, 0, 1]),
    ("1_white_05", 1, Gem::White, 0, [0, 0, 0, 2, 1]),
    ("1_white_06", 1, Gem::White, 0, [0, 2, 0, 0, 2]),
    ("1_white_07", 1, Gem::White, 0, [0, 3, 0, 0, 0]),
    ("1_white_08", 1, Gem::White, 1, [0, 0, 4, 0, 0]),
    ("1_green_01", 1, Gem::Green, 0, [1, 1, 0, 1, 1]),
    ("1_green_02", 1, Gem::Green, 0, [1, 1, 0, 1, 2]),
    ("1_green_03", 1, Gem::Green, 0, [0, 1, 0, 2, 2]),
    ("1_green_04", 1, Gem::Green, 0, [1, 3, 1, 0, 0]),
    ("1_green_05", 1, Gem::Green, 0, [2, 1, 0, 0, 0]),
    ("1_green_06", 1, Gem::Green, 0, [0, 2, 0, 2, 0]),
    ("1_green_07", 1, Gem::Green, 0, [0, 0, 0, 3, 0]),
    ("1_green_08", 1, Gem::Green, 1, [0, 0, 0, 0, 4]),
    ("1_red_01", 1, Gem::Red, 0, [1, 1, 1, 0, 1]),
    ("1_red_02", 1, Gem::Red, 0, [2, 1, 1, 0, 1]),
    ("1_red_03", 1, Gem::Red, 0, [2, 0, 1, 0, 2]),
    ("1_red_04", 1, Gem::Red, 0, [1, 0, 0, 1, 3]),
    ("1_red_05", 1, Gem::Red, 0, [0, 2, 1, 0, 0]),
    ("1_red_06", 1, Gem::Red, 0, [2, 0, 0, 2, 0]),
    ("1_red_07", 1, Gem::Red, 0, [3, 0, 0, 0, 0]),
    ("1_red_08", 1, Gem::Red, 1, [4, 0, 0, 0, 0]),
    ("2_black_01", 2, Gem::Black, 1, [3, 2, 2, 0, 0]),
    ("2_black_02", 2, Gem::Black, 1, [3, 0, 3, 0, 2]),
    ("2_black_03", 2, Gem::Black, 2, [0, 1, 4, 2, 0]),
    ("2_black_04", 2, Gem::Black, 2, [0, 0, 5, 3, 0]),
    ("2_black_05", 2, Gem::Black, 2, [5, 0, 0, 0, 0]),
    ("2_black_06", 2, Gem::Black, 3, [0, 0, 0, 0, 6]),
    ("2_blue_01", 2, Gem::Blue, 1, [0, 2, 2, 3, 0]),
    ("2_blue_02", 2, Gem::Blue, 1, [0, 2, 3, 0, 3]),
    ("2_blue_03", 2, Gem::Blue, 2, [5, 3, 0, 0, 0]),
    ("2_blue_04", 2, Gem::Blue, 2, [2, 0, 0, 1, 4]),
    ("2_blue_05", 2, Gem::Blue, 2, [0, 5, 0, 0, 0]),
    ("2_blue_06", 2, Gem::Blue, 3, [0, 6, 0, 0, 0]),
    ("2_white_01", 2, Gem::White, 1, [0, 0, 3, 2, 2]),
    ("2_white_02", 2, Gem::White, 1, [2, 3, 0, 3, 0]),
    ("2_white_03", 2, Gem::White, 2, [0, 0, 1, 4, 2]),
    ("2_white_04", 2, Gem::White, 2, [0, 0, 0, 5, 3]),
    ("2_white_05", 2, Gem::White, 2, [0, 0, 0, 5, 0]),
    ("2_white_06", 2, Gem::White, 3, [6, 0, 0, 0, 0]),
    ("2_green_01", 2, Gem::Green, 1, [3, 0, 2, 3, 0]),
    ("2_green_02", 2, Gem::Green, 1, [2, 3, 0, 0, 2]),
    ("2_green_03", 2, Gem::Green, 2, [4, 2, 0, 0, 1]),
    ("2_green_04", 2, Gem::Green, 2, [0, 5, 3, 0, 0]),
    ("2_green_05", 2, Gem::Green, 2, [0, 0, 5, 0, 0]),
    ("2_green_06", 2, Gem::Green, 3, [0, 0, 6, 0, 0]),
    ("2_red_01", 2, Gem::Red, 1, [2, 0, 0, 2, 3]),
    ("2_red_02", 2, Gem::Red, 1, [0, 3, 0, 2, 3]),
    ("2_red_03", 2, Gem::Red, 2, [1, 4, 2, 0, 0]),
    ("2_red_04", 2, Gem::Red, 2, [3, 0, 0, 0, 5]),
    ("2_red_05", 2, Gem::Red, 2, [0, 0, 0, 0, 5]),
    ("2_red_06", 2, Gem::Red, 3, [0, 0, 0, 6, 0]),
    ("3_black_01", 3, Gem::Black, 3, [3, 3, 5, 3, 0]),
    ("3_black_02", 3, Gem::Black, 4, [0, 0, 0, 7, 0]),
    ("3_black_03", 3, Gem::Black, 4, [0, 0, 3, 6, 3]),
    ("3_black_04", 3, Gem::Black, 5, [0, 0, 0, 7, 3]),
    ("3_blue_01", 3, Gem::Blue, 3, [3, 0, 3, 3, 5]),
    ("3_blue_02", 3, Gem::Blue, 4, [7, 0, 0, 0, 0]),
    ("3_blue_03", 3, Gem::Blue, 4, [6, 3, 0, 0, 3]),
    ("3_blue_04", 3, Gem::Blue, 5, [7, 3, 0, 0, 0]),
    ("3_white_01", 3, Gem::White, 3, [0, 3, 3, 5, 3]),
    ("3_white_02", 3, Gem::White, 4, [0, 0, 0, 0, 7]),
    ("3_white_03", 3, Gem::White, 4, [3, 0, 0, 3, 6]),
    ("3_white_04", 3, Gem::White, 5, [3, 0, 0, 0, 7]),
    ("3_green_01", 3, Gem::Green, 3, [5, 3, 0, 3, 3]),
    ("3_green_02", 3, Gem::Green, 4, [0, 7, 0, 0, 0]),
    ("3_green_03", 3, Gem::Green, 4, [3, 6, 3, 0, 0]),
    ("3_green_04", 3, Gem::Green, 5, [0, 7, 3, 0, 0]),
    ("3_red_01", 3, Gem::Red, 3, [3, 5, 3, 0, 3]),
    ("3_red_02", 3, Gem::Red, 4, [0, 0, 7, 0, 0]),
    ("3_red_03", 3, Gem::Red, 4, [0, 3, 6, 3, 0]),
    ("3_red_04", 3, Gem::Red, 5, [0, 0, 7, 3, 0]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_tier_sizes() {
        let count = |tier| cards().iter().filter(|c| c.tier == tier).count();
        assert_eq!(count(1), 40);
        assert_eq!(count(2), 30);
        assert_eq!(count(3), 20);
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = cards().iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 90);
    }

    #[test]
    fn test_catalog_costs_never_include_gold() {
        assert!(cards().iter().all(|c| c.cost.gold == 0 && c.bonus.is_colored()));
        assert!(nobles().iter().all(|n| n.requirement.gold == 0));
    }

    #[test]
    fn test_nobles_each_need_eight_bonuses() {
        assert_eq!(nobles().len(), 10);
        for noble in nobles() {
            assert_eq!(noble.points, NOBLE_POINTS);
            assert_eq!(noble.requirement.total(), 8);
        }
    }
}
