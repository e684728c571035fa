//! The closed set of in-game actions.
//!
//! Clients send a loosely typed [`ActionRequest`]; this module is the only
//! place that interprets its `type` string. Anything that does not map to a
//! variant of [`Action`] is refused here, before the engine sees it.

use std::collections::BTreeMap;

use gemhall_protocol::ActionRequest;

use crate::{GameError, Gem};

/// Where a card being bought currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardSource {
    #[default]
    Tableau,
    Reserved,
}

/// A move a player can make on their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Two of one color, or up to three distinct colors.
    TakeTokens(Vec<Gem>),
    /// Move a face-up card into the player's reserve, maybe gaining gold.
    ReserveCard { card_id: String },
    /// Pay for a face-up or reserved card.
    BuyCard { card_id: String, source: CardSource },
    /// Do nothing.
    Pass,
    /// Return tokens to the bank, one per entry.
    DiscardTokens(Vec<Gem>),
    /// Take and return in one step: positive deltas draw, negative return.
    AdjustTokens(BTreeMap<Gem, i32>),
}

impl Action {
    /// The wire name, also recorded as the player's last action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::TakeTokens(_) => "take_tokens",
            Action::ReserveCard { .. } => "reserve_card",
            Action::BuyCard { .. } => "buy_card",
            Action::Pass => "pass",
            Action::DiscardTokens(_) => "discard_tokens",
            Action::AdjustTokens(_) => "adjust_tokens",
        }
    }
}

impl TryFrom<&ActionRequest> for Action {
    type Error = GameError;

    fn try_from(req: &ActionRequest) -> Result<Self, Self::Error> {
        let kind = req.kind.trim().to_ascii_lowercase();
        let payload = &req.payload;

        match kind.as_str() {
            "take_tokens" => Ok(Action::TakeTokens(parse_colors(&payload.colors)?)),
            "reserve_card" => Ok(Action::ReserveCard {
                card_id: required_card_id(payload.card_id.as_deref())?,
            }),
            "buy_card" => Ok(Action::BuyCard {
                card_id: required_card_id(payload.card_id.as_deref())?,
                source: parse_source(payload.source.as_deref())?,
            }),
            "pass" => Ok(Action::Pass),
            "discard_tokens" => Ok(Action::DiscardTokens(parse_colors(&payload.colors)?)),
            "adjust_tokens" => {
                let mut deltas = BTreeMap::new();
                for (color, delta) in &payload.adjust {
                    let gem = Gem::parse(color)
                        .ok_or_else(|| GameError::invalid("unsupported gem color"))?;
                    let merged: &mut i32 = deltas.entry(gem).or_insert(0);
                    *merged = merged
                        .checked_add(*delta)
                        .ok_or_else(|| GameError::invalid("adjust delta out of range"))?;
                }
                Ok(Action::AdjustTokens(deltas))
            }
            _ => Err(GameError::UnknownAction(req.kind.trim().to_string())),
        }
    }
}

impl TryFrom<ActionRequest> for Action {
    type Error = GameError;

    fn try_from(req: ActionRequest) -> Result<Self, Self::Error> {
        Action::try_from(&req)
    }
}

fn parse_colors(raw: &[String]) -> Result<Vec<Gem>, GameError> {
    raw.iter()
        .map(|c| Gem::parse(c).ok_or_else(|| GameError::invalid("unsupported gem color")))
        .collect()
}

fn required_card_id(raw: Option<&str>) -> Result<String, GameError> {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(GameError::invalid("cardId is required")),
    }
}

fn parse_source(raw: Option<&str>) -> Result<CardSource, GameError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() || raw.eq_ignore_ascii_case("tableau") {
        Ok(CardSource::Tableau)
    } else if raw.eq_ignore_ascii_case("reserved") {
        Ok(CardSource::Reserved)
    } else {
        Err(GameError::invalid("source must be tableau or reserved"))
    }
}
