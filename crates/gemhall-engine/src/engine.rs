//! The rules engine.

use std::collections::BTreeMap;

use gemhall_protocol::PlayerId;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{
    Action, Card, CardSource, GameError, GameState, GameStatus, Gem, PlayerState, Seat, TokenSet,
    cards, nobles,
};

/// Most tokens a player may hold at the end of an action.
pub const HAND_LIMIT: u32 = 10;

/// Most cards a player may hold in reserve.
pub const MAX_RESERVED: usize = 3;

/// Points that trigger the final round.
pub const WINNING_POINTS: u32 = 15;

const MIN_SEATS: usize = 2;
const MAX_SEATS: usize = 4;
const TABLEAU_SIZE: usize = 4;
const GOLD_TOKENS: u32 = 5;

/// Minimum bank count for taking two tokens of one color.
const DOUBLE_TAKE_MIN_BANK: u32 = 4;

/// Action label recorded when the turn timer passes for a player.
const TIMEOUT_LABEL: &str = "timeout";

/// Authoritative state of one match.
///
/// Every mutating method validates first and commits last: when it
/// returns an error the engine is exactly as it was before the call.
#[derive(Debug, Clone)]
pub struct GameEngine {
    state: GameState,
    /// Hidden draw piles for tiers 1–3. Cards are drawn from the back.
    decks: [Vec<Card>; 3],
}

impl GameEngine {
    /// Deals a new match for the given seats using the thread-local RNG.
    ///
    /// # Errors
    /// `InvalidPlayerCount` unless there are two to four seats.
    pub fn initialize(seats: &[Seat]) -> Result<Self, GameError> {
        Self::initialize_with_rng(seats, &mut rand::rng())
    }

    /// Deals a new match with a caller-supplied RNG, so tests can seed it.
    ///
    /// # Errors
    /// `InvalidPlayerCount` unless there are two to four seats.
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        seats: &[Seat],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&seats.len()) {
            return Err(GameError::InvalidPlayerCount(seats.len()));
        }

        let mut decks: [Vec<Card>; 3] = Default::default();
        for card in cards() {
            decks[usize::from(card.tier - 1)].push(card.clone());
        }
        for deck in &mut decks {
            deck.shuffle(rng);
        }

        let mut tableaux: [Vec<Card>; 3] = Default::default();
        for (tableau, deck) in tableaux.iter_mut().zip(decks.iter_mut()) {
            let split = deck.len().saturating_sub(TABLEAU_SIZE);
            tableau.extend(deck.drain(split..).rev());
        }

        let mut available = nobles().to_vec();
        available.shuffle(rng);
        available.truncate(seats.len() + 1);

        let colored = match seats.len() {
            2 => 4,
            3 => 5,
            _ => 7,
        };

        let [tier1, tier2, tier3] = tableaux;
        let state = GameState {
            status: GameStatus::Playing,
            turn: 1,
            current_player_id: seats[0].id.clone(),
            bank: TokenSet::uniform(colored, GOLD_TOKENS),
            tier1,
            tier2,
            tier3,
            deck1_count: decks[0].len(),
            deck2_count: decks[1].len(),
            deck3_count: decks[2].len(),
            nobles: available,
            players: seats.iter().map(PlayerState::seated).collect(),
            winner_ids: Vec::new(),
            final_round: false,
            final_turns_left: 0,
        };

        tracing::debug!(players = seats.len(), "game dealt");
        Ok(Self { state, decks })
    }

    /// Returns an independent copy of the current state.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Borrows the current state without copying it.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the board, for setting up positions in tests.
    #[cfg(any(test, feature = "test-util"))]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn current_player(&self) -> &PlayerId {
        &self.state.current_player_id
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Updates a player's connectivity flag. Unknown players are ignored.
    pub fn set_connected(&mut self, player_id: &PlayerId, connected: bool) {
        if let Some(player) = self.state.players.iter_mut().find(|p| &p.id == player_id) {
            player.is_connected = connected;
        }
    }

    /// Applies one action for `player_id` and ends their turn.
    ///
    /// # Errors
    /// - `GameFinished` once the match is over
    /// - `NotPlayerTurn` if someone else is to move
    /// - `InvalidAction` with a reason when the move is illegal
    pub fn apply_action(&mut self, player_id: &PlayerId, action: Action) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        if &self.state.current_player_id != player_id {
            return Err(GameError::NotPlayerTurn);
        }
        let idx = self.player_index(player_id).ok_or(GameError::NotPlayerTurn)?;

        match &action {
            Action::TakeTokens(colors) => self.take_tokens(idx, colors)?,
            Action::ReserveCard { card_id } => self.reserve_card(idx, card_id)?,
            Action::BuyCard { card_id, source } => self.buy_card(idx, card_id, *source)?,
            Action::Pass => {}
            Action::DiscardTokens(colors) => self.discard_tokens(idx, colors)?,
            Action::AdjustTokens(deltas) => self.adjust_tokens(idx, deltas)?,
        }

        self.end_turn(idx, action.name());
        Ok(())
    }

    /// Passes on behalf of the current player because their turn timer ran
    /// out. Returns the player who lost the turn.
    ///
    /// # Errors
    /// `GameFinished` once the match is over.
    pub fn force_pass(&mut self) -> Result<PlayerId, GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        let player_id = self.state.current_player_id.clone();
        let idx = self.player_index(&player_id).ok_or(GameError::NotPlayerTurn)?;
        self.end_turn(idx, TIMEOUT_LABEL);
        Ok(player_id)
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn take_tokens(&mut self, idx: usize, colors: &[Gem]) -> Result<(), GameError> {
        if colors.is_empty() {
            return Err(GameError::invalid("colors is required"));
        }
        if colors.iter().any(|gem| !gem.is_colored()) {
            return Err(GameError::invalid("gold cannot be taken"));
        }

        let mut bank = self.state.bank;
        let mut hand = self.state.players[idx].tokens;

        if hand.total() + colors.len() as u32 > HAND_LIMIT {
            return Err(GameError::invalid("token limit exceeded"));
        }

        if colors.len() == 2 && colors[0] == colors[1] {
            if bank.get(colors[0]) < DOUBLE_TAKE_MIN_BANK {
                return Err(GameError::invalid("bank needs at least 4 of the same color"));
            }
        } else {
            if colors.len() > 3 {
                return Err(GameError::invalid("take must be 3 different or 2 same"));
            }
            let mut seen = Vec::with_capacity(colors.len());
            for &gem in colors {
                if seen.contains(&gem) {
                    return Err(GameError::invalid("colors must be unique"));
                }
                seen.push(gem);
            }
        }

        for &gem in colors {
            if !bank.try_remove(gem, 1) {
                return Err(GameError::invalid(format!("bank has no token for color {gem}")));
            }
            hand.add(gem, 1);
        }

        self.state.bank = bank;
        self.state.players[idx].tokens = hand;
        Ok(())
    }

    fn reserve_card(&mut self, idx: usize, card_id: &str) -> Result<(), GameError> {
        if self.state.players[idx].reserved.len() >= MAX_RESERVED {
            return Err(GameError::invalid("reserved card limit is 3"));
        }
        let (tier, pos) = self
            .locate_on_tableau(card_id)
            .ok_or_else(|| GameError::invalid("card not found in tableau"))?;

        let card = self.take_from_tableau(tier, pos);
        let grant_gold =
            self.state.bank.gold > 0 && self.state.players[idx].tokens.total() < HAND_LIMIT;

        let player = &mut self.state.players[idx];
        player.reserved.push(card);
        if grant_gold && self.state.bank.try_remove(Gem::Gold, 1) {
            player.tokens.add(Gem::Gold, 1);
        }
        Ok(())
    }

    fn buy_card(&mut self, idx: usize, card_id: &str, source: CardSource) -> Result<(), GameError> {
        let location = match source {
            CardSource::Tableau => self
                .locate_on_tableau(card_id)
                .ok_or_else(|| GameError::invalid("card not found in tableau"))?,
            CardSource::Reserved => {
                let pos = self.state.players[idx]
                    .reserved
                    .iter()
                    .position(|c| c.id == card_id)
                    .ok_or_else(|| GameError::invalid("card not found in reserved"))?;
                (0, pos)
            }
        };

        let player = &self.state.players[idx];
        let cost = match source {
            CardSource::Tableau => self.state.tableau(location.0)[location.1].cost,
            CardSource::Reserved => player.reserved[location.1].cost,
        };
        let payment = payment_for(&cost, &player.bonuses, &player.tokens)
            .ok_or_else(|| GameError::invalid("not enough tokens to buy card"))?;

        let mut bank = self.state.bank;
        let mut hand = player.tokens;
        for (gem, n) in payment.iter() {
            if !hand.try_remove(gem, n) {
                return Err(GameError::invalid("not enough tokens to buy card"));
            }
            bank.add(gem, n);
        }

        // Nothing below can fail: the card leaves the board only once the
        // payment has been taken from copies.
        let card = match source {
            CardSource::Tableau => self.take_from_tableau(location.0, location.1),
            CardSource::Reserved => self.state.players[idx].reserved.remove(location.1),
        };

        self.state.bank = bank;
        let player = &mut self.state.players[idx];
        player.tokens = hand;
        player.purchased_count += 1;
        player.points += card.points;
        player.bonuses.add(card.bonus, 1);

        self.claim_noble(idx);
        Ok(())
    }

    fn discard_tokens(&mut self, idx: usize, colors: &[Gem]) -> Result<(), GameError> {
        if colors.is_empty() {
            return Err(GameError::invalid("colors is required"));
        }

        let mut bank = self.state.bank;
        let mut hand = self.state.players[idx].tokens;
        for &gem in colors {
            if !hand.try_remove(gem, 1) {
                return Err(GameError::invalid(format!("no {gem} token to discard")));
            }
            bank.add(gem, 1);
        }

        self.state.bank = bank;
        self.state.players[idx].tokens = hand;
        Ok(())
    }

    fn adjust_tokens(&mut self, idx: usize, deltas: &BTreeMap<Gem, i32>) -> Result<(), GameError> {
        if deltas.values().all(|&d| d == 0) {
            return Err(GameError::invalid("adjust is required"));
        }
        if deltas.get(&Gem::Gold).is_some_and(|&d| d > 0) {
            return Err(GameError::invalid("gold can only be gained by reserving"));
        }

        let mut bank = self.state.bank;
        let mut hand = self.state.players[idx].tokens;
        for (&gem, &delta) in deltas {
            let n = delta.unsigned_abs();
            if delta > 0 {
                if !bank.try_remove(gem, n) {
                    return Err(GameError::invalid(format!("bank has not enough {gem} tokens")));
                }
                hand.add(gem, n);
            } else if delta < 0 {
                if !hand.try_remove(gem, n) {
                    return Err(GameError::invalid(format!("not enough {gem} tokens to return")));
                }
                bank.add(gem, n);
            }
        }
        if hand.total() > HAND_LIMIT {
            return Err(GameError::invalid("token limit exceeded"));
        }

        self.state.bank = bank;
        self.state.players[idx].tokens = hand;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Board helpers
    // -----------------------------------------------------------------------

    fn player_index(&self, player_id: &PlayerId) -> Option<usize> {
        self.state.players.iter().position(|p| &p.id == player_id)
    }

    fn locate_on_tableau(&self, card_id: &str) -> Option<(u8, usize)> {
        (1..=3).find_map(|tier| {
            self.state
                .tableau(tier)
                .iter()
                .position(|c| c.id == card_id)
                .map(|pos| (tier, pos))
        })
    }

    /// Removes a face-up card and refills its slot from the same tier's
    /// deck while the deck lasts.
    fn take_from_tableau(&mut self, tier: u8, pos: usize) -> Card {
        let (tableau, deck, count) = match tier {
            1 => (&mut self.state.tier1, &mut self.decks[0], &mut self.state.deck1_count),
            2 => (&mut self.state.tier2, &mut self.decks[1], &mut self.state.deck2_count),
            _ => (&mut self.state.tier3, &mut self.decks[2], &mut self.state.deck3_count),
        };
        let card = tableau.remove(pos);
        if let Some(next) = deck.pop() {
            tableau.insert(pos, next);
        }
        *count = deck.len();
        card
    }

    /// Grants the first available noble the player now qualifies for. At
    /// most one per call.
    fn claim_noble(&mut self, idx: usize) {
        let bonuses = self.state.players[idx].bonuses;
        if let Some(pos) = self
            .state
            .nobles
            .iter()
            .position(|n| bonuses.covers(&n.requirement))
        {
            let noble = self.state.nobles.remove(pos);
            let player = &mut self.state.players[idx];
            player.points += noble.points;
            tracing::debug!(player_id = %player.id, noble = %noble.id, "noble claimed");
            player.nobles.push(noble);
        }
    }

    // -----------------------------------------------------------------------
    // Turn flow
    // -----------------------------------------------------------------------

    fn end_turn(&mut self, idx: usize, label: &str) {
        let player_count = self.state.players.len();
        let player = &mut self.state.players[idx];
        player.last_action = label.to_string();

        if !self.state.final_round && player.points >= WINNING_POINTS {
            self.state.final_round = true;
            self.state.final_turns_left = (player_count - 1) as u32;
            tracing::debug!(player_id = %player.id, "final round triggered");
        } else if self.state.final_round {
            self.state.final_turns_left = self.state.final_turns_left.saturating_sub(1);
            if self.state.final_turns_left == 0 {
                self.finish();
                return;
            }
        }

        let next = (idx + 1) % player_count;
        self.state.current_player_id = self.state.players[next].id.clone();
        self.state.turn += 1;
    }

    fn finish(&mut self) {
        self.state.status = GameStatus::Finished;
        self.state.winner_ids = winners(&self.state.players);
        tracing::debug!(winners = ?self.state.winner_ids, "game finished");
    }
}

/// Tokens needed to buy a card with the given cost. Colored tokens are used
/// first; gold covers whatever is still short. `None` if gold runs out.
fn payment_for(cost: &TokenSet, bonuses: &TokenSet, tokens: &TokenSet) -> Option<TokenSet> {
    let mut payment = TokenSet::default();
    let mut gold_needed = 0;
    for gem in Gem::COLORED {
        let need = cost.get(gem).saturating_sub(bonuses.get(gem));
        let colored = need.min(tokens.get(gem));
        payment.add(gem, colored);
        gold_needed += need - colored;
    }
    if gold_needed > tokens.gold {
        return None;
    }
    payment.gold = gold_needed;
    Some(payment)
}

/// Highest score wins; ties go to whoever bought fewer cards; remaining
/// ties share the win.
fn winners(players: &[PlayerState]) -> Vec<PlayerId> {
    let Some(top) = players.iter().map(|p| p.points).max() else {
        return Vec::new();
    };
    let leaders: Vec<&PlayerState> = players.iter().filter(|p| p.points == top).collect();
    let fewest = leaders.iter().map(|p| p.purchased_count).min().unwrap_or(0);
    leaders
        .into_iter()
        .filter(|p| p.purchased_count == fewest)
        .map(|p| p.id.clone())
        .collect()
}

// =========================================================================
// Tests
// =========================================================================
