//! The room registry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gemhall_engine::{Action, GameEngine, Seat};
use gemhall_protocol::{ActionRequest, PlayerId, RoomCode, RoomId};
use gemhall_tick::{Clock, SystemClock};
use tokio::sync::RwLock;

use crate::codes::{self, PLAYER_ID_LEN, ROOM_ID_LEN};
use crate::room::RoomEntry;
use crate::{Room, RoomConfig, RoomError, RoomStatus, TimeoutUpdate};

type RoomHandle = Arc<RwLock<RoomEntry>>;

#[derive(Default)]
struct Index {
    rooms: HashMap<RoomId, RoomHandle>,
    codes: HashMap<RoomCode, RoomId>,
}

/// Creates rooms and routes every room-level operation.
///
/// The index lock is write-locked only while inserting a room. Every other
/// operation clones the room's handle, drops the index lock, and then locks
/// just that room, so two rooms never wait on each other.
///
/// Rooms are never removed.
pub struct RoomStore {
    config: RoomConfig,
    clock: Arc<dyn Clock>,
    index: RwLock<Index>,
}

impl RoomStore {
    /// Creates an empty store on the system clock.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    pub fn with_clock(config: RoomConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            index: RwLock::new(Index::default()),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// The clock deadlines are measured against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Number of rooms ever created.
    pub async fn room_count(&self) -> usize {
        self.index.read().await.rooms.len()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Opens a new room with `host_name` in the first seat.
    ///
    /// # Errors
    /// `InvalidPlayerName` for a blank name, `InvalidTurnSeconds` for a
    /// timer outside the configured bounds.
    pub async fn create_room(
        &self,
        host_name: &str,
        turn_seconds: Option<u32>,
    ) -> Result<(Room, Seat), RoomError> {
        let host_name = valid_name(host_name)?;
        let turn_seconds = self.config.resolve_turn_seconds(turn_seconds)?;
        let host = Seat::new(codes::random_code(PLAYER_ID_LEN), host_name);

        let mut index = self.index.write().await;
        let id = RoomId::new(codes::unique_code(ROOM_ID_LEN, |c| {
            index.rooms.contains_key(&RoomId::new(c))
        }));
        let code = RoomCode::new(codes::mnemonic_alias(|c| {
            index.codes.contains_key(&RoomCode::new(c))
        }));

        let entry = RoomEntry::new(
            id.clone(),
            code.clone(),
            host.clone(),
            turn_seconds,
            self.clock.now(),
        );
        let room = entry.snapshot();
        index.codes.insert(code.clone(), id.clone());
        index.rooms.insert(id.clone(), Arc::new(RwLock::new(entry)));
        drop(index);

        tracing::info!(room_id = %id, %code, host = %host.id, turn_seconds, "room created");
        Ok((room, host))
    }

    /// Seats a new player in a waiting room.
    ///
    /// # Errors
    /// `RoomNotFound`, `GameAlreadyStarted`, `PlayerDuplicate`, `RoomFull`,
    /// `InvalidPlayerName`, checked in that order.
    pub async fn join_room(
        &self,
        room_ref: &str,
        player_name: &str,
    ) -> Result<(Room, Seat), RoomError> {
        let handle = self.resolve(room_ref).await?;
        let mut entry = handle.write().await;

        if !entry.status.is_joinable() {
            return Err(RoomError::GameAlreadyStarted);
        }
        if entry.has_name(player_name) {
            return Err(RoomError::PlayerDuplicate);
        }
        if entry.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull);
        }
        let name = valid_name(player_name)?;

        let id = codes::unique_code(PLAYER_ID_LEN, |c| entry.has_player(&PlayerId::new(c)));
        let seat = Seat::new(id, name);
        entry.players.push(seat.clone());

        tracing::info!(
            room_id = %entry.id,
            player = %seat.id,
            players = entry.players.len(),
            "player joined"
        );
        Ok((entry.snapshot(), seat))
    }

    /// Deals a game for the current roster. Only the host may do this.
    ///
    /// # Errors
    /// `RoomNotFound`; `InvalidStartState` unless the room is waiting;
    /// `OnlyHostCanStart`; `InvalidStartState` with too few players.
    pub async fn start_game(&self, room_ref: &str, player_id: &PlayerId) -> Result<Room, RoomError> {
        let handle = self.resolve(room_ref).await?;
        let mut entry = handle.write().await;

        if !entry.status.can_transition_to(RoomStatus::Playing) {
            return Err(RoomError::InvalidStartState);
        }
        if &entry.host_id != player_id {
            return Err(RoomError::OnlyHostCanStart);
        }
        if entry.players.len() < self.config.min_players {
            return Err(RoomError::InvalidStartState);
        }

        let engine = GameEngine::initialize(&entry.players)?;
        let now = self.clock.now();
        entry.engine = Some(engine);
        entry.status = RoomStatus::Playing;
        entry.started_at = Some(now);
        entry.turn_deadline = Some(entry.deadline_from(now));

        tracing::info!(room_id = %entry.id, players = entry.players.len(), "game started");
        Ok(entry.snapshot())
    }

    // -----------------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------------

    /// Applies a player's action to the room's game.
    ///
    /// The request is interpreted only after the room checks pass, so a
    /// malformed action against a room with no game still reports
    /// `GameNotStarted`.
    ///
    /// # Errors
    /// `RoomNotFound`, `GameNotStarted`, `PlayerNotFound`, then any engine
    /// refusal as `RoomError::Game`.
    pub async fn apply_action(
        &self,
        room_ref: &str,
        player_id: &PlayerId,
        request: &ActionRequest,
    ) -> Result<Room, RoomError> {
        let handle = self.resolve(room_ref).await?;
        let mut entry = handle.write().await;

        if entry.engine.is_none() {
            return Err(RoomError::GameNotStarted);
        }
        if !entry.has_player(player_id) {
            return Err(RoomError::PlayerNotFound);
        }
        let action = Action::try_from(request)?;
        let label = action.name();

        let Some(engine) = entry.engine.as_mut() else {
            return Err(RoomError::GameNotStarted);
        };
        if let Err(err) = engine.apply_action(player_id, action) {
            tracing::debug!(room_id = %entry.id, player = %player_id, %err, "action rejected");
            return Err(err.into());
        }

        entry.after_turn(self.clock.now());
        tracing::debug!(room_id = %entry.id, player = %player_id, action = label, "action applied");
        Ok(entry.snapshot())
    }

    /// Records whether a player has a live connection.
    ///
    /// Before the game starts there is nothing to update, but the room's
    /// snapshot is still returned.
    ///
    /// # Errors
    /// `RoomNotFound`.
    pub async fn set_connected(
        &self,
        room_ref: &str,
        player_id: &PlayerId,
        connected: bool,
    ) -> Result<Room, RoomError> {
        let handle = self.resolve(room_ref).await?;
        let mut entry = handle.write().await;
        if let Some(engine) = entry.engine.as_mut() {
            engine.set_connected(player_id, connected);
        }
        Ok(entry.snapshot())
    }

    /// Reads a room without changing it.
    ///
    /// # Errors
    /// `RoomNotFound`.
    pub async fn get_room(&self, room_ref: &str) -> Result<Room, RoomError> {
        let handle = self.resolve(room_ref).await?;
        let entry = handle.read().await;
        Ok(entry.snapshot())
    }

    // -----------------------------------------------------------------------
    // Turn timer
    // -----------------------------------------------------------------------

    /// Passes for the current player in every room whose turn deadline is
    /// at or before `now`.
    ///
    /// Returns one update per room that changed. Rooms are locked one at a
    /// time, never while holding the index. Each room is checked under its
    /// read lock; only expired rooms are write-locked, and re-checked there
    /// since a player may have moved in between.
    pub async fn process_timeouts(&self, now: DateTime<Utc>) -> Vec<TimeoutUpdate> {
        let handles = self.room_handles().await;
        let mut updates = Vec::new();

        for handle in handles {
            if !handle.read().await.turn_expired(now) {
                continue;
            }
            let mut entry = handle.write().await;
            if !entry.turn_expired(now) {
                continue;
            }
            let Some(engine) = entry.engine.as_mut() else {
                continue;
            };
            match engine.force_pass() {
                Ok(timed_out_player) => {
                    entry.after_turn(now);
                    tracing::info!(
                        room_id = %entry.id,
                        player = %timed_out_player,
                        "turn timed out"
                    );
                    updates.push(TimeoutUpdate {
                        room: entry.snapshot(),
                        timed_out_player,
                    });
                }
                Err(err) => {
                    tracing::warn!(room_id = %entry.id, %err, "timeout pass refused");
                }
            }
        }
        updates
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Finds a room by exact id, then by alias (any case), then by the
    /// uppercased id. Aliases win over the case-folded id so a room whose id
    /// spells another room's alias never shadows it.
    async fn resolve(&self, room_ref: &str) -> Result<RoomHandle, RoomError> {
        let room_ref = room_ref.trim();
        if room_ref.is_empty() {
            return Err(RoomError::RoomNotFound);
        }

        let index = self.index.read().await;
        let handle = index
            .rooms
            .get(&RoomId::new(room_ref))
            .or_else(|| {
                index
                    .codes
                    .get(&RoomCode::new(room_ref))
                    .and_then(|id| index.rooms.get(id))
            })
            .or_else(|| index.rooms.get(&RoomId::new(room_ref.to_uppercase())))
            .ok_or(RoomError::RoomNotFound)?;
        Ok(Arc::clone(handle))
    }

    /// Clones every room handle so callers can work without the index lock.
    async fn room_handles(&self) -> Vec<RoomHandle> {
        self.index.read().await.rooms.values().cloned().collect()
    }
}

fn valid_name(name: &str) -> Result<&str, RoomError> {
    let name = name.trim();
    if name.is_empty() {
        Err(RoomError::InvalidPlayerName)
    } else {
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeDelta;
    use gemhall_engine::GameError;
    use gemhall_tick::ManualClock;

    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_000)
    }

    fn pass() -> ActionRequest {
        ActionRequest::new("pass")
    }

    /// A started two-player room. Returns the store, clock, room and both seats.
    async fn started_room() -> (RoomStore, Arc<ManualClock>, Room, Seat, Seat) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = RoomStore::with_clock(RoomConfig::default(), clock.clone());
        let (room, host) = store.create_room("Alice", None).await.unwrap();
        let (_, guest) = store.join_room(room.id.as_str(), "Bob").await.unwrap();
        let room = store.start_game(room.id.as_str(), &host.id).await.unwrap();
        (store, clock, room, host, guest)
    }

    async fn set_points(store: &RoomStore, room: &Room, player: &PlayerId, points: u32) {
        let handle = store.resolve(room.id.as_str()).await.unwrap();
        let mut entry = handle.write().await;
        let engine = entry.engine.as_mut().unwrap();
        let seat = engine
            .state_mut()
            .players
            .iter_mut()
            .find(|p| &p.id == player)
            .unwrap();
        seat.points = points;
    }

    /// Inserts a bare waiting room under a chosen id and alias.
    async fn insert_room(store: &RoomStore, id: &str, code: &str) {
        let entry = RoomEntry::new(
            RoomId::new(id),
            RoomCode::new(code),
            Seat::new("HOSTHOST", "Host"),
            30,
            start(),
        );
        let mut index = store.index.write().await;
        index.codes.insert(RoomCode::new(code), RoomId::new(id));
        index
            .rooms
            .insert(RoomId::new(id), Arc::new(RwLock::new(entry)));
    }

    // =====================================================================
    // Game end
    // =====================================================================

    #[tokio::test]
    async fn test_apply_action_finishing_game_closes_room() {
        let (store, clock, room, host, guest) = started_room().await;
        set_points(&store, &room, &host.id, 15).await;

        // Host reaches the threshold; the guest gets one last turn.
        let after_host = store.apply_action(room.id.as_str(), &host.id, &pass()).await.unwrap();
        assert_eq!(after_host.status, RoomStatus::Playing);
        assert!(after_host.game.as_ref().unwrap().final_round);

        clock.advance(TimeDelta::seconds(5));
        let finished = store.apply_action(room.id.as_str(), &guest.id, &pass()).await.unwrap();
        assert_eq!(finished.status, RoomStatus::Finished);
        assert_eq!(finished.finished_at, Some(start() + TimeDelta::seconds(5)));
        assert_eq!(finished.turn_deadline, None);
        assert_eq!(finished.game.as_ref().unwrap().winner_ids, vec![host.id.clone()]);

        let err = store.apply_action(room.id.as_str(), &host.id, &pass()).await.unwrap_err();
        assert_eq!(err, RoomError::Game(GameError::GameFinished));

        // A finished room is never swept.
        clock.advance(TimeDelta::hours(1));
        assert!(store.process_timeouts(clock.now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_ending_final_round_closes_room() {
        let (store, clock, room, host, guest) = started_room().await;
        set_points(&store, &room, &host.id, 15).await;
        store.apply_action(room.id.as_str(), &host.id, &pass()).await.unwrap();

        clock.advance(TimeDelta::seconds(31));
        let updates = store.process_timeouts(clock.now()).await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].timed_out_player, guest.id);

        let closed = &updates[0].room;
        assert_eq!(closed.status, RoomStatus::Finished);
        assert_eq!(closed.finished_at, Some(clock.now()));
        assert_eq!(closed.turn_deadline, None);
        assert_eq!(closed.game.as_ref().unwrap().winner_ids, vec![host.id.clone()]);

        let stored = store.get_room(room.code.as_str()).await.unwrap();
        assert_eq!(stored.status, RoomStatus::Finished);
    }

    // =====================================================================
    // Resolution
    // =====================================================================

    #[tokio::test]
    async fn test_alias_is_not_shadowed_by_id_spelling_it() {
        let store = RoomStore::new(RoomConfig::default());
        insert_room(&store, "K7M2QX", "garden").await;
        insert_room(&store, "GARDEN", "tiger").await;

        for alias in ["garden", "Garden", " GARDEN "] {
            let room = store.get_room(alias).await.unwrap();
            let expected = if alias.trim() == "GARDEN" { "GARDEN" } else { "K7M2QX" };
            assert_eq!(room.id.as_str(), expected, "lookup of {alias:?}");
        }
        assert_eq!(store.get_room("tiger").await.unwrap().id.as_str(), "GARDEN");
    }

    #[tokio::test]
    async fn test_lowercased_id_falls_back_to_id_lookup() {
        let store = RoomStore::new(RoomConfig::default());
        insert_room(&store, "K7M2QX", "garden").await;
        assert_eq!(store.get_room("k7m2qx").await.unwrap().id.as_str(), "K7M2QX");
    }

    // =====================================================================
    // Sweep locking
    // =====================================================================

    #[tokio::test]
    async fn test_sweep_does_not_wait_on_idle_room_readers() {
        let (store, clock, room, _, _) = started_room().await;
        insert_room(&store, "K7M2QX", "garden").await;

        // Someone is reading the waiting room for the whole sweep.
        let idle = store.resolve("K7M2QX").await.unwrap();
        let _reader = idle.read().await;

        clock.advance(TimeDelta::seconds(31));
        let updates = tokio::time::timeout(
            Duration::from_secs(1),
            store.process_timeouts(clock.now()),
        )
        .await
        .expect("sweep should not block on a read-locked idle room");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].room.id, room.id);
    }
}
