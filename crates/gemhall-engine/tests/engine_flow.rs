//! Integration tests driving the engine through its public API only, the
//! way the room store does: wire requests in, snapshots out.

use gemhall_engine::{Action, GameEngine, GameError, GameStatus, Seat, TokenSet};
use gemhall_protocol::{ActionRequest, PlayerId};

// =========================================================================
// Helpers
// =========================================================================

fn two_player_game() -> GameEngine {
    GameEngine::initialize(&[Seat::new("p1", "Alice"), Seat::new("p2", "Bob")])
        .expect("two seats are valid")
}

fn act(engine: &mut GameEngine, player: &str, req: ActionRequest) -> Result<(), GameError> {
    let action = Action::try_from(req)?;
    engine.apply_action(&PlayerId::new(player), action)
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_first_take_moves_tokens_and_turn() {
    let mut engine = two_player_game();

    act(
        &mut engine,
        "p1",
        ActionRequest::new("take_tokens").with_colors(["white", "blue", "green"]),
    )
    .unwrap();

    let state = engine.snapshot();
    assert_eq!(state.players[0].tokens, TokenSet::colored([1, 1, 1, 0, 0]));
    assert_eq!((state.bank.white, state.bank.blue, state.bank.green), (3, 3, 3));
    assert_eq!(state.current_player_id, PlayerId::new("p2"));
    assert_eq!(state.turn, 2);
}

#[test]
fn test_out_of_turn_action_leaves_state_untouched() {
    let mut engine = two_player_game();
    let before = engine.snapshot();

    let err = act(
        &mut engine,
        "p2",
        ActionRequest::new("take_tokens").with_colors(["red"]),
    )
    .unwrap_err();

    assert_eq!(err, GameError::NotPlayerTurn);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_unknown_action_is_rejected_before_the_engine() {
    let mut engine = two_player_game();
    let err = act(&mut engine, "p1", ActionRequest::new("flip_table")).unwrap_err();
    assert!(matches!(err, GameError::UnknownAction(kind) if kind == "flip_table"));
    assert_eq!(engine.snapshot().turn, 1);
}

#[test]
fn test_reserve_then_buy_reserved_over_wire_names() {
    let mut engine = two_player_game();
    let card = engine.snapshot().tier1[0].clone();

    act(&mut engine, "p1", ActionRequest::new("reserve_card").with_card(&card.id)).unwrap();
    act(&mut engine, "p2", ActionRequest::new("pass")).unwrap();

    let state = engine.snapshot();
    assert_eq!(state.players[0].reserved[0].id, card.id);
    assert_eq!(state.players[0].tokens.gold, 1);
    assert_eq!(state.players[1].last_action, "pass");
}

#[test]
fn test_timeouts_alone_never_finish_a_game() {
    let mut engine = two_player_game();
    for _ in 0..20 {
        engine.force_pass().unwrap();
    }
    let state = engine.snapshot();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.turn, 21);
    assert!(state.players.iter().all(|p| p.last_action == "timeout"));
}

#[test]
fn test_snapshot_serializes_with_camel_case_keys() {
    let engine = two_player_game();
    let json = serde_json::to_value(engine.snapshot()).unwrap();

    assert_eq!(json["status"], "playing");
    assert_eq!(json["currentPlayerId"], "p1");
    assert_eq!(json["deck1Count"], 36);
    assert_eq!(json["tier3"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["players"][0]["isConnected"], true);
    assert_eq!(json["players"][0]["purchasedCount"], 0);
    assert!(json["winnerIds"].as_array().is_some_and(Vec::is_empty));
    assert_eq!(json["finalRound"], false);
}
