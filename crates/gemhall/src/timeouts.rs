//! Background task that passes for players whose turn timer ran out.

use std::sync::Arc;

use gemhall_protocol::Codec;
use gemhall_tick::{Clock, TickConfig, TickScheduler};
use tokio::task::JoinHandle;

use crate::SnapshotReason;
use crate::server::ServerState;

/// Spawns the sweeper. On every tick it asks the store for expired turns
/// and broadcasts a `turn_timeout` snapshot for each room that changed.
///
/// The task runs until aborted through the returned handle.
pub(crate) fn spawn_timeout_sweeper<C: Codec>(
    state: Arc<ServerState<C>>,
    config: TickConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = TickScheduler::new(config);
        loop {
            let tick = ticks.wait_for_tick().await;
            let now = state.store.clock().now();
            let updates = state.store.process_timeouts(now).await;
            if updates.is_empty() {
                continue;
            }

            tracing::debug!(
                tick = tick.tick,
                overrun = tick.overrun,
                rooms = updates.len(),
                "turns expired"
            );
            for update in updates {
                if let Err(e) = state
                    .broadcast_snapshot(&update.room, SnapshotReason::TurnTimeout)
                    .await
                {
                    tracing::warn!(
                        room_id = %update.room.id,
                        player = %update.timed_out_player,
                        error = %e,
                        "timeout broadcast failed"
                    );
                }
            }
        }
    })
}
