//! `GemhallServer` builder and accept loop.
//!
//! Ties the layers together: WebSocket transport → JSON messages → room
//! store, with the hub carrying snapshots back out and the sweeper
//! expiring turns in the background.

use std::sync::Arc;
use std::time::Duration;

use gemhall_protocol::{Codec, JsonCodec};
use gemhall_room::{Room, RoomConfig, RoomStore};
use gemhall_tick::{Clock, SystemClock, TickConfig};
use gemhall_transport::{BroadcastHub, Transport, WebSocketConnection, WebSocketTransport};

use crate::handler::handle_connection;
use crate::timeouts::spawn_timeout_sweeper;
use crate::{GemhallError, ServerMessage, SnapshotReason};

/// Default time a connection may go without sending any frame, pongs
/// included, before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection task and the sweeper.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) store: Arc<RoomStore>,
    pub(crate) hub: BroadcastHub<WebSocketConnection>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

impl<C: Codec> ServerState<C> {
    /// Pings go out twice per idle window, so a live peer always answers
    /// before it would be dropped.
    pub(crate) fn heartbeat_interval(&self) -> Duration {
        (self.idle_timeout / 2).max(Duration::from_millis(10))
    }

    /// Sends a snapshot to everyone watching the room under its id or its
    /// alias. Returns the number of connections reached.
    pub(crate) async fn broadcast_snapshot(
        &self,
        room: &Room,
        reason: SnapshotReason,
    ) -> Result<usize, GemhallError> {
        let bytes = self.codec.encode(&ServerMessage::RoomSnapshot {
            reason,
            room: room.clone(),
        })?;
        let delivered = self
            .hub
            .broadcast_refs(&[room.id.as_str(), room.code.as_str()], &bytes)
            .await;
        tracing::debug!(room_id = %room.id, ?reason, delivered, "snapshot broadcast");
        Ok(delivered)
    }
}

/// Builder for configuring and starting a Gemhall server.
///
/// # Example
///
/// ```rust,ignore
/// use gemhall::prelude::*;
///
/// let server = GemhallServer::builder()
///     .bind("0.0.0.0:8080")
///     .sweep_interval(Duration::from_millis(500))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GemhallServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
    tick_config: TickConfig,
    clock: Arc<dyn Clock>,
}

impl GemhallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            tick_config: TickConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// How long a connection may go without sending anything, pongs to the
    /// server's heartbeat pings included. Clients that only listen stay
    /// attached as long as their WebSocket stack answers pings.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// How often expired turns are looked for.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.tick_config.interval = interval;
        self
    }

    /// Replaces the wall clock turn deadlines are measured against.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<GemhallServer<JsonCodec>, GemhallError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            store: Arc::new(RoomStore::with_clock(self.room_config, self.clock)),
            hub: BroadcastHub::new(),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(GemhallServer {
            transport,
            state,
            tick_config: self.tick_config,
        })
    }
}

impl Default for GemhallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Gemhall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GemhallServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    tick_config: TickConfig,
}

impl GemhallServer<JsonCodec> {
    pub fn builder() -> GemhallServerBuilder {
        GemhallServerBuilder::new()
    }
}

impl<C: Codec> GemhallServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The room store behind this server.
    pub fn rooms(&self) -> Arc<RoomStore> {
        Arc::clone(&self.state.store)
    }

    /// Starts the turn-timeout sweeper, then accepts connections and
    /// spawns a handler task for each. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), GemhallError> {
        let _sweeper = spawn_timeout_sweeper(Arc::clone(&self.state), self.tick_config.clone());
        tracing::info!(addr = ?self.local_addr().ok(), "Gemhall server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
