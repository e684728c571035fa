//! Tests for `BroadcastHub` against an in-memory connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use gemhall_transport::{BroadcastHub, Connection, ConnectionId, TransportError};
use tokio::sync::Mutex;

// =========================================================================
// Mock connection
// =========================================================================

static NEXT_ID: AtomicU64 = AtomicU64::new(1000);

struct MockConn {
    id: ConnectionId,
    sent: Mutex<Vec<Vec<u8>>>,
    broken: AtomicBool,
}

impl MockConn {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            sent: Mutex::new(Vec::new()),
            broken: AtomicBool::new(false),
        })
    }

    fn break_pipe(&self) {
        self.broken.store(true, Ordering::Relaxed);
    }

    async fn received(&self) -> Vec<Vec<u8>> {
        self.sent.lock().await.clone()
    }
}

impl Connection for MockConn {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        if self.broken.load(Ordering::Relaxed) {
            return Err(TransportError::ConnectionClosed("pipe broken".into()));
        }
        self.sent.lock().await.push(data.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(None)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

// =========================================================================
// Subscription bookkeeping
// =========================================================================

#[tokio::test]
async fn test_add_is_idempotent() {
    let hub = BroadcastHub::new();
    let conn = MockConn::new();

    assert!(hub.add("QH4T2Z", Arc::clone(&conn)).await);
    assert!(!hub.add("QH4T2Z", Arc::clone(&conn)).await);
    assert_eq!(hub.subscriber_count("QH4T2Z").await, 1);

    assert_eq!(hub.broadcast("QH4T2Z", b"x").await, 1);
    assert_eq!(conn.received().await.len(), 1);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let hub = BroadcastHub::new();
    let conn = MockConn::new();
    hub.add("tiger", Arc::clone(&conn)).await;

    assert!(hub.remove("tiger", conn.id()).await);
    assert!(!hub.remove("tiger", conn.id()).await);
    assert!(!hub.remove("unknown", conn.id()).await);
    assert_eq!(hub.subscriber_count("tiger").await, 0);
}

#[tokio::test]
async fn test_remove_connection_clears_every_key() {
    let hub = BroadcastHub::new();
    let conn = MockConn::new();
    hub.add("QH4T2Z", Arc::clone(&conn)).await;
    hub.add("tiger", Arc::clone(&conn)).await;

    hub.remove_connection(conn.id()).await;

    assert_eq!(hub.subscriber_count("QH4T2Z").await, 0);
    assert_eq!(hub.subscriber_count("tiger").await, 0);
}

// =========================================================================
// Delivery
// =========================================================================

#[tokio::test]
async fn test_broadcast_reaches_only_that_key() {
    let hub = BroadcastHub::new();
    let a = MockConn::new();
    let b = MockConn::new();
    let other = MockConn::new();
    hub.add("QH4T2Z", Arc::clone(&a)).await;
    hub.add("QH4T2Z", Arc::clone(&b)).await;
    hub.add("ZZZZZZ", Arc::clone(&other)).await;

    assert_eq!(hub.broadcast("QH4T2Z", b"snapshot").await, 2);
    assert_eq!(a.received().await, vec![b"snapshot".to_vec()]);
    assert_eq!(b.received().await, vec![b"snapshot".to_vec()]);
    assert!(other.received().await.is_empty());
}

#[tokio::test]
async fn test_broadcast_to_unknown_key_delivers_nothing() {
    let hub: BroadcastHub<MockConn> = BroadcastHub::new();
    assert_eq!(hub.broadcast("nobody", b"x").await, 0);
}

#[tokio::test]
async fn test_broadcast_refs_dedups_id_and_alias_subscribers() {
    let hub = BroadcastHub::new();
    let both = MockConn::new();
    let by_alias = MockConn::new();
    hub.add("QH4T2Z", Arc::clone(&both)).await;
    hub.add("tiger", Arc::clone(&both)).await;
    hub.add("tiger", Arc::clone(&by_alias)).await;

    assert_eq!(hub.broadcast_refs(&["QH4T2Z", "tiger"], b"once").await, 2);
    assert_eq!(both.received().await.len(), 1);
    assert_eq!(by_alias.received().await.len(), 1);
}

#[tokio::test]
async fn test_failed_send_evicts_only_the_broken_connection() {
    let hub = BroadcastHub::new();
    let healthy = MockConn::new();
    let broken = MockConn::new();
    hub.add("QH4T2Z", Arc::clone(&healthy)).await;
    hub.add("QH4T2Z", Arc::clone(&broken)).await;
    hub.add("tiger", Arc::clone(&broken)).await;
    broken.break_pipe();

    assert_eq!(hub.broadcast("QH4T2Z", b"first").await, 1);
    assert_eq!(healthy.received().await.len(), 1);

    // Gone from the alias key too.
    assert_eq!(hub.subscriber_count("QH4T2Z").await, 1);
    assert_eq!(hub.subscriber_count("tiger").await, 0);

    assert_eq!(hub.broadcast("QH4T2Z", b"second").await, 1);
    assert_eq!(healthy.received().await.len(), 2);
}
