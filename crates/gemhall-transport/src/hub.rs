//! Room-keyed fan-out of outbound messages.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::RwLock;

use crate::{Connection, ConnectionId};

/// Tracks which connections watch which room and delivers messages to them.
///
/// A room is usually reachable under two keys, its id and its alias, and a
/// connection may subscribe under either. Sends happen outside the
/// subscriber lock and run concurrently; a connection whose send fails is
/// dropped from every key it was subscribed under.
pub struct BroadcastHub<C> {
    subscribers: RwLock<HashMap<String, HashMap<ConnectionId, Arc<C>>>>,
}

impl<C: Connection> BroadcastHub<C> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes `conn` to `key`. Returns `false` if it already was.
    pub async fn add(&self, key: &str, conn: Arc<C>) -> bool {
        let mut subs = self.subscribers.write().await;
        subs.entry(key.to_string())
            .or_default()
            .insert(conn.id(), conn)
            .is_none()
    }

    /// Unsubscribes a connection from one key. Returns `false` if it was not
    /// subscribed.
    pub async fn remove(&self, key: &str, id: ConnectionId) -> bool {
        let mut subs = self.subscribers.write().await;
        let Some(conns) = subs.get_mut(key) else {
            return false;
        };
        let removed = conns.remove(&id).is_some();
        if conns.is_empty() {
            subs.remove(key);
        }
        removed
    }

    /// Unsubscribes a connection from every key.
    pub async fn remove_connection(&self, id: ConnectionId) {
        let mut subs = self.subscribers.write().await;
        evict(&mut subs, &HashSet::from([id]));
    }

    /// Number of connections subscribed under `key`.
    pub async fn subscriber_count(&self, key: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(key)
            .map_or(0, HashMap::len)
    }

    /// Sends `data` to every subscriber of `key`. Returns how many sends
    /// succeeded.
    pub async fn broadcast(&self, key: &str, data: &[u8]) -> usize {
        self.broadcast_refs(&[key], data).await
    }

    /// Sends `data` once to every connection subscribed under any of `keys`.
    /// Returns how many sends succeeded.
    pub async fn broadcast_refs(&self, keys: &[&str], data: &[u8]) -> usize {
        let targets: Vec<Arc<C>> = {
            let subs = self.subscribers.read().await;
            let mut seen = HashMap::new();
            for conns in keys.iter().filter_map(|k| subs.get(*k)) {
                for (id, conn) in conns {
                    seen.entry(*id).or_insert_with(|| Arc::clone(conn));
                }
            }
            seen.into_values().collect()
        };
        if targets.is_empty() {
            return 0;
        }

        let results = join_all(targets.iter().map(|conn| async move {
            match conn.send(data).await {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(conn_id = %conn.id(), error = %err, "broadcast send failed");
                    Some(conn.id())
                }
            }
        }))
        .await;

        let failed: HashSet<ConnectionId> = results.into_iter().flatten().collect();
        if !failed.is_empty() {
            let mut subs = self.subscribers.write().await;
            evict(&mut subs, &failed);
        }
        targets.len() - failed.len()
    }
}

impl<C: Connection> Default for BroadcastHub<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn evict<C>(
    subs: &mut HashMap<String, HashMap<ConnectionId, Arc<C>>>,
    ids: &HashSet<ConnectionId>,
) {
    subs.retain(|_, conns| {
        conns.retain(|id, _| !ids.contains(id));
        !conns.is_empty()
    });
}
