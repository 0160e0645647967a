//! Socket Registry
//!
//! Process-wide directory of connected sockets, shared as an
//! `Arc<SocketRegistry>` by everything that needs it. The `DashMap` lets
//! lookups, inserts and removes run while a sweep is in progress; each
//! socket's own lock keeps its state consistent.
//!
//! Sweeps (`clear_all`/`flush_all`) are fire-and-forget: they run over a
//! snapshot of the registry taken when they start, so sockets added later may
//! or may not be visited. No ordering holds between two sweeps.

use crate::error::{LiveError, Result};
use crate::socket::Socket;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, error, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata_commons::{ConnectionId, LiveQueryId};

pub struct SocketRegistry {
    sockets: DashMap<ConnectionId, Arc<Socket>>,
    total_connections: AtomicUsize,
    max_connections: usize,
}

impl SocketRegistry {
    pub fn new(max_connections: usize) -> Self {
        Self {
            sockets: DashMap::new(),
            total_connections: AtomicUsize::new(0),
            max_connections,
        }
    }

    /// Add a newly accepted connection.
    ///
    /// Fails when the connection id is already present or when
    /// `max_connections` is reached.
    pub fn register(&self, socket: Arc<Socket>) -> Result<()> {
        // DoS protection: reserve a slot before inserting so concurrent
        // registrations never overshoot max_connections
        let max = self.max_connections;
        if self
            .total_connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .is_err()
        {
            warn!(
                "Rejecting connection {}: max connections ({}) reached",
                socket.connection_id(),
                max
            );
            return Err(LiveError::LimitExceeded(format!(
                "max connections ({}) reached",
                max
            )));
        }

        match self.sockets.entry(socket.connection_id().clone()) {
            Entry::Occupied(entry) => {
                self.total_connections.fetch_sub(1, Ordering::AcqRel);
                warn!("Rejecting duplicate connection {}", entry.key());
                Err(LiveError::DuplicateConnection(entry.key().to_string()))
            }
            Entry::Vacant(entry) => {
                debug!("Registered connection {}", entry.key());
                entry.insert(socket);
                Ok(())
            }
        }
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<Arc<Socket>> {
        self.sockets
            .get(connection_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<Socket>> {
        let removed = self.sockets.remove(connection_id).map(|(_, socket)| socket);
        if removed.is_some() {
            self.total_connections.fetch_sub(1, Ordering::AcqRel);
            debug!("Unregistered connection {}", connection_id);
        }
        removed
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.sockets.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Clone every registered socket handle. Shard locks are released before
    /// this returns, so callers can lock sockets freely.
    pub fn snapshot(&self) -> Vec<Arc<Socket>> {
        self.sockets
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Discard pending notifications of `live_id` on every socket.
    ///
    /// Returns the number of sockets visited.
    pub fn discard_everywhere(&self, live_id: &LiveQueryId) -> usize {
        let sockets = self.snapshot();
        for socket in &sockets {
            socket.discard(live_id);
        }
        sockets.len()
    }

    /// Flush pending notifications of `live_id` on every socket. A failing
    /// socket is logged and skipped.
    ///
    /// Returns the number of sockets visited.
    pub fn flush_everywhere(&self, live_id: &LiveQueryId) -> usize {
        let sockets = self.snapshot();
        for socket in &sockets {
            if let Err(e) = socket.flush(live_id) {
                warn!(
                    "Failed to flush live query {} on connection {}: {}",
                    live_id,
                    socket.connection_id(),
                    e
                );
            }
        }
        sockets.len()
    }

    /// Discard `live_id` on every socket in the background.
    pub fn clear_all(self: &Arc<Self>, live_id: LiveQueryId) {
        let registry = Arc::clone(self);
        spawn_sweep("clear", move || {
            let visited = registry.discard_everywhere(&live_id);
            debug!("Cleared live query {} on {} sockets", live_id, visited);
        });
    }

    /// Flush `live_id` on every socket in the background.
    pub fn flush_all(self: &Arc<Self>, live_id: LiveQueryId) {
        let registry = Arc::clone(self);
        spawn_sweep("flush", move || {
            let visited = registry.flush_everywhere(&live_id);
            debug!("Flushed live query {} on {} sockets", live_id, visited);
        });
    }
}

/// Run a sweep without waiting for it: on the blocking pool of the current
/// tokio runtime, or on a dedicated thread when there is none.
fn spawn_sweep<F>(kind: &'static str, sweep: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(sweep);
        }
        Err(_) => {
            if let Err(e) = std::thread::Builder::new()
                .name(format!("strata-{}-sweep", kind))
                .spawn(sweep)
            {
                error!("Failed to spawn {} sweep: {}", kind, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;
    use crate::notifier::ChannelNotifier;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use strata_commons::{DatabaseId, NamespaceId};
    use strata_session::AuthSession;

    fn socket(id: &str) -> Arc<Socket> {
        let (notifier, _rx) = ChannelNotifier::channel(8);
        Arc::new(Socket::new(
            ConnectionId::new(id),
            NamespaceId::new("app"),
            DatabaseId::new("main"),
            AuthSession::root(),
            Arc::new(notifier),
        ))
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let registry = SocketRegistry::new(10);
        registry.register(socket("c1")).unwrap();
        let err = registry.register(socket("c1")).unwrap_err();
        assert!(matches!(err, LiveError::DuplicateConnection(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_enforces_max_connections() {
        let registry = SocketRegistry::new(2);
        registry.register(socket("c1")).unwrap();
        registry.register(socket("c2")).unwrap();
        assert!(matches!(
            registry.register(socket("c3")),
            Err(LiveError::LimitExceeded(_))
        ));

        registry.unregister(&ConnectionId::new("c1")).unwrap();
        registry.register(socket("c3")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_does_not_consume_a_slot() {
        let registry = SocketRegistry::new(2);
        registry.register(socket("c1")).unwrap();
        assert!(registry.register(socket("c1")).is_err());
        registry.register(socket("c2")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_registrations_respect_max_connections() {
        let registry = Arc::new(SocketRegistry::new(4));
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let s = socket(&format!("c{}", i));
                    barrier.wait();
                    registry.register(s).is_ok()
                })
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(accepted, 4);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_unregister_unknown_is_none() {
        let registry = SocketRegistry::new(2);
        assert!(registry.unregister(&ConnectionId::new("nope")).is_none());
    }

    #[test]
    fn test_discard_everywhere_visits_all_sockets() {
        let registry = SocketRegistry::new(10);
        let live_id = LiveQueryId::new("lq-1");
        for id in ["c1", "c2", "c3"] {
            let s = socket(id);
            s.enqueue(&live_id, Action::Create, json!(id));
            registry.register(s).unwrap();
        }

        assert_eq!(registry.discard_everywhere(&live_id), 3);
        assert!(registry.snapshot().iter().all(|s| s.pending_len(&live_id) == 0));
    }

    #[test]
    fn test_clear_all_without_runtime() {
        let registry = Arc::new(SocketRegistry::new(10));
        let live_id = LiveQueryId::new("lq-1");
        let s = socket("c1");
        s.enqueue(&live_id, Action::Create, json!(1));
        registry.register(Arc::clone(&s)).unwrap();

        registry.clear_all(live_id.clone());

        let deadline = Instant::now() + Duration::from_secs(5);
        while s.pending_len(&live_id) > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(s.pending_len(&live_id), 0);
    }
}
