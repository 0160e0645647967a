//! Per-connection live query state.
//!
//! A [`Socket`] owns the live queries registered through its connection and
//! the notification batches not yet delivered for each of them. Both maps sit
//! behind one `parking_lot::Mutex`; every operation takes the lock for its
//! whole duration and never awaits while holding it.

use crate::error::{LiveError, Result};
use crate::models::{Action, Dispatch, LiveStatement, RpcNotification};
use crate::notifier::Notifier;
use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use strata_commons::{ConnectionId, DatabaseId, LiveQueryId, NamespaceId};
use strata_session::{AuthSession, ExecutionContext};

/// Mutable state guarded by the socket lock.
#[derive(Debug, Default)]
pub(crate) struct SocketState {
    /// Undelivered notifications, in generation order per live query
    pub(crate) pending: HashMap<LiveQueryId, Vec<Dispatch>>,
    pub(crate) lives: HashMap<LiveQueryId, LiveStatement>,
    /// Set once teardown has taken the lives; no registration lands after it
    pub(crate) closed: bool,
}

pub struct Socket {
    connection_id: ConnectionId,
    namespace_id: NamespaceId,
    database_id: DatabaseId,
    auth: AuthSession,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SocketState>,
}

impl Socket {
    pub fn new(
        connection_id: ConnectionId,
        namespace_id: NamespaceId,
        database_id: DatabaseId,
        auth: AuthSession,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            connection_id,
            namespace_id,
            database_id,
            auth,
            notifier,
            state: Mutex::new(SocketState::default()),
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn namespace_id(&self) -> &NamespaceId {
        &self.namespace_id
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.database_id
    }

    /// Execution context for statements issued on this connection.
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::from_session(
            &self.auth,
            self.namespace_id.clone(),
            self.database_id.clone(),
        )
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, SocketState> {
        self.state.lock()
    }

    /// Queue a change for `live_id`. Batches are unbounded.
    pub fn enqueue(&self, live_id: &LiveQueryId, action: Action, result: JsonValue) {
        let mut state = self.state.lock();
        state
            .pending
            .entry(live_id.clone())
            .or_default()
            .push(Dispatch::new(live_id.clone(), action, result));
    }

    /// Queue a change for `live_id` only while this socket owns it.
    ///
    /// Ownership is checked under the same lock as the push, so a KILL that
    /// completes first always wins and no bucket is left behind.
    pub fn enqueue_owned(
        &self,
        live_id: &LiveQueryId,
        action: Action,
        result: JsonValue,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.lives.contains_key(live_id) {
            return false;
        }
        state
            .pending
            .entry(live_id.clone())
            .or_default()
            .push(Dispatch::new(live_id.clone(), action, result));
        true
    }

    /// Drop every pending notification of `live_id` without sending it.
    pub fn discard(&self, live_id: &LiveQueryId) {
        let mut state = self.state.lock();
        if let Some(batch) = state.pending.remove(live_id) {
            debug!(
                "Discarded {} pending notifications for live query {} on connection {}",
                batch.len(),
                live_id,
                self.connection_id
            );
        }
    }

    /// Deliver the pending batch of `live_id` as one `notify` message.
    ///
    /// Returns `Ok(false)` when nothing was pending. The batch is removed
    /// before delivery: if the notifier fails it is dropped, not retained.
    pub fn flush(&self, live_id: &LiveQueryId) -> Result<bool> {
        let mut state = self.state.lock();

        let batch = match state.pending.remove(live_id) {
            Some(batch) if !batch.is_empty() => batch,
            _ => return Ok(false),
        };
        let count = batch.len();

        if let Err(source) = self.notifier.notify(RpcNotification::notify(batch)) {
            warn!(
                "Dropped {} notifications for live query {} on connection {}: {}",
                count, live_id, self.connection_id, source
            );
            return Err(LiveError::NotifyFailed {
                connection_id: self.connection_id.to_string(),
                source,
            });
        }

        debug!(
            "Flushed {} notifications for live query {} to connection {}",
            count, live_id, self.connection_id
        );
        Ok(true)
    }

    /// Flush every pending batch, one message per live query.
    ///
    /// Keeps going after a failed delivery and reports the first failure.
    pub fn flush_pending(&self) -> Result<usize> {
        let live_ids: Vec<LiveQueryId> = self.state.lock().pending.keys().cloned().collect();

        let mut sent = 0;
        let mut first_error = None;
        for live_id in &live_ids {
            match self.flush(live_id) {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(sent),
        }
    }

    pub fn pending_len(&self, live_id: &LiveQueryId) -> usize {
        self.state.lock().pending.get(live_id).map_or(0, Vec::len)
    }

    pub fn live_query_ids(&self) -> Vec<LiveQueryId> {
        self.state.lock().lives.keys().cloned().collect()
    }

    pub fn live_query(&self, live_id: &LiveQueryId) -> Option<LiveStatement> {
        self.state.lock().lives.get(live_id).cloned()
    }

    pub fn owns(&self, live_id: &LiveQueryId) -> bool {
        self.state.lock().lives.contains_key(live_id)
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().lives.len()
    }

    /// True once the connection has been torn down.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("connection_id", &self.connection_id)
            .field("namespace_id", &self.namespace_id)
            .field("database_id", &self.database_id)
            .field("auth_level", &self.auth.level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{ChannelNotifier, NotifyError};
    use serde_json::json;

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _message: RpcNotification) -> std::result::Result<(), NotifyError> {
            Err(NotifyError("peer gone".to_string()))
        }
    }

    fn socket_with(notifier: Arc<dyn Notifier>) -> Socket {
        Socket::new(
            ConnectionId::new("conn-1"),
            NamespaceId::new("app"),
            DatabaseId::new("main"),
            AuthSession::root(),
            notifier,
        )
    }

    #[test]
    fn test_flush_sends_batch_in_order_once() {
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        let socket = socket_with(Arc::new(notifier));
        let live_id = LiveQueryId::new("lq-1");

        socket.enqueue(&live_id, Action::Create, json!({"n": 1}));
        socket.enqueue(&live_id, Action::Update, json!({"n": 2}));
        socket.enqueue(&live_id, Action::Delete, json!({"n": 3}));
        assert_eq!(socket.pending_len(&live_id), 3);

        assert!(socket.flush(&live_id).unwrap());
        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.method, "notify");
        let payloads: Vec<_> = msg.params.iter().map(|d| d.result.clone()).collect();
        assert_eq!(payloads, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
        assert!(msg.params.iter().all(|d| d.query == live_id));

        assert!(!socket.flush(&live_id).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_discard_then_flush_sends_nothing() {
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        let socket = socket_with(Arc::new(notifier));
        let live_id = LiveQueryId::new("lq-1");

        socket.enqueue(&live_id, Action::Create, json!(1));
        socket.discard(&live_id);
        assert!(!socket.flush(&live_id).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_batches_are_per_live_query() {
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        let socket = socket_with(Arc::new(notifier));
        let a = LiveQueryId::new("a");
        let b = LiveQueryId::new("b");

        socket.enqueue(&a, Action::Create, json!("a1"));
        socket.enqueue(&b, Action::Create, json!("b1"));
        socket.discard(&a);

        assert_eq!(socket.pending_len(&b), 1);
        assert_eq!(socket.flush_pending().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap().params[0].query, b);
    }

    #[test]
    fn test_enqueue_owned_skips_unowned_queries() {
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        let socket = socket_with(Arc::new(notifier));
        let live_id = LiveQueryId::new("lq-1");

        assert!(!socket.enqueue_owned(&live_id, Action::Create, json!(1)));
        assert_eq!(socket.pending_len(&live_id), 0);

        socket
            .lock_state()
            .lives
            .insert(live_id.clone(), LiveStatement::new(Vec::new()));
        assert!(socket.enqueue_owned(&live_id, Action::Create, json!(2)));
        assert_eq!(socket.live_query_ids(), vec![live_id.clone()]);

        socket.lock_state().lives.remove(&live_id);
        assert!(!socket.enqueue_owned(&live_id, Action::Update, json!(3)));
        assert_eq!(socket.pending_len(&live_id), 1);

        assert!(socket.flush(&live_id).unwrap());
        assert_eq!(rx.try_recv().unwrap().params[0].result, json!(2));
    }

    #[test]
    fn test_failed_notify_drops_batch() {
        let socket = socket_with(Arc::new(FailingNotifier));
        let live_id = LiveQueryId::new("lq-1");

        socket.enqueue(&live_id, Action::Create, json!(1));
        let err = socket.flush(&live_id).unwrap_err();
        assert!(matches!(err, LiveError::NotifyFailed { .. }));

        assert_eq!(socket.pending_len(&live_id), 0);
        assert!(!socket.flush(&live_id).unwrap());
    }

    #[test]
    fn test_context_carries_session_variables() {
        let (notifier, _rx) = ChannelNotifier::channel(1);
        let socket = Socket::new(
            ConnectionId::new("conn-1"),
            NamespaceId::new("app"),
            DatabaseId::new("main"),
            AuthSession::scoped("user", json!({"id": "person:1"})),
            Arc::new(notifier),
        );

        let ctx = socket.context();
        assert_eq!(ctx.namespace_id().as_str(), "app");
        assert_eq!(ctx.variable("auth"), Some(&json!({"id": "person:1"})));
        assert_eq!(ctx.variable("scope"), Some(&json!("user")));
    }
}
