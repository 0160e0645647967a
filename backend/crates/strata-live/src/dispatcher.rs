//! Notification Dispatcher
//!
//! Entry point of the write path: routes already-built changes to the
//! sockets owning the matching live queries and pushes the batches out.

use crate::error::Result;
use crate::manager::LiveQueryManager;
use crate::models::Action;
use crate::registry::SocketRegistry;
use log::debug;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use strata_commons::{ConnectionId, DatabaseId, LiveQueryId, NamespaceId, TableName};

pub struct NotificationDispatcher {
    registry: Arc<SocketRegistry>,
    manager: Arc<LiveQueryManager>,
}

impl NotificationDispatcher {
    pub fn new(manager: Arc<LiveQueryManager>) -> Self {
        Self {
            registry: Arc::clone(manager.registry()),
            manager,
        }
    }

    /// Queue a change for one live query of one connection.
    ///
    /// Returns false when the connection is gone or no longer owns the query.
    pub fn enqueue(
        &self,
        connection_id: &ConnectionId,
        live_id: &LiveQueryId,
        action: Action,
        result: JsonValue,
    ) -> bool {
        let Some(socket) = self.registry.get(connection_id) else {
            debug!("Dropping change for live query {}: connection {} gone", live_id, connection_id);
            return false;
        };
        if !socket.enqueue_owned(live_id, action, result) {
            debug!(
                "Dropping change for live query {}: not owned by connection {}",
                live_id, connection_id
            );
            return false;
        }
        true
    }

    /// Queue a change to `ns.db.table` for every live query watching it.
    ///
    /// Returns the number of live queries the change was queued for.
    pub fn enqueue_for_table(
        &self,
        ns: &NamespaceId,
        db: &DatabaseId,
        table: &TableName,
        action: Action,
        result: JsonValue,
    ) -> Result<usize> {
        let mut queued = 0;
        for live in self.manager.watchers(ns, db, table)? {
            let (Some(live_id), Some(connection_id)) = (live.id.as_ref(), live.connection.as_ref())
            else {
                continue;
            };
            if self.enqueue(connection_id, live_id, action, result.clone()) {
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Flush one live query of one connection. `Ok(false)` when nothing was
    /// sent.
    pub fn flush(&self, connection_id: &ConnectionId, live_id: &LiveQueryId) -> Result<bool> {
        match self.registry.get(connection_id) {
            Some(socket) => socket.flush(live_id),
            None => Ok(false),
        }
    }

    /// Flush every pending batch of a connection, one message per live query.
    pub fn flush_socket(&self, connection_id: &ConnectionId) -> Result<usize> {
        match self.registry.get(connection_id) {
            Some(socket) => socket.flush_pending(),
            None => Ok(0),
        }
    }

    pub fn clear_all(&self, live_id: LiveQueryId) {
        self.registry.clear_all(live_id);
    }

    pub fn flush_all(&self, live_id: LiveQueryId) {
        self.registry.flush_all(live_id);
    }
}
