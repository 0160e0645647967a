//! Live Query Lifecycle Manager
//!
//! Keeps the two homes of a live query consistent: the owning socket's
//! `lives` map and one store entry per watched table under
//! [`LiveQueryKey`]. A registration goes absent → registered → killed or
//! torn down, and never comes back.
//!
//! LIVE and KILL hold the socket lock across their store calls so that two
//! statements on the same connection never interleave.

use crate::error::{LiveError, Result};
use crate::id_generator::{LiveIdGenerator, UuidGenerator};
use crate::models::{KillStatement, LiveStatement, Target};
use crate::registry::SocketRegistry;
use crate::resolver::{ContextTargetResolver, TargetResolver};
use crate::socket::Socket;
use log::{debug, error, info, warn};
use std::sync::Arc;
use strata_commons::{
    ConnectionId, DatabaseId, LiveQueryId, LiveQueryKey, NamespaceId, StorageKey, TableName,
};
use strata_configs::LiveQuerySettings;
use strata_session::PermissionChecker;
use strata_store::{Partition, StorageBackend, StorageTransaction};

pub struct LiveQueryManager {
    registry: Arc<SocketRegistry>,
    backend: Arc<dyn StorageBackend>,
    checker: Arc<PermissionChecker>,
    resolver: Arc<dyn TargetResolver>,
    ids: Arc<dyn LiveIdGenerator>,
    partition: Partition,
    max_live_queries_per_socket: usize,
}

impl LiveQueryManager {
    /// Create a manager storing registrations in `settings.partition`,
    /// creating the partition if needed.
    pub fn new(
        registry: Arc<SocketRegistry>,
        backend: Arc<dyn StorageBackend>,
        checker: Arc<PermissionChecker>,
        settings: &LiveQuerySettings,
    ) -> Result<Self> {
        let partition = Partition::new(settings.partition.as_str());
        if !backend.partition_exists(&partition) {
            backend.create_partition(&partition)?;
        }

        Ok(Self {
            registry,
            backend,
            checker,
            resolver: Arc::new(ContextTargetResolver),
            ids: Arc::new(UuidGenerator),
            partition,
            max_live_queries_per_socket: settings.max_live_queries_per_socket,
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn TargetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn LiveIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn registry(&self) -> &Arc<SocketRegistry> {
        &self.registry
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    fn key(&self, socket: &Socket, table: &TableName, live_id: &LiveQueryId) -> Vec<u8> {
        LiveQueryKey::new(
            socket.namespace_id().clone(),
            socket.database_id().clone(),
            table.clone(),
            live_id.clone(),
        )
        .storage_key()
    }

    /// Register a LIVE statement on `socket` and return its new id.
    ///
    /// Every watched table is persisted in one transaction. On any failure
    /// (closed connection, resolution, permissions, store) nothing is
    /// persisted and the socket does not own the query.
    pub fn register_live(
        &self,
        socket: &Socket,
        mut statement: LiveStatement,
    ) -> Result<LiveQueryId> {
        let ctx = socket.context();
        let mut state = socket.lock_state();

        if state.closed {
            warn!(
                "Rejecting LIVE on connection {}: connection closed",
                socket.connection_id()
            );
            return Err(LiveError::ConnectionClosed(socket.connection_id().to_string()));
        }

        if state.lives.len() >= self.max_live_queries_per_socket {
            warn!(
                "Rejecting LIVE on connection {}: limit of {} live queries reached",
                socket.connection_id(),
                self.max_live_queries_per_socket
            );
            return Err(LiveError::LimitExceeded(format!(
                "max live queries per connection ({}) reached",
                self.max_live_queries_per_socket
            )));
        }

        let mut resolved = Vec::with_capacity(statement.what.len());
        let mut tables = Vec::with_capacity(statement.what.len());
        for target in &statement.what {
            let target = self.resolver.resolve(&ctx, target)?;
            match &target {
                Target::Table(name) => tables.push(name.clone()),
                Target::Ident(name) => tables.push(TableName::new(name.as_str())),
                Target::Param(_) | Target::Text(_) | Target::Value(_) => {
                    return Err(LiveError::UnsupportedTarget(format!(
                        "Can not execute LIVE query using value '{}'",
                        target
                    )));
                }
            }
            resolved.push(target);
        }

        if tables.is_empty() {
            return Err(LiveError::UnsupportedTarget(
                "LIVE query has no target table".to_string(),
            ));
        }

        for table in &tables {
            self.checker
                .check(&ctx, socket.namespace_id(), socket.database_id(), table)?;
        }

        let live_id = self.ids.generate();
        statement.what = resolved;
        statement.id = Some(live_id.clone());
        statement.connection = Some(socket.connection_id().clone());
        let value = serde_json::to_vec(&statement)?;

        let mut txn = StorageTransaction::begin(Arc::clone(&self.backend), true);
        for table in &tables {
            txn.put(&self.partition, &self.key(socket, table, &live_id), &value)?;
        }
        txn.commit()?;

        state.lives.insert(live_id.clone(), statement);
        info!(
            "Registered live query {} on connection {} watching {} table(s)",
            live_id,
            socket.connection_id(),
            tables.len()
        );

        Ok(live_id)
    }

    /// Kill live queries owned by `socket`.
    ///
    /// All targets are resolved before anything is killed. Ids the socket
    /// does not own are skipped. Store deletes are best-effort: a failure is
    /// logged and the remaining keys are still processed. Returns the ids
    /// actually killed.
    pub fn execute_kill(
        &self,
        socket: &Socket,
        statement: KillStatement,
    ) -> Result<Vec<LiveQueryId>> {
        let ctx = socket.context();
        let mut state = socket.lock_state();

        let mut ids = Vec::with_capacity(statement.what.len());
        for target in &statement.what {
            match self.resolver.resolve(&ctx, target)? {
                Target::Text(id) => ids.push(LiveQueryId::new(id)),
                other => {
                    return Err(LiveError::UnsupportedTarget(format!(
                        "Can not execute KILL query using value '{}'",
                        other
                    )));
                }
            }
        }

        let mut killed = Vec::with_capacity(ids.len());
        for live_id in ids {
            let Some(live) = state.lives.remove(&live_id) else {
                debug!(
                    "KILL of unknown live query {} on connection {} ignored",
                    live_id,
                    socket.connection_id()
                );
                continue;
            };
            state.pending.remove(&live_id);

            for table in live.watched_tables() {
                let key = self.key(socket, &table, &live_id);
                if let Err(e) = self.backend.delete(&self.partition, &key) {
                    warn!(
                        "Failed to delete live query {} for table {}: {}",
                        live_id, table, e
                    );
                }
            }

            info!("Killed live query {} on connection {}", live_id, socket.connection_id());
            killed.push(live_id);
        }

        Ok(killed)
    }

    /// Tear down a disconnected connection.
    ///
    /// The socket leaves the registry first and is marked closed, so a LIVE
    /// racing with teardown is refused. Every key of every live query it owned
    /// is then cleared in a single transaction committed once.
    /// Returns the number of keys cleared; an unknown connection clears none.
    pub fn deregister_socket(&self, connection_id: &ConnectionId) -> Result<usize> {
        let Some(socket) = self.registry.unregister(connection_id) else {
            debug!("Teardown of unknown connection {} ignored", connection_id);
            return Ok(0);
        };

        let lives = {
            let mut state = socket.lock_state();
            state.closed = true;
            state.pending.clear();
            std::mem::take(&mut state.lives)
        };

        let mut txn = StorageTransaction::begin(Arc::clone(&self.backend), true);
        for (live_id, live) in &lives {
            for table in live.watched_tables() {
                txn.clr(&self.partition, &self.key(&socket, &table, live_id))?;
            }
        }
        let cleared = txn.len();

        txn.commit().map_err(|source| {
            error!(
                "Teardown of connection {} failed, {} live query keys left behind: {}",
                connection_id, cleared, source
            );
            LiveError::CommitFailed {
                connection_id: connection_id.to_string(),
                source,
            }
        })?;

        info!(
            "Connection {} torn down: {} live queries, {} keys cleared",
            connection_id,
            lives.len(),
            cleared
        );
        Ok(cleared)
    }

    /// Live queries watching `ns.db.table`, as persisted.
    pub fn watchers(
        &self,
        ns: &NamespaceId,
        db: &DatabaseId,
        table: &TableName,
    ) -> Result<Vec<LiveStatement>> {
        let prefix = LiveQueryKey::table_prefix(ns, db, table);
        self.backend
            .scan(&self.partition, Some(prefix.as_slice()), None)?
            .map(|(_, value)| serde_json::from_slice(&value).map_err(LiveError::from))
            .collect()
    }
}
