//! Server lifecycle management helpers.
//!
//! Bootstraps the live query subsystem over a storage backend and coordinates
//! connection setup, teardown and shutdown.

use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use strata_commons::{ConnectionId, DatabaseId, NamespaceId};
use strata_configs::ServerConfig;
use strata_live::{LiveQueryManager, NotificationDispatcher, Notifier, Socket, SocketRegistry};
use strata_session::{
    AuthSession, PermissionChecker, PermissionEvaluator, StaticPermissionEvaluator,
};
use strata_store::{StorageBackend, StoreCatalog};

/// Fully wired live query subsystem.
pub struct StrataServer {
    config: ServerConfig,
    catalog: Arc<StoreCatalog>,
    checker: Arc<PermissionChecker>,
    registry: Arc<SocketRegistry>,
    manager: Arc<LiveQueryManager>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl StrataServer {
    /// Wire every component over `backend` with the static permission
    /// evaluator.
    pub fn bootstrap(config: ServerConfig, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        Self::bootstrap_with_evaluator(config, backend, Arc::new(StaticPermissionEvaluator))
    }

    pub fn bootstrap_with_evaluator(
        config: ServerConfig,
        backend: Arc<dyn StorageBackend>,
        evaluator: Arc<dyn PermissionEvaluator>,
    ) -> Result<Self> {
        let phase_start = std::time::Instant::now();
        config.validate()?;

        let catalog = Arc::new(StoreCatalog::new(Arc::clone(&backend))?);
        let checker = Arc::new(PermissionChecker::new(catalog.clone(), evaluator));
        let registry = Arc::new(SocketRegistry::new(config.live.max_connections));
        let manager = Arc::new(LiveQueryManager::new(
            Arc::clone(&registry),
            backend,
            Arc::clone(&checker),
            &config.live,
        )?);
        let dispatcher = Arc::new(NotificationDispatcher::new(Arc::clone(&manager)));

        info!(
            "Live query subsystem ready: partition={}, max_connections={}, \
             max_live_queries_per_socket={} ({:.2}ms)",
            config.live.partition,
            config.live.max_connections,
            config.live.max_live_queries_per_socket,
            phase_start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            config,
            catalog,
            checker,
            registry,
            manager,
            dispatcher,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<StoreCatalog> {
        &self.catalog
    }

    pub fn permission_checker(&self) -> &Arc<PermissionChecker> {
        &self.checker
    }

    pub fn registry(&self) -> &Arc<SocketRegistry> {
        &self.registry
    }

    pub fn live_query_manager(&self) -> &Arc<LiveQueryManager> {
        &self.manager
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Register an accepted connection.
    pub fn connect(
        &self,
        connection_id: ConnectionId,
        namespace_id: NamespaceId,
        database_id: DatabaseId,
        auth: AuthSession,
        notifier: Arc<dyn Notifier>,
    ) -> strata_live::Result<Arc<Socket>> {
        let socket = Arc::new(Socket::new(
            connection_id,
            namespace_id,
            database_id,
            auth,
            notifier,
        ));
        self.registry.register(Arc::clone(&socket))?;
        debug!("Connection {} accepted", socket.connection_id());
        Ok(socket)
    }

    /// Tear down a closed connection. See [`LiveQueryManager::deregister_socket`].
    pub fn disconnect(&self, connection_id: &ConnectionId) -> strata_live::Result<usize> {
        self.manager.deregister_socket(connection_id)
    }

    /// Tear down every connected socket.
    ///
    /// Returns the number of connections whose teardown failed; each failure
    /// is logged.
    pub fn shutdown(&self) -> usize {
        let sockets = self.registry.snapshot();
        info!("Shutting down: tearing down {} connections", sockets.len());

        let mut failed = 0;
        for socket in sockets {
            if let Err(e) = self.manager.deregister_socket(socket.connection_id()) {
                warn!("Teardown of connection {} failed: {}", socket.connection_id(), e);
                failed += 1;
            }
        }
        failed
    }
}
