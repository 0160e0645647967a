//! Bootstrap wiring: a server built from config + backend serves a whole
//! connection lifecycle.

use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use strata_commons::{
    ConnectionId, DatabaseDefinition, DatabaseId, NamespaceDefinition, NamespaceId,
    PermissionExpression, PermissionRule, TableDefinition, TableName, TablePermissions,
};
use strata_configs::ServerConfig;
use strata_live::{Action, ChannelNotifier, LiveError, LiveStatement, Target};
use strata_server::StrataServer;
use strata_session::AuthSession;
use strata_store::{InMemoryBackend, Partition};

fn config_from_toml(toml: &str) -> ServerConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", toml).unwrap();
    ServerConfig::from_file(file.path()).unwrap()
}

fn define_schema(server: &StrataServer) {
    let (ns, db) = (NamespaceId::new("app"), DatabaseId::new("main"));
    let catalog = server.catalog();
    catalog
        .define_namespace(&NamespaceDefinition { name: ns.clone() })
        .unwrap();
    catalog
        .define_database(&DatabaseDefinition {
            namespace_id: ns.clone(),
            name: db.clone(),
        })
        .unwrap();
    catalog
        .define_table(&TableDefinition::new(
            ns,
            db,
            TableName::new("person"),
            TablePermissions::Expression(PermissionExpression::uniform(PermissionRule::Full)),
        ))
        .unwrap();
}

#[test]
fn test_bootstrap_serves_connection_lifecycle() {
    let config = config_from_toml(
        r#"
        [live]
        partition = "lq"
        max_connections = 4
        "#,
    );
    let backend = Arc::new(InMemoryBackend::new());
    let server = StrataServer::bootstrap(config, backend.clone()).unwrap();
    define_schema(&server);

    let (notifier, mut rx) = ChannelNotifier::bounded();
    let socket = server
        .connect(
            ConnectionId::new("c1"),
            NamespaceId::new("app"),
            DatabaseId::new("main"),
            AuthSession::scoped("user", json!({"id": "person:1"})),
            Arc::new(notifier),
        )
        .unwrap();

    let live_id = server
        .live_query_manager()
        .register_live(
            &socket,
            LiveStatement::new(vec![Target::Table(TableName::new("person"))]),
        )
        .unwrap();
    assert_eq!(backend.len(&Partition::new("lq")), 1);

    let dispatcher = server.dispatcher();
    let queued = dispatcher
        .enqueue_for_table(
            &NamespaceId::new("app"),
            &DatabaseId::new("main"),
            &TableName::new("person"),
            Action::Create,
            json!({"id": "person:2"}),
        )
        .unwrap();
    assert_eq!(queued, 1);
    assert!(dispatcher.flush(socket.connection_id(), &live_id).unwrap());
    assert_eq!(rx.try_recv().unwrap().params[0].query, live_id);

    assert_eq!(server.disconnect(&ConnectionId::new("c1")).unwrap(), 1);
    assert!(backend.is_empty(&Partition::new("lq")));
    assert!(server.registry().is_empty());
}

#[test]
fn test_connection_limit_from_config() {
    let config = config_from_toml("[live]\nmax_connections = 1\n");
    let server = StrataServer::bootstrap(config, Arc::new(InMemoryBackend::new())).unwrap();

    let connect = |id: &str| {
        let (notifier, _rx) = ChannelNotifier::channel(1);
        server.connect(
            ConnectionId::new(id),
            NamespaceId::new("app"),
            DatabaseId::new("main"),
            AuthSession::root(),
            Arc::new(notifier),
        )
    };

    connect("c1").unwrap();
    assert!(matches!(connect("c2"), Err(LiveError::LimitExceeded(_))));
}

#[test]
fn test_shutdown_tears_down_everything() {
    let backend = Arc::new(InMemoryBackend::new());
    let server = StrataServer::bootstrap(ServerConfig::default(), backend.clone()).unwrap();
    define_schema(&server);

    for id in ["c1", "c2", "c3"] {
        let (notifier, _rx) = ChannelNotifier::channel(1);
        let socket = server
            .connect(
                ConnectionId::new(id),
                NamespaceId::new("app"),
                DatabaseId::new("main"),
                AuthSession::root(),
                Arc::new(notifier),
            )
            .unwrap();
        server
            .live_query_manager()
            .register_live(
                &socket,
                LiveStatement::new(vec![Target::Ident("person".to_string())]),
            )
            .unwrap();
    }
    let partition = Partition::new("live_queries");
    assert_eq!(backend.len(&partition), 3);

    assert_eq!(server.shutdown(), 0);
    assert!(server.registry().is_empty());
    assert!(backend.is_empty(&partition));
}

#[test]
fn test_bootstrap_rejects_invalid_config() {
    let mut config = ServerConfig::default();
    config.live.max_connections = 0;
    assert!(StrataServer::bootstrap(config, Arc::new(InMemoryBackend::new())).is_err());
}
