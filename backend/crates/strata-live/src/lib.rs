//! # strata-live
//!
//! Live query subsystem for Strata:
//! - [`Socket`]: per-connection live queries and pending notification batches
//! - [`SocketRegistry`]: concurrent directory of connected sockets with
//!   background clear/flush sweeps
//! - [`LiveQueryManager`]: LIVE, KILL and connection teardown against the
//!   socket state and the transactional store
//! - [`NotificationDispatcher`]: routing of changes to owning sockets
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use strata_commons::{ConnectionId, DatabaseId, LiveQueryId, NamespaceId};
//! use strata_live::{Action, ChannelNotifier, Socket};
//! use strata_session::AuthSession;
//!
//! let (notifier, mut rx) = ChannelNotifier::channel(16);
//! let socket = Socket::new(
//!     ConnectionId::new("conn-1"),
//!     NamespaceId::new("app"),
//!     DatabaseId::new("main"),
//!     AuthSession::root(),
//!     Arc::new(notifier),
//! );
//!
//! let live_id = LiveQueryId::new("lq-1");
//! socket.enqueue(&live_id, Action::Create, json!({"id": 1}));
//! assert!(socket.flush(&live_id).unwrap());
//! assert_eq!(rx.try_recv().unwrap().params.len(), 1);
//! ```

pub mod dispatcher;
pub mod error;
pub mod id_generator;
pub mod manager;
pub mod models;
pub mod notifier;
pub mod registry;
pub mod resolver;
pub mod socket;

pub use dispatcher::NotificationDispatcher;
pub use error::{LiveError, Result};
pub use id_generator::{LiveIdGenerator, UuidGenerator};
pub use manager::LiveQueryManager;
pub use models::{Action, Dispatch, KillStatement, LiveStatement, RpcNotification, Target};
pub use notifier::{
    ChannelNotifier, NotificationReceiver, Notifier, NotifyError, NOTIFICATION_CHANNEL_CAPACITY,
};
pub use registry::SocketRegistry;
pub use resolver::{ContextTargetResolver, TargetResolver};
pub use socket::Socket;
