//! Outbound delivery of notification messages to a connection.

use crate::models::RpcNotification;
use thiserror::Error;
use tokio::sync::mpsc;

/// Maximum queued notification messages per connection before delivery fails
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 1000;

/// Type alias for receiving notification messages on the transport side
pub type NotificationReceiver = mpsc::Receiver<RpcNotification>;

/// Delivery failure reported by a [`Notifier`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// Handle used to push one message to the remote peer.
///
/// Called with the socket lock held, so implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: RpcNotification) -> Result<(), NotifyError>;
}

/// [`Notifier`] backed by a bounded tokio channel drained by the transport.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<RpcNotification>,
}

impl ChannelNotifier {
    /// Channel sized to [`NOTIFICATION_CHANNEL_CAPACITY`].
    pub fn bounded() -> (Self, NotificationReceiver) {
        Self::channel(NOTIFICATION_CHANNEL_CAPACITY)
    }

    pub fn channel(capacity: usize) -> (Self, NotificationReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: RpcNotification) -> Result<(), NotifyError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                NotifyError("notification channel full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                NotifyError("notification channel closed".to_string())
            }
        })
    }
}
