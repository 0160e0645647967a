//! Notification payloads and LIVE/KILL statement models.

mod dispatch;
mod statement;

pub use dispatch::{Action, Dispatch, RpcNotification, NOTIFY_METHOD};
pub use statement::{KillStatement, LiveStatement, Target};
