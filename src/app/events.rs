//! Outbound session events.
//!
//! The [`Session`](super::session::Session) emits these through the
//! [`EventSink`](super::ports::EventSink) port while handling transport
//! events.  They describe what the session did with each inbound message,
//! including the ones it dropped.

use crate::error::Error;
use crate::fsm::BootstrapState;

/// Structured events emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The bootstrap machine entered a new state.
    BootstrapChanged {
        from: BootstrapState,
        to: BootstrapState,
    },

    /// All bootstrap subscriptions are in place.
    BootstrapComplete,

    /// Kuzzle answered a request with a failure status.  Not retried.
    ReplyRejected { request_id: String, status: i64 },

    /// The firmware search matched nothing: no update available.
    FirmwareQueryEmpty,

    /// Success reply for a request id outside the known set.
    UnknownRequestId(String),

    /// Push from a collection the client never subscribed to.
    UnknownCollection,

    /// An inbound message, or an action it triggered, failed and was dropped.
    MessageDropped(Error),
}
