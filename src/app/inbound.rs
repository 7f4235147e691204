//! Inbound transport events.
//!
//! The broker client delivers these one at a time; the session processes
//! each to completion before the next one is read.

use super::ports::MessageId;
use crate::error::Error;

/// A transport event, borrowing the received topic and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent<'a> {
    Connected,
    Disconnected,
    Subscribed(MessageId),
    Published(MessageId),
    Received { topic: &'a str, payload: &'a [u8] },
    /// An inbound message the transport could not deliver whole.
    Discarded(Error),
}

/// Owned form of [`TransportEvent`] for handing events across a channel
/// from the client's event task to the session's loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedTransportEvent {
    Connected,
    Disconnected,
    Subscribed(MessageId),
    Published(MessageId),
    Received { topic: String, payload: Vec<u8> },
    Discarded(Error),
}

impl OwnedTransportEvent {
    pub fn as_event(&self) -> TransportEvent<'_> {
        match self {
            Self::Connected => TransportEvent::Connected,
            Self::Disconnected => TransportEvent::Disconnected,
            Self::Subscribed(id) => TransportEvent::Subscribed(*id),
            Self::Published(id) => TransportEvent::Published(*id),
            Self::Received { topic, payload } => TransportEvent::Received { topic, payload },
            Self::Discarded(e) => TransportEvent::Discarded(*e),
        }
    }
}

impl From<TransportEvent<'_>> for OwnedTransportEvent {
    fn from(event: TransportEvent<'_>) -> Self {
        match event {
            TransportEvent::Connected => Self::Connected,
            TransportEvent::Disconnected => Self::Disconnected,
            TransportEvent::Subscribed(id) => Self::Subscribed(id),
            TransportEvent::Published(id) => Self::Published(id),
            TransportEvent::Received { topic, payload } => Self::Received {
                topic: topic.into(),
                payload: payload.to_vec(),
            },
            TransportEvent::Discarded(e) => Self::Discarded(e),
        }
    }
}
