//! Port traits: the hexagonal boundary between the session and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Session (domain)
//! ```
//!
//! The MQTT adapter implements [`PubSubTransport`]; log or telemetry adapters
//! implement [`EventSink`].  The [`Session`](super::session::Session) consumes
//! them via generics, so the domain core never touches the network directly.

use crate::error::TransportError;

/// Transport-assigned id of a publish or subscribe, echoed in its confirmation.
pub type MessageId = u32;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe capability of the broker client.
///
/// Both calls only *queue* the operation: completion is reported later as a
/// [`TransportEvent`](super::inbound::TransportEvent) carrying the returned id.
/// Delivery is at-most-once and nothing is retained by the broker.
pub trait PubSubTransport {
    fn subscribe(&mut self, topic: &str) -> Result<MessageId, TransportError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<MessageId, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The session reports structured [`SessionEvent`](super::events::SessionEvent)s
/// through this port.  Adapters decide where they go (serial log, a status
/// LED, test recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::SessionEvent);
}
