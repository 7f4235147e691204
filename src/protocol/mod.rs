//! Kuzzle-over-MQTT protocol.
//!
//! Requests are JSON documents published on a single request topic; every
//! reply comes back on a single response topic and echoes the `requestId`
//! of the request that caused it.  Realtime subscriptions deliver push
//! notifications on per-subscription channels instead.
//!
//! ```text
//!  application ──▶ request (builder) ──▶ Kuzzle/request
//!
//!  Kuzzle/response ──▶ router ──▶ reply ──▶ bootstrap FSM / firmware query
//!  <channel>       ──▶ router ──▶ notify ──▶ application callbacks
//! ```

mod fields;
pub mod notify;
pub mod request;
pub mod router;

/// Topic requests are published to.
pub const REQUEST_TOPIC: &str = "Kuzzle/request";

/// Topic every reply arrives on.
pub const RESPONSE_TOPIC: &str = "Kuzzle/response";

/// Index holding the IoT collections.
pub const DEFAULT_INDEX: &str = "iot-3";

/// Collection of device state documents.
pub const COLLECTION_DEVICE_STATE: &str = "device-state";

/// Collection of firmware update announcements, filtered by device type.
pub const COLLECTION_FW_UPDATES: &str = "fw-updates";

/// Controller for realtime subscriptions.
pub const CONTROLLER_REALTIME: &str = "realtime";

/// Controller for document CRUD and search.
pub const CONTROLLER_DOCUMENT: &str = "document";

/// Reply status for a successful request.
pub const STATUS_OK: i64 = 200;

/// Upper bound for one serialized request.
pub const REQUEST_MAX_SIZE: usize = 1024;

/// Upper bound for one serialized body document (state or filter).
pub const DOCUMENT_MAX_SIZE: usize = 512;

/// Serialized request, ready to publish.
pub type RequestFrame = heapless::Vec<u8, REQUEST_MAX_SIZE>;

/// Correlation ids of the requests the client can have outstanding.
///
/// Closed set: one token per request kind, at most one request per token in
/// flight.  Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestToken {
    /// One-shot search for the latest firmware.
    FirmwareQuery,
    /// Realtime subscription to this device's own state.
    SubscribeOwnState,
    /// Realtime subscription to firmware updates for this device type.
    SubscribeFirmware,
}

impl RequestToken {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirmwareQuery => "fw_update",
            Self::SubscribeOwnState => "sub_state",
            Self::SubscribeFirmware => "subfw_update",
        }
    }

    /// Look up the token echoed in a reply.  Unknown ids yield `None`.
    pub fn from_wire(id: &str) -> Option<Self> {
        match id {
            "fw_update" => Some(Self::FirmwareQuery),
            "sub_state" => Some(Self::SubscribeOwnState),
            "subfw_update" => Some(Self::SubscribeFirmware),
            _ => None,
        }
    }
}

impl core::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
