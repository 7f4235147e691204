//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing session events to the `log` facade
//! (the ESP-IDF logger on target, whatever the host installs otherwise).

use log::{debug, info, warn};

use crate::app::events::SessionEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`SessionEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::BootstrapChanged { from, to } => {
                debug!("EVENT | bootstrap {} -> {}", from, to);
            }
            SessionEvent::BootstrapComplete => {
                info!("EVENT | session ready");
            }
            SessionEvent::ReplyRejected { request_id, status } => {
                warn!("EVENT | request {} rejected (status {})", request_id, status);
            }
            SessionEvent::FirmwareQueryEmpty => {
                info!("EVENT | no firmware available");
            }
            SessionEvent::UnknownRequestId(id) => {
                debug!("EVENT | reply for untracked request {}", id);
            }
            SessionEvent::UnknownCollection => {
                debug!("EVENT | push from unknown collection");
            }
            SessionEvent::MessageDropped(e) => {
                warn!("EVENT | message dropped: {}", e);
            }
        }
    }
}
