//! Application callback slots.
//!
//! Every slot is optional; an empty slot turns the delivery into a no-op.
//! Documents are lent to the callback for the duration of the call only.

use serde_json::Value;

type DocumentFn<'a> = Box<dyn FnMut(&Value) + 'a>;
type NotifyFn<'a> = Box<dyn FnMut() + 'a>;

#[derive(Default)]
pub struct Callbacks<'a> {
    device_state_changed: Option<DocumentFn<'a>>,
    firmware_update: Option<DocumentFn<'a>>,
    connected: Option<NotifyFn<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn set_device_state_changed(&mut self, f: impl FnMut(&Value) + 'a) {
        self.device_state_changed = Some(Box::new(f));
    }

    pub fn set_firmware_update(&mut self, f: impl FnMut(&Value) + 'a) {
        self.firmware_update = Some(Box::new(f));
    }

    pub fn set_connected(&mut self, f: impl FnMut() + 'a) {
        self.connected = Some(Box::new(f));
    }

    pub(crate) fn device_state_changed(&mut self, doc: &Value) {
        if let Some(f) = self.device_state_changed.as_mut() {
            log::debug!("-> device state callback");
            f(doc);
        }
    }

    pub(crate) fn firmware_update(&mut self, doc: &Value) {
        if let Some(f) = self.firmware_update.as_mut() {
            log::debug!("-> firmware update callback");
            f(doc);
        }
    }

    pub(crate) fn connected(&mut self) {
        if let Some(f) = self.connected.as_mut() {
            f();
        }
    }
}

impl core::fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks")
            .field("device_state_changed", &self.device_state_changed.is_some())
            .field("firmware_update", &self.firmware_update.is_some())
            .field("connected", &self.connected.is_some())
            .finish()
    }
}
