//! Device identity.
//!
//! Immutable for the lifetime of the process: a bounded identifier and a
//! device type.  The id becomes the MQTT client id and the own-state
//! subscription filter; the type selects which firmware updates apply.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum device id length in bytes.
pub const DEVICE_ID_MAX_LEN: usize = 32;

/// Maximum device type length in bytes.
pub const DEVICE_TYPE_MAX_LEN: usize = 32;

/// Fixed-capacity device id string.
pub type DeviceId = heapless::String<DEVICE_ID_MAX_LEN>;

/// Fixed-capacity device type string.
pub type DeviceType = heapless::String<DEVICE_TYPE_MAX_LEN>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    id: DeviceId,
    device_type: DeviceType,
}

impl DeviceIdentity {
    /// Build an identity, rejecting empty or oversized fields.
    pub fn new(id: &str, device_type: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(Error::Config("device id is empty"));
        }
        if device_type.is_empty() {
            return Err(Error::Config("device type is empty"));
        }
        let id = DeviceId::try_from(id).map_err(|_| Error::Config("device id too long"))?;
        let device_type =
            DeviceType::try_from(device_type).map_err(|_| Error::Config("device type too long"))?;
        Ok(Self { id, device_type })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }
}
