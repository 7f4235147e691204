//! Device id derived from the ESP32 factory MAC address.
//!
//! The id is the 6-byte MAC in lowercase hex, no separators
//! (`a4cf12ab34cd`).  It is stable across reboots and doubles as the MQTT
//! client id, so it must be unique per broker.

use core::fmt::Write;

use crate::identity::DeviceId;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Format `mac` as a device id.
pub fn device_id(mac: &MacAddress) -> DeviceId {
    let mut id = DeviceId::new();
    for b in mac {
        // 12 chars always fit.
        let _ = write!(id, "{:02x}", b);
    }
    id
}
