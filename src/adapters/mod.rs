//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements       | Connects to                   |
//! |-------------|------------------|-------------------------------|
//! | `mqtt`      | PubSubTransport  | ESP-IDF MQTT client / sim     |
//! | `log_sink`  | EventSink        | Serial log output             |
//! | `device_id` | (helper)         | eFuse factory MAC             |

pub mod device_id;
pub mod log_sink;
pub mod mqtt;
