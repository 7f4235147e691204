//! Client configuration parameters
//!
//! Everything the client needs to reach the broker and address the Kuzzle
//! backend.  Loaded once at startup and borrowed by the session for the
//! rest of the process lifetime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::DeviceIdentity;
use crate::protocol::{DEFAULT_INDEX, REQUEST_TOPIC, RESPONSE_TOPIC};

/// Fixed-capacity string for hosts, credentials and topics.
pub type ConfigString = heapless::String<64>;

/// MQTT broker connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker hostname or IP address
    pub host: ConfigString,
    /// Broker TCP port
    pub port: u16,
    pub username: ConfigString,
    pub password: ConfigString,
    /// MQTT keepalive (seconds)
    pub keepalive_secs: u16,
    /// Start a fresh broker session on every connect
    pub clean_session: bool,
    /// MQTT client receive buffer (bytes).  Larger messages arrive in chunks.
    pub rx_buffer_size: usize,
    /// Largest inbound message reassembled from chunks (bytes)
    pub max_message_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: ConfigString::new(),
            port: 1883,
            username: ConfigString::new(),
            password: ConfigString::new(),
            keepalive_secs: 120,
            clean_session: false,
            rx_buffer_size: 4096,
            max_message_size: 16 * 1024,
        }
    }
}

impl BrokerConfig {
    /// `mqtt://host:port` URL for the MQTT client.
    pub fn url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

/// Core client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub identity: DeviceIdentity,
    pub broker: BrokerConfig,

    // --- Kuzzle ---
    /// Index holding the IoT collections
    pub index: ConfigString,
    /// Topic requests are published to
    pub request_topic: ConfigString,
    /// Topic every reply arrives on
    pub response_topic: ConfigString,
}

impl ClientConfig {
    /// Configuration with the stock index and topics for `identity`.
    pub fn new(identity: DeviceIdentity, broker: BrokerConfig) -> Self {
        Self {
            identity,
            broker,
            index: fixed(DEFAULT_INDEX),
            request_topic: fixed(REQUEST_TOPIC),
            response_topic: fixed(RESPONSE_TOPIC),
        }
    }

    /// Reject values the client cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.identity.id().is_empty() {
            return Err(Error::Config("device id is empty"));
        }
        if self.identity.device_type().is_empty() {
            return Err(Error::Config("device type is empty"));
        }
        if self.broker.host.is_empty() {
            return Err(Error::Config("broker host is empty"));
        }
        if self.broker.port == 0 {
            return Err(Error::Config("broker port is 0"));
        }
        if self.broker.keepalive_secs == 0 {
            return Err(Error::Config("keepalive is 0"));
        }
        if self.broker.rx_buffer_size == 0 {
            return Err(Error::Config("receive buffer is 0"));
        }
        if self.broker.max_message_size < self.broker.rx_buffer_size {
            return Err(Error::Config("max message size below receive buffer"));
        }
        if self.index.is_empty() {
            return Err(Error::Config("index is empty"));
        }
        if self.request_topic.is_empty() || self.response_topic.is_empty() {
            return Err(Error::Config("topic is empty"));
        }
        if self.request_topic == self.response_topic {
            return Err(Error::Config("request and response topics collide"));
        }
        Ok(())
    }
}

fn fixed(s: &str) -> ConfigString {
    let mut out = ConfigString::new();
    // Compile-time constants, all well under capacity.
    let _ = out.push_str(s);
    out
}
