//! MQTT transport adapter.
//!
//! Implements [`PubSubTransport`], the hexagonal boundary for the broker
//! connection.  Inbound client events are converted to
//! [`OwnedTransportEvent`]s and queued on a channel; the main loop drains it
//! with [`MqttAdapter::next_event`] and feeds the session one event at a time.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF MQTT client via
//!   `esp_idf_svc::mqtt::client`.  A pump thread owns the client's
//!   connection handle and forwards its events.  Messages larger than the
//!   client's receive buffer arrive in chunks and are joined by a
//!   [`ChunkAssembler`] before they are forwarded.
//! - **all other targets**: recording simulation for host-side tests.
//!
//! Everything is QoS 0, not retained; last-will is disabled.

use std::sync::mpsc::{self, Receiver};
#[cfg(not(target_os = "espidf"))]
use std::sync::mpsc::Sender;

use log::{debug, info, warn};

use crate::app::inbound::OwnedTransportEvent;
use crate::app::ports::{MessageId, PubSubTransport};
use crate::config::ClientConfig;
use crate::error::{Error, TransportError};

// ───────────────────────────────────────────────────────────────
// Chunk reassembly
// ───────────────────────────────────────────────────────────────

/// Where one received piece sits within its MQTT message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    /// The whole message in one piece.
    Complete,
    /// First piece of a `total`-byte message.
    First { total: usize },
    /// A later piece, starting at byte `offset`.
    Next { offset: usize, total: usize },
}

/// Joins a message the client delivered in pieces.
///
/// Pieces must arrive in order.  A message over `limit` bytes, a piece out
/// of sequence or a message without a topic is reported once as
/// [`OwnedTransportEvent::Discarded`]; its remaining pieces are skipped.
#[derive(Debug)]
pub struct ChunkAssembler {
    limit: usize,
    topic: String,
    buf: Vec<u8>,
    total: usize,
    skipping: bool,
}

impl ChunkAssembler {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            topic: String::new(),
            buf: Vec::new(),
            total: 0,
            skipping: false,
        }
    }

    /// Feed one piece.  Returns an event once the message is whole or has
    /// been given up on.
    pub fn feed(
        &mut self,
        topic: Option<&str>,
        data: &[u8],
        fragment: Fragment,
    ) -> Option<OwnedTransportEvent> {
        match fragment {
            Fragment::Complete => {
                self.reset();
                match topic {
                    Some(topic) => Some(OwnedTransportEvent::Received {
                        topic: topic.into(),
                        payload: data.to_vec(),
                    }),
                    None => Some(self.discard("topic")),
                }
            }
            Fragment::First { total } => {
                self.reset();
                let Some(topic) = topic else {
                    return Some(self.discard("topic"));
                };
                if total > self.limit {
                    debug!("MQTT: {} bytes on {} over the {} byte cap", total, topic, self.limit);
                    return Some(self.discard("payload"));
                }
                self.topic.push_str(topic);
                self.total = total;
                self.append(data)
            }
            Fragment::Next { offset, total } => {
                if self.skipping {
                    return None;
                }
                if self.total == 0 || total != self.total || offset != self.buf.len() {
                    debug!("MQTT: chunk at {} out of sequence (have {})", offset, self.buf.len());
                    self.reset();
                    return Some(self.discard("payload"));
                }
                self.append(data)
            }
        }
    }

    fn append(&mut self, data: &[u8]) -> Option<OwnedTransportEvent> {
        if self.buf.len() + data.len() > self.total {
            self.reset();
            return Some(self.discard("payload"));
        }
        self.buf.extend_from_slice(data);
        if self.buf.len() < self.total {
            return None;
        }
        self.total = 0;
        Some(OwnedTransportEvent::Received {
            topic: core::mem::take(&mut self.topic),
            payload: core::mem::take(&mut self.buf),
        })
    }

    fn discard(&mut self, field: &'static str) -> OwnedTransportEvent {
        warn!("MQTT: discarding inbound message (bad {})", field);
        self.skipping = true;
        OwnedTransportEvent::Discarded(Error::MalformedReply(field))
    }

    fn reset(&mut self) {
        self.topic.clear();
        self.buf.clear();
        self.total = 0;
        self.skipping = false;
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct MqttAdapter {
    client: esp_idf_svc::mqtt::client::EspMqttClient<'static>,
    events: Receiver<OwnedTransportEvent>,
}

#[cfg(target_os = "espidf")]
impl MqttAdapter {
    const PUMP_STACK_SIZE: usize = 6 * 1024;

    /// Create the client and start its event pump.  The broker connection is
    /// established in the background; [`OwnedTransportEvent::Connected`]
    /// reports it.
    pub fn start(config: &ClientConfig) -> anyhow::Result<Self> {
        use core::time::Duration;
        use esp_idf_svc::mqtt::client::{EspMqttClient, MqttClientConfiguration};

        let broker = &config.broker;
        let conf = MqttClientConfiguration {
            client_id: Some(config.identity.id()),
            username: (!broker.username.is_empty()).then_some(broker.username.as_str()),
            password: (!broker.password.is_empty()).then_some(broker.password.as_str()),
            keep_alive_interval: Some(Duration::from_secs(broker.keepalive_secs.into())),
            disable_clean_session: !broker.clean_session,
            buffer_size: broker.rx_buffer_size,
            ..Default::default()
        };

        let url = broker.url();
        info!("MQTT: starting client {} -> {}", config.identity.id(), url);
        let (client, mut connection) = EspMqttClient::new(&url, &conf)?;

        let mut chunks = ChunkAssembler::new(broker.max_message_size);
        let (tx, events) = mpsc::channel();
        std::thread::Builder::new()
            .name("mqtt-events".into())
            .stack_size(Self::PUMP_STACK_SIZE)
            .spawn(move || {
                while let Ok(event) = connection.next() {
                    if let Some(ev) = convert(&event.payload(), &mut chunks) {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                info!("MQTT: event pump stopped");
            })?;

        Ok(Self { client, events })
    }

    /// Block until the next client event.  `None` once the pump has stopped.
    pub fn next_event(&self) -> Option<OwnedTransportEvent> {
        self.events.recv().ok()
    }
}

#[cfg(target_os = "espidf")]
fn convert(
    payload: &esp_idf_svc::mqtt::client::EventPayload<'_, esp_idf_svc::sys::EspError>,
    chunks: &mut ChunkAssembler,
) -> Option<OwnedTransportEvent> {
    use esp_idf_svc::mqtt::client::{Details, EventPayload};

    match payload {
        EventPayload::Connected(_) => Some(OwnedTransportEvent::Connected),
        EventPayload::Disconnected => Some(OwnedTransportEvent::Disconnected),
        EventPayload::Subscribed(id) => Some(OwnedTransportEvent::Subscribed(*id)),
        EventPayload::Published(id) => Some(OwnedTransportEvent::Published(*id)),
        EventPayload::Received {
            topic,
            data,
            details,
            ..
        } => {
            let fragment = match details {
                Details::Complete => Fragment::Complete,
                Details::InitialChunk(chunk) => Fragment::First {
                    total: chunk.total_data_size,
                },
                Details::SubsequentChunk(chunk) => Fragment::Next {
                    offset: chunk.current_data_offset,
                    total: chunk.total_data_size,
                },
            };
            chunks.feed(*topic, data, fragment)
        }
        EventPayload::Error(e) => {
            warn!("MQTT: client error: {}", e);
            None
        }
        other => {
            debug!("MQTT: {:?}", other);
            None
        }
    }
}

#[cfg(target_os = "espidf")]
impl PubSubTransport for MqttAdapter {
    fn subscribe(&mut self, topic: &str) -> Result<MessageId, TransportError> {
        use esp_idf_svc::mqtt::client::QoS;
        debug!("MQTT: subscribe {}", topic);
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| {
                warn!("MQTT: subscribe {} failed: {}", topic, e);
                TransportError::SubscribeFailed
            })
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<MessageId, TransportError> {
        use esp_idf_svc::mqtt::client::QoS;
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(|e| {
                warn!("MQTT: publish to {} failed: {}", topic, e);
                TransportError::PublishFailed
            })
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Simulation: records every subscribe and publish, hands out increasing
/// message ids, and replays injected events.
#[cfg(not(target_os = "espidf"))]
pub struct MqttAdapter {
    next_id: MessageId,
    subscriptions: Vec<String>,
    published: Vec<(String, Vec<u8>)>,
    injector: Sender<OwnedTransportEvent>,
    events: Receiver<OwnedTransportEvent>,
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    pub fn start(config: &ClientConfig) -> Result<Self, TransportError> {
        info!(
            "MQTT(sim): client {} -> {}",
            config.identity.id(),
            config.broker.url()
        );
        let (injector, events) = mpsc::channel();
        Ok(Self {
            next_id: 1,
            subscriptions: Vec::new(),
            published: Vec::new(),
            injector,
            events,
        })
    }

    /// Next injected event, if any.  Never blocks.
    pub fn next_event(&self) -> Option<OwnedTransportEvent> {
        self.events.try_recv().ok()
    }

    /// Queue an event as if the broker client had produced it.
    pub fn inject(&self, event: OwnedTransportEvent) {
        // The receiver lives in `self`, so the send cannot fail.
        let _ = self.injector.send(event);
    }

    /// Topics subscribed so far, in order.
    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    /// `(topic, payload)` of every publish so far, in order.
    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    fn alloc_msg_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

#[cfg(not(target_os = "espidf"))]
impl PubSubTransport for MqttAdapter {
    fn subscribe(&mut self, topic: &str) -> Result<MessageId, TransportError> {
        debug!("MQTT(sim): subscribe {}", topic);
        self.subscriptions.push(topic.into());
        Ok(self.alloc_msg_id())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<MessageId, TransportError> {
        debug!("MQTT(sim): publish {} bytes to {}", payload.len(), topic);
        self.published.push((topic.into(), payload.to_vec()));
        Ok(self.alloc_msg_id())
    }
}
