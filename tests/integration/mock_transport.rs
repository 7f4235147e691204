//! Mock broker transport for integration tests.
//!
//! Records every subscribe and publish so tests can assert on the full
//! outbound history.  The record is shared through an `Rc` so the test keeps
//! a handle after the session has taken ownership of the transport.

use std::cell::RefCell;
use std::rc::Rc;

use kuzzle_iot::app::events::SessionEvent;
use kuzzle_iot::app::ports::{EventSink, MessageId, PubSubTransport};
use kuzzle_iot::error::TransportError;
use serde_json::Value;

// ── Transport call record ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Subscribe(String),
    /// Publish with the payload decoded back to a document.
    Publish { topic: String, body: Value },
}

#[derive(Debug, Default)]
pub struct Record {
    pub calls: Vec<TransportCall>,
    pub fail_subscribe: bool,
    pub fail_publish: bool,
    /// Publish payloads exactly as sent.
    pub raw: Vec<Vec<u8>>,
    next_id: MessageId,
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockTransport {
    record: Rc<RefCell<Record>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.record.borrow().calls.clone()
    }

    pub fn clear(&self) {
        let mut r = self.record.borrow_mut();
        r.calls.clear();
        r.raw.clear();
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.record.borrow_mut().fail_subscribe = fail;
    }

    pub fn fail_publish(&self, fail: bool) {
        self.record.borrow_mut().fail_publish = fail;
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Subscribe(t) => Some(t),
                TransportCall::Publish { .. } => None,
            })
            .collect()
    }

    /// Bodies of every publish, in order.
    pub fn published(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Publish { body, .. } => Some(body),
                TransportCall::Subscribe(_) => None,
            })
            .collect()
    }

    /// Payloads of every publish as text, in order.
    pub fn published_text(&self) -> Vec<String> {
        self.record
            .borrow()
            .raw
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }

    fn alloc_msg_id(record: &mut Record) -> MessageId {
        record.next_id += 1;
        record.next_id
    }
}

impl PubSubTransport for MockTransport {
    fn subscribe(&mut self, topic: &str) -> Result<MessageId, TransportError> {
        let mut r = self.record.borrow_mut();
        if r.fail_subscribe {
            return Err(TransportError::SubscribeFailed);
        }
        r.calls.push(TransportCall::Subscribe(topic.into()));
        Ok(Self::alloc_msg_id(&mut r))
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<MessageId, TransportError> {
        let mut r = self.record.borrow_mut();
        if r.fail_publish {
            return Err(TransportError::PublishFailed);
        }
        let body = serde_json::from_slice(payload).expect("session published invalid JSON");
        r.raw.push(payload.to_vec());
        r.calls.push(TransportCall::Publish {
            topic: topic.into(),
            body,
        });
        Ok(Self::alloc_msg_id(&mut r))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SessionEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &SessionEvent) -> bool {
        self.events.contains(event)
    }

    pub fn dropped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SessionEvent::MessageDropped(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

use kuzzle_iot::config::{BrokerConfig, ClientConfig};
use kuzzle_iot::identity::DeviceIdentity;
use serde_json::json;

pub const DEVICE_ID: &str = "a4cf12ab34cd";
pub const DEVICE_TYPE: &str = "k-light";

pub fn make_config() -> ClientConfig {
    let mut broker = BrokerConfig::default();
    let _ = broker.host.push_str("broker.test");
    ClientConfig::new(DeviceIdentity::new(DEVICE_ID, DEVICE_TYPE).unwrap(), broker)
}

/// Encoded reply on the response topic.
pub fn reply(request_id: &str, status: i64, result: Value) -> Vec<u8> {
    json!({"status": status, "requestId": request_id, "result": result})
        .to_string()
        .into_bytes()
}

/// Encoded success reply to a subscribe request.
pub fn channel_reply(request_id: &str, channel: &str) -> Vec<u8> {
    reply(request_id, 200, json!({"channel": channel}))
}
