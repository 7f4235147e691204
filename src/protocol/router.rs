//! Inbound message classification.
//!
//! A message on the response topic is a *reply*: it must carry an integer
//! `status` and a string `requestId`, and is matched against the closed
//! [`RequestToken`] set.  Anything on another topic is a *push*
//! notification, handed to [`notify::classify`].
//!
//! Routing is pure: it decodes and classifies but performs no I/O.  The
//! session acts on the returned [`Routed`] value.

use serde_json::Value;

use super::fields::{array_field, decode, field, int_field, object_field, str_field};
use super::notify::{self, Notification};
use super::{RequestToken, STATUS_OK};
use crate::error::{Error, Result};

/// A reply on the response topic.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Non-success status.  Never acted upon, whatever the request.
    Rejected { request_id: String, status: i64 },
    /// The own-state subscription was accepted; pushes will arrive on `channel`.
    OwnStateSubscribed { channel: String },
    /// The firmware-update subscription was accepted.
    FirmwareSubscribed { channel: String },
    /// Result of the firmware search; `None` when nothing matched.
    FirmwareQuery(Option<Value>),
    /// Success reply to a request this client does not track.
    Unknown { request_id: String },
}

/// Outcome of routing one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Reply(Reply),
    Notification(Notification),
    /// Push from a collection the client never subscribed to.
    UnknownCollection,
}

/// Classify a message received on `topic`.
///
/// `response_topic` is the configured reply topic; comparison is exact.
pub fn route(response_topic: &str, topic: &str, payload: &[u8]) -> Result<Routed> {
    let doc = decode(payload)?;

    if topic == response_topic {
        parse_reply(&doc).map(Routed::Reply)
    } else {
        Ok(match notify::classify(doc)? {
            Some(n) => Routed::Notification(n),
            None => Routed::UnknownCollection,
        })
    }
}

fn parse_reply(doc: &Value) -> Result<Reply> {
    let status = int_field(doc, "status")?;
    let request_id = str_field(doc, "requestId")?;

    if status != STATUS_OK {
        return Ok(Reply::Rejected {
            request_id: request_id.into(),
            status,
        });
    }

    match RequestToken::from_wire(request_id) {
        Some(RequestToken::SubscribeOwnState) => Ok(Reply::OwnStateSubscribed {
            channel: parse_channel(doc)?,
        }),
        Some(RequestToken::SubscribeFirmware) => Ok(Reply::FirmwareSubscribed {
            channel: parse_channel(doc)?,
        }),
        Some(RequestToken::FirmwareQuery) => parse_firmware_search(doc).map(Reply::FirmwareQuery),
        None => Ok(Reply::Unknown {
            request_id: request_id.into(),
        }),
    }
}

fn parse_channel(doc: &Value) -> Result<String> {
    let result = object_field(doc, "result")?;
    Ok(str_field(result, "channel")?.into())
}

fn parse_firmware_search(doc: &Value) -> Result<Option<Value>> {
    let result = object_field(doc, "result")?;
    if int_field(result, "total")? < 1 {
        return Ok(None);
    }
    let hits = array_field(result, "hits")?;
    let first = hits.first().ok_or(Error::MalformedReply("hits"))?;
    Ok(Some(field(first, "_source")?.clone()))
}
