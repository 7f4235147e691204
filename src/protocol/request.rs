//! Request envelope builder.
//!
//! Wire format (one JSON object per MQTT message):
//! ```text
//! {"index":..,"collection":..,"controller":..,"action":..,"requestId":..,"body":{..}}
//! ```
//! `requestId` is omitted when the caller does not need the reply.
//!
//! Every builder serializes into a fixed [`RequestFrame`]; a request that does
//! not fit fails with [`Error::RequestTooLarge`] and nothing is truncated.

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{Value, json};

use super::{
    COLLECTION_DEVICE_STATE, COLLECTION_FW_UPDATES, CONTROLLER_DOCUMENT, CONTROLLER_REALTIME,
    DOCUMENT_MAX_SIZE, RequestFrame, RequestToken,
};
use crate::error::{Error, Result};
use crate::identity::DeviceIdentity;

/// Addressing and payload of one Kuzzle request.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a, B: Serialize> {
    pub index: &'a str,
    pub collection: &'a str,
    pub controller: &'a str,
    pub action: &'a str,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<&'a str>,
    pub body: B,
}

impl<B: Serialize> Request<'_, B> {
    /// Serialize into a bounded frame.
    pub fn encode(&self) -> Result<RequestFrame> {
        let bytes = serde_json::to_vec(self).map_err(|_| Error::InvalidDocument)?;
        RequestFrame::from_slice(&bytes).map_err(|()| Error::RequestTooLarge)
    }
}

/// Body of a `document:create` in the device-state collection.  The state is
/// embedded byte-for-byte as the application supplied it.
#[derive(Debug, Serialize)]
struct DeviceStateBody<'a> {
    device_id: &'a str,
    device_type: &'a str,
    state: &'a RawValue,
}

/// `document:create` of a state document in the device-state collection.
pub fn create_device_state(
    index: &str,
    identity: &DeviceIdentity,
    state: &RawValue,
) -> Result<RequestFrame> {
    if state.get().len() > DOCUMENT_MAX_SIZE {
        return Err(Error::RequestTooLarge);
    }
    Request {
        index,
        collection: COLLECTION_DEVICE_STATE,
        controller: CONTROLLER_DOCUMENT,
        action: "create",
        request_id: None,
        body: DeviceStateBody {
            device_id: identity.id(),
            device_type: identity.device_type(),
            state,
        },
    }
    .encode()
}

/// `realtime:subscribe` on `collection` with a Koncorde `filter`.
pub fn subscribe(
    index: &str,
    collection: &str,
    token: RequestToken,
    filter: &Value,
) -> Result<RequestFrame> {
    ensure_document_fits(filter)?;
    Request {
        index,
        collection,
        controller: CONTROLLER_REALTIME,
        action: "subscribe",
        request_id: Some(token.as_str()),
        body: filter,
    }
    .encode()
}

/// Subscription to state changes addressed to this device.
pub fn subscribe_own_state(index: &str, identity: &DeviceIdentity) -> Result<RequestFrame> {
    let filter = json!({ "equals": { "device_id": identity.id() } });
    subscribe(
        index,
        COLLECTION_DEVICE_STATE,
        RequestToken::SubscribeOwnState,
        &filter,
    )
}

/// Subscription to firmware announcements targeting this device type.
pub fn subscribe_firmware_updates(index: &str, identity: &DeviceIdentity) -> Result<RequestFrame> {
    let filter = json!({ "equals": { "target": identity.device_type() } });
    subscribe(
        index,
        COLLECTION_FW_UPDATES,
        RequestToken::SubscribeFirmware,
        &filter,
    )
}

/// `document:search` for the newest firmware document for this device type.
pub fn search_latest_firmware(index: &str, identity: &DeviceIdentity) -> Result<RequestFrame> {
    Request {
        index,
        collection: COLLECTION_FW_UPDATES,
        controller: CONTROLLER_DOCUMENT,
        action: "search",
        request_id: Some(RequestToken::FirmwareQuery.as_str()),
        body: json!({
            "size": 1,
            "query": { "match": { "target.keyword": identity.device_type() } },
            "sort": { "_kuzzle_info.createdAt": { "order": "desc" } },
        }),
    }
    .encode()
}

fn ensure_document_fits(doc: &Value) -> Result<()> {
    let len = serde_json::to_vec(doc)
        .map_err(|_| Error::InvalidDocument)?
        .len();
    if len > DOCUMENT_MAX_SIZE {
        return Err(Error::RequestTooLarge);
    }
    Ok(())
}
