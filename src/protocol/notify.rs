//! Push notification dispatch.
//!
//! Each realtime subscription is made once per collection, so the
//! `collection` field alone identifies which subscription a push belongs to.
//!
//! A state change is handed over as the whole notification, a firmware push
//! as only the `result._source` document it announces.

use serde_json::Value;

use super::fields::{field, object_field, str_field};
use super::{COLLECTION_DEVICE_STATE, COLLECTION_FW_UPDATES};
use crate::error::Result;

/// A push notification matched to one of the client's subscriptions.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The whole notification body.
    DeviceState(Value),
    /// The announced firmware document (`result._source`).
    FirmwareUpdate(Value),
}

/// Match a decoded push to a subscription.
///
/// `Ok(None)` for a collection the client never subscribed to.
pub fn classify(mut doc: Value) -> Result<Option<Notification>> {
    let collection = str_field(&doc, "collection")?;

    if collection == COLLECTION_DEVICE_STATE {
        Ok(Some(Notification::DeviceState(doc)))
    } else if collection == COLLECTION_FW_UPDATES {
        let result = object_field(&doc, "result")?;
        field(result, "_source")?;
        let source = doc["result"]["_source"].take();
        Ok(Some(Notification::FirmwareUpdate(source)))
    } else {
        Ok(None)
    }
}
