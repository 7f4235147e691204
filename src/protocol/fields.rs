//! Typed field extraction from decoded documents.
//!
//! Each accessor fails with [`Error::MalformedReply`] naming the field, so a
//! reply with a missing or ill-typed field is dropped instead of being
//! dereferenced blindly.

use serde_json::Value;

use crate::error::{Error, Result};

pub(crate) fn decode(payload: &[u8]) -> Result<Value> {
    serde_json::from_slice(payload).map_err(|_| Error::MalformedReply("payload"))
}

pub(crate) fn field<'v>(doc: &'v Value, name: &'static str) -> Result<&'v Value> {
    doc.get(name).ok_or(Error::MalformedReply(name))
}

pub(crate) fn str_field<'v>(doc: &'v Value, name: &'static str) -> Result<&'v str> {
    field(doc, name)?
        .as_str()
        .ok_or(Error::MalformedReply(name))
}

pub(crate) fn int_field(doc: &Value, name: &'static str) -> Result<i64> {
    field(doc, name)?
        .as_i64()
        .ok_or(Error::MalformedReply(name))
}

/// Nested object; the returned value is guaranteed to be an object.
pub(crate) fn object_field<'v>(doc: &'v Value, name: &'static str) -> Result<&'v Value> {
    let v = field(doc, name)?;
    if v.is_object() {
        Ok(v)
    } else {
        Err(Error::MalformedReply(name))
    }
}

pub(crate) fn array_field<'v>(doc: &'v Value, name: &'static str) -> Result<&'v [Value]> {
    field(doc, name)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or(Error::MalformedReply(name))
}
