//! Unified error types for the Kuzzle IoT client.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! event loop's error handling uniform.  All variants are `Copy` so they can
//! be handed to the [`EventSink`](crate::app::ports::EventSink) and logged
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level client error
// ---------------------------------------------------------------------------

/// Every fallible operation in the client funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The session already owns a transport.
    AlreadyInitialized,
    /// The transport client could not be created.
    OutOfResources,
    /// An operation was attempted without a connected transport.
    TransportUnavailable,
    /// An inbound reply or notification lacks a field or has it ill-typed.
    /// Carries the name of the offending field.
    MalformedReply(&'static str),
    /// A serialized request would exceed its fixed buffer.
    RequestTooLarge,
    /// Application-supplied JSON could not be parsed.
    InvalidDocument,
    /// The transport refused a publish or subscribe.
    Transport(TransportError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "session already initialized"),
            Self::OutOfResources => write!(f, "out of resources"),
            Self::TransportUnavailable => write!(f, "transport unavailable"),
            Self::MalformedReply(field) => write!(f, "malformed message: bad `{field}`"),
            Self::RequestTooLarge => write!(f, "request too large"),
            Self::InvalidDocument => write!(f, "invalid JSON document"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The client rejected the subscribe request.
    SubscribeFailed,
    /// The client rejected the publish request.
    PublishFailed,
    /// The broker connection is down.
    NotConnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Client-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
