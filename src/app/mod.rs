//! Application core: session logic, zero I/O.
//!
//! This module holds the Kuzzle session: bootstrap orchestration, reply
//! correlation and push delivery.  All interaction with the broker happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without a network.

pub mod callbacks;
pub mod events;
pub mod inbound;
pub mod ports;
pub mod session;
