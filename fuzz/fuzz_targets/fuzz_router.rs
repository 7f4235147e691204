//! Fuzz target: `router::route`
//!
//! Feeds arbitrary payloads on both the response topic and a push channel.
//! Routing must never panic, and every error must be a malformed-reply
//! error naming the offending field.
//!
//! cargo fuzz run fuzz_router

#![no_main]

use kuzzle_iot::error::Error;
use kuzzle_iot::protocol::RESPONSE_TOPIC;
use kuzzle_iot::protocol::router::route;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for topic in [RESPONSE_TOPIC, "channel-0"] {
        if let Err(e) = route(RESPONSE_TOPIC, topic, data) {
            assert!(matches!(e, Error::MalformedReply(_)), "unexpected {:?}", e);
        }
    }
});
