//! Fuzz target: `Session::handle_event`
//!
//! Brings a simulated session up to its pending own-state step, then feeds
//! the input as a reply and as a push.  The session must absorb anything
//! without panicking, and must never regress below the pending step.
//!
//! cargo fuzz run fuzz_session

#![no_main]

use kuzzle_iot::adapters::mqtt::MqttAdapter;
use kuzzle_iot::app::events::SessionEvent;
use kuzzle_iot::app::inbound::TransportEvent;
use kuzzle_iot::app::ports::EventSink;
use kuzzle_iot::app::session::Session;
use kuzzle_iot::config::{BrokerConfig, ClientConfig};
use kuzzle_iot::fsm::BootstrapState;
use kuzzle_iot::identity::DeviceIdentity;
use kuzzle_iot::protocol::RESPONSE_TOPIC;
use libfuzzer_sys::fuzz_target;

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &SessionEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(identity) = DeviceIdentity::new("fuzz-01", "k-fuzz") else {
        return;
    };
    let mut broker = BrokerConfig::default();
    let _ = broker.host.push_str("localhost");
    let config = ClientConfig::new(identity, broker);

    let mut session = Session::new(&config);
    if session.initialize(MqttAdapter::start).is_err() {
        return;
    }
    let mut sink = NullSink;
    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);

    for topic in [RESPONSE_TOPIC, "channel-0"] {
        session.handle_event(TransportEvent::Received { topic, payload: data }, &mut sink);
    }
    assert_ne!(session.bootstrap_state(), BootstrapState::Disconnected);
});
