//! Integration tests for the connect → subscribe → ready sequence.
//!
//! Drives a [`Session`] over a [`MockTransport`] one transport event at a
//! time and checks the outbound traffic after every step.

use std::cell::Cell;

use kuzzle_iot::app::events::SessionEvent;
use kuzzle_iot::app::inbound::TransportEvent;
use kuzzle_iot::app::session::Session;
use kuzzle_iot::error::{Error, TransportError};
use kuzzle_iot::fsm::BootstrapState;
use kuzzle_iot::protocol::{REQUEST_TOPIC, RESPONSE_TOPIC};
use serde_json::json;

use crate::mock_transport::{
    channel_reply, make_config, reply, MockTransport, RecordingSink, TransportCall, DEVICE_ID,
    DEVICE_TYPE,
};

fn received<'a>(payload: &'a [u8]) -> TransportEvent<'a> {
    TransportEvent::Received {
        topic: RESPONSE_TOPIC,
        payload,
    }
}

fn start<'a>(
    config: &'a kuzzle_iot::config::ClientConfig,
    mock: &MockTransport,
) -> Session<'a, MockTransport> {
    let mut session = Session::new(config);
    let handle = mock.clone();
    session
        .initialize(move |_| Ok::<_, TransportError>(handle))
        .unwrap();
    session
}

// ── Connect ───────────────────────────────────────────────────

#[test]
fn connect_only_subscribes_reply_topic() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);

    assert_eq!(
        mock.calls(),
        vec![TransportCall::Subscribe(RESPONSE_TOPIC.into())]
    );
    assert_eq!(
        session.bootstrap_state(),
        BootstrapState::ResponseChannelPending
    );
}

#[test]
fn reply_topic_confirmation_requests_own_state_subscription() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    mock.clear();
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    let TransportCall::Publish { topic, body } = &calls[0] else {
        panic!("expected a publish, got {:?}", calls[0]);
    };
    assert_eq!(topic, REQUEST_TOPIC);
    assert_eq!(body["controller"], "realtime");
    assert_eq!(body["action"], "subscribe");
    assert_eq!(body["collection"], "device-state");
    assert_eq!(body["requestId"], "sub_state");
    assert_eq!(body["body"], json!({"equals": {"device_id": DEVICE_ID}}));
    assert_eq!(session.bootstrap_state(), BootstrapState::OwnStateSubPending);
    assert!(sink.contains(&SessionEvent::BootstrapChanged {
        from: BootstrapState::ResponseChannelPending,
        to: BootstrapState::ResponseChannelReady,
    }));
}

#[test]
fn unrelated_suback_does_not_advance() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    mock.clear();
    session.handle_event(TransportEvent::Subscribed(99), &mut sink);

    assert!(mock.calls().is_empty());
    assert_eq!(
        session.bootstrap_state(),
        BootstrapState::ResponseChannelPending
    );

    // The matching confirmation still starts the chain.
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    assert_eq!(session.bootstrap_state(), BootstrapState::OwnStateSubPending);
}

#[test]
fn suback_from_previous_connection_is_ignored() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Disconnected, &mut sink);
    session.handle_event(TransportEvent::Connected, &mut sink);
    mock.clear();

    // Id 1 belonged to the first connection; this one subscribed with id 2.
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    assert!(mock.calls().is_empty());
    assert_eq!(
        session.bootstrap_state(),
        BootstrapState::ResponseChannelPending
    );

    session.handle_event(TransportEvent::Subscribed(2), &mut sink);
    assert_eq!(session.bootstrap_state(), BootstrapState::OwnStateSubPending);
}

#[test]
fn own_state_reply_subscribes_channel_then_requests_firmware_subscription() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    mock.clear();
    session.handle_event(received(&channel_reply("sub_state", "X")), &mut sink);

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], TransportCall::Subscribe("X".into()));
    let TransportCall::Publish { body, .. } = &calls[1] else {
        panic!("expected a publish, got {:?}", calls[1]);
    };
    assert_eq!(body["collection"], "fw-updates");
    assert_eq!(body["requestId"], "subfw_update");
    assert_eq!(body["body"], json!({"equals": {"target": DEVICE_TYPE}}));

    assert!(sink.contains(&SessionEvent::BootstrapChanged {
        from: BootstrapState::OwnStateSubPending,
        to: BootstrapState::OwnStateSubReady,
    }));
    assert_eq!(session.bootstrap_state(), BootstrapState::FwUpdateSubPending);
}

#[test]
fn full_sequence_notifies_once() {
    let config = make_config();
    let mock = MockTransport::new();
    let connected = Cell::new(0);
    let mut session = start(&config, &mock);
    session.on_connected(|| connected.set(connected.get() + 1));
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    session.handle_event(received(&channel_reply("sub_state", "ch-state")), &mut sink);
    session.handle_event(TransportEvent::Subscribed(2), &mut sink);
    assert_eq!(connected.get(), 0);
    session.handle_event(received(&channel_reply("subfw_update", "ch-fw")), &mut sink);
    session.handle_event(TransportEvent::Subscribed(3), &mut sink);

    assert_eq!(connected.get(), 1);
    assert!(session.bootstrap_state().is_ready());
    assert_eq!(
        mock.subscriptions(),
        vec![RESPONSE_TOPIC.to_string(), "ch-state".into(), "ch-fw".into()]
    );
    assert_eq!(mock.published().len(), 2);
    assert!(sink.contains(&SessionEvent::BootstrapComplete));
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn rejected_bootstrap_reply_stalls_without_requests() {
    let config = make_config();
    let mock = MockTransport::new();
    let connected = Cell::new(false);
    let mut session = start(&config, &mock);
    session.on_connected(|| connected.set(true));
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    mock.clear();
    session.handle_event(received(&reply("sub_state", 500, json!(null))), &mut sink);

    assert!(mock.calls().is_empty());
    assert!(!connected.get());
    assert_eq!(session.bootstrap_state(), BootstrapState::OwnStateSubPending);
    assert!(session.bootstrap_state().is_pending());
    assert!(sink.contains(&SessionEvent::ReplyRejected {
        request_id: "sub_state".into(),
        status: 500,
    }));
}

#[test]
fn out_of_order_reply_does_not_skip_steps() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    mock.clear();
    // Firmware reply arrives while the own-state step is still pending.
    session.handle_event(received(&channel_reply("subfw_update", "ch-fw")), &mut sink);

    assert_eq!(mock.calls(), vec![TransportCall::Subscribe("ch-fw".into())]);
    assert_eq!(session.bootstrap_state(), BootstrapState::OwnStateSubPending);
}

#[test]
fn failed_publish_is_reported_and_not_fatal() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    mock.fail_publish(true);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);

    assert!(sink.contains(&SessionEvent::MessageDropped(Error::Transport(
        TransportError::PublishFailed
    ))));
    assert_eq!(session.bootstrap_state(), BootstrapState::OwnStateSubPending);
}

// ── Disconnect / reconnect ────────────────────────────────────

#[test]
fn disconnect_resets_and_reconnect_restarts_from_top() {
    let config = make_config();
    let mock = MockTransport::new();
    let connected = Cell::new(0);
    let mut session = start(&config, &mock);
    session.on_connected(|| connected.set(connected.get() + 1));
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Subscribed(1), &mut sink);
    session.handle_event(received(&channel_reply("sub_state", "a")), &mut sink);
    session.handle_event(TransportEvent::Disconnected, &mut sink);
    assert_eq!(session.bootstrap_state(), BootstrapState::Disconnected);

    // Stale reply from the old connection is ignored.
    mock.clear();
    session.handle_event(received(&channel_reply("subfw_update", "b")), &mut sink);
    assert!(mock.calls().is_empty());

    session.handle_event(TransportEvent::Connected, &mut sink);
    assert_eq!(
        mock.calls(),
        vec![TransportCall::Subscribe(RESPONSE_TOPIC.into())]
    );
    // Ids 1 to 4 went to the first connection.
    session.handle_event(TransportEvent::Subscribed(5), &mut sink);
    session.handle_event(received(&channel_reply("sub_state", "a2")), &mut sink);
    session.handle_event(received(&channel_reply("subfw_update", "b2")), &mut sink);

    assert_eq!(connected.get(), 1);
    assert!(session.bootstrap_state().is_ready());
}

#[test]
fn operations_while_disconnected_are_unavailable() {
    let config = make_config();
    let mock = MockTransport::new();
    let mut session = start(&config, &mock);
    let mut sink = RecordingSink::new();

    session.handle_event(TransportEvent::Connected, &mut sink);
    session.handle_event(TransportEvent::Disconnected, &mut sink);
    mock.clear();

    assert_eq!(
        session.query_firmware_update(),
        Err(Error::TransportUnavailable)
    );
    assert_eq!(
        session.publish_device_state("{}"),
        Err(Error::TransportUnavailable)
    );
    assert!(mock.calls().is_empty());
}
