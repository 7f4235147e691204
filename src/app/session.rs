//! Kuzzle session, the hexagonal core.
//!
//! [`Session`] owns the transport handle, the bootstrap state and the
//! application callbacks.  Transport events are fed in one at a time via
//! [`Session::handle_event`]; each runs to completion (routing, state
//! transition, outbound requests, callbacks) before the next.
//!
//! ```text
//!  TransportEvent ──▶ ┌──────────────────────────┐ ──▶ PubSubTransport
//!                     │         Session           │
//!    app calls   ──▶  │ router · bootstrap · push │ ──▶ callbacks / EventSink
//!                     └──────────────────────────┘
//! ```
//!
//! Inbound failures never escape `handle_event`: they are logged, reported as
//! [`SessionEvent::MessageDropped`] and the message is discarded.

use core::fmt::Display;

use log::{debug, info, warn};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::fsm::{self, Action, BootstrapState, Input};
use crate::protocol::notify::Notification;
use crate::protocol::request;
use crate::protocol::router::{self, Reply, Routed};
use crate::protocol::RequestFrame;

use super::callbacks::Callbacks;
use super::events::SessionEvent;
use super::inbound::TransportEvent;
use super::ports::{EventSink, MessageId, PubSubTransport};

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

/// The one client session of the process.
pub struct Session<'a, T: PubSubTransport> {
    config: &'a ClientConfig,
    transport: Option<T>,
    bootstrap: BootstrapState,
    /// Id of the reply-topic subscribe whose confirmation starts the chain.
    reply_suback: Option<MessageId>,
    callbacks: Callbacks<'a>,
}

impl<'a, T: PubSubTransport> Session<'a, T> {
    /// Create a session for `config`.
    ///
    /// No transport yet; call [`initialize`](Self::initialize) next.
    pub fn new(config: &'a ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            bootstrap: BootstrapState::Disconnected,
            reply_suback: None,
            callbacks: Callbacks::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate the configuration and create the transport with `connect`.
    ///
    /// The transport reports its connection later as
    /// [`TransportEvent::Connected`], which starts the bootstrap.
    pub fn initialize<F, E>(&mut self, connect: F) -> Result<()>
    where
        F: FnOnce(&ClientConfig) -> core::result::Result<T, E>,
        E: Display,
    {
        debug!("Initialising Kuzzle session");

        if self.transport.is_some() {
            warn!("Kuzzle session already initialized");
            return Err(Error::AlreadyInitialized);
        }
        self.config.validate()?;

        match connect(self.config) {
            Ok(transport) => {
                self.transport = Some(transport);
                info!(
                    "Kuzzle session for {} ({}) -> {}",
                    self.config.identity.id(),
                    self.config.identity.device_type(),
                    self.config.broker.url()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Transport start failed: {}", e);
                Err(Error::OutOfResources)
            }
        }
    }

    // ── Callback registration ─────────────────────────────────

    /// Called with the whole notification when this device's state changes.
    pub fn on_device_state_changed(&mut self, f: impl FnMut(&Value) + 'a) {
        self.callbacks.set_device_state_changed(f);
    }

    /// Called with the firmware document when an update is announced or found.
    pub fn on_firmware_update(&mut self, f: impl FnMut(&Value) + 'a) {
        self.callbacks.set_firmware_update(f);
    }

    /// Called once per connection when every subscription is in place.
    pub fn on_connected(&mut self, f: impl FnMut() + 'a) {
        self.callbacks.set_connected(f);
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Process one transport event to completion.
    pub fn handle_event(&mut self, event: TransportEvent<'_>, sink: &mut impl EventSink) {
        match event {
            TransportEvent::Connected => {
                info!("MQTT: connected");
                self.reply_suback = None;
                self.step(Input::Connected, sink);
            }
            TransportEvent::Disconnected => {
                info!("MQTT: disconnected");
                self.reply_suback = None;
                self.step(Input::Disconnected, sink);
            }
            TransportEvent::Subscribed(id) if self.reply_suback == Some(id) => {
                debug!("MQTT: reply topic subscribed (msg {})", id);
                self.reply_suback = None;
                self.step(Input::TransportSubscribed, sink);
            }
            TransportEvent::Subscribed(id) => {
                debug!("MQTT: subscribed (msg {})", id);
            }
            TransportEvent::Published(id) => {
                debug!("MQTT: published (msg {})", id);
            }
            TransportEvent::Received { topic, payload } => {
                debug!("MQTT: data from {}: {}", topic, String::from_utf8_lossy(payload));
                self.on_message(topic, payload, sink);
            }
            TransportEvent::Discarded(e) => {
                debug!("MQTT: inbound message discarded: {}", e);
                sink.emit(&SessionEvent::MessageDropped(e));
            }
        }
    }

    fn on_message(&mut self, topic: &str, payload: &[u8], sink: &mut impl EventSink) {
        match router::route(&self.config.response_topic, topic, payload) {
            Ok(Routed::Reply(reply)) => self.on_reply(reply, sink),
            Ok(Routed::Notification(n)) => self.on_notification(&n),
            Ok(Routed::UnknownCollection) => {
                debug!("PUSH | from unsubscribed collection on {}, ignored", topic);
                sink.emit(&SessionEvent::UnknownCollection);
            }
            Err(e) => {
                warn!("Dropping message on {}: {}", topic, e);
                sink.emit(&SessionEvent::MessageDropped(e));
            }
        }
    }

    fn on_reply(&mut self, reply: Reply, sink: &mut impl EventSink) {
        match reply {
            Reply::Rejected { request_id, status } => {
                warn!("REPLY | {} failed with status {}", request_id, status);
                sink.emit(&SessionEvent::ReplyRejected { request_id, status });
            }
            Reply::OwnStateSubscribed { channel } => {
                info!("REPLY | own state subscription on {}", channel);
                self.step(Input::OwnStateAccepted(&channel), sink);
            }
            Reply::FirmwareSubscribed { channel } => {
                info!("REPLY | firmware subscription on {}", channel);
                self.step(Input::FirmwareAccepted(&channel), sink);
            }
            Reply::FirmwareQuery(Some(doc)) => {
                info!("REPLY | firmware query found an update");
                self.callbacks.firmware_update(&doc);
            }
            Reply::FirmwareQuery(None) => {
                warn!("REPLY | no info found about available firmware");
                sink.emit(&SessionEvent::FirmwareQueryEmpty);
            }
            Reply::Unknown { request_id } => {
                debug!("REPLY | untracked request id {}, ignored", request_id);
                sink.emit(&SessionEvent::UnknownRequestId(request_id));
            }
        }
    }

    fn on_notification(&mut self, notification: &Notification) {
        match notification {
            Notification::DeviceState(doc) => {
                debug!("PUSH | device state changed");
                self.callbacks.device_state_changed(doc);
            }
            Notification::FirmwareUpdate(doc) => {
                debug!("PUSH | firmware update pushed");
                self.callbacks.firmware_update(doc);
            }
        }
    }

    // ── Bootstrap ─────────────────────────────────────────────

    fn step(&mut self, input: Input<'_>, sink: &mut impl EventSink) {
        let t = fsm::transition(self.bootstrap, input);

        for &to in &t.path {
            let from = self.bootstrap;
            info!("BOOT | {} -> {}", from, to);
            self.bootstrap = to;
            sink.emit(&SessionEvent::BootstrapChanged { from, to });
        }

        for &action in &t.actions {
            if let Err(e) = self.perform(action, sink) {
                warn!("BOOT | {:?} failed: {}", action, e);
                sink.emit(&SessionEvent::MessageDropped(e));
            }
        }
    }

    fn perform(&mut self, action: Action<'_>, sink: &mut impl EventSink) -> Result<()> {
        let config = self.config;
        match action {
            Action::SubscribeResponseTopic => {
                let id = self.transport_mut()?.subscribe(&config.response_topic)?;
                self.reply_suback = Some(id);
            }
            Action::RequestOwnStateSubscription => self.subscribe_own_state()?,
            Action::RequestFirmwareSubscription => self.subscribe_firmware_updates()?,
            Action::SubscribeChannel(channel) => {
                self.transport_mut()?.subscribe(channel)?;
            }
            Action::NotifyReady => {
                info!("BOOT | complete");
                sink.emit(&SessionEvent::BootstrapComplete);
                self.callbacks.connected();
            }
        }
        Ok(())
    }

    // ── Outbound operations ───────────────────────────────────

    /// Publish this device's state.  `state_json` must be a JSON document.
    pub fn publish_device_state(&mut self, state_json: &str) -> Result<()> {
        let state: &RawValue = match serde_json::from_str(state_json) {
            Ok(v) => v,
            Err(e) => {
                warn!("Device state is not valid JSON: {}", e);
                return Err(Error::InvalidDocument);
            }
        };
        let frame = request::create_device_state(&self.config.index, &self.config.identity, state);
        self.send("device state", frame)
    }

    /// Subscribe to state changes addressed to this device.
    pub fn subscribe_own_state(&mut self) -> Result<()> {
        debug!("Subscribing to own state: {}", self.config.identity.id());
        let frame = request::subscribe_own_state(&self.config.index, &self.config.identity);
        self.send("own state subscription", frame)
    }

    /// Subscribe to firmware announcements for this device type.
    pub fn subscribe_firmware_updates(&mut self) -> Result<()> {
        debug!("Subscribing to fw update {}", self.config.identity.device_type());
        let frame = request::subscribe_firmware_updates(&self.config.index, &self.config.identity);
        self.send("firmware subscription", frame)
    }

    /// Ask for the newest firmware for this device type.  The answer, if any,
    /// goes to the firmware update callback.
    pub fn query_firmware_update(&mut self) -> Result<()> {
        let frame = request::search_latest_firmware(&self.config.index, &self.config.identity);
        self.send("firmware query", frame)
    }

    fn send(&mut self, what: &str, frame: Result<RequestFrame>) -> Result<()> {
        let config = self.config;
        let result = frame.and_then(|frame| {
            let transport = self.transport_mut()?;
            debug!("Publishing msg: {}", String::from_utf8_lossy(&frame));
            transport.publish(&config.request_topic, &frame)?;
            Ok(())
        });
        if let Err(e) = result {
            warn!("{} not sent: {}", what, e);
        }
        result
    }

    fn transport_mut(&mut self) -> Result<&mut T> {
        match self.transport.as_mut() {
            Some(t) if self.bootstrap != BootstrapState::Disconnected => Ok(t),
            _ => Err(Error::TransportUnavailable),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn device_id(&self) -> &str {
        self.config.identity.id()
    }

    pub fn bootstrap_state(&self) -> BootstrapState {
        self.bootstrap
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// The owned transport, if initialized.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }
}
