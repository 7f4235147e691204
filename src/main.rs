//! Kuzzle IoT client: main entry point (ESP-IDF only).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  MqttAdapter            LogEventSink       device_id     │
//! │  (PubSubTransport)      (EventSink)        (eFuse MAC)   │
//! │                                                          │
//! │  ────────────── Port Trait Boundary ──────────────       │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │            Session (pure logic)                │      │
//! │  │  router · bootstrap FSM · callbacks            │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Broker and WiFi settings are baked in at build time from the
//! `KUZZLE_*` and `WIFI_*` environment variables.
#![deny(unused_must_use)]

use core::cell::Cell;

use anyhow::{anyhow, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use kuzzle_iot::adapters::device_id;
use kuzzle_iot::adapters::log_sink::LogEventSink;
use kuzzle_iot::adapters::mqtt::MqttAdapter;
use kuzzle_iot::app::session::Session;
use kuzzle_iot::config::{BrokerConfig, ClientConfig};
use kuzzle_iot::identity::DeviceIdentity;

const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const KUZZLE_HOST: &str = match option_env!("KUZZLE_HOST") {
    Some(s) => s,
    None => "kuzzle.local",
};
const KUZZLE_USER: &str = match option_env!("KUZZLE_USER") {
    Some(s) => s,
    None => "",
};
const KUZZLE_PASS: &str = match option_env!("KUZZLE_PASS") {
    Some(s) => s,
    None => "",
};
const DEVICE_TYPE: &str = match option_env!("KUZZLE_DEVICE_TYPE") {
    Some(s) => s,
    None => "k-generic",
};

/// State reported once every subscription is in place.
const ONLINE_STATE: &str = r#"{"status":"online"}"#;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Kuzzle IoT client v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. WiFi station ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID.try_into().map_err(|_| anyhow!("WiFi SSID too long"))?,
        password: WIFI_PASS.try_into().map_err(|_| anyhow!("WiFi password too long"))?,
        auth_method: if WIFI_PASS.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("WiFi up: {}", WIFI_SSID);

    // ── 3. Client configuration ───────────────────────────────
    let dev_id = device_id::device_id(&device_id::read_mac());
    let identity = DeviceIdentity::new(&dev_id, DEVICE_TYPE)?;

    let mut broker = BrokerConfig::default();
    broker.host = KUZZLE_HOST.try_into().map_err(|_| anyhow!("broker host too long"))?;
    broker.username = KUZZLE_USER.try_into().map_err(|_| anyhow!("username too long"))?;
    broker.password = KUZZLE_PASS.try_into().map_err(|_| anyhow!("password too long"))?;
    let config = ClientConfig::new(identity, broker);

    // ── 4. Session ────────────────────────────────────────────
    let ready = Cell::new(false);
    let mut sink = LogEventSink::new();
    let mut session = Session::new(&config);

    session.on_device_state_changed(|doc| info!("Device state changed: {}", doc));
    session.on_firmware_update(|doc| info!("Firmware update available: {}", doc));
    session.on_connected(|| ready.set(true));
    session.initialize(MqttAdapter::start)?;

    info!("Device {} ready. Entering event loop.", session.device_id());

    // ── 5. Event loop ─────────────────────────────────────────
    while let Some(event) = session.transport().and_then(MqttAdapter::next_event) {
        session.handle_event(event.as_event(), &mut sink);

        if ready.take() {
            if let Err(e) = session.publish_device_state(ONLINE_STATE) {
                warn!("Initial state not published: {}", e);
            }
            if let Err(e) = session.query_firmware_update() {
                warn!("Firmware query not sent: {}", e);
            }
        }
    }

    warn!("MQTT event stream ended");
    Ok(())
}
