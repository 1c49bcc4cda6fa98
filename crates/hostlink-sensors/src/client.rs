use std::time::Duration;

use hostlink_frame::{recv_frame, send_command};
use hostlink_transport::{Channel, LinkConfig};
use tracing::{debug, warn};

use crate::error::{Result, SensorError};
use crate::event::SensorEvent;
use crate::kind::SensorKind;

/// The one command the poll loop issues per sample slot.
const GET_ACCELEROMETER: &str = "get:accelerometer";

/// Client side of the sensor polling protocol.
///
/// Owns one channel to the sensor endpoint, (re)established lazily: the first
/// call after any failure reconnects, and the host being absent simply means
/// no data this tick. The configured sample delay is applied as a sleep
/// before each reported sample, as a crude rate limiter.
pub struct SensorClient {
    config: LinkConfig,
    channel: Option<Channel>,
    delay_ns: i64,
}

impl SensorClient {
    /// Create a client for the sensor endpoint described by `config`.
    ///
    /// No connection is made here; the first poll or command connects.
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            config: config.clone(),
            channel: None,
            delay_ns: 0,
        }
    }

    /// Poll up to `max_events` readings.
    ///
    /// Each slot costs one command/reply exchange. The call returns whatever
    /// arrived before the first failure: an unparseable reply or a transport
    /// error truncates the sequence, and the host being absent yields an
    /// empty one. A short result is valid — the caller just has fewer events
    /// this tick and tries again on the next.
    pub fn poll(&mut self, max_events: usize) -> Vec<SensorEvent> {
        let mut events = Vec::new();
        if !self.ensure_connected() {
            return events;
        }

        for _ in 0..max_events {
            if self.delay_ns > 0 {
                std::thread::sleep(Duration::from_micros((self.delay_ns / 1000) as u64));
            }

            let Some(channel) = self.channel.as_mut() else {
                break;
            };
            let payload = match request_sample(channel) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "sensor exchange failed, dropping channel");
                    self.channel = None;
                    break;
                }
            };

            match SensorEvent::parse(&payload) {
                Some(event) => events.push(event),
                None => {
                    warn!(
                        reply = %String::from_utf8_lossy(&payload),
                        "unsupported sensor reply"
                    );
                    break;
                }
            }
        }

        events
    }

    /// Enable or disable a sensor.
    ///
    /// Kinds without a producer are rejected before any socket traffic. The
    /// write itself is fire-and-forget and optimistically successful even
    /// with the host absent — the desired state is reapplied once it comes
    /// back.
    pub fn activate(&mut self, kind: SensorKind, enabled: bool) -> Result<()> {
        if !kind.is_supported() {
            return Err(SensorError::UnsupportedSensor(kind));
        }
        let command = format!("set:{}:{}", kind.name(), u8::from(enabled));
        self.send_best_effort(&command);
        Ok(())
    }

    /// Set the sample delay, in nanoseconds.
    ///
    /// The delay is stored regardless of kind and paces every future poll;
    /// only supported kinds are additionally announced to the host,
    /// fire-and-forget.
    pub fn set_delay(&mut self, kind: SensorKind, nanoseconds: i64) -> Result<()> {
        self.delay_ns = nanoseconds;
        if !kind.is_supported() {
            return Err(SensorError::UnsupportedSensor(kind));
        }
        let command = format!("setDelay:{}:{nanoseconds}", kind.name());
        self.send_best_effort(&command);
        Ok(())
    }

    /// Currently configured sample delay in nanoseconds.
    pub fn delay_ns(&self) -> i64 {
        self.delay_ns
    }

    /// Whether a channel to the host is currently open.
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    fn ensure_connected(&mut self) -> bool {
        if self.channel.is_none() {
            match Channel::connect(self.config.sensor_endpoint(), &self.config) {
                Ok(channel) => self.channel = Some(channel),
                Err(err) => {
                    debug!(%err, "sensor host not reachable");
                    return false;
                }
            }
        }
        true
    }

    fn send_best_effort(&mut self, command: &str) {
        if !self.ensure_connected() {
            return;
        }
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        if let Err(err) = send_command(channel, command) {
            warn!(%err, command, "sensor command dropped, dropping channel");
            self.channel = None;
        }
    }
}

impl std::fmt::Debug for SensorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorClient")
            .field("connected", &self.channel.is_some())
            .field("delay_ns", &self.delay_ns)
            .finish()
    }
}

/// One command/reply exchange on an open channel.
fn request_sample(channel: &mut Channel) -> hostlink_frame::Result<Vec<u8>> {
    send_command(channel, GET_ACCELEROMETER)?;
    recv_frame(channel)
}
