//! Sensor polling protocol client.
//!
//! The guest asks the host for virtual motion-sensor readings over a
//! length-prefixed command channel: one `get:accelerometer` per sample slot,
//! one typed reply back. The protocol is deliberately synchronous and
//! single-outstanding-request — sensor data is a polling feed, not a push
//! stream — and the host being absent is a normal condition the client
//! absorbs, not an error it raises.

#[cfg(unix)]
pub mod client;
pub mod error;
pub mod event;
pub mod kind;

#[cfg(unix)]
pub use client::SensorClient;
pub use error::{Result, SensorError};
pub use event::SensorEvent;
pub use kind::SensorKind;
