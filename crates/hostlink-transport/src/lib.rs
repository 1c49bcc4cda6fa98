//! Channel lifecycle management for guest-to-host IPC.
//!
//! Provides the connection primitives both protocol clients build on:
//! - [`Channel`] — one owned, exclusive stream connection to a fixed local
//!   endpoint, with a bounded receive timeout and RAII descriptor cleanup
//! - [`fdpass`] — out-of-band file descriptor transfer (`SCM_RIGHTS`)
//! - [`LinkConfig`] — the well-known endpoint paths and timing policy,
//!   constructed once at process start and passed to each client
//!
//! This is the lowest layer of hostlink. Everything else builds on top of
//! the [`Channel`] type provided here.

pub mod config;
pub mod error;

#[cfg(unix)]
pub mod channel;
#[cfg(unix)]
pub mod fdpass;

#[cfg(unix)]
pub use channel::Channel;
pub use config::LinkConfig;
pub use error::{Result, TransportError};
