//! Guest-to-host delegation over local Unix sockets.
//!
//! hostlink lets a constrained guest environment hand two kinds of work to a
//! host process: polling virtual motion-sensor readings, and relaying
//! rendered graphics buffers by handle — descriptors and all — for the host
//! to composite.
//!
//! # Crate Structure
//!
//! - [`transport`] — channel lifecycle, descriptor passing, endpoint config
//! - [`frame`] — one-byte length-prefixed command framing
//! - [`sensors`] — sensor polling protocol client
//! - [`display`] — buffer handle relay client and shared-memory mirror

/// Re-export transport types.
pub mod transport {
    pub use hostlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use hostlink_frame::*;
}

/// Re-export sensor polling types.
pub mod sensors {
    pub use hostlink_sensors::*;
}

/// Re-export buffer relay types.
pub mod display {
    pub use hostlink_display::*;
}
