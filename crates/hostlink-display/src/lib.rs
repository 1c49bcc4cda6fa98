//! Buffer handle relay protocol client.
//!
//! Once per rendered frame, the guest hands the host a buffer *by handle*:
//! one message carrying the buffer's geometry, the handle's structural
//! header and its plain integer values, with the handle's file descriptors
//! attached as `SCM_RIGHTS` ancillary data on the same send. The host maps
//! the descriptors and composites the pixels without a copy ever crossing
//! the socket. A fixed 3-byte status reply closes each exchange.
//!
//! A missed frame is never fatal: the host being absent or a channel failing
//! degrades to a dropped frame, and the next present reconnects.

#[cfg(unix)]
pub mod buffer;
pub mod error;
pub mod status;

#[cfg(unix)]
pub mod mirror;
#[cfg(unix)]
pub mod relay;

#[cfg(unix)]
pub use buffer::{
    decode_present, encode_present, BufferDescriptor, BufferHandle, DisplayMode, PresentMessage,
    MAX_HANDLE_FDS, MAX_HANDLE_INTS,
};
pub use error::{RelayError, Result};
pub use status::{Status, StatusError, STATUS_LEN};

#[cfg(unix)]
pub use mirror::{mirror_frame, BufferMapper, ShmMirror};
#[cfg(unix)]
pub use relay::RelayClient;
