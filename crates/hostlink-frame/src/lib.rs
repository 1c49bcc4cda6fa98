//! One-byte length-prefixed command framing.
//!
//! Every message on the sensor channel is framed as a single length byte
//! followed by that many payload bytes. Commands additionally carry a
//! trailing NUL terminator which is counted by the prefix and stripped by the
//! peer. The prefix is never zero: an empty frame cannot be produced, and a
//! received zero prefix is a protocol violation.
//!
//! The codec performs no retries and owns no reconnection policy — every
//! failure propagates to the owning client, which drops and replaces its
//! channel.

pub mod codec;
pub mod error;

#[cfg(unix)]
pub mod exchange;

pub use codec::{
    decode_frame, encode_command, encode_frame, strip_terminator, MAX_COMMAND_LEN, MAX_PAYLOAD,
    PREFIX_SIZE,
};
pub use error::{FrameError, Result};

#[cfg(unix)]
pub use exchange::{recv_frame, send_command, send_frame};
