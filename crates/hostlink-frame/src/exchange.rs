//! Blocking frame exchange over a [`Channel`].
//!
//! One command, one reply — no pipelining, no correlation. Each client
//! serializes its own calls, so the synchronous discipline here is the whole
//! concurrency model.

use bytes::BytesMut;
use hostlink_transport::Channel;
use tracing::trace;

use crate::codec::{encode_command, encode_frame, PREFIX_SIZE};
use crate::error::{FrameError, Result};

/// Frame and send a raw payload.
pub fn send_frame(channel: &mut Channel, payload: &[u8]) -> Result<()> {
    let mut buf = BytesMut::with_capacity(PREFIX_SIZE + payload.len());
    encode_frame(payload, &mut buf)?;
    channel.send_all(&buf)?;
    Ok(())
}

/// Frame and send a command, with the trailing terminator the peer strips.
pub fn send_command(channel: &mut Channel, command: &str) -> Result<()> {
    trace!(command, "sending command");
    let mut buf = BytesMut::with_capacity(PREFIX_SIZE + command.len() + 1);
    encode_command(command, &mut buf)?;
    channel.send_all(&buf)?;
    Ok(())
}

/// Receive one frame: the length prefix, then exactly that many bytes.
///
/// A short or failed read on either step is a hard channel failure.
pub fn recv_frame(channel: &mut Channel) -> Result<Vec<u8>> {
    let mut prefix = [0u8; PREFIX_SIZE];
    channel.recv_exact(&mut prefix)?;

    let payload_len = prefix[0] as usize;
    if payload_len == 0 {
        return Err(FrameError::InvalidPrefix);
    }

    let mut payload = vec![0u8; payload_len];
    channel.recv_exact(&mut payload)?;
    Ok(payload)
}
