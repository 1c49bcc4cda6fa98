use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix size: a single byte.
pub const PREFIX_SIZE: usize = 1;

/// Maximum payload length representable by the one-byte prefix.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Maximum command text length. One byte of the payload range is reserved
/// for the trailing terminator.
pub const MAX_COMMAND_LEN: usize = MAX_PAYLOAD - 1;

/// Encode a raw payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────┬──────────────────┐
/// │ Length (1B) │ Payload          │
/// │ 1..=255     │ (Length bytes)   │
/// └─────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.is_empty() {
        return Err(FrameError::EmptyPayload);
    }
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(PREFIX_SIZE + payload.len());
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    Ok(())
}

/// Encode a command into the wire format.
///
/// The prefix equals `command.len() + 1`: the payload is the command text
/// plus a trailing NUL the peer is expected to strip.
pub fn encode_command(command: &str, dst: &mut BytesMut) -> Result<()> {
    if command.len() > MAX_COMMAND_LEN {
        return Err(FrameError::CommandTooLong {
            len: command.len(),
            max: MAX_COMMAND_LEN,
        });
    }
    dst.reserve(PREFIX_SIZE + command.len() + 1);
    dst.put_u8((command.len() + 1) as u8);
    dst.put_slice(command.as_bytes());
    dst.put_u8(0);
    Ok(())
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Bytes>> {
    if src.is_empty() {
        return Ok(None); // Need more data
    }

    let payload_len = src[0] as usize;
    if payload_len == 0 {
        return Err(FrameError::InvalidPrefix);
    }
    if src.len() < PREFIX_SIZE + payload_len {
        return Ok(None); // Need more data
    }

    src.advance(PREFIX_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Strip the trailing NUL terminator from a received payload, if present.
pub fn strip_terminator(payload: &[u8]) -> &[u8] {
    match payload.split_last() {
        Some((0, rest)) => rest,
        _ => payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip_all_lengths() {
        for len in 1..=MAX_PAYLOAD {
            let payload = vec![0x5Au8; len];
            let mut buf = BytesMut::new();
            encode_frame(&payload, &mut buf).unwrap();

            assert_eq!(buf[0] as usize, len);
            assert_eq!(buf.len(), PREFIX_SIZE + len);

            let decoded = decode_frame(&mut buf).unwrap().unwrap();
            assert_eq!(decoded.as_ref(), payload.as_slice());
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn command_prefix_counts_terminator() {
        for len in 0..=MAX_COMMAND_LEN {
            let command = "g".repeat(len);
            let mut buf = BytesMut::new();
            encode_command(&command, &mut buf).unwrap();

            assert_eq!(buf[0] as usize, len + 1);
            assert_eq!(&buf[PREFIX_SIZE..PREFIX_SIZE + len], command.as_bytes());
            assert_eq!(buf[PREFIX_SIZE + len], 0);
        }
    }

    #[test]
    fn command_roundtrips_through_decode_and_strip() {
        let mut buf = BytesMut::new();
        encode_command("get:accelerometer", &mut buf).unwrap();

        let payload = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(strip_terminator(payload.as_ref()), b"get:accelerometer");
    }

    #[test]
    fn empty_payload_rejected() {
        let mut buf = BytesMut::new();
        let err = encode_frame(b"", &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::EmptyPayload));
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(&payload, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
    }

    #[test]
    fn oversized_command_rejected() {
        let command = "x".repeat(MAX_COMMAND_LEN + 1);
        let mut buf = BytesMut::new();
        let err = encode_command(&command, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::CommandTooLong { .. }));
    }

    #[test]
    fn decode_incomplete_frame_needs_more_data() {
        let mut buf = BytesMut::from(&[5u8, b'a', b'b'][..]);
        let result = decode_frame(&mut buf).unwrap();
        assert!(result.is_none());
        // Nothing consumed until the frame is whole.
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn decode_zero_prefix_is_violation() {
        let mut buf = BytesMut::from(&[0u8, b'x'][..]);
        let result = decode_frame(&mut buf);
        assert!(matches!(result, Err(FrameError::InvalidPrefix)));
    }

    #[test]
    fn decode_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(b"first", &mut buf).unwrap();
        encode_frame(b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf).unwrap().unwrap();
        let f2 = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(f1.as_ref(), b"first");
        assert_eq!(f2.as_ref(), b"second");
        assert!(buf.is_empty());
    }

    #[test]
    fn strip_terminator_leaves_bare_payloads_alone() {
        assert_eq!(strip_terminator(b"plain"), b"plain");
        assert_eq!(strip_terminator(b"nul\0"), b"nul");
        assert_eq!(strip_terminator(b""), b"");
    }
}
