use hostlink_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The command text exceeds what the one-byte prefix can carry.
    #[error("command too long ({len} bytes, max {max})")]
    CommandTooLong { len: usize, max: usize },

    /// Zero-length payloads are never produced on the wire.
    #[error("refusing to frame an empty payload")]
    EmptyPayload,

    /// The payload exceeds the one-byte prefix range.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The peer sent a zero length prefix.
    #[error("invalid length prefix (zero)")]
    InvalidPrefix,

    /// The underlying channel failed; the owning client must reconnect.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
