use std::path::PathBuf;

/// Errors that can occur on a guest-to-host channel.
///
/// Every variant here is a transport failure: the owning client must drop its
/// channel on any of these and reconnect lazily on the next call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create the stream socket.
    #[error("failed to create socket: {0}")]
    SocketCreateFailed(#[source] std::io::Error),

    /// Failed to connect to the host endpoint.
    #[error("failed to connect to {path}: {source}")]
    ConnectFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A send on the channel failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// A receive on the channel failed (including receive-timeout expiry).
    #[error("receive failed: {0}")]
    RecvFailed(#[source] std::io::Error),

    /// The peer closed the connection before a full message arrived.
    #[error("short read ({got} of {wanted} bytes)")]
    ShortRead { wanted: usize, got: usize },

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
