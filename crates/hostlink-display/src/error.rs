use hostlink_transport::TransportError;

use crate::status::StatusError;

/// Errors from the buffer relay client.
///
/// The transport-carrying variants mean the channel has already been dropped
/// and the next call will reconnect. None of them is fatal to the caller: a
/// failed present is a dropped frame, nothing more.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The display host is not reachable. Benign — the frame is skipped
    /// without sending anything.
    #[error("display host unavailable: {0}")]
    PeerUnavailable(#[source] TransportError),

    /// Sending the buffer message failed.
    #[error("buffer transfer failed: {0}")]
    TransferFailed(#[source] TransportError),

    /// The status reply failed to arrive or to parse.
    #[error("unexpected status reply: {0}")]
    UnexpectedReply(#[source] StatusError),

    /// The host answered the protocol correctly but declined the buffer.
    /// Logical outcome, not a transport failure: the channel stays open.
    #[error("host rejected buffer")]
    PeerRejected,

    /// Handle counts above the wire ceilings; nothing was sent.
    #[error("buffer handle exceeds wire limits ({fds} fds, {ints} ints)")]
    HandleTooLarge { fds: usize, ints: usize },
}

pub type Result<T> = std::result::Result<T, RelayError>;
