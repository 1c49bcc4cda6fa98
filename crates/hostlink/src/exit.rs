use std::fmt;
use std::io;

use hostlink_display::{RelayError, StatusError};
use hostlink_sensors::SensorError;
use hostlink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::ConnectFailed { source, .. } => io_error(context, source),
        TransportError::RecvFailed(source)
            if matches!(
                source.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) =>
        {
            CliError::new(TIMEOUT, format!("{context}: receive timed out"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn sensor_error(context: &str, err: SensorError) -> CliError {
    match err {
        SensorError::UnsupportedSensor(_) => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

pub fn relay_error(context: &str, err: RelayError) -> CliError {
    match err {
        RelayError::PeerUnavailable(source) => transport_error(context, source),
        RelayError::TransferFailed(source) => transport_error(context, source),
        RelayError::UnexpectedReply(StatusError::Transport(source)) => {
            transport_error(context, source)
        }
        RelayError::UnexpectedReply(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        RelayError::PeerRejected => CliError::new(FAILURE, format!("{context}: {err}")),
        RelayError::HandleTooLarge { .. } => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_timeout_maps_to_timeout_code() {
        let err = TransportError::RecvFailed(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(transport_error("poll", err).code, TIMEOUT);
    }

    #[test]
    fn unsupported_sensor_maps_to_usage_code() {
        let err = SensorError::UnsupportedSensor(hostlink_sensors::SensorKind::Proximity);
        assert_eq!(sensor_error("activate", err).code, USAGE);
    }

    #[test]
    fn rejection_maps_to_plain_failure() {
        assert_eq!(relay_error("present", RelayError::PeerRejected).code, FAILURE);
    }
}
