use crate::kind::SensorKind;

/// Logical errors returned by the sensor client.
///
/// Transport failures never surface here: they invalidate the channel and
/// degrade to "no data this tick" inside the client.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// The kind has no producer; only acceleration is wired up.
    #[error("unsupported sensor kind: {0}")]
    UnsupportedSensor(SensorKind),
}

pub type Result<T> = std::result::Result<T, SensorError>;
