use std::path::PathBuf;
use std::time::Duration;

/// Endpoint locations and timing policy shared by both protocol clients.
///
/// Built once at process start and passed by reference into each client.
/// Replaces any notion of process-wide registration state: two clients with
/// different configs are two fully independent links.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Directory the host publishes its sockets under.
    pub runtime_dir: PathBuf,
    /// Receive timeout applied to every channel on connect. Bounds the
    /// worst-case stall of a single blocking call.
    pub recv_timeout: Duration,
    /// Sleep applied after a failed connect attempt, before the error is
    /// returned. Throttles lazy reconnection while the host is absent.
    pub connect_backoff: Duration,
}

/// Socket file name for the sensor polling endpoint.
pub const SENSOR_SOCKET: &str = "sensors.sock";

/// Socket file name for the buffer relay endpoint.
pub const DISPLAY_SOCKET: &str = "display.sock";

impl LinkConfig {
    /// Config rooted at `runtime_dir` with default timing policy.
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            ..Self::default()
        }
    }

    /// Path of the sensor polling endpoint.
    pub fn sensor_endpoint(&self) -> PathBuf {
        self.runtime_dir.join(SENSOR_SOCKET)
    }

    /// Path of the buffer relay endpoint.
    pub fn display_endpoint(&self) -> PathBuf {
        self.runtime_dir.join(DISPLAY_SOCKET)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            runtime_dir: PathBuf::from("/tmp/hostlink"),
            recv_timeout: Duration::from_secs(1),
            connect_backoff: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_derive_from_runtime_dir() {
        let config = LinkConfig::new("/run/guest");
        assert_eq!(config.sensor_endpoint(), PathBuf::from("/run/guest/sensors.sock"));
        assert_eq!(config.display_endpoint(), PathBuf::from("/run/guest/display.sock"));
    }

    #[test]
    fn default_timing_policy() {
        let config = LinkConfig::default();
        assert_eq!(config.recv_timeout, Duration::from_secs(1));
        assert_eq!(config.connect_backoff, Duration::from_millis(100));
    }
}
