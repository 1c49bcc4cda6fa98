use hostlink_frame::strip_terminator;

use crate::kind::SensorKind;

/// One sensor reading, parsed from a reply payload and consumed immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SensorEvent {
    /// Reply pattern: `acceleration:<x>:<y>:<z>:<timestamp>`.
    Acceleration {
        x: f32,
        y: f32,
        z: f32,
        /// Host-side timestamp in nanoseconds.
        timestamp_ns: i64,
    },
}

impl SensorEvent {
    /// The kind this event belongs to.
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorEvent::Acceleration { .. } => SensorKind::Acceleration,
        }
    }

    /// Parse a reply payload.
    ///
    /// Returns `None` for anything that does not match the acceleration
    /// pattern exactly: wrong tag, missing fields, trailing fields, or
    /// unparseable numbers.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(strip_terminator(payload)).ok()?;
        let mut fields = text.split(':');

        if fields.next()? != SensorKind::Acceleration.name() {
            return None;
        }
        let x = fields.next()?.parse().ok()?;
        let y = fields.next()?.parse().ok()?;
        let z = fields.next()?.parse().ok()?;
        let timestamp_ns = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }

        Some(SensorEvent::Acceleration {
            x,
            y,
            z,
            timestamp_ns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_acceleration_reply() {
        let event = SensorEvent::parse(b"acceleration:1.0:2.0:3.0:1000").unwrap();
        assert_eq!(
            event,
            SensorEvent::Acceleration {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                timestamp_ns: 1000
            }
        );
    }

    #[test]
    fn parses_terminated_reply() {
        let event = SensorEvent::parse(b"acceleration:-0.5:9.81:0:42\0").unwrap();
        assert_eq!(
            event,
            SensorEvent::Acceleration {
                x: -0.5,
                y: 9.81,
                z: 0.0,
                timestamp_ns: 42
            }
        );
    }

    #[test]
    fn rejects_wrong_tag() {
        assert_eq!(SensorEvent::parse(b"orientation:1:2:3:4"), None);
    }

    #[test]
    fn rejects_missing_and_trailing_fields() {
        assert_eq!(SensorEvent::parse(b"acceleration:1:2:3"), None);
        assert_eq!(SensorEvent::parse(b"acceleration:1:2:3:4:5"), None);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert_eq!(SensorEvent::parse(b"acceleration:a:b:c:d"), None);
        assert_eq!(SensorEvent::parse(b"acceleration:1:2:3:4.5"), None);
    }

    #[test]
    fn rejects_non_utf8() {
        assert_eq!(SensorEvent::parse(&[0xFF, 0xFE, 0x00]), None);
    }
}
