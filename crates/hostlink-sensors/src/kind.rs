//! The fixed sensor identifier table.
//!
//! Five slots, matching the host's name table one-for-one. Only acceleration
//! currently has a producer; the other four are reserved identifiers kept so
//! the numbering stays stable when they gain one.

/// A class of motion/environment sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Acceleration,
    MagneticField,
    Orientation,
    Temperature,
    Proximity,
}

impl SensorKind {
    /// All kinds, in identifier order.
    pub const ALL: [SensorKind; 5] = [
        SensorKind::Acceleration,
        SensorKind::MagneticField,
        SensorKind::Orientation,
        SensorKind::Temperature,
        SensorKind::Proximity,
    ];

    /// The wire name used in `set:`/`setDelay:` commands and reply tags.
    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Acceleration => "acceleration",
            SensorKind::MagneticField => "magnetic-field",
            SensorKind::Orientation => "orientation",
            SensorKind::Temperature => "temperature",
            SensorKind::Proximity => "proximity",
        }
    }

    /// Look up a kind by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether this kind currently has a producer on the host side.
    pub fn is_supported(self) -> bool {
        matches!(self, SensorKind::Acceleration)
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown sensor kind: {s}"))
    }
}
