use clap::{Args, Subcommand};
use hostlink_sensors::SensorKind;
use hostlink_transport::LinkConfig;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod activate;
pub mod doctor;
pub mod poll;
pub mod present;
pub mod set_delay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll the sensor endpoint and print readings.
    Poll(PollArgs),
    /// Enable or disable a sensor on the host.
    Activate(ActivateArgs),
    /// Set the sensor sample delay.
    SetDelay(SetDelayArgs),
    /// Relay a synthetic test-pattern buffer to the display endpoint.
    Present(PresentArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Poll(args) => poll::run(args, config, format),
        Command::Activate(args) => activate::run(args, config),
        Command::SetDelay(args) => set_delay::run(args, config),
        Command::Present(args) => present::run(args, config, format),
        Command::Doctor(args) => doctor::run(args, config, format),
        Command::Version(args) => version::run(args),
    }
}

fn parse_sensor_kind(name: &str) -> Result<SensorKind, String> {
    name.parse()
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Maximum number of readings to request.
    #[arg(long, default_value = "1")]
    pub count: usize,
    /// Sample delay in nanoseconds applied before each reading.
    #[arg(long)]
    pub delay_ns: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ActivateArgs {
    /// Sensor kind (wire name, e.g. `acceleration`).
    #[arg(value_parser = parse_sensor_kind)]
    pub sensor: SensorKind,
    /// Disable the sensor instead of enabling it.
    #[arg(long)]
    pub disable: bool,
}

#[derive(Args, Debug)]
pub struct SetDelayArgs {
    /// Sensor kind (wire name, e.g. `acceleration`).
    #[arg(value_parser = parse_sensor_kind)]
    pub sensor: SensorKind,
    /// Sample delay in nanoseconds.
    pub nanoseconds: i64,
}

#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Buffer width in pixels.
    #[arg(long, default_value = "640")]
    pub width: u32,
    /// Buffer height in pixels.
    #[arg(long, default_value = "480")]
    pub height: u32,
    /// Row stride in pixels. Defaults to the width.
    #[arg(long)]
    pub stride: Option<u32>,
    /// Pixel format identifier.
    #[arg(long, default_value = "1")]
    pub pixel_format: i32,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
