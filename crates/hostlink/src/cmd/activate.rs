use hostlink_sensors::SensorClient;
use hostlink_transport::LinkConfig;
use tracing::info;

use crate::cmd::ActivateArgs;
use crate::exit::{sensor_error, CliResult, SUCCESS};

pub fn run(args: ActivateArgs, config: &LinkConfig) -> CliResult<i32> {
    let enabled = !args.disable;
    let mut client = SensorClient::new(config);
    client
        .activate(args.sensor, enabled)
        .map_err(|err| sensor_error("activate failed", err))?;

    // Fire-and-forget: the command is on its way (or will be reapplied once
    // the host shows up).
    info!(sensor = %args.sensor, enabled, "sensor state requested");
    Ok(SUCCESS)
}
