use hostlink_sensors::SensorClient;
use hostlink_transport::LinkConfig;
use tracing::info;

use crate::cmd::SetDelayArgs;
use crate::exit::{sensor_error, CliResult, SUCCESS};

pub fn run(args: SetDelayArgs, config: &LinkConfig) -> CliResult<i32> {
    let mut client = SensorClient::new(config);
    client
        .set_delay(args.sensor, args.nanoseconds)
        .map_err(|err| sensor_error("set-delay failed", err))?;

    info!(sensor = %args.sensor, nanoseconds = args.nanoseconds, "sample delay requested");
    Ok(SUCCESS)
}
