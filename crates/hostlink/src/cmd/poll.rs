use hostlink_sensors::{SensorClient, SensorKind};
use hostlink_transport::LinkConfig;
use tracing::info;

use crate::cmd::PollArgs;
use crate::exit::{sensor_error, CliResult, SUCCESS};
use crate::output::{print_events, OutputFormat};

pub fn run(args: PollArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    let mut client = SensorClient::new(config);
    if let Some(delay) = args.delay_ns {
        client
            .set_delay(SensorKind::Acceleration, delay)
            .map_err(|err| sensor_error("set delay failed", err))?;
    }

    let events = client.poll(args.count);
    if events.is_empty() {
        info!("no readings this tick (sensor host absent or quiet)");
    }
    print_events(&events, format);

    // An empty result is a normal tick, not a failure.
    Ok(SUCCESS)
}
