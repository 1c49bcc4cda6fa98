use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("hostlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: hostlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("sensor socket: {}", hostlink_transport::config::SENSOR_SOCKET);
    println!(
        "display socket: {}",
        hostlink_transport::config::DISPLAY_SOCKET
    );

    Ok(SUCCESS)
}
