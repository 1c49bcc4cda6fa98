//! Minimal host-side mock — serves both endpoints for manual exercise.
//!
//! Run with:
//!   cargo run --example mock-host
//!
//! In another terminal:
//!   cargo run --features cli -- poll --count 3
//!   cargo run --features cli -- present --width 320 --height 240

use std::io::Write;
use std::os::unix::net::{UnixListener, UnixStream};

use hostlink::display::{decode_present, MAX_HANDLE_FDS};
use hostlink::frame::{recv_frame, send_frame, strip_terminator};
use hostlink::transport::fdpass::recv_with_fds;
use hostlink::transport::{Channel, LinkConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LinkConfig::default();
    std::fs::create_dir_all(&config.runtime_dir)?;

    // Ensure no stale sockets
    let _ = std::fs::remove_file(config.sensor_endpoint());
    let _ = std::fs::remove_file(config.display_endpoint());

    let sensors = UnixListener::bind(config.sensor_endpoint())?;
    let display = UnixListener::bind(config.display_endpoint())?;
    eprintln!("sensors on {}", config.sensor_endpoint().display());
    eprintln!("display on {}", config.display_endpoint().display());

    let sensor_thread = std::thread::spawn(move || {
        for stream in sensors.incoming().flatten() {
            if let Err(err) = serve_sensor_peer(stream) {
                eprintln!("sensor peer ended: {err}");
            }
        }
    });
    let display_thread = std::thread::spawn(move || {
        for stream in display.incoming().flatten() {
            if let Err(err) = serve_display_peer(stream) {
                eprintln!("display peer ended: {err}");
            }
        }
    });

    let _ = sensor_thread.join();
    let _ = display_thread.join();
    Ok(())
}

/// Answer `get:` commands with a synthetic swaying accelerometer; log the
/// `set:`/`setDelay:` commands a real host would act on.
fn serve_sensor_peer(stream: UnixStream) -> std::io::Result<()> {
    let mut channel = Channel::from(stream);
    let mut tick: u64 = 0;
    loop {
        let payload = match recv_frame(&mut channel) {
            Ok(payload) => payload,
            Err(_) => return Ok(()), // peer gone
        };
        let command = String::from_utf8_lossy(strip_terminator(&payload)).into_owned();

        if command.starts_with("get:") {
            tick += 1;
            let phase = tick as f32 / 8.0;
            let mut reply = format!(
                "acceleration:{:.3}:{:.3}:9.810:{}",
                phase.sin(),
                phase.cos(),
                tick * 1_000_000
            )
            .into_bytes();
            reply.push(0);
            send_frame(&mut channel, &reply).map_err(std::io::Error::other)?;
        } else {
            eprintln!("sensor command: {command}");
        }
    }
}

/// Receive relayed buffers, drain their descriptors, acknowledge each one.
fn serve_display_peer(stream: UnixStream) -> std::io::Result<()> {
    loop {
        let mut buf = [0u8; 1024];
        let (n, fds) = recv_with_fds(&stream, &mut buf, MAX_HANDLE_FDS)?;
        if n == 0 {
            return Ok(()); // peer gone
        }

        match decode_present(&buf[..n]) {
            Some(message) => {
                eprintln!(
                    "frame {}x{} stride {} format {} ({} fds, {} ints)",
                    message.descriptor.width,
                    message.descriptor.height,
                    message.descriptor.stride,
                    message.descriptor.pixel_format,
                    fds.len(),
                    message.ints.len()
                );
                (&stream).write_all(b"OK\0")?;
            }
            None => {
                eprintln!("declining malformed present message ({n} bytes)");
                (&stream).write_all(b"FA\0")?;
            }
        }
        // Received descriptor duplicates drop here.
    }
}
