use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hostlink_display::BufferDescriptor;
use hostlink_sensors::SensorEvent;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput {
    sensor: &'static str,
    x: f32,
    y: f32,
    z: f32,
    timestamp_ns: i64,
}

impl From<&SensorEvent> for EventOutput {
    fn from(event: &SensorEvent) -> Self {
        match *event {
            SensorEvent::Acceleration {
                x,
                y,
                z,
                timestamp_ns,
            } => Self {
                sensor: event.kind().name(),
                x,
                y,
                z,
                timestamp_ns,
            },
        }
    }
}

pub fn print_events(events: &[SensorEvent], format: OutputFormat) {
    let rows: Vec<EventOutput> = events.iter().map(EventOutput::from).collect();
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENSOR", "X", "Y", "Z", "TIMESTAMP (ns)"]);
            for row in &rows {
                table.add_row(vec![
                    row.sensor.to_string(),
                    format!("{:.3}", row.x),
                    format!("{:.3}", row.y),
                    format!("{:.3}", row.z),
                    row.timestamp_ns.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!(
                    "{} x={:.3} y={:.3} z={:.3} t={}ns",
                    row.sensor, row.x, row.y, row.z, row.timestamp_ns
                );
            }
        }
    }
}

#[derive(Serialize)]
pub struct PresentOutput {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixel_format: i32,
    pub num_fds: usize,
    pub num_ints: usize,
    pub status: &'static str,
}

impl PresentOutput {
    pub fn new(
        descriptor: &BufferDescriptor,
        num_fds: usize,
        num_ints: usize,
        status: &'static str,
    ) -> Self {
        Self {
            width: descriptor.width,
            height: descriptor.height,
            stride: descriptor.stride,
            pixel_format: descriptor.pixel_format,
            num_fds,
            num_ints,
            status,
        }
    }
}

pub fn print_present(output: &PresentOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SIZE", "STRIDE", "FORMAT", "FDS", "INTS", "STATUS"])
                .add_row(vec![
                    format!("{}x{}", output.width, output.height),
                    output.stride.to_string(),
                    output.pixel_format.to_string(),
                    output.num_fds.to_string(),
                    output.num_ints.to_string(),
                    output.status.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{}x{} stride={} format={} fds={} ints={} status={}",
                output.width,
                output.height,
                output.stride,
                output.pixel_format,
                output.num_fds,
                output.num_ints,
                output.status
            );
        }
    }
}
