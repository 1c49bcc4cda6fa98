use std::fs::File;
use std::io::{self, Write};
use std::os::fd::AsFd;

use hostlink_display::{BufferDescriptor, BufferHandle, RelayClient};
use hostlink_transport::LinkConfig;

use crate::cmd::PresentArgs;
use crate::exit::{io_error, relay_error, CliResult, SUCCESS};
use crate::output::{print_present, OutputFormat, PresentOutput};

const BYTES_PER_PIXEL: usize = 4;

pub fn run(args: PresentArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    let stride = args.stride.unwrap_or(args.width);
    let descriptor = BufferDescriptor {
        width: args.width,
        height: args.height,
        stride,
        pixel_format: args.pixel_format,
    };

    let frame = build_test_frame(&descriptor)
        .map_err(|err| io_error("failed building test buffer", err))?;
    let handle = BufferHandle::new(vec![frame.as_fd()], vec![descriptor.pixel_format])
        .map_err(|err| relay_error("handle rejected", err))?;

    let mut client = RelayClient::new(config);
    client
        .present(&descriptor, &handle)
        .map_err(|err| relay_error("present failed", err))?;

    let output = PresentOutput::new(&descriptor, handle.num_fds(), handle.num_ints(), "accepted");
    print_present(&output, format);
    Ok(SUCCESS)
}

/// A buffer the host can map: an anonymous memory file holding a simple
/// gradient test pattern.
fn build_test_frame(descriptor: &BufferDescriptor) -> io::Result<File> {
    let mut file = create_frame_file()?;

    let row_bytes = descriptor.stride as usize * BYTES_PER_PIXEL;
    let mut row = vec![0u8; row_bytes];
    for y in 0..descriptor.height {
        let shade = (y * 255 / descriptor.height.max(1)) as u8;
        for pixel in row.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel[0] = shade;
            pixel[1] = 255 - shade;
            pixel[2] = 128;
            pixel[3] = 255;
        }
        file.write_all(&row)?;
    }
    file.flush()?;
    Ok(file)
}

#[cfg(target_os = "linux")]
fn create_frame_file() -> io::Result<File> {
    use std::os::fd::FromRawFd;

    // SAFETY: memfd_create with a static NUL-terminated name; the returned
    // descriptor is wrapped immediately and owned by the File.
    let fd = unsafe { libc::memfd_create(c"hostlink-frame".as_ptr(), libc::MFD_CLOEXEC) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` is a fresh descriptor not owned elsewhere.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// No memfd outside Linux; an unlinked temp file gives the same lifetime.
#[cfg(not(target_os = "linux"))]
fn create_frame_file() -> io::Result<File> {
    let path = std::env::temp_dir().join(format!(
        "hostlink-frame-{}-{}.bin",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    let file = File::options()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&path)?;
    let _ = std::fs::remove_file(&path);
    Ok(file)
}
