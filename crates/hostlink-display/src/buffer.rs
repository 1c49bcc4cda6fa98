use std::os::fd::BorrowedFd;

use bytes::{BufMut, BytesMut};

use crate::error::RelayError;

/// Geometry and format of a relayed buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDescriptor {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixel_format: i32,
}

/// Display geometry as reported by the video driver.
///
/// Supplied by the platform glue; converts into the descriptor sent with
/// every relayed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: i32,
}

impl From<DisplayMode> for BufferDescriptor {
    fn from(mode: DisplayMode) -> Self {
        Self {
            width: mode.width,
            height: mode.height,
            stride: mode.stride,
            pixel_format: mode.format,
        }
    }
}

/// Ceiling on transferable descriptors per handle.
pub const MAX_HANDLE_FDS: usize = 8;

/// Ceiling on plain integer values per handle.
pub const MAX_HANDLE_INTS: usize = 64;

/// Size marker leading the wire header, mirroring the three-int native
/// handle layout the host expects.
const HANDLE_HEADER_BYTES: i32 = 12;

/// Fixed message length before the integer payload: four descriptor fields
/// plus the three-field handle header.
const PRESENT_FIXED_LEN: usize = 7 * 4;

/// An opaque platform buffer handle: transferable descriptors plus plain
/// integer values, both counts fixed at construction.
///
/// The handle *borrows* its descriptors. The relay attaches kernel-made
/// duplicates to the outgoing message and never closes the caller's own
/// descriptors — the caller retains ownership throughout.
#[derive(Debug)]
pub struct BufferHandle<'fd> {
    fds: Vec<BorrowedFd<'fd>>,
    ints: Vec<i32>,
}

impl<'fd> BufferHandle<'fd> {
    /// Build a handle, enforcing the wire ceilings on both counts.
    pub fn new(fds: Vec<BorrowedFd<'fd>>, ints: Vec<i32>) -> Result<Self, RelayError> {
        if fds.len() > MAX_HANDLE_FDS || ints.len() > MAX_HANDLE_INTS {
            return Err(RelayError::HandleTooLarge {
                fds: fds.len(),
                ints: ints.len(),
            });
        }
        Ok(Self { fds, ints })
    }

    pub fn num_fds(&self) -> usize {
        self.fds.len()
    }

    pub fn num_ints(&self) -> usize {
        self.ints.len()
    }

    pub fn fds(&self) -> &[BorrowedFd<'fd>] {
        &self.fds
    }

    pub fn ints(&self) -> &[i32] {
        &self.ints
    }
}

/// Encode one present message.
///
/// Wire format (native byte order — both ends share the machine):
/// ```text
/// ┌─────────────────────────────┬──────────────────────────┬──────────────┐
/// │ width height stride format  │ header  numFds  numInts  │ ints…        │
/// │ u32   u32    u32    i32     │ i32     i32     i32      │ i32 × numInts│
/// └─────────────────────────────┴──────────────────────────┴──────────────┘
/// ```
/// The transferable descriptors are *not* in these bytes; they ride as
/// `SCM_RIGHTS` ancillary data on the same send. There is no length prefix —
/// the embedded counts describe the message.
pub fn encode_present(
    descriptor: &BufferDescriptor,
    handle: &BufferHandle<'_>,
    dst: &mut BytesMut,
) {
    dst.reserve(PRESENT_FIXED_LEN + handle.num_ints() * 4);
    dst.put_u32_ne(descriptor.width);
    dst.put_u32_ne(descriptor.height);
    dst.put_u32_ne(descriptor.stride);
    dst.put_i32_ne(descriptor.pixel_format);
    dst.put_i32_ne(HANDLE_HEADER_BYTES);
    dst.put_i32_ne(handle.num_fds() as i32);
    dst.put_i32_ne(handle.num_ints() as i32);
    for value in handle.ints() {
        dst.put_i32_ne(*value);
    }
}

/// A decoded present message, as seen by the host side.
#[derive(Debug, PartialEq, Eq)]
pub struct PresentMessage {
    pub descriptor: BufferDescriptor,
    /// How many descriptors to expect in the accompanying ancillary data.
    pub num_fds: usize,
    pub ints: Vec<i32>,
}

/// Decode one present message (host side and diagnostics).
///
/// Returns `None` for truncated messages, counts above the wire ceilings, or
/// a header marker that doesn't match the expected layout — the embedded
/// counts are not trusted past the ceilings.
pub fn decode_present(bytes: &[u8]) -> Option<PresentMessage> {
    if bytes.len() < PRESENT_FIXED_LEN {
        return None;
    }

    let mut fields = bytes.chunks_exact(4);
    let mut next_u32 = || -> Option<u32> {
        fields
            .next()
            .map(|chunk| u32::from_ne_bytes(chunk.try_into().expect("4-byte chunk")))
    };

    let width = next_u32()?;
    let height = next_u32()?;
    let stride = next_u32()?;
    let pixel_format = next_u32()? as i32;
    let header = next_u32()? as i32;
    let num_fds = next_u32()? as i32;
    let num_ints = next_u32()? as i32;

    if header != HANDLE_HEADER_BYTES || num_fds < 0 || num_ints < 0 {
        return None;
    }
    let (num_fds, num_ints) = (num_fds as usize, num_ints as usize);
    if num_fds > MAX_HANDLE_FDS || num_ints > MAX_HANDLE_INTS {
        return None;
    }
    if bytes.len() != PRESENT_FIXED_LEN + num_ints * 4 {
        return None;
    }

    let mut ints = Vec::with_capacity(num_ints);
    for _ in 0..num_ints {
        ints.push(next_u32()? as i32);
    }

    Some(PresentMessage {
        descriptor: BufferDescriptor {
            width,
            height,
            stride,
            pixel_format,
        },
        num_fds,
        ints,
    })
}
