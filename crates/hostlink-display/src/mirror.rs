//! Optional local copy-out sink.
//!
//! Independently of the relay protocol, a presented frame can be copied into
//! a plain shared-memory region for a second, read-only viewer. The copy is
//! fed from the same buffer lock/unlock bracket the present path uses and
//! never touches relay state — a mirror failure costs one mirrored frame,
//! nothing else.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

use tracing::warn;

/// The upstream buffer lock/unlock capability.
///
/// `lock` maps the current buffer and returns a guard exposing its pixels;
/// the mapping is released when the guard drops — on every exit path,
/// including errors, so the buffer is never left pinned.
pub trait BufferMapper {
    type Guard<'a>: AsRef<[u8]>
    where
        Self: 'a;

    fn lock(&mut self) -> io::Result<Self::Guard<'_>>;
}

/// A shared-memory region mirroring the most recent frame.
///
/// Maps a caller-supplied descriptor; the mapping is released exactly once,
/// when the mirror is dropped. The descriptor itself stays with the caller.
pub struct ShmMirror {
    ptr: *mut u8,
    len: usize,
}

impl ShmMirror {
    /// Map `len` bytes of `fd` as a shared writable region.
    pub fn map(fd: BorrowedFd<'_>, len: usize) -> io::Result<Self> {
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to map an empty mirror region",
            ));
        }

        // SAFETY: mapping a caller-supplied descriptor with a fresh address
        // chosen by the kernel; the result is checked before use.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            ptr: ptr.cast::<u8>(),
            len,
        })
    }

    /// Size of the mapped region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy one frame into the region. The frame must fit.
    pub fn put_frame(&mut self, pixels: &[u8]) -> io::Result<()> {
        if pixels.len() > self.len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame of {} bytes exceeds mirror region of {} bytes",
                    pixels.len(),
                    self.len
                ),
            ));
        }
        // SAFETY: the region is `len` bytes, the frame fits, and the source
        // slice cannot overlap a MAP_SHARED mapping we own exclusively.
        unsafe {
            std::ptr::copy_nonoverlapping(pixels.as_ptr(), self.ptr, pixels.len());
        }
        Ok(())
    }
}

impl Drop for ShmMirror {
    fn drop(&mut self) {
        // SAFETY: ptr/len are exactly the mapping created in `map`; this is
        // the only place it is unmapped.
        let rc = unsafe { libc::munmap(self.ptr.cast::<libc::c_void>(), self.len) };
        if rc != 0 {
            warn!("failed to unmap mirror region");
        }
    }
}

// SAFETY: the mapping is exclusively owned and all access goes through
// &mut self.
unsafe impl Send for ShmMirror {}

impl std::fmt::Debug for ShmMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShmMirror").field("len", &self.len).finish()
    }
}

/// Lock the current buffer and copy its pixels into the mirror.
///
/// The lock is released when this returns, whether the copy succeeded or
/// not.
pub fn mirror_frame<M: BufferMapper>(mapper: &mut M, mirror: &mut ShmMirror) -> io::Result<()> {
    let guard = mapper.lock()?;
    mirror.put_frame(guard.as_ref())
}
