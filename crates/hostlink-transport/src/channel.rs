use std::io::{ErrorKind, Read};
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};

/// Maximum socket path length.
/// Unix `sockaddr_un.sun_path` is 108 bytes on Linux, 104 on macOS; one byte
/// is reserved for the NUL terminator.
#[cfg(target_os = "linux")]
const MAX_PATH_LEN: usize = 107;
#[cfg(not(target_os = "linux"))]
const MAX_PATH_LEN: usize = 103;

#[cfg(target_os = "linux")]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(target_os = "linux"))]
const SEND_FLAGS: libc::c_int = 0;

/// One owned, exclusive stream connection to a host endpoint.
///
/// The underlying descriptor is released exactly once, when the `Channel` is
/// dropped. Clients hold `Option<Channel>`: any send/receive error means
/// "drop and replace" — the failed channel is discarded and the next logical
/// operation establishes a fresh one. A `Channel` is never retried mid-call.
pub struct Channel {
    stream: UnixStream,
}

impl Channel {
    /// Connect to a listening host endpoint (blocking).
    ///
    /// On success the configured receive timeout is applied, bounding every
    /// later blocking receive. On connect failure the call sleeps the
    /// configured backoff before returning the error, so a caller that
    /// reconnects lazily on every tick does not hammer a dead endpoint.
    pub fn connect(path: impl AsRef<Path>, config: &LinkConfig) -> Result<Self> {
        let path = path.as_ref();
        let fd = create_stream_socket()?;

        if let Err(err) = connect_fd(&fd, path) {
            std::thread::sleep(config.connect_backoff);
            return Err(err);
        }

        let stream = UnixStream::from(fd);
        if let Err(err) = stream.set_read_timeout(Some(config.recv_timeout)) {
            // The channel still works without it; only the stall bound is lost.
            warn!(?path, %err, "failed to set receive timeout on channel");
        }

        debug!(?path, "channel connected");
        Ok(Self { stream })
    }

    /// Send all of `bytes`, retrying short writes.
    ///
    /// Uses `MSG_NOSIGNAL` so a peer closing mid-write surfaces as
    /// [`TransportError::SendFailed`] instead of terminating the process.
    pub fn send_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            let remaining = &bytes[offset..];
            // SAFETY: pointer and length describe the live `remaining` slice,
            // and the descriptor is an open socket owned by `self.stream`.
            let n = unsafe {
                libc::send(
                    self.stream.as_raw_fd(),
                    remaining.as_ptr().cast::<libc::c_void>(),
                    remaining.len(),
                    SEND_FLAGS,
                )
            };
            if n < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                return Err(TransportError::SendFailed(err));
            }
            offset += n as usize;
        }
        Ok(())
    }

    /// Receive exactly `buf.len()` bytes.
    ///
    /// A clean peer close mid-message is reported as
    /// [`TransportError::ShortRead`]; anything else (including expiry of the
    /// receive timeout) as [`TransportError::RecvFailed`].
    pub fn recv_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::ShortRead {
                        wanted: buf.len(),
                        got: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::RecvFailed(err)),
            }
        }
        Ok(())
    }

    /// Send `bytes` with `fds` attached as `SCM_RIGHTS` ancillary data, in a
    /// single atomic `sendmsg`.
    ///
    /// The descriptors are borrowed for the duration of the call; the kernel
    /// duplicates them into the receiving process and the caller retains
    /// ownership of its copies.
    #[cfg(unix)]
    pub fn send_with_fds(&mut self, bytes: &[u8], fds: &[BorrowedFd<'_>]) -> Result<()> {
        crate::fdpass::send_with_fds(&self.stream, bytes, fds)
            .map_err(TransportError::SendFailed)?;
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn stream(&self) -> &UnixStream {
        &self.stream
    }
}

impl From<UnixStream> for Channel {
    /// Wrap an already-connected stream (accepted side, tests).
    fn from(stream: UnixStream) -> Self {
        Self { stream }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("fd", &self.stream.as_raw_fd())
            .finish()
    }
}

fn create_stream_socket() -> Result<OwnedFd> {
    // macOS has no SOCK_CLOEXEC; the flag is set after creation there.
    #[cfg(target_os = "linux")]
    let socket_type = libc::SOCK_STREAM | libc::SOCK_CLOEXEC;
    #[cfg(not(target_os = "linux"))]
    let socket_type = libc::SOCK_STREAM;

    // SAFETY: plain syscall with constant arguments; on success the raw
    // descriptor is immediately wrapped into an `OwnedFd`, which closes it
    // exactly once.
    let fd = unsafe { libc::socket(libc::AF_UNIX, socket_type, 0) };
    if fd < 0 {
        return Err(TransportError::SocketCreateFailed(
            std::io::Error::last_os_error(),
        ));
    }
    // SAFETY: `fd` is a freshly created descriptor not owned elsewhere.
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };

    #[cfg(not(target_os = "linux"))]
    {
        // SAFETY: `fd` is an open descriptor owned above.
        unsafe {
            libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC);
        }
        #[cfg(target_os = "macos")]
        disable_sigpipe(&fd);
    }

    Ok(fd)
}

/// macOS has no `MSG_NOSIGNAL`; suppress SIGPIPE per socket instead.
#[cfg(target_os = "macos")]
fn disable_sigpipe(fd: &OwnedFd) {
    let one: libc::c_int = 1;
    // SAFETY: `fd` is an open socket and `one` outlives the call.
    let rc = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_NOSIGPIPE,
            (&one as *const libc::c_int).cast::<libc::c_void>(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        warn!("failed to set SO_NOSIGPIPE on socket");
    }
}

fn connect_fd(fd: &OwnedFd, path: &Path) -> Result<()> {
    let bytes = path.as_os_str().as_bytes();

    // SAFETY: sockaddr_un is a plain-old-data struct; all-zeroes is a valid
    // initial state.
    let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
    if bytes.len() > MAX_PATH_LEN || bytes.len() >= addr.sun_path.len() {
        return Err(TransportError::PathTooLong {
            path: path.to_path_buf(),
            len: bytes.len(),
            max: MAX_PATH_LEN,
        });
    }
    addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
    for (dst, src) in addr.sun_path.iter_mut().zip(bytes.iter()) {
        *dst = *src as libc::c_char;
    }

    // SAFETY: `addr` is fully initialized above and the length covers the
    // whole struct; `fd` is an open socket descriptor.
    let rc = unsafe {
        libc::connect(
            fd.as_raw_fd(),
            (&addr as *const libc::sockaddr_un).cast::<libc::sockaddr>(),
            std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(TransportError::ConnectFailed {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}
