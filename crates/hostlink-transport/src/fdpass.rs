//! File descriptor transfer over Unix stream sockets.
//!
//! A single `sendmsg` carries the message bytes and an `SCM_RIGHTS` control
//! block; the kernel duplicates the descriptors into the receiving process,
//! so a buffer created on one side becomes usable on the other without
//! copying its contents through the socket.
//!
//! The send side *borrows* descriptors — the caller retains ownership and the
//! descriptors remain open and valid in both processes after the call. The
//! receive side takes ownership of the duplicates as [`OwnedFd`]s.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::os::unix::net::UnixStream;

#[cfg(target_os = "linux")]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(target_os = "linux"))]
const SEND_FLAGS: libc::c_int = 0;

/// Send `bytes` with `fds` attached as `SCM_RIGHTS` ancillary data.
///
/// Bytes and descriptors travel in one atomic `sendmsg`, so a receiver that
/// sees the message is guaranteed to also see the descriptors.
pub fn send_with_fds(
    stream: &UnixStream,
    bytes: &[u8],
    fds: &[BorrowedFd<'_>],
) -> io::Result<usize> {
    let fd_bytes = fds.len() * std::mem::size_of::<libc::c_int>();
    // SAFETY: CMSG_SPACE is a pure size computation.
    let cmsg_space = if fds.is_empty() {
        0
    } else {
        unsafe { libc::CMSG_SPACE(fd_bytes as u32) as usize }
    };
    let mut cmsg_buf = vec![0u8; cmsg_space];

    let mut iov = libc::iovec {
        iov_base: bytes.as_ptr() as *mut libc::c_void,
        iov_len: bytes.len(),
    };

    // SAFETY: msghdr is plain-old-data; all-zeroes is a valid initial state
    // and sidesteps the platform-private padding fields.
    let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;

    if !fds.is_empty() {
        msg.msg_control = cmsg_buf.as_mut_ptr().cast::<libc::c_void>();
        msg.msg_controllen = cmsg_space as _;

        // SAFETY: msg_control points at a zeroed buffer of CMSG_SPACE(fd_bytes)
        // bytes, so CMSG_FIRSTHDR is non-null and CMSG_DATA has room for every
        // descriptor written below.
        unsafe {
            let cmsg = libc::CMSG_FIRSTHDR(&msg);
            (*cmsg).cmsg_level = libc::SOL_SOCKET;
            (*cmsg).cmsg_type = libc::SCM_RIGHTS;
            (*cmsg).cmsg_len = libc::CMSG_LEN(fd_bytes as u32) as _;
            let data = libc::CMSG_DATA(cmsg) as *mut libc::c_int;
            for (i, fd) in fds.iter().enumerate() {
                std::ptr::write_unaligned(data.add(i), fd.as_raw_fd());
            }
        }
    }

    // SAFETY: `msg` refers to live iov and control buffers for the duration
    // of the call; the descriptor is an open socket.
    let n = unsafe { libc::sendmsg(stream.as_raw_fd(), &msg, SEND_FLAGS) };
    if n < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(n as usize)
}

/// Receive one message into `buf`, extracting up to `max_fds` transferred
/// descriptors from `SCM_RIGHTS` ancillary data.
///
/// Returns the number of message bytes read and the received descriptors,
/// which the caller now owns.
pub fn recv_with_fds(
    stream: &UnixStream,
    buf: &mut [u8],
    max_fds: usize,
) -> io::Result<(usize, Vec<OwnedFd>)> {
    let fd_bytes = max_fds * std::mem::size_of::<libc::c_int>();
    // SAFETY: CMSG_SPACE is a pure size computation.
    let cmsg_space = unsafe { libc::CMSG_SPACE(fd_bytes as u32) as usize };
    let mut cmsg_buf = vec![0u8; cmsg_space];

    let mut iov = libc::iovec {
        iov_base: buf.as_mut_ptr().cast::<libc::c_void>(),
        iov_len: buf.len(),
    };

    // SAFETY: see send_with_fds.
    let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = cmsg_buf.as_mut_ptr().cast::<libc::c_void>();
    msg.msg_controllen = cmsg_space as _;

    // SAFETY: `msg` refers to live buffers for the duration of the call.
    let n = unsafe { libc::recvmsg(stream.as_raw_fd(), &mut msg, 0) };
    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    let mut fds = Vec::new();
    // SAFETY: the kernel filled msg_control with well-formed cmsg headers;
    // CMSG_FIRSTHDR/CMSG_NXTHDR walk exactly that region. Each received
    // descriptor is owned by this process now and is wrapped exactly once.
    unsafe {
        let mut cmsg = libc::CMSG_FIRSTHDR(&msg);
        while !cmsg.is_null() {
            if (*cmsg).cmsg_level == libc::SOL_SOCKET && (*cmsg).cmsg_type == libc::SCM_RIGHTS {
                let data = libc::CMSG_DATA(cmsg);
                let count = ((*cmsg).cmsg_len as usize - libc::CMSG_LEN(0) as usize)
                    / std::mem::size_of::<libc::c_int>();
                for i in 0..count {
                    let fd: libc::c_int = std::ptr::read_unaligned(
                        data.add(i * std::mem::size_of::<libc::c_int>()) as *const libc::c_int,
                    );
                    fds.push(OwnedFd::from_raw_fd(fd));
                }
            }
            cmsg = libc::CMSG_NXTHDR(&msg, cmsg);
        }
    }

    Ok((n as usize, fds))
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::{Seek, SeekFrom, Write};
    use std::os::fd::AsFd;
    use std::os::unix::fs::MetadataExt;

    use super::*;

    #[test]
    fn transfers_bytes_and_descriptor_together() {
        let (left, right) = UnixStream::pair().expect("socketpair");

        let dir = std::env::temp_dir().join(format!("hostlink-fdpass-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let mut file = File::create(dir.join("payload.bin")).expect("file create");
        file.write_all(b"pixels").expect("file write");

        let sent = send_with_fds(&left, b"header", &[file.as_fd()]).expect("send");
        assert_eq!(sent, 6);

        let mut buf = [0u8; 16];
        let (n, fds) = recv_with_fds(&right, &mut buf, 4).expect("recv");
        assert_eq!(&buf[..n], b"header");
        assert_eq!(fds.len(), 1);

        // The duplicate refers to the same open file description.
        let received = File::from(fds.into_iter().next().expect("one fd"));
        let original_meta = file.metadata().expect("metadata");
        let received_meta = received.metadata().expect("metadata");
        assert_eq!(original_meta.dev(), received_meta.dev());
        assert_eq!(original_meta.ino(), received_meta.ino());

        // Sender still owns its descriptor.
        file.seek(SeekFrom::Start(0)).expect("sender fd still valid");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn plain_message_carries_no_descriptors() {
        let (left, right) = UnixStream::pair().expect("socketpair");

        send_with_fds(&left, b"no-fds", &[]).expect("send");

        let mut buf = [0u8; 16];
        let (n, fds) = recv_with_fds(&right, &mut buf, 4).expect("recv");
        assert_eq!(&buf[..n], b"no-fds");
        assert!(fds.is_empty());
    }

    #[test]
    fn multiple_descriptors_arrive_in_order() {
        let (left, right) = UnixStream::pair().expect("socketpair");

        let dir = std::env::temp_dir().join(format!("hostlink-fdpass-multi-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let a = File::create(dir.join("a")).expect("file a");
        let b = File::create(dir.join("b")).expect("file b");

        send_with_fds(&left, b"two", &[a.as_fd(), b.as_fd()]).expect("send");

        let mut buf = [0u8; 8];
        let (_, fds) = recv_with_fds(&right, &mut buf, 4).expect("recv");
        assert_eq!(fds.len(), 2);

        let got: Vec<u64> = fds
            .into_iter()
            .map(|fd| File::from(fd).metadata().expect("metadata").ino())
            .collect();
        let want = vec![
            a.metadata().expect("metadata").ino(),
            b.metadata().expect("metadata").ino(),
        ];
        assert_eq!(got, want);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
