use bytes::BytesMut;
use hostlink_transport::{Channel, LinkConfig};
use tracing::{debug, warn};

use crate::buffer::{encode_present, BufferDescriptor, BufferHandle};
use crate::error::{RelayError, Result};
use crate::status::{Status, StatusError, STATUS_LEN};

/// Client side of the buffer handle relay protocol.
///
/// Owns one channel to the display endpoint, reconnected lazily per present.
/// The channel is taken out of its slot for the duration of a call: error
/// paths simply don't put it back, which closes the descriptor and leaves
/// the client disconnected for the next call to repair.
pub struct RelayClient {
    config: LinkConfig,
    channel: Option<Channel>,
}

impl RelayClient {
    /// Create a client for the display endpoint described by `config`.
    ///
    /// No connection is made here; the first present connects.
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            config: config.clone(),
            channel: None,
        }
    }

    /// Relay one rendered buffer to the host.
    ///
    /// One message carries the descriptor fields, the handle header and the
    /// plain integers; the handle's descriptors ride the same send as
    /// `SCM_RIGHTS` ancillary data. The exchange completes with the host's
    /// 3-byte status reply.
    ///
    /// The handle's descriptors are borrowed, never closed: the kernel
    /// duplicates them into the host and the caller keeps its own.
    pub fn present(
        &mut self,
        descriptor: &BufferDescriptor,
        handle: &BufferHandle<'_>,
    ) -> Result<()> {
        let mut channel = match self.channel.take() {
            Some(channel) => channel,
            None => match Channel::connect(self.config.display_endpoint(), &self.config) {
                Ok(channel) => channel,
                Err(err) => {
                    debug!(%err, "display host not reachable, dropping frame");
                    return Err(RelayError::PeerUnavailable(err));
                }
            },
        };

        let mut message = BytesMut::new();
        encode_present(descriptor, handle, &mut message);

        if let Err(err) = channel.send_with_fds(&message, handle.fds()) {
            warn!(%err, "buffer transfer failed, dropping channel");
            return Err(RelayError::TransferFailed(err));
        }

        let mut reply = [0u8; STATUS_LEN];
        if let Err(err) = channel.recv_exact(&mut reply) {
            warn!(%err, "status read failed, dropping channel");
            return Err(RelayError::UnexpectedReply(StatusError::Transport(err)));
        }

        match Status::parse(&reply) {
            Ok(Status::Accepted) => {
                self.channel = Some(channel);
                Ok(())
            }
            Ok(Status::Rejected) => {
                // The host was reachable and spoke the protocol; it just
                // declined this buffer. Keep the channel for the next frame.
                self.channel = Some(channel);
                Err(RelayError::PeerRejected)
            }
            Err(err) => {
                warn!(?reply, %err, "malformed status reply, dropping channel");
                Err(RelayError::UnexpectedReply(err))
            }
        }
    }

    /// Whether a channel to the host is currently open.
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("connected", &self.channel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::os::fd::AsFd;
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use hostlink_transport::fdpass::recv_with_fds;

    use super::*;
    use crate::buffer::{decode_present, MAX_HANDLE_FDS};

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hostlink-relay-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn test_config(dir: &PathBuf) -> LinkConfig {
        LinkConfig {
            runtime_dir: dir.clone(),
            recv_timeout: Duration::from_millis(300),
            connect_backoff: Duration::from_millis(10),
        }
    }

    fn descriptor() -> BufferDescriptor {
        BufferDescriptor {
            width: 640,
            height: 480,
            stride: 640,
            pixel_format: 1,
        }
    }

    /// Receive one present message on the host side and reply with `status`.
    fn serve_one_present(stream: &UnixStream, status: &[u8; 3]) -> (usize, Vec<i32>) {
        let mut buf = [0u8; 1024];
        let (n, fds) = recv_with_fds(stream, &mut buf, MAX_HANDLE_FDS).expect("host recv");
        let message = decode_present(&buf[..n]).expect("host decode");
        assert_eq!(fds.len(), message.num_fds);
        (&*stream).write_all(status).expect("host status write");
        (message.num_fds, message.ints)
    }

    #[test]
    fn present_with_host_absent_is_peer_unavailable() {
        let dir = unique_temp_dir("absent");
        let mut client = RelayClient::new(&test_config(&dir));
        let handle = BufferHandle::new(vec![], vec![]).expect("handle");

        let err = client.present(&descriptor(), &handle).unwrap_err();
        assert!(matches!(err, RelayError::PeerUnavailable(_)));
        assert!(!client.is_connected());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn present_transfers_descriptor_and_keeps_channel() {
        let dir = unique_temp_dir("ok");
        let config = test_config(&dir);
        let listener = UnixListener::bind(config.display_endpoint()).expect("bind");

        let host = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let first = serve_one_present(&stream, b"OK\0");
            // Same connection serves the next frame.
            let second = serve_one_present(&stream, b"OK\0");
            (first, second)
        });

        let file = File::open("/dev/null").expect("open");
        let handle = BufferHandle::new(vec![file.as_fd()], vec![]).expect("handle");

        let mut client = RelayClient::new(&config);
        client.present(&descriptor(), &handle).expect("first present");
        assert!(client.is_connected());
        client
            .present(&descriptor(), &handle)
            .expect("second present on same channel");

        let (first, second) = host.join().expect("host thread");
        assert_eq!(first, (1, vec![]));
        assert_eq!(second, (1, vec![]));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejection_is_distinct_and_keeps_channel() {
        let dir = unique_temp_dir("rejected");
        let config = test_config(&dir);
        let listener = UnixListener::bind(config.display_endpoint()).expect("bind");

        let host = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            serve_one_present(&stream, b"FA\0");
            serve_one_present(&stream, b"OK\0");
        });

        let handle = BufferHandle::new(vec![], vec![5]).expect("handle");
        let mut client = RelayClient::new(&config);

        let err = client.present(&descriptor(), &handle).unwrap_err();
        assert!(matches!(err, RelayError::PeerRejected));
        assert!(client.is_connected());

        client
            .present(&descriptor(), &handle)
            .expect("channel survives a rejection");
        host.join().expect("host thread");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_status_drops_channel() {
        let dir = unique_temp_dir("malformed");
        let config = test_config(&dir);
        let listener = UnixListener::bind(config.display_endpoint()).expect("bind");

        let host = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            serve_one_present(&stream, b"OK!");
        });

        let handle = BufferHandle::new(vec![], vec![]).expect("handle");
        let mut client = RelayClient::new(&config);

        let err = client.present(&descriptor(), &handle).unwrap_err();
        assert!(matches!(
            err,
            RelayError::UnexpectedReply(StatusError::BadTerminator(b'!'))
        ));
        assert!(!client.is_connected());
        host.join().expect("host thread");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn channel_failure_reconnects_on_next_present() {
        let dir = unique_temp_dir("reset");
        let config = test_config(&dir);
        let listener = UnixListener::bind(config.display_endpoint()).expect("bind");

        let host = std::thread::spawn(move || {
            // First connection dies mid-exchange without a reply.
            let (stream, _) = listener.accept().expect("accept");
            drop(stream);

            // Second connection completes normally.
            let (stream, _) = listener.accept().expect("second accept");
            serve_one_present(&stream, b"OK\0");
        });

        let handle = BufferHandle::new(vec![], vec![]).expect("handle");
        let mut client = RelayClient::new(&config);

        let err = client.present(&descriptor(), &handle).unwrap_err();
        // Depending on timing the reset lands on the send or on the status
        // read; both are hard failures that drop the channel.
        assert!(matches!(
            err,
            RelayError::TransferFailed(_) | RelayError::UnexpectedReply(_)
        ));
        assert!(!client.is_connected());

        client
            .present(&descriptor(), &handle)
            .expect("fresh connection after failure");
        assert!(client.is_connected());
        host.join().expect("host thread");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn silent_host_bounds_present_by_receive_timeout() {
        let dir = unique_temp_dir("silent");
        let config = test_config(&dir);
        let listener = UnixListener::bind(config.display_endpoint()).expect("bind");

        let host = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 1024];
            let _ = recv_with_fds(&stream, &mut buf, MAX_HANDLE_FDS);
            // Never reply; hold the stream open past the client timeout.
            std::thread::sleep(Duration::from_millis(600));
        });

        let handle = BufferHandle::new(vec![], vec![]).expect("handle");
        let mut client = RelayClient::new(&config);

        let start = Instant::now();
        let err = client.present(&descriptor(), &handle).unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(
            err,
            RelayError::UnexpectedReply(StatusError::Transport(_))
        ));
        assert!(elapsed < Duration::from_secs(2));
        host.join().expect("host thread");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
