use hostlink_transport::TransportError;

/// Status replies are exactly this many bytes.
pub const STATUS_LEN: usize = 3;

/// Outcome of one relay exchange, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// `"OK\0"` — the host took the buffer.
    Accepted,
    /// `"FA\0"` — the host answered but declined the buffer.
    Rejected,
}

/// Ways a status reply can fail to arrive or to parse.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// The read itself failed (timeout, reset, short read).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The third byte must be the NUL terminator.
    #[error("status reply not terminated (third byte {0:#04x})")]
    BadTerminator(u8),

    /// The two-byte code is neither `OK` nor `FA`.
    #[error("unknown status code {code:?}")]
    UnknownCode { code: [u8; 2] },
}

impl Status {
    /// Parse a raw 3-byte reply.
    pub fn parse(reply: &[u8; STATUS_LEN]) -> Result<Self, StatusError> {
        if reply[2] != 0 {
            return Err(StatusError::BadTerminator(reply[2]));
        }
        match &reply[..2] {
            b"OK" => Ok(Status::Accepted),
            b"FA" => Ok(Status::Rejected),
            other => Err(StatusError::UnknownCode {
                code: [other[0], other[1]],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_and_rejected_parse() {
        assert!(matches!(Status::parse(b"OK\0"), Ok(Status::Accepted)));
        assert!(matches!(Status::parse(b"FA\0"), Ok(Status::Rejected)));
    }

    #[test]
    fn missing_terminator_is_violation() {
        let err = Status::parse(b"OK!").unwrap_err();
        assert!(matches!(err, StatusError::BadTerminator(b'!')));
    }

    #[test]
    fn unknown_code_is_violation() {
        let err = Status::parse(b"NO\0").unwrap_err();
        assert!(matches!(
            err,
            StatusError::UnknownCode { code } if &code == b"NO"
        ));
    }
}
