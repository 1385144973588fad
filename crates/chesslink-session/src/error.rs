//! Error types for the session layer.

use std::time::Duration;

use chesslink_protocol::ProtocolError;
use chesslink_transport::TransportError;

/// Errors that can occur while connecting, handshaking, or playing.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The relay server could not be reached.
    #[error("could not reach relay server")]
    Connect(#[source] TransportError),

    /// The peer sent something malformed or out of sequence, or speaks a
    /// different protocol version.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Reading from or writing to an established connection failed.
    #[error("connection I/O failed")]
    Io(#[from] TransportError),

    /// The background reader stopped: the peer closed the socket or sent an
    /// undecodable frame.
    #[error("connection lost")]
    ConnectionLost,

    /// Local and remote disagree on who plays which side.
    #[error("side assignment out of sync: {0}")]
    Desync(String),

    /// A handshake step got no answer in time.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// The server refused to admit us to the room.
    #[error(
        "server rejected the join: {}",
        .reason.as_deref().unwrap_or("no reason given")
    )]
    Rejected { reason: Option<String> },

    /// The operation needs a live connection.
    #[error("not connected")]
    NotConnected,

    /// `start` was called on a session that is already connected.
    #[error("session already connected")]
    AlreadyConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_with_and_without_reason() {
        let err = SessionError::Rejected {
            reason: Some("Room full".into()),
        };
        assert!(err.to_string().contains("Room full"));

        let err = SessionError::Rejected { reason: None };
        assert!(err.to_string().contains("no reason given"));
    }

    #[test]
    fn test_protocol_error_is_transparent() {
        let err: SessionError = ProtocolError::VersionMismatch {
            local: "0.2".into(),
            remote: "0.3".into(),
        }
        .into();
        assert!(err.to_string().contains("0.3"));
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[test]
    fn test_transport_error_converts_to_io() {
        let err: SessionError =
            TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, SessionError::Io(_)));
    }

    #[test]
    fn test_io_cause_is_reported_once_through_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe gone");
        let err: SessionError = TransportError::SendFailed(io).into();
        assert_eq!(err.to_string(), "connection I/O failed");

        let transport = err.source().expect("transport error is the source");
        assert_eq!(transport.to_string(), "send failed");
        let cause = transport.source().expect("io error is the source");
        assert_eq!(cause.to_string(), "pipe gone");
    }
}
