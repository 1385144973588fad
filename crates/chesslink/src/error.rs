//! Unified error type for chesslink.

use chesslink_protocol::ProtocolError;
use chesslink_session::SessionError;
use chesslink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChessLinkError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, version mismatch).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (handshake, desync, lost connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The configuration could not be rendered as TOML.
    #[error("config error: {0}")]
    Config(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let link_err: ChessLinkError = err.into();
        assert!(matches!(link_err, ChessLinkError::Transport(_)));
        assert!(link_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let link_err: ChessLinkError = err.into();
        assert!(matches!(link_err, ChessLinkError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Rejected {
            reason: Some("room full".into()),
        };
        let link_err: ChessLinkError = err.into();
        assert!(matches!(link_err, ChessLinkError::Session(_)));
        assert!(link_err.to_string().contains("room full"));
    }
}
