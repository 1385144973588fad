//! Transport layer for chesslink.
//!
//! Provides [`connect`], which opens a TCP connection to the relay server
//! and returns a [`TcpConnection`] speaking length-delimited frames. The
//! connection splits into a [`FrameReader`] and a [`FrameWriter`] so the
//! session can hand the reading half to a background task.

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{FrameReader, FrameWriter, TcpConnection, connect};

use std::fmt;

/// Largest frame payload accepted from the wire (1 MiB).
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_equality() {
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(1);
        let c = ConnectionId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_transport_error_display_includes_address() {
        let err = TransportError::ConnectFailed {
            addr: "127.0.0.1:1".into(),
            source: std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            ),
        };
        assert!(err.to_string().contains("127.0.0.1:1"));
        // The io cause is left to the error chain.
        assert!(!err.to_string().contains("refused"));
        let source = std::error::Error::source(&err).expect("io source");
        assert_eq!(source.to_string(), "refused");
    }
}
