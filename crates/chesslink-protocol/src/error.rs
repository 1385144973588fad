//! Error types for the protocol layer.
//!
//! Each crate in chesslink defines its own error enum. A `ProtocolError`
//! means the bytes or the message sequence were wrong, never the socket.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a message).
    ///
    /// Covers malformed JSON, missing fields, and unrecognized `type`
    /// tags.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The peer sent a well-formed message that is wrong at this point of
    /// the conversation.
    #[error("unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },

    /// The relay server speaks a different protocol version.
    #[error("protocol version mismatch: local {local}, server {remote}")]
    VersionMismatch { local: String, remote: String },

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
