/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The TCP connection could not be established.
    #[error("connect to {addr} failed")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed")]
    ReceiveFailed(#[source] std::io::Error),
}
