//! Handshake with the relay server, run once right after connecting.
//!
//! ```text
//! client                         server
//!   │ ◀──────── ServerHello ──────── │   version check
//!   │ ───────── ClientHello ───────▶ │   room, identity
//!   │ ◀──────── Ack | Reject ─────── │
//!   │ ◀──────── [ShutdownMsg] ────── │   only after Reject
//! ```
//!
//! Reads and writes alternate on the caller's task; the background reader
//! is only started once this has succeeded.

use std::time::Duration;

use chesslink_protocol::{Codec, Message, ProtocolError};
use chesslink_transport::{FrameReader, FrameWriter, TcpConnection};

use crate::{ClientConfig, SessionError};

/// Runs the handshake over `conn`. On `Err` the caller closes the connection.
pub(crate) async fn perform_handshake<C: Codec>(
    conn: &mut TcpConnection,
    codec: &C,
    config: &ClientConfig,
) -> Result<(), SessionError> {
    let (reader, writer) = conn.halves();
    let step_timeout = config.timeouts.handshake();

    // --- Step 1: ServerHello ---
    tracing::debug!("waiting for ServerHello");
    let remote_version =
        match recv_message(reader, codec, step_timeout).await? {
            Message::ServerHello { protocol_version } => protocol_version,
            other => {
                tracing::error!(got = other.kind(), "expected ServerHello");
                return Err(ProtocolError::UnexpectedMessage {
                    expected: "ServerHello",
                    got: other.kind(),
                }
                .into());
            }
        };

    // --- Step 2: version check ---
    if remote_version != config.server.protocol_version {
        tracing::error!(
            local = %config.server.protocol_version,
            remote = %remote_version,
            "incompatible server version"
        );
        return Err(ProtocolError::VersionMismatch {
            local: config.server.protocol_version.clone(),
            remote: remote_version,
        }
        .into());
    }

    // --- Step 3: ClientHello ---
    let hello = Message::ClientHello {
        room_id: config.server.room_id.clone(),
        protocol_version: config.server.protocol_version.clone(),
        client_version: config.server.client_version.clone(),
        user_name: config.profile.user_name.clone(),
    };
    send_message(writer, codec, &hello).await?;
    tracing::info!(room = %config.server.room_id, "hello sent, waiting for admission");

    // --- Step 4: Ack or Reject ---
    match recv_message(reader, codec, step_timeout).await? {
        Message::Ack => Ok(()),
        Message::Reject => {
            let wait = config.timeouts.reject_wait();
            tracing::warn!(?wait, "join rejected, waiting for shutdown reason");
            Err(reject_follow_up(reader, codec, wait).await)
        }
        other => {
            tracing::error!(got = other.kind(), "expected Ack or Reject");
            Err(ProtocolError::UnexpectedMessage {
                expected: "Ack",
                got: other.kind(),
            }
            .into())
        }
    }
}

/// After a `Reject` the server may explain itself with a `ShutdownMsg`.
/// Whatever arrives, the handshake has failed.
async fn reject_follow_up<C: Codec>(
    reader: &mut FrameReader,
    codec: &C,
    wait: Duration,
) -> SessionError {
    match recv_message(reader, codec, wait).await {
        Ok(Message::Shutdown { reason }) => {
            tracing::info!(%reason, "server disconnected");
            SessionError::Rejected {
                reason: Some(reason),
            }
        }
        Ok(other) => {
            tracing::debug!(got = other.kind(), "no reason given after reject");
            SessionError::Rejected { reason: None }
        }
        Err(SessionError::HandshakeTimeout(after)) => {
            SessionError::HandshakeTimeout(after)
        }
        Err(e) => {
            tracing::debug!(error = %e, "connection failed after reject");
            SessionError::Rejected { reason: None }
        }
    }
}

async fn recv_message<C: Codec>(
    reader: &mut FrameReader,
    codec: &C,
    timeout: Duration,
) -> Result<Message, SessionError> {
    match tokio::time::timeout(timeout, reader.recv()).await {
        Ok(Ok(Some(bytes))) => Ok(codec.decode(&bytes)?),
        Ok(Ok(None)) => Err(ProtocolError::InvalidMessage(
            "connection closed during handshake".into(),
        )
        .into()),
        Ok(Err(e)) => Err(SessionError::Io(e)),
        Err(_) => Err(SessionError::HandshakeTimeout(timeout)),
    }
}

async fn send_message<C: Codec>(
    writer: &mut FrameWriter,
    codec: &C,
    msg: &Message,
) -> Result<(), SessionError> {
    let bytes = codec.encode(msg)?;
    writer.send(&bytes).await?;
    Ok(())
}
