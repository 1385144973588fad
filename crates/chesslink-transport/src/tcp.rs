//! TCP transport with length-delimited framing using `tokio-util`.
//!
//! Every frame on the wire is a 4-byte big-endian length followed by that
//! many payload bytes. The stream is split into an owned [`FrameReader`] and
//! [`FrameWriter`] so the two directions can live in different tasks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::{ConnectionId, MAX_FRAME_LEN, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(MAX_FRAME_LEN)
        .new_codec()
}

/// Opens a TCP connection to `host:port`.
pub async fn connect(
    host: &str,
    port: u16,
) -> Result<TcpConnection, TransportError> {
    let addr = format!("{host}:{port}");
    tracing::info!(%addr, "connecting");
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| TransportError::ConnectFailed {
            addr: addr.clone(),
            source,
        })?;
    let conn = TcpConnection::new(stream)?;
    tracing::info!(id = %conn.id(), peer = %conn.peer_addr(), "connection established");
    Ok(conn)
}

/// An established TCP connection, not yet split into halves.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: FrameReader,
    writer: FrameWriter,
}

impl TcpConnection {
    /// Wraps an already-connected stream.
    pub fn new(stream: TcpStream) -> Result<Self, TransportError> {
        let peer = stream.peer_addr().map_err(|e| {
            TransportError::ConnectionClosed(e.to_string())
        })?;
        // Frames are small and latency matters more than throughput.
        let _ = stream.set_nodelay(true);

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            id,
            peer,
            reader: FrameReader {
                id,
                inner: FramedRead::new(read_half, frame_codec()),
            },
            writer: FrameWriter {
                id,
                inner: FramedWrite::new(write_half, frame_codec()),
                closed: false,
            },
        })
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Mutable access to both halves at once, for the handshake which
    /// alternates reads and writes on the caller's task.
    pub fn halves(&mut self) -> (&mut FrameReader, &mut FrameWriter) {
        (&mut self.reader, &mut self.writer)
    }

    /// Splits into independently owned halves.
    pub fn into_split(self) -> (FrameReader, FrameWriter) {
        (self.reader, self.writer)
    }
}

/// The receiving half of a [`TcpConnection`].
pub struct FrameReader {
    id: ConnectionId,
    inner: FramedRead<OwnedReadHalf, LengthDelimitedCodec>,
}

impl FrameReader {
    /// Receives the next complete frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly.
    ///
    /// Cancel-safe: if the returned future is dropped before it resolves,
    /// any bytes already read stay buffered and the next call continues
    /// the same frame.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.inner.next().await {
            Some(Ok(frame)) => {
                tracing::trace!(id = %self.id, len = frame.len(), "frame received");
                Ok(Some(frame.to_vec()))
            }
            Some(Err(e)) => Err(TransportError::ReceiveFailed(e)),
            None => Ok(None),
        }
    }

    /// Returns the identifier of the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

/// The sending half of a [`TcpConnection`].
pub struct FrameWriter {
    id: ConnectionId,
    inner: FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>,
    closed: bool,
}

impl FrameWriter {
    /// Sends one frame and flushes it.
    pub async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::ConnectionClosed(
                "writer already closed".into(),
            ));
        }
        self.inner
            .send(Bytes::copy_from_slice(data))
            .await
            .map_err(TransportError::SendFailed)?;
        tracing::trace!(id = %self.id, len = data.len(), "frame sent");
        Ok(())
    }

    /// Flushes and shuts down the write direction. Calling it again is a no-op.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(id = %self.id, "closing connection");
        SinkExt::<Bytes>::close(&mut self.inner)
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Returns the identifier of the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}
