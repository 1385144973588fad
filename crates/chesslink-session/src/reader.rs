//! Background reader: one decode in flight, one decoded message cached.
//!
//! The reading half of the socket is moved into a spawned task for each
//! decode and handed back when that task is joined. While a decode is
//! running nobody else holds the reader, so two concurrent decodes cannot
//! exist.
//!
//! ```text
//!          start()                    task finishes
//!  parked ─────────▶ decode in flight ─────────────▶ parked + cached message
//!    ▲                   │ cancel()                        │ get_next_message()
//!    └───────────────────┘                                 └──▶ start()
//! ```
//!
//! Cancellation goes through a `CancellationToken`. The frame reader is
//! cancel-safe, so a frame that was half received when the decode was
//! cancelled is completed by the next decode.

use chesslink_protocol::{Codec, Message};
use chesslink_transport::FrameReader;
use futures_util::FutureExt;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// What a single background decode resolved to.
enum Decoded {
    Message(Message),
    Cancelled,
    Closed,
    Failed(String),
}

struct PendingRead {
    cancel: CancellationToken,
    task: JoinHandle<(FrameReader, Decoded)>,
}

/// Owns the reading half of the connection and the decode task using it.
pub struct ReaderLoop<C> {
    codec: C,
    /// The reader while no decode is running. `None` while a decode owns
    /// it, or for good once the loop is dead.
    reader: Option<FrameReader>,
    pending: Option<PendingRead>,
    ready: Option<Message>,
    dead: bool,
}

impl<C: Codec + Clone> ReaderLoop<C> {
    /// Wraps a reader. No decode runs until [`start`](Self::start).
    pub fn new(reader: FrameReader, codec: C) -> Self {
        Self {
            codec,
            reader: Some(reader),
            pending: None,
            ready: None,
            dead: false,
        }
    }

    /// Launches a background decode of the next message.
    ///
    /// No-op while a decode is already running, while a decoded message is
    /// still waiting to be consumed, or once the loop is dead.
    pub fn start(&mut self) {
        if self.pending.is_some() || self.ready.is_some() || self.dead {
            return;
        }
        let Some(mut reader) = self.reader.take() else {
            return;
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let codec = self.codec.clone();

        let task = tokio::spawn(async move {
            let decoded = tokio::select! {
                biased;
                _ = token.cancelled() => Decoded::Cancelled,
                frame = reader.recv() => match frame {
                    Ok(Some(bytes)) => match codec.decode::<Message>(&bytes) {
                        Ok(msg) => Decoded::Message(msg),
                        Err(e) => Decoded::Failed(e.to_string()),
                    },
                    Ok(None) => Decoded::Closed,
                    Err(e) => Decoded::Failed(e.to_string()),
                },
            };
            (reader, decoded)
        });

        self.pending = Some(PendingRead { cancel, task });
    }

    /// Returns `true` if a decoded message is waiting. Never blocks.
    pub fn has_new_message(&mut self) -> bool {
        if self.ready.is_some() {
            return true;
        }
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(joined) = (&mut pending.task).now_or_never() else {
            return false;
        };
        self.pending = None;
        self.ready = self.settle(joined);
        if self.ready.is_none() {
            // A cancelled decode hands the reader back; keep listening.
            self.start();
        }
        self.ready.is_some()
    }

    /// Takes the next message, waiting for the running decode if nothing
    /// is cached yet, then starts the following decode.
    ///
    /// Returns `None` when the decode failed or the peer closed the
    /// connection. Cancel-safe: dropping the future leaves the running
    /// decode in place.
    pub async fn get_next_message(&mut self) -> Option<Message> {
        while self.ready.is_none() {
            if self.dead {
                return None;
            }
            if self.pending.is_none() {
                tracing::debug!("no decode in flight, starting one");
                self.start();
            }
            let pending = self.pending.as_mut()?;
            let joined = (&mut pending.task).await;
            self.pending = None;
            self.ready = self.settle(joined);
        }

        let msg = self.ready.take()?;
        self.start();
        Some(msg)
    }

    /// Cancels the running decode and waits for it to hand the reader back.
    ///
    /// A frame that finished decoding before the cancellation was seen is
    /// kept and returned by the next [`get_next_message`](Self::get_next_message).
    pub async fn cancel(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.cancel.cancel();
        let joined = (&mut pending.task).await;
        self.pending = None;
        if let Some(msg) = self.settle(joined) {
            tracing::debug!(kind = msg.kind(), "message completed before cancel");
            self.ready = Some(msg);
        }
    }

    /// Cancels any decode and drops the reader. The loop is dead afterwards.
    pub async fn shutdown(&mut self) {
        self.cancel().await;
        self.reader = None;
        self.ready = None;
        self.dead = true;
    }

    /// Returns `true` while a background decode is outstanding.
    pub fn is_reading(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `true` once the connection can no longer be read.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    fn settle(
        &mut self,
        joined: Result<(FrameReader, Decoded), JoinError>,
    ) -> Option<Message> {
        let (reader, decoded) = match joined {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(error = %e, "decode task did not complete");
                self.dead = true;
                return None;
            }
        };

        match decoded {
            Decoded::Message(msg) => {
                tracing::debug!(kind = msg.kind(), "message received");
                self.reader = Some(reader);
                Some(msg)
            }
            Decoded::Cancelled => {
                self.reader = Some(reader);
                None
            }
            Decoded::Closed => {
                tracing::info!(id = %reader.id(), "peer closed the connection");
                self.dead = true;
                None
            }
            Decoded::Failed(error) => {
                tracing::warn!(id = %reader.id(), %error, "read failed, reader stopped");
                self.dead = true;
                None
            }
        }
    }
}
