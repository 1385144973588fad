//! The relay session: connection lifecycle and the message state machine.
//!
//! A [`Session`] is the client's whole view of the relay. It owns the
//! connection, tracks which phase the room is in, answers the server's
//! requests, and forwards game events to the [`Host`].
//!
//! ```text
//!  NotConnected ──start()──▶ Connecting ──handshake ok──▶ WaitingForOpponentToJoin
//!                                                          │   ▲
//!                                     PlayerJoined/GetReady│   │PlayerLeft
//!                                                          ▼   │
//!                                                   WaitingForGameStart
//!                                                          │ GameStart
//!                                                          ▼
//!                                                     GameOnGoing
//!
//!  any state ──disconnect()/ShutdownMsg──▶ NotConnected
//! ```

use std::fmt;
use std::time::Duration;

use chesslink_protocol::{Codec, JsonCodec, Message, MoveMessage};
use chesslink_transport::{ConnectionId, FrameWriter};

use crate::handshake::perform_handshake;
use crate::reader::ReaderLoop;
use crate::{ClientConfig, ClockSlot, Host, MatchResult, MatchSetup, SessionError, Side};

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    NotConnected,
    Connecting,
    /// Handshake accepted; immediately followed by `WaitingForOpponentToJoin`.
    JoinedRoom,
    WaitingForOpponentToJoin,
    WaitingForGameStart,
    GameOnGoing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Session facts
// ---------------------------------------------------------------------------

/// Game parameters announced by `GetReady`.
#[derive(Debug, Clone)]
struct Readiness {
    remote_side: Side,
    start_fen: String,
    clock: Duration,
}

/// What the session has learned from the server. Reset on disconnect.
#[derive(Debug, Default)]
pub(crate) struct SessionFacts {
    pub(crate) opponent_name: Option<String>,
    readiness: Option<Readiness>,
    /// A received move the game-facing side hasn't picked up yet.
    pub(crate) next_move: Option<MoveMessage>,
    /// Name of the most recent real move received from the remote side.
    pub(crate) last_received_move: Option<String>,
    pub(crate) terminal_move_received: bool,
    pub(crate) final_move_reported: bool,
    expecting_ack: bool,
}

impl SessionFacts {
    fn remote_side(&self) -> Option<Side> {
        self.readiness.as_ref().map(|r| r.remote_side)
    }
}

/// The live half of a session: present only between a successful
/// handshake and disconnect.
struct Link<C> {
    id: ConnectionId,
    writer: FrameWriter,
    reader: ReaderLoop<C>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A client session with the relay server.
///
/// Not reentrant: every operation takes `&mut self`, and the owner drives
/// it from one task.
pub struct Session<H: Host, C: Codec + Clone = JsonCodec> {
    config: ClientConfig,
    host: H,
    codec: C,
    state: ConnectionState,
    link: Option<Link<C>>,
    pub(crate) facts: SessionFacts,
}

impl<H: Host> Session<H, JsonCodec> {
    /// Creates a disconnected session speaking JSON.
    pub fn new(config: ClientConfig, host: H) -> Self {
        Self::with_codec(config, host, JsonCodec)
    }
}

impl<H: Host, C: Codec + Clone> Session<H, C> {
    /// Creates a disconnected session with a custom payload codec.
    pub fn with_codec(config: ClientConfig, host: H, codec: C) -> Self {
        Self {
            config,
            host,
            codec,
            state: ConnectionState::NotConnected,
            link: None,
            facts: SessionFacts::default(),
        }
    }

    // -- Accessors --

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Display name of the opponent currently in the room.
    pub fn opponent_name(&self) -> Option<&str> {
        self.facts.opponent_name.as_deref()
    }

    /// Side the opponent plays, once `GetReady` has arrived.
    pub fn opponent_side(&self) -> Option<Side> {
        self.facts.remote_side()
    }

    /// Returns `true` between a successful handshake and disconnect.
    pub fn connection_ready(&self) -> bool {
        self.link.is_some()
    }

    /// Returns `true` while a background decode is outstanding.
    pub fn is_reading(&self) -> bool {
        self.link.as_ref().is_some_and(|l| l.reader.is_reading())
    }

    // -- Lifecycle --

    /// Connects to the configured relay server and runs the handshake.
    ///
    /// On success the session is `WaitingForOpponentToJoin` and the
    /// background reader is running. On failure the connection is closed,
    /// the session is back to `NotConnected`, and the error says why.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.state != ConnectionState::NotConnected {
            return Err(SessionError::AlreadyConnected);
        }
        self.state = ConnectionState::Connecting;

        let server = &self.config.server;
        let mut conn = match chesslink_transport::connect(&server.host, server.port).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "failed to connect to relay server");
                self.state = ConnectionState::NotConnected;
                return Err(SessionError::Connect(e));
            }
        };

        if let Err(e) = perform_handshake(&mut conn, &self.codec, &self.config).await {
            tracing::error!(error = %e, "handshake failed");
            let (_reader, mut writer) = conn.into_split();
            if let Err(e) = writer.close().await {
                tracing::debug!(error = %e, "close failed");
            }
            self.state = ConnectionState::NotConnected;
            return Err(e);
        }
        self.state = ConnectionState::JoinedRoom;

        let id = conn.id();
        let (reader, writer) = conn.into_split();
        let mut reader = ReaderLoop::new(reader, self.codec.clone());
        reader.start();
        self.link = Some(Link { id, writer, reader });

        self.state = ConnectionState::WaitingForOpponentToJoin;
        tracing::info!(%id, room = %self.config.server.room_id, "joined room");
        Ok(())
    }

    /// Tears the connection down and resets the session to `NotConnected`.
    ///
    /// With `send_shutdown`, a best-effort `ShutdownMsg{reason}` goes out
    /// first. Safe to call when already disconnected.
    pub async fn disconnect(&mut self, send_shutdown: bool, reason: &str) {
        if send_shutdown && self.link.is_some() {
            let notice = Message::Shutdown {
                reason: reason.to_string(),
            };
            if let Err(e) = self.send_message(&notice).await {
                tracing::debug!(error = %e, "shutdown notice not delivered");
            }
        }

        if let Some(mut link) = self.link.take() {
            link.reader.shutdown().await;
            if let Err(e) = link.writer.close().await {
                tracing::debug!(error = %e, "close failed");
            }
            tracing::info!(id = %link.id, %reason, "disconnected");
        }

        self.facts = SessionFacts::default();
        self.state = ConnectionState::NotConnected;
    }

    /// Ends the game from the local side: reports non-timeout results with
    /// `GameOver`, then disconnects with a shutdown notice.
    pub async fn game_over(&mut self, result: MatchResult) {
        if self.link.is_none() {
            return;
        }
        // The server detects timeouts itself.
        if !result.is_timeout() {
            let msg = Message::GameOver {
                reason: result.to_string(),
            };
            if let Err(e) = self.send_message(&msg).await {
                tracing::warn!(error = %e, "GameOver not delivered");
            }
        }
        self.disconnect(true, &format!("GameOver: {result}")).await;
    }

    /// The local player walked away (window closed, mode switched).
    pub async fn leave(&mut self, reason: &str) {
        if self.state != ConnectionState::NotConnected {
            self.disconnect(true, reason).await;
        }
    }

    // -- Traffic --

    /// Writes one message, pausing the background reader around the write.
    ///
    /// The running decode is cancelled and joined before anything is
    /// written, and a new one starts right after.
    pub async fn send_message(&mut self, msg: &Message) -> Result<(), SessionError> {
        let link = self.link.as_mut().ok_or(SessionError::NotConnected)?;
        let bytes = self.codec.encode(msg)?;

        link.reader.cancel().await;
        let written = link.writer.send(&bytes).await;
        link.reader.start();

        match written {
            Ok(()) => {
                tracing::debug!(kind = msg.kind(), "message sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(kind = msg.kind(), error = %e, "send failed");
                Err(SessionError::Io(e))
            }
        }
    }

    /// Handles at most one message that has already arrived. Never waits
    /// for the network.
    ///
    /// Returns `Ok(true)` if a message was dispatched. Returns
    /// [`SessionError::ConnectionLost`] once the reader has stopped and
    /// nothing is left to dispatch.
    pub async fn update(&mut self) -> Result<bool, SessionError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(false);
        };
        if !link.reader.has_new_message() {
            if link.reader.is_dead() {
                return Err(SessionError::ConnectionLost);
            }
            // A send cut off between cancel and restart leaves the reader idle.
            link.reader.start();
            return Ok(false);
        }
        let Some(msg) = link.reader.get_next_message().await else {
            return Err(SessionError::ConnectionLost);
        };
        self.dispatch(msg).await?;
        Ok(true)
    }

    /// Waits for the next message without handling it.
    ///
    /// Cancel-safe: dropping the future loses nothing, so this is the part
    /// to put under a deadline. The message must then go to
    /// [`dispatch`](Self::dispatch), which is not cancel-safe.
    pub(crate) async fn next_message(&mut self) -> Result<Message, SessionError> {
        let link = self.link.as_mut().ok_or(SessionError::NotConnected)?;
        link.reader
            .get_next_message()
            .await
            .ok_or(SessionError::ConnectionLost)
    }

    pub(crate) async fn dispatch(&mut self, msg: Message) -> Result<(), SessionError> {
        match msg {
            Message::Ping => {
                tracing::debug!("ping");
                self.send_message(&Message::Ping).await?;
            }

            Message::Ack => {
                if self.facts.expecting_ack {
                    self.facts.expecting_ack = false;
                } else {
                    tracing::warn!("unexpected Ack, ignoring");
                }
            }

            Message::Reject => {
                tracing::warn!("got a Reject outside the handshake, ignoring");
            }

            Message::GiveYourPrefs => {
                let prefs = Message::ClientPrefs {
                    start_fen: self.config.profile.start_fen.clone(),
                    preferred_clock_millis: self.config.profile.preferred_clock_ms,
                };
                self.send_message(&prefs).await?;
                self.facts.expecting_ack = true;
            }

            Message::Move(mv) => {
                self.host.set_elapsed(
                    ClockSlot::PlayerToMove,
                    Duration::from_millis(mv.opponent_clock_elapsed_ms),
                );
                self.host.set_elapsed(
                    ClockSlot::PlayerNotToMove,
                    Duration::from_millis(mv.your_clock_elapsed_ms),
                );
                if mv.last_move {
                    self.facts.terminal_move_received = true;
                }
                if !mv.is_no_move() {
                    self.facts.last_received_move = Some(mv.move_name.clone());
                }
                tracing::debug!(mv = %mv.move_name, last = mv.last_move, "move received");
                self.facts.next_move = Some(mv);
            }

            Message::PlayerJoined { user_name } => {
                tracing::info!(opponent = %user_name, "player joined");
                self.facts.opponent_name = Some(user_name);
                self.set_state(ConnectionState::WaitingForGameStart);
                self.send_message(&Message::Ack).await?;
            }

            Message::Shutdown { reason } => {
                tracing::info!(%reason, "remote shutdown");
                self.disconnect(false, &reason).await;
                self.host.end_match(MatchResult::DrawByArbiter);
            }

            Message::PlayerLeft => {
                tracing::info!("player left");
                self.facts.opponent_name = None;
                self.set_state(ConnectionState::WaitingForOpponentToJoin);
                self.send_message(&Message::Ack).await?;
            }

            Message::GetReady {
                is_white,
                game_start_fen,
                clock_time_millis,
            } => {
                let remote_side = if is_white { Side::White } else { Side::Black };
                tracing::info!(%remote_side, fen = %game_start_fen, clock_ms = clock_time_millis, "get ready");
                self.facts.readiness = Some(Readiness {
                    remote_side,
                    start_fen: game_start_fen,
                    clock: Duration::from_millis(clock_time_millis),
                });
                self.set_state(ConnectionState::WaitingForGameStart);
                self.send_message(&Message::IsReady { is_ready: true }).await?;
            }

            Message::GameStart { timestamp } => {
                let Some(ready) = self.facts.readiness.clone() else {
                    tracing::error!("GameStart before GetReady");
                    return Err(SessionError::Desync(
                        "game started without a side assignment".into(),
                    ));
                };
                self.facts.next_move = None;
                self.facts.last_received_move = None;
                self.facts.terminal_move_received = false;
                self.facts.final_move_reported = false;
                self.set_state(ConnectionState::GameOnGoing);
                tracing::info!(timestamp, remote = %ready.remote_side, "game start");
                self.host.start_match(MatchSetup {
                    local_side: ready.remote_side.opposite(),
                    remote_side: ready.remote_side,
                    start_fen: ready.start_fen,
                    clock: ready.clock,
                });
            }

            Message::TimeOut { it_was_you } => {
                let Some(remote_side) = self.facts.remote_side() else {
                    tracing::error!("TimeOut with no side assignment");
                    return Err(SessionError::Desync(
                        "timeout reported before sides were assigned".into(),
                    ));
                };
                let timed_out = if it_was_you {
                    remote_side.opposite()
                } else {
                    remote_side
                };
                tracing::info!(%timed_out, it_was_you, "timeout");
                self.host.end_match(MatchResult::timeout(timed_out));
            }

            other @ (Message::ServerHello { .. }
            | Message::ClientHello { .. }
            | Message::ClientPrefs { .. }
            | Message::IsReady { .. }
            | Message::GameOver { .. }) => {
                tracing::warn!(kind = other.kind(), "ignoring unexpected message");
            }
        }
        Ok(())
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::debug!(from = %self.state, to = %next, "state change");
            self.state = next;
        }
    }
}
