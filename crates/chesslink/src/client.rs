//! `ChessLinkClient` builder and client loop.
//!
//! This is the entry point for running a relay client. It connects the
//! session, then polls it on a fixed interval so server requests are
//! answered and game events reach the host, until the session ends or the
//! caller asks to stop.

use std::future::Future;
use std::time::Duration;

use chesslink_session::{ClientConfig, ConnectionState, Host, Session, SessionError};
use tokio::time::MissedTickBehavior;

use crate::ChessLinkError;

/// Reason given to the server when the local player stops the client.
pub const PLAYER_QUIT_REASON: &str = "Player Quit";

/// Why [`ChessLinkClient::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The server ended the session with a shutdown notice.
    ServerClosed,
    /// The connection dropped without a shutdown notice.
    ConnectionLost,
    /// The caller's shutdown signal fired; the server was told we quit.
    Interrupted,
}

/// Builder for configuring a relay client.
///
/// # Example
///
/// ```rust,ignore
/// use chesslink::prelude::*;
///
/// let mut client = ChessLinkClientBuilder::new()
///     .config(config)
///     .build(LoggingHost::new());
/// let outcome = client.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
/// ```
pub struct ChessLinkClientBuilder {
    config: ClientConfig,
    poll_interval: Duration,
}

impl ChessLinkClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            poll_interval: Duration::from_millis(50),
        }
    }

    /// Sets the session configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how often the loop checks for inbound messages.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builds a disconnected client driving `host`.
    pub fn build<H: Host>(self, host: H) -> ChessLinkClient<H> {
        ChessLinkClient {
            session: Session::new(self.config, host),
            poll_interval: self.poll_interval,
        }
    }
}

impl Default for ChessLinkClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A relay client: one session plus the loop that keeps it serviced.
pub struct ChessLinkClient<H: Host> {
    session: Session<H>,
    poll_interval: Duration,
}

impl<H: Host> ChessLinkClient<H> {
    pub fn session(&self) -> &Session<H> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<H> {
        &mut self.session
    }

    /// Connects and services the session until it ends.
    ///
    /// When `shutdown` completes, a shutdown notice is sent and the loop
    /// returns [`RunOutcome::Interrupted`]. A failed handshake or a
    /// protocol desync is returned as an error; in the desync case the
    /// server is told why before the connection is closed.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<RunOutcome, ChessLinkError>
    where
        F: Future<Output = ()>,
    {
        self.session.start().await?;
        tracing::info!(
            room = %self.session.config().server.room_id,
            "chesslink client running"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    self.session.leave(PLAYER_QUIT_REASON).await;
                    return Ok(RunOutcome::Interrupted);
                }
                _ = ticker.tick() => {
                    if let Some(outcome) = self.drain().await? {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    /// Dispatches every message that has already arrived.
    async fn drain(&mut self) -> Result<Option<RunOutcome>, ChessLinkError> {
        loop {
            match self.session.update().await {
                Ok(true) => {
                    if self.session.state() == ConnectionState::NotConnected {
                        return Ok(Some(RunOutcome::ServerClosed));
                    }
                }
                Ok(false) => return Ok(None),
                Err(SessionError::ConnectionLost) => {
                    tracing::warn!("relay connection lost");
                    self.session.disconnect(false, "connection lost").await;
                    return Ok(Some(RunOutcome::ConnectionLost));
                }
                Err(e) => {
                    tracing::error!(error = %e, "session failed");
                    self.session.disconnect(true, &e.to_string()).await;
                    return Err(e.into());
                }
            }
        }
    }
}
