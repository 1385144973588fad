//! Client configuration: where the relay is, who we are, how long to wait.
//!
//! Every section has sensible defaults; a config file only needs the
//! fields it wants to override (`#[serde(default)]`).

use std::time::Duration;

use chesslink_protocol::{CLIENT_VERSION, DEFAULT_PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};

/// FEN of the standard chess starting position.
pub const STANDARD_START_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Top-level configuration for a relay session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay server address and protocol constants.
    pub server: ServerConfig,
    /// Identity and game preferences announced to the server.
    pub profile: ProfileConfig,
    /// Handshake deadlines.
    pub timeouts: TimeoutConfig,
}

/// Relay server address and protocol constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Must match the server's `ServerHello` exactly.
    pub protocol_version: String,
    /// Room to join; both players must name the same room.
    pub room_id: String,
    pub client_version: String,
}

/// Identity and game preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Display name shown to the opponent.
    pub user_name: String,
    /// Start position offered when the server asks for preferences.
    pub start_fen: String,
    /// Clock budget per side offered when the server asks for preferences.
    pub preferred_clock_ms: u64,
}

/// Handshake deadlines, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long to wait for `ServerHello` and for the answer to `ClientHello`.
    pub handshake_ms: u64,
    /// How long to wait for a `ShutdownMsg` after a `Reject`.
    pub reject_wait_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 4578,
            protocol_version: DEFAULT_PROTOCOL_VERSION.into(),
            room_id: "Room1".into(),
            client_version: CLIENT_VERSION.into(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            user_name: "Bob 99".into(),
            start_fen: STANDARD_START_FEN.into(),
            preferred_clock_ms: 60 * 1000,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            handshake_ms: 10_000,
            reject_wait_ms: 60_000,
        }
    }
}

impl TimeoutConfig {
    pub fn handshake(&self) -> Duration {
        Duration::from_millis(self.handshake_ms)
    }

    pub fn reject_wait(&self) -> Duration {
        Duration::from_millis(self.reject_wait_ms)
    }
}
