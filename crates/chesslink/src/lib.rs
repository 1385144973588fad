//! # chesslink
//!
//! Play chess against a remote bot through a TCP relay server.
//!
//! The relay pairs two clients in a named room and forwards their moves.
//! chesslink speaks the client side of that protocol: handshake, room and
//! game lifecycle, clock updates, and move relay. The embedding chess
//! application implements the [`Host`] trait and calls
//! [`Session::think`] whenever the remote side is to move.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chesslink::prelude::*;
//!
//! # async fn demo() -> Result<(), ChessLinkError> {
//! let mut client = ChessLinkClientBuilder::new()
//!     .config(ClientConfig::default())
//!     .build(LoggingHost::new());
//! client
//!     .run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
mod host;

pub use client::{ChessLinkClient, ChessLinkClientBuilder, PLAYER_QUIT_REASON, RunOutcome};
pub use error::ChessLinkError;
pub use host::LoggingHost;

pub use chesslink_protocol::{Codec, JsonCodec, Message, MoveMessage, ProtocolError};
pub use chesslink_session::{
    ClientConfig, ClockSlot, ConnectionState, Host, MatchResult, MatchSetup, Session,
    SessionError, Side,
};
pub use chesslink_transport::TransportError;

/// Everything an embedding application usually needs.
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::{
        ChessLinkClient, ChessLinkClientBuilder, ChessLinkError, ClientConfig, ClockSlot,
        ConnectionState, Host, LoggingHost, MatchResult, MatchSetup, Message, MoveMessage,
        RunOutcome, Session, SessionError, Side,
    };
}
