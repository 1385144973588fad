//! Relay session management for chesslink.
//!
//! This crate is the client's protocol engine:
//!
//! 1. **Handshake**: version check and room admission right after
//!    connecting.
//! 2. **Reader loop**: one background decode at a time, paused around
//!    every write ([`ReaderLoop`]).
//! 3. **State machine**: answers the server and drives the [`Host`]
//!    through a match ([`Session`]).
//! 4. **Move relay**: [`Session::think`] and [`Session::on_game_over`] for
//!    the bot framework.
//!
//! # How it fits in the stack
//!
//! ```text
//! Host application (above)  ← start_match / end_match / clocks
//!     ↕
//! Session Layer (this crate)  ← connection phase, replies, move relay
//!     ↕
//! Protocol + Transport (below)  ← Message, JsonCodec, framed TCP
//! ```

mod config;
mod error;
mod handshake;
mod host;
mod reader;
mod relay;
mod session;

pub use config::{ClientConfig, ProfileConfig, STANDARD_START_FEN, ServerConfig, TimeoutConfig};
pub use error::SessionError;
pub use host::{ClockSlot, Host, MatchResult, MatchSetup, Side};
pub use reader::ReaderLoop;
pub use session::{ConnectionState, Session};
