//! Wire protocol for chesslink.
//!
//! This crate defines what travels inside each frame:
//!
//! - **Messages** ([`Message`], [`MoveMessage`]): the closed set of
//!   messages the relay server and client exchange.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a message becomes a
//!   frame payload and back.
//! - **Errors** ([`ProtocolError`]): malformed payloads and out-of-order
//!   messages.
//!
//! ```text
//! Transport (frames) → Protocol (Message) → Session (state machine)
//! ```

mod codec;
mod error;
mod message;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{CLIENT_VERSION, DEFAULT_PROTOCOL_VERSION, Message, MoveMessage};
