//! Wire messages exchanged with the relay server.
//!
//! Every frame on the wire carries exactly one [`Message`]. Messages are
//! internally tagged: the JSON object has a `"type"` field naming the
//! variant, so a decoder never needs outside context to know what it got.
//!
//! ```text
//! { "type": "GetReady", "isWhite": true, "gameStartFen": "...", "clockTimeMillis": 60000 }
//! ```

use serde::{Deserialize, Serialize};

/// Protocol version spoken by this client unless configured otherwise.
pub const DEFAULT_PROTOCOL_VERSION: &str = "0.2";

/// Client software version announced in `ClientHello`.
pub const CLIENT_VERSION: &str = "0.1";

// ---------------------------------------------------------------------------
// MoveMessage
// ---------------------------------------------------------------------------

/// A move relayed between the two players, with both clocks as the
/// sender saw them.
///
/// An empty `move_name` is the "no move" sentinel: the sender had nothing
/// to play, usually because its clock ran out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMessage {
    /// Move in the engine's own notation (e.g. `"e2e4"`). Opaque here.
    pub move_name: String,

    /// Whether this is the final move of the game.
    pub last_move: bool,

    /// Milliseconds the receiver's opponent has used on its clock.
    pub opponent_clock_elapsed_ms: u64,

    /// Milliseconds the receiver has used on its own clock.
    pub your_clock_elapsed_ms: u64,
}

impl MoveMessage {
    /// A move with no clock information attached.
    pub fn new(move_name: impl Into<String>, last_move: bool) -> Self {
        Self {
            move_name: move_name.into(),
            last_move,
            ..Self::default()
        }
    }

    /// The "no move" sentinel.
    pub fn no_move(last_move: bool) -> Self {
        Self::new(String::new(), last_move)
    }

    /// Returns `true` if this carries no move.
    pub fn is_no_move(&self) -> bool {
        self.move_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Every message the relay protocol knows about.
///
/// Direction notes use "client" for this crate's side and "server" for the
/// relay, which forwards game traffic from the other player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Message {
    // -- Handshake --

    /// Server → Client: first frame after the TCP connection opens.
    ServerHello { protocol_version: String },

    /// Client → Server: identity and the room to join.
    ClientHello {
        room_id: String,
        protocol_version: String,
        client_version: String,
        user_name: String,
    },

    /// Generic positive acknowledgement, either direction.
    Ack,

    /// Generic negative acknowledgement, either direction.
    Reject,

    // -- Room lifecycle --

    /// Heartbeat; the client echoes it back.
    Ping,

    /// Server → Client: asks for the client's game preferences.
    GiveYourPrefs,

    /// Client → Server: preferred start position and clock.
    ClientPrefs {
        start_fen: String,
        preferred_clock_millis: u64,
    },

    /// Server → Client: an opponent entered the room.
    PlayerJoined { user_name: String },

    /// Server → Client: the opponent left the room.
    PlayerLeft,

    /// Server → Client: parameters of the game about to start.
    GetReady {
        is_white: bool,
        game_start_fen: String,
        clock_time_millis: u64,
    },

    /// Client → Server: answer to `GetReady`.
    IsReady { is_ready: bool },

    /// Server → Client: the game begins now.
    GameStart { timestamp: u64 },

    // -- In game --

    /// A move, either direction.
    #[serde(rename = "MoveMessage")]
    Move(MoveMessage),

    /// Server → Client: someone's clock ran out.
    TimeOut { it_was_you: bool },

    /// Either direction: the sender is going away.
    #[serde(rename = "ShutdownMsg")]
    Shutdown { reason: String },

    /// Client → Server: the game ended for a reason other than a timeout.
    GameOver { reason: String },
}

impl Message {
    /// The wire tag of this message, for logs and error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::ServerHello { .. } => "ServerHello",
            Message::ClientHello { .. } => "ClientHello",
            Message::Ack => "Ack",
            Message::Reject => "Reject",
            Message::Ping => "Ping",
            Message::GiveYourPrefs => "GiveYourPrefs",
            Message::ClientPrefs { .. } => "ClientPrefs",
            Message::PlayerJoined { .. } => "PlayerJoined",
            Message::PlayerLeft => "PlayerLeft",
            Message::GetReady { .. } => "GetReady",
            Message::IsReady { .. } => "IsReady",
            Message::GameStart { .. } => "GameStart",
            Message::Move(_) => "MoveMessage",
            Message::TimeOut { .. } => "TimeOut",
            Message::Shutdown { .. } => "ShutdownMsg",
            Message::GameOver { .. } => "GameOver",
        }
    }
}

impl From<MoveMessage> for Message {
    fn from(mv: MoveMessage) -> Self {
        Message::Move(mv)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The relay server parses these shapes; a renamed field or tag breaks
    //! interop silently, so the JSON is pinned here.

    use super::*;

    fn every_variant() -> Vec<Message> {
        vec![
            Message::ServerHello {
                protocol_version: "0.2".into(),
            },
            Message::ClientHello {
                room_id: "Room1".into(),
                protocol_version: "0.2".into(),
                client_version: CLIENT_VERSION.into(),
                user_name: "Bob 99".into(),
            },
            Message::Ack,
            Message::Reject,
            Message::Ping,
            Message::GiveYourPrefs,
            Message::ClientPrefs {
                start_fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
                preferred_clock_millis: 60_000,
            },
            Message::PlayerJoined {
                user_name: "Alice".into(),
            },
            Message::PlayerLeft,
            Message::GetReady {
                is_white: true,
                game_start_fen: "startpos".into(),
                clock_time_millis: 30_000,
            },
            Message::IsReady { is_ready: true },
            Message::GameStart {
                timestamp: 1_700_000_000,
            },
            Message::Move(MoveMessage {
                move_name: "e2e4".into(),
                last_move: false,
                opponent_clock_elapsed_ms: 1200,
                your_clock_elapsed_ms: 800,
            }),
            Message::TimeOut { it_was_you: false },
            Message::Shutdown {
                reason: "Player Quit".into(),
            },
            Message::GameOver {
                reason: "WhiteIsMated".into(),
            },
        ]
    }

    #[test]
    fn test_every_variant_round_trips() {
        for msg in every_variant() {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: Message = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(msg, decoded, "{} did not round-trip", msg.kind());
        }
    }

    #[test]
    fn test_type_tag_matches_kind() {
        for msg in every_variant() {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
        }
    }

    #[test]
    fn test_client_hello_uses_camel_case_fields() {
        let msg = Message::ClientHello {
            room_id: "Room1".into(),
            protocol_version: "0.2".into(),
            client_version: "0.1".into(),
            user_name: "Bob".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["roomId"], "Room1");
        assert_eq!(json["protocolVersion"], "0.2");
        assert_eq!(json["clientVersion"], "0.1");
        assert_eq!(json["userName"], "Bob");
    }

    #[test]
    fn test_move_message_is_flattened_under_its_tag() {
        let msg = Message::Move(MoveMessage::new("g1f3", true));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "MoveMessage");
        assert_eq!(json["moveName"], "g1f3");
        assert_eq!(json["lastMove"], true);
        assert_eq!(json["opponentClockElapsedMs"], 0);
    }

    #[test]
    fn test_unit_variant_is_bare_tag() {
        let json = serde_json::to_string(&Message::Ack).unwrap();
        assert_eq!(json, r#"{"type":"Ack"}"#);
    }

    #[test]
    fn test_decode_from_server_json() {
        let raw = r#"{"type":"TimeOut","itWasYou":true}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg, Message::TimeOut { it_was_you: true });
    }

    #[test]
    fn test_no_move_sentinel() {
        let mv = MoveMessage::no_move(true);
        assert!(mv.is_no_move());
        assert!(mv.last_move);
        assert!(!MoveMessage::new("a7a5", false).is_no_move());
    }

    #[test]
    fn test_decode_unknown_type_returns_error() {
        let unknown = r#"{"type": "FlyToMoon", "speed": 9000}"#;
        let result: Result<Message, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_field_returns_error() {
        let missing = r#"{"type": "GetReady", "isWhite": true}"#;
        let result: Result<Message, _> = serde_json::from_str(missing);
        assert!(result.is_err());
    }
}
