//! The `Host` trait: what the embedding chess application provides.
//!
//! The session never touches the host's board, clocks, or players
//! directly. It reports what the relay told it through these calls and
//! the host decides what that means for its own game loop.

use std::fmt;
use std::time::Duration;

/// A chess colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// Which of the host's two clocks an elapsed-time update is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSlot {
    /// The player whose turn it is.
    PlayerToMove,
    /// The player waiting for the other to move.
    PlayerNotToMove,
}

/// Everything the host needs to begin a relayed match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSetup {
    /// Side played by the local bot.
    pub local_side: Side,
    /// Side played by the remote counterpart.
    pub remote_side: Side,
    /// Start position as FEN.
    pub start_fen: String,
    /// Clock budget per side.
    pub clock: Duration,
}

/// How a match ended.
///
/// `Display` yields the bare variant name, which is also the `reason`
/// string sent in `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    WhiteIsMated,
    BlackIsMated,
    Stalemate,
    Repetition,
    FiftyMoveRule,
    InsufficientMaterial,
    DrawByArbiter,
    WhiteTimeout,
    BlackTimeout,
    WhiteIllegalMove,
    BlackIllegalMove,
}

impl MatchResult {
    /// The result for `side` running out of time.
    pub fn timeout(side: Side) -> Self {
        match side {
            Side::White => MatchResult::WhiteTimeout,
            Side::Black => MatchResult::BlackTimeout,
        }
    }

    pub fn is_timeout(self) -> bool {
        matches!(self, MatchResult::WhiteTimeout | MatchResult::BlackTimeout)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Callbacks into the application the session is embedded in.
///
/// Calls arrive from whichever task drives [`Session::update`] or
/// [`Session::think`](crate::Session::think), one at a time.
///
/// [`Session::update`]: crate::Session::update
pub trait Host {
    /// Overwrites the elapsed time on one of the two clocks.
    ///
    /// Called for every relayed move, with the clock values the remote
    /// side reported.
    fn set_elapsed(&mut self, slot: ClockSlot, elapsed: Duration);

    /// Begins a match between the local bot and the relayed opponent.
    fn start_match(&mut self, setup: MatchSetup);

    /// Ends the current match with the given result.
    fn end_match(&mut self, result: MatchResult);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_side() {
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::Black.opposite().opposite(), Side::Black);
    }

    #[test]
    fn test_timeout_result_per_side() {
        assert_eq!(MatchResult::timeout(Side::White), MatchResult::WhiteTimeout);
        assert_eq!(MatchResult::timeout(Side::Black), MatchResult::BlackTimeout);
        assert!(MatchResult::BlackTimeout.is_timeout());
        assert!(!MatchResult::DrawByArbiter.is_timeout());
    }

    #[test]
    fn test_result_display_is_variant_name() {
        assert_eq!(MatchResult::WhiteIsMated.to_string(), "WhiteIsMated");
        assert_eq!(MatchResult::DrawByArbiter.to_string(), "DrawByArbiter");
    }
}
