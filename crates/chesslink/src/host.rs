//! A [`Host`] that only logs and remembers what the relay reported.
//!
//! Used by the `chesslink` binary to watch a room without a chess engine
//! attached, and handy in tests.

use std::time::Duration;

use chesslink_session::{ClockSlot, Host, MatchResult, MatchSetup};

/// Records match events and logs each one.
#[derive(Debug, Default)]
pub struct LoggingHost {
    setup: Option<MatchSetup>,
    result: Option<MatchResult>,
    to_move_elapsed: Duration,
    not_to_move_elapsed: Duration,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setup of the current or most recent match.
    pub fn setup(&self) -> Option<&MatchSetup> {
        self.setup.as_ref()
    }

    /// How the last match ended, if it has.
    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    pub fn elapsed(&self, slot: ClockSlot) -> Duration {
        match slot {
            ClockSlot::PlayerToMove => self.to_move_elapsed,
            ClockSlot::PlayerNotToMove => self.not_to_move_elapsed,
        }
    }
}

impl Host for LoggingHost {
    fn set_elapsed(&mut self, slot: ClockSlot, elapsed: Duration) {
        tracing::debug!(?slot, ?elapsed, "clock update");
        match slot {
            ClockSlot::PlayerToMove => self.to_move_elapsed = elapsed,
            ClockSlot::PlayerNotToMove => self.not_to_move_elapsed = elapsed,
        }
    }

    fn start_match(&mut self, setup: MatchSetup) {
        tracing::info!(
            local = %setup.local_side,
            remote = %setup.remote_side,
            fen = %setup.start_fen,
            clock = ?setup.clock,
            "match started"
        );
        self.to_move_elapsed = Duration::ZERO;
        self.not_to_move_elapsed = Duration::ZERO;
        self.result = None;
        self.setup = Some(setup);
    }

    fn end_match(&mut self, result: MatchResult) {
        tracing::info!(%result, "match ended");
        self.result = Some(result);
    }
}
