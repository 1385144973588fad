//! Game-facing entry points: the networked opponent as seen by the bot
//! framework.
//!
//! The host treats the relayed opponent like any other player. When it is
//! the opponent's turn the host calls [`Session::think`] with the move
//! history; when the game ends it calls [`Session::on_game_over`].

use std::time::Duration;

use chesslink_protocol::{Codec, Message, MoveMessage};
use tokio::time::Instant;

use crate::{ConnectionState, Host, Session, SessionError};

impl<H: Host, C: Codec + Clone> Session<H, C> {
    /// Relays the local side's latest move and waits for the remote reply.
    ///
    /// `history` is the game's move list so far; its last entry is sent
    /// unless it is the move the remote side just played. Waits at most
    /// `time_remaining`. Returns `None`, the no-move sentinel, when the
    /// remote side sends an empty move, the clock runs out, or the
    /// connection fails. Never returns an error.
    pub async fn think(
        &mut self,
        history: &[String],
        time_remaining: Duration,
    ) -> Option<String> {
        let deadline = Instant::now() + time_remaining;

        if let Some(local_move) = history.last() {
            if self.facts.last_received_move.as_deref() != Some(local_move.as_str()) {
                let msg = Message::Move(MoveMessage::new(local_move.clone(), false));
                if let Err(e) = self.send_message(&msg).await {
                    tracing::error!(error = %e, "could not relay move, waiting out the clock");
                    return wait_out(deadline).await;
                }
            }
        }

        self.wait_for_move(deadline).await
    }

    /// Reports the final move of the game to the peer, once per game.
    ///
    /// If the last move in `history` is the one the remote side just
    /// played, the local side never answered (a timeout), so the no-move
    /// sentinel is sent instead. Does nothing if the remote side already
    /// sent the terminal move. Leaves the connection open.
    pub async fn on_game_over(&mut self, history: &[String]) {
        if self.state() != ConnectionState::GameOnGoing
            || self.facts.terminal_move_received
            || self.facts.final_move_reported
        {
            return;
        }
        self.facts.final_move_reported = true;

        let final_move = match history.last() {
            Some(last) if self.facts.last_received_move.as_deref() != Some(last.as_str()) => {
                MoveMessage::new(last.clone(), true)
            }
            _ => {
                tracing::info!("no local reply to the last move, reporting no move");
                MoveMessage::no_move(true)
            }
        };

        if let Err(e) = self.send_message(&Message::Move(final_move)).await {
            tracing::error!(error = %e, "connection lost while reporting final move");
        }
    }

    /// Returns a move handed over by the reader if one is waiting.
    pub fn take_received_move(&mut self) -> Option<MoveMessage> {
        self.facts.next_move.take()
    }

    async fn wait_for_move(&mut self, deadline: Instant) -> Option<String> {
        loop {
            if let Some(mv) = self.take_received_move() {
                if mv.is_no_move() {
                    tracing::info!(last = mv.last_move, "remote side sent no move");
                    return None;
                }
                return Some(mv.move_name);
            }

            // Only the receive step is raced against the clock; a reply
            // must never be cut off halfway.
            let msg = match tokio::time::timeout_at(deadline, self.next_message()).await {
                Ok(Ok(msg)) => msg,
                Ok(Err(SessionError::NotConnected)) => {
                    tracing::info!("session ended while waiting for a move");
                    return None;
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "connection failed while waiting for a move");
                    return wait_out(deadline).await;
                }
                Err(_) => {
                    tracing::info!("clock ran out waiting for the remote move");
                    return None;
                }
            };

            if let Err(e) = self.dispatch(msg).await {
                tracing::error!(error = %e, "could not handle message while waiting for a move");
                return wait_out(deadline).await;
            }
        }
    }
}

/// Lets the host's own clock expire before reporting no move.
async fn wait_out(deadline: Instant) -> Option<String> {
    tokio::time::sleep_until(deadline).await;
    None
}
