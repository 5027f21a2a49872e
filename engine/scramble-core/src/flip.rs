//! Flip state machine.
//!
//! One attempt runs entirely under the board lock and either finishes, fails,
//! or hands back a wake-up token for the caller to await after unlocking.
//! A woken caller starts a fresh attempt; nothing carries over.

use tokio::sync::oneshot;
use tracing::debug;

use crate::card::Position;
use crate::error::{BoardError, Result};
use crate::state::BoardState;
use crate::tracker::PendingMove;
use crate::waiters::WaiterId;

/// Result of a single flip attempt that did not fail.
#[derive(Debug)]
pub(crate) enum FlipAttempt {
    Done,
    /// The first card is held by someone else; retry once signalled.
    Blocked {
        waiter: WaiterId,
        signal: oneshot::Receiver<()>,
    },
}

impl BoardState {
    /// Run one flip attempt for `player` at `pos`. `pos` must be in bounds.
    pub(crate) fn attempt_flip(&mut self, player: &str, pos: Position) -> Result<FlipAttempt> {
        self.finish_previous_move(player);

        let owned = self.moves.owned(player).to_vec();

        if self.grid.card(pos).is_none() {
            if let Some(&first) = owned.first() {
                self.give_up_first_card(player, first);
            }
            debug!(player, %pos, "flip failed: no card");
            return Err(BoardError::NoCard {
                row: pos.row,
                col: pos.col,
            });
        }

        let attempt = match owned.as_slice() {
            [] => self.flip_first(player, pos),
            [first] => self.flip_second(player, *first, pos),
            _ => Err(BoardError::InvariantViolated(format!(
                "{} starts a flip holding {} cards",
                player,
                owned.len()
            ))),
        };
        debug_assert!(self.check_rep().is_ok(), "{:?}", self.check_rep());
        attempt
    }

    /// Apply the deferred outcome of the player's previous move, if any.
    fn finish_previous_move(&mut self, player: &str) {
        match self.moves.take_pending(player) {
            None => {}
            Some(PendingMove::Matched(pair)) => {
                for pos in pair {
                    self.remove(player, pos);
                }
                debug!(player, first = %pair[0], second = %pair[1], "removed matched pair");
            }
            Some(PendingMove::Unmatched(cells)) => {
                for pos in cells {
                    // Skip cards someone else has claimed since.
                    if self.grid.controller(pos).is_none() && self.grid.turn_face_down(pos) {
                        self.notify_change();
                    }
                }
            }
        }
    }

    /// Relinquish a held first card after a failed second flip.
    fn give_up_first_card(&mut self, player: &str, first: Position) {
        self.relinquish(player, first);
        self.moves
            .set_pending(player, PendingMove::Unmatched(vec![first]));
    }

    fn flip_first(&mut self, player: &str, pos: Position) -> Result<FlipAttempt> {
        match self.grid.controller(pos) {
            Some(holder) if holder != player => {
                let (waiter, signal) = self.waiters.register_cell_waiter(pos);
                debug!(player, %pos, holder, "first card controlled, waiting");
                Ok(FlipAttempt::Blocked { waiter, signal })
            }
            _ => {
                if self.grid.turn_face_up(pos) {
                    self.notify_change();
                }
                self.claim(player, pos);
                debug!(player, %pos, "took first card");
                Ok(FlipAttempt::Done)
            }
        }
    }

    fn flip_second(&mut self, player: &str, first: Position, pos: Position) -> Result<FlipAttempt> {
        // Never wait here: two players each holding the card the other wants
        // would deadlock.
        if self.grid.is_face_up(pos) && self.grid.controller(pos).is_some() {
            self.give_up_first_card(player, first);
            debug!(player, %pos, "flip failed: second card controlled");
            return Err(BoardError::Controlled {
                row: pos.row,
                col: pos.col,
            });
        }

        if self.grid.turn_face_up(pos) {
            self.notify_change();
        }
        self.claim(player, pos);

        if self.grid.card(first) == self.grid.card(pos) {
            self.moves
                .set_pending(player, PendingMove::Matched([first, pos]));
            debug!(player, %first, %pos, "cards match");
        } else {
            self.relinquish(player, first);
            self.relinquish(player, pos);
            self.moves
                .set_pending(player, PendingMove::Unmatched(vec![first, pos]));
            debug!(player, %first, %pos, "cards do not match");
        }
        Ok(FlipAttempt::Done)
    }
}
