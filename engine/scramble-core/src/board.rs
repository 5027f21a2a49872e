//! The shared board.
//!
//! A `Board` is meant to be shared behind an `Arc` by every connected player.
//! All state sits behind one `std::sync::Mutex`; the guard is never held
//! across an `.await`, so every operation's future stays `Send`.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::card::{Card, Position};
use crate::error::{BoardError, Result};
use crate::flip::FlipAttempt;
use crate::grid::Grid;
use crate::state::BoardState;
use crate::waiters::WaiterId;

#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    state: Mutex<BoardState>,
}

impl Board {
    /// Create a board with every card face down.
    ///
    /// `cards` is row-major and must be exactly `rows` x `cols`.
    pub fn new<S: AsRef<str>>(rows: usize, cols: usize, cards: Vec<Vec<S>>) -> Result<Self> {
        let cards = cards
            .into_iter()
            .map(|row| row.iter().map(Card::new).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()
            .map_err(|err| BoardError::Malformed(err.to_string()))?;
        let grid = Grid::new(rows, cols, cards)?;
        debug!(rows, cols, "created board");
        Ok(Self {
            rows,
            cols,
            state: Mutex::new(BoardState::new(grid)),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Nothing panics while holding the lock, but if something ever does the
    /// state is still structurally valid, so keep serving it.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn position(&self, row: usize, col: usize) -> Result<Position> {
        if row < self.rows && col < self.cols {
            Ok(Position::new(row, col))
        } else {
            Err(BoardError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// The board as `player` sees it. Never blocks on other players.
    pub fn look(&self, player: &str) -> String {
        self.lock().grid.render(player)
    }

    /// Flip the card at (`row`, `col`) for `player` and return the resulting
    /// view.
    ///
    /// A first card held by another player makes this wait until that card is
    /// relinquished or removed, then try again from scratch. A second card
    /// never waits. Dropping the returned future while it waits withdraws the
    /// request.
    pub async fn flip(&self, player: &str, row: usize, col: usize) -> Result<String> {
        let pos = self.position(row, col)?;
        loop {
            let (waiter, signal) = {
                let mut state = self.lock();
                match state.attempt_flip(player, pos)? {
                    FlipAttempt::Done => return Ok(state.grid.render(player)),
                    FlipAttempt::Blocked { waiter, signal } => (
                        CellWaiter {
                            board: self,
                            pos,
                            id: waiter,
                        },
                        signal,
                    ),
                }
            };
            // A closed channel only happens if the registry was dropped,
            // which cannot outlive `self`; either way, retry.
            let _ = signal.await;
            drop(waiter);
            debug!(player, %pos, "woken, retrying flip");
        }
    }

    /// Wait for the next change to face state, removal or card value, then
    /// return the view for `player`.
    ///
    /// Control changing hands without a card turning over does not count.
    pub async fn watch(&self, player: &str) -> String {
        let (watcher, signal) = {
            let mut state = self.lock();
            let (id, signal) = state.waiters.register_change_watcher();
            (ChangeWatcher { board: self, id }, signal)
        };
        let _ = signal.await;
        drop(watcher);
        self.look(player)
    }

    /// Verify the board's internal invariants.
    pub fn check_rep(&self) -> Result<()> {
        self.lock().check_rep()
    }

    /// Human-readable grid for logs and reports. Not player-relative.
    pub fn snapshot_grid(&self) -> String {
        self.lock().grid.to_string()
    }

    /// Flips currently parked on a controlled card.
    pub fn blocked_flips(&self) -> usize {
        self.lock().waiters.cell_waiter_count()
    }

    /// `watch` calls currently waiting for a change.
    pub fn pending_watchers(&self) -> usize {
        self.lock().waiters.watcher_count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.snapshot_grid())
    }
}

/// Withdraws a parked flip when dropped. Harmless once already resolved.
struct CellWaiter<'a> {
    board: &'a Board,
    pos: Position,
    id: WaiterId,
}

impl Drop for CellWaiter<'_> {
    fn drop(&mut self) {
        if self
            .board
            .lock()
            .waiters
            .cancel_cell_waiter(self.pos, self.id)
        {
            debug!(pos = %self.pos, id = self.id, "cancelled blocked flip");
        }
    }
}

struct ChangeWatcher<'a> {
    board: &'a Board,
    id: WaiterId,
}

impl Drop for ChangeWatcher<'_> {
    fn drop(&mut self) {
        if self.board.lock().waiters.cancel_change_watcher(self.id) {
            debug!(id = self.id, "cancelled watch");
        }
    }
}
