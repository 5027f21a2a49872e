//! The aggregate guarded by the board lock.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;

use crate::card::{Card, Position};
use crate::error::{BoardError, Result};
use crate::grid::{Cell, Grid};
use crate::tracker::MoveTracker;
use crate::waiters::WaitRegistry;

/// Everything mutable about a board. Only ever touched with the board lock
/// held.
#[derive(Debug)]
pub(crate) struct BoardState {
    pub(crate) grid: Grid,
    pub(crate) moves: MoveTracker,
    pub(crate) waiters: WaitRegistry,
    /// Value-keyed locks serializing concurrent `map` calls on the same card
    /// value. Created lazily, dropped when unused; awaited without the board
    /// lock held.
    map_locks: HashMap<Card, Arc<AsyncMutex<()>>>,
}

impl BoardState {
    pub(crate) fn new(grid: Grid) -> Self {
        Self {
            grid,
            moves: MoveTracker::default(),
            waiters: WaitRegistry::default(),
            map_locks: HashMap::new(),
        }
    }

    /// Give `player` control of the face-up card at `pos`.
    pub(crate) fn claim(&mut self, player: &str, pos: Position) {
        self.grid.set_controller(pos, Some(player));
        self.moves.take(player, pos);
        self.waiters.resolve_cell_waiters(pos);
    }

    /// Release `player`'s control of `pos`, leaving the card face up.
    pub(crate) fn relinquish(&mut self, player: &str, pos: Position) {
        if self.grid.controller(pos) == Some(player) {
            self.grid.set_controller(pos, None);
            self.moves.release(player, pos);
            self.waiters.resolve_cell_waiters(pos);
        }
    }

    /// Take a card off the board, waking anyone blocked on it.
    pub(crate) fn remove(&mut self, player: &str, pos: Position) -> bool {
        self.moves.release(player, pos);
        let removed = self.grid.remove(pos);
        self.waiters.resolve_cell_waiters(pos);
        if removed {
            self.notify_change();
        }
        removed
    }

    /// A qualifying change happened: face state, removal, or value.
    pub(crate) fn notify_change(&mut self) {
        self.waiters.resolve_all_change_watchers();
    }

    /// Present cards grouped by value, each with the positions holding it.
    pub(crate) fn group_by_card(&self) -> BTreeMap<Card, Vec<Position>> {
        let mut groups: BTreeMap<Card, Vec<Position>> = BTreeMap::new();
        for (pos, cell) in self.grid.iter() {
            if let Cell::Occupied { card, .. } = cell {
                groups.entry(card.clone()).or_default().push(pos);
            }
        }
        groups
    }

    /// The lock serializing maps over `card`, created on first use. Creation
    /// happens under the board lock so two racing maps get the same one.
    pub(crate) fn map_lock(&mut self, card: &Card) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.map_locks.entry(card.clone()).or_default())
    }

    /// Forget the lock for `card` if `held` is the last handle outside the
    /// table. Runs under the board lock, so no new handle can appear meanwhile.
    pub(crate) fn release_map_lock(&mut self, card: &Card, held: &Arc<AsyncMutex<()>>) {
        let unshared = self
            .map_locks
            .get(card)
            .is_some_and(|lock| Arc::ptr_eq(lock, held) && Arc::strong_count(lock) == 2);
        if unshared {
            self.map_locks.remove(card);
        }
    }

    #[cfg(test)]
    pub(crate) fn map_lock_count(&self) -> usize {
        self.map_locks.len()
    }

    /// Verify the grid and ownership invariants.
    pub(crate) fn check_rep(&self) -> Result<()> {
        let violation = |msg: String| -> Result<()> { Err(BoardError::InvariantViolated(msg)) };

        for (pos, cell) in self.grid.iter() {
            if let Cell::Occupied {
                face_up: false,
                controller: Some(player),
                ..
            } = cell
            {
                return violation(format!(
                    "face-down card at {} is controlled by {}",
                    pos, player
                ));
            }
            if let Some(player) = self.grid.controller(pos) {
                if !self.moves.owned(player).contains(&pos) {
                    return violation(format!(
                        "{} controls {} but does not own it",
                        player, pos
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        for (player, cells) in self.moves.ownership() {
            if cells.len() > 2 {
                return violation(format!("{} owns {} cards", player, cells.len()));
            }
            for &pos in cells {
                if !self.grid.contains(pos) {
                    return violation(format!("{} owns {} outside the board", player, pos));
                }
                if !seen.insert(pos) {
                    return violation(format!("{} is owned twice", pos));
                }
                if self.grid.controller(pos) != Some(player) {
                    return violation(format!(
                        "{} owns {} but the cell says otherwise",
                        player, pos
                    ));
                }
            }
        }
        Ok(())
    }
}
