//! Per-player move tracking: controlled cells and the deferred outcome of the
//! last completed move.

use std::collections::HashMap;

use crate::card::Position;

/// Outcome of a player's previous move, applied lazily at the start of their
/// next flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingMove {
    /// Both cards matched and are still controlled; they get removed.
    Matched([Position; 2]),
    /// One or two cards left face up without control; they get turned face
    /// down if nobody has claimed them since.
    Unmatched(Vec<Position>),
}

#[derive(Debug, Default)]
pub(crate) struct MoveTracker {
    owned: HashMap<String, Vec<Position>>,
    pending: HashMap<String, PendingMove>,
}

impl MoveTracker {
    /// Cells `player` controls, in the order they were taken.
    pub(crate) fn owned(&self, player: &str) -> &[Position] {
        self.owned.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn take(&mut self, player: &str, pos: Position) {
        let cells = self.owned.entry(player.to_string()).or_default();
        if !cells.contains(&pos) {
            cells.push(pos);
        }
    }

    /// Drop `pos` from the player's list. Empty lists are removed.
    pub(crate) fn release(&mut self, player: &str, pos: Position) -> bool {
        let Some(cells) = self.owned.get_mut(player) else {
            return false;
        };
        let before = cells.len();
        cells.retain(|p| *p != pos);
        let removed = cells.len() != before;
        if cells.is_empty() {
            self.owned.remove(player);
        }
        removed
    }

    pub(crate) fn take_pending(&mut self, player: &str) -> Option<PendingMove> {
        self.pending.remove(player)
    }

    pub(crate) fn set_pending(&mut self, player: &str, pending: PendingMove) {
        self.pending.insert(player.to_string(), pending);
    }

    pub(crate) fn ownership(&self) -> impl Iterator<Item = (&str, &[Position])> {
        self.owned
            .iter()
            .map(|(player, cells)| (player.as_str(), cells.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_and_release() {
        let mut tracker = MoveTracker::default();
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);

        tracker.take("alice", a);
        tracker.take("alice", b);
        tracker.take("alice", b);
        assert_eq!(tracker.owned("alice"), &[a, b]);
        assert!(tracker.owned("bob").is_empty());

        assert!(tracker.release("alice", a));
        assert!(!tracker.release("alice", a));
        assert!(tracker.release("alice", b));
        assert_eq!(tracker.ownership().count(), 0);
    }

    #[test]
    fn test_pending_is_consumed_once() {
        let mut tracker = MoveTracker::default();
        let pending = PendingMove::Unmatched(vec![Position::new(1, 1)]);
        tracker.set_pending("alice", pending.clone());
        assert_eq!(tracker.take_pending("alice"), Some(pending));
        assert_eq!(tracker.take_pending("alice"), None);
    }
}
