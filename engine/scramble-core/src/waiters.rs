//! Wait/notify registry.
//!
//! Two kinds of one-shot tokens: per-cell waiters for blocked first-card
//! flips, and board-wide change watchers. Registration and resolution happen
//! under the board lock; the receiving side is awaited after the lock is
//! released. A resolved token is removed and never reused.

use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::card::Position;

pub(crate) type WaiterId = u64;

#[derive(Debug, Default)]
pub(crate) struct WaitRegistry {
    next_id: WaiterId,
    cells: HashMap<Position, Vec<(WaiterId, oneshot::Sender<()>)>>,
    watchers: HashMap<WaiterId, oneshot::Sender<()>>,
}

impl WaitRegistry {
    fn next_id(&mut self) -> WaiterId {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn register_cell_waiter(
        &mut self,
        pos: Position,
    ) -> (WaiterId, oneshot::Receiver<()>) {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.cells.entry(pos).or_default().push((id, tx));
        (id, rx)
    }

    /// Wake every flip waiting on `pos`. Returns how many were woken.
    pub(crate) fn resolve_cell_waiters(&mut self, pos: Position) -> usize {
        let Some(waiters) = self.cells.remove(&pos) else {
            return 0;
        };
        let woken = waiters.len();
        for (_, tx) in waiters {
            // The receiver may already be gone if its flip was cancelled.
            let _ = tx.send(());
        }
        woken
    }

    /// Deregister a waiter that is no longer listening. No-op if it was
    /// already resolved.
    pub(crate) fn cancel_cell_waiter(&mut self, pos: Position, id: WaiterId) -> bool {
        let Some(waiters) = self.cells.get_mut(&pos) else {
            return false;
        };
        let before = waiters.len();
        waiters.retain(|(waiter, _)| *waiter != id);
        let removed = waiters.len() != before;
        if waiters.is_empty() {
            self.cells.remove(&pos);
        }
        removed
    }

    pub(crate) fn register_change_watcher(&mut self) -> (WaiterId, oneshot::Receiver<()>) {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.watchers.insert(id, tx);
        (id, rx)
    }

    /// Wake and clear every pending watcher. Returns how many were woken.
    pub(crate) fn resolve_all_change_watchers(&mut self) -> usize {
        let woken = self.watchers.len();
        for (_, tx) in self.watchers.drain() {
            let _ = tx.send(());
        }
        woken
    }

    pub(crate) fn cancel_change_watcher(&mut self, id: WaiterId) -> bool {
        self.watchers.remove(&id).is_some()
    }

    pub(crate) fn cell_waiter_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub(crate) fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}
