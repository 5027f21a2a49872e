//! Board-wide card rewriting.
//!
//! Cards are processed one value group at a time. Each group is rewritten in a
//! single critical section, so two cards that were equal when the call began
//! are never observed with different values. Calls that race on the same
//! value serialize on a per-value lock, taken before the board lock.
//!
//! Value locks live only while some map holds or waits on them, so the table
//! stays bounded by the number of concurrent calls.
//!
//! If a transform fails the call stops there: groups already rewritten keep
//! their new value and later groups are left alone.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::board::Board;
use crate::card::Card;
use crate::error::{BoardError, Result};

impl Board {
    /// Rewrite every card through `transform` and return the view for
    /// `player`.
    ///
    /// `transform` must be a pure function of its input and must not call
    /// back into this board.
    ///
    /// Each value group is written back atomically and wakes watchers on its
    /// own, so a `watch` can return while later groups are still unmapped.
    pub async fn map<F, Fut>(&self, player: &str, transform: F) -> Result<String>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = String>,
    {
        self.try_map(player, |card| {
            let fut = transform(card);
            async move { Ok::<_, Infallible>(fut.await) }
        })
        .await
    }

    /// Like [`Board::map`], with a transform that can fail.
    ///
    /// The first failure aborts the call with `BoardError::Transform`; a
    /// result that is not a valid card aborts it with
    /// `BoardError::InvalidCard`.
    pub async fn try_map<F, Fut, E>(&self, player: &str, transform: F) -> Result<String>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
        E: Display,
    {
        let groups = self.lock().group_by_card();

        for (card, positions) in groups {
            let lease = self.lease_value(card.clone());
            let _serialized = lease.lock.lock().await;

            let replacement =
                transform(card.to_string())
                    .await
                    .map_err(|err| BoardError::Transform {
                        card: card.to_string(),
                        reason: err.to_string(),
                    })?;
            let replacement = Card::new(replacement)?;
            if replacement == card {
                continue;
            }

            let rewritten = {
                let mut state = self.lock();
                let mut rewritten = 0;
                for &pos in &positions {
                    // Skip cells removed or already rewritten since the snapshot.
                    if state.grid.rewrite(pos, &card, &replacement) {
                        rewritten += 1;
                    }
                }
                if rewritten > 0 {
                    state.notify_change();
                }
                debug_assert!(state.check_rep().is_ok(), "{:?}", state.check_rep());
                rewritten
            };
            debug!(from = %card, to = %replacement, rewritten, "rewrote card group");
        }

        Ok(self.look(player))
    }

    fn lease_value(&self, card: Card) -> ValueLease<'_> {
        let lock = self.lock().map_lock(&card);
        ValueLease {
            board: self,
            card,
            lock,
        }
    }

    /// Replace every `from` card with `to`.
    pub async fn replace(&self, player: &str, from: &str, to: &str) -> Result<String> {
        let to = Card::new(to)?;
        self.map(player, |card| {
            let out = if card == from { to.to_string() } else { card };
            async move { out }
        })
        .await
    }
}

/// A handle on one value lock. Dropping it, on any path including
/// cancellation, prunes the table entry if no other map is holding or waiting
/// on it.
struct ValueLease<'a> {
    board: &'a Board,
    card: Card,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for ValueLease<'_> {
    fn drop(&mut self) {
        self.board.lock().release_map_lock(&self.card, &self.lock);
    }
}
