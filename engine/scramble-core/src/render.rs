//! Player-relative text view of the board.
//!
//! ```text
//! 2x2
//! my A
//! down
//! up B
//! none
//! ```

use std::fmt::Write;

use crate::grid::{Cell, Grid};

impl Grid {
    /// Render the board as seen by `player`. Every line ends in `\n`.
    pub(crate) fn render(&self, player: &str) -> String {
        let mut out = String::with_capacity(8 + self.rows() * self.cols() * 8);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}x{}", self.rows(), self.cols());
        for (_, cell) in self.iter() {
            let _ = match cell {
                Cell::Empty => writeln!(out, "none"),
                Cell::Occupied { face_up: false, .. } => writeln!(out, "down"),
                Cell::Occupied {
                    card,
                    controller: Some(holder),
                    ..
                } if holder == player => writeln!(out, "my {}", card),
                Cell::Occupied { card, .. } => writeln!(out, "up {}", card),
            };
        }
        out
    }
}
