//! Error type shared by every board operation.

use std::path::PathBuf;

/// Errors reported by the board.
///
/// `OutOfBounds`, `NoCard` and `Controlled` are the ordinary outcomes of a
/// flip that the rules reject. The rest signal bad input or a broken board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("position ({row}, {col}) is out of bounds for a {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("no card at ({row}, {col})")]
    NoCard { row: usize, col: usize },

    #[error("card at ({row}, {col}) is controlled by a player")]
    Controlled { row: usize, col: usize },

    #[error("malformed board: {0}")]
    Malformed(String),

    #[error("invalid card value {0:?}: must be non-empty with no whitespace")]
    InvalidCard(String),

    #[error("transform failed for card {card:?}: {reason}")]
    Transform { card: String, reason: String },

    #[error("board invariant violated: {0}")]
    InvariantViolated(String),

    #[error("failed to read board file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BoardError {
    /// True for failures the game rules produce during normal play.
    pub fn is_flip_failure(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. } | Self::NoCard { .. } | Self::Controlled { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_failures_are_classified() {
        assert!(BoardError::NoCard { row: 0, col: 0 }.is_flip_failure());
        assert!(BoardError::Controlled { row: 1, col: 2 }.is_flip_failure());
        assert!(BoardError::OutOfBounds {
            row: 9,
            col: 0,
            rows: 3,
            cols: 3
        }
        .is_flip_failure());
        assert!(!BoardError::Malformed("bad".into()).is_flip_failure());
        assert!(!BoardError::InvalidCard("a b".into()).is_flip_failure());
    }

    #[test]
    fn test_messages() {
        let err = BoardError::OutOfBounds {
            row: 5,
            col: 1,
            rows: 5,
            cols: 5,
        };
        assert_eq!(
            err.to_string(),
            "position (5, 1) is out of bounds for a 5x5 board"
        );
        assert_eq!(
            BoardError::NoCard { row: 0, col: 3 }.to_string(),
            "no card at (0, 3)"
        );
    }
}
