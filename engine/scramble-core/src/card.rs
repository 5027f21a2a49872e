//! Card values and grid coordinates.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoardError, Result};

/// A card value: a non-empty string with no whitespace.
///
/// Cheap to clone; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(Arc<str>);

impl Card {
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(BoardError::InvalidCard(value.to_string()));
        }
        Ok(Self(Arc::from(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Card {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Card {
    type Error = BoardError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Card {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

/// A (row, column) coordinate on the board, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
