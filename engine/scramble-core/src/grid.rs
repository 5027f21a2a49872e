//! Grid store: the rectangular array of cells.
//!
//! Pure data. Callers are responsible for keeping the ownership lists in
//! `MoveTracker` in step with the controller fields kept here.

use std::fmt;

use crate::card::{Card, Position};
use crate::error::{BoardError, Result};

/// One grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cell {
    /// Card removed. Always face down with no controller.
    Empty,
    Occupied {
        card: Card,
        face_up: bool,
        /// Only ever set while `face_up` is true.
        controller: Option<String>,
    },
}

impl Cell {
    fn face_down(card: Card) -> Self {
        Self::Occupied {
            card,
            face_up: false,
            controller: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major, `rows * cols` long.
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid with every card face down and uncontrolled.
    pub(crate) fn new(rows: usize, cols: usize, cards: Vec<Vec<Card>>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::Malformed(format!(
                "dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        if cards.len() != rows {
            return Err(BoardError::Malformed(format!(
                "expected {} rows, got {}",
                rows,
                cards.len()
            )));
        }
        if let Some((r, row)) = cards.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(BoardError::Malformed(format!(
                "row {} has {} columns, expected {}",
                r,
                row.len(),
                cols
            )));
        }
        // Every row checked, so `rows * cols` is the number of cards in hand.
        let cells: Vec<Cell> = cards
            .into_iter()
            .flatten()
            .map(Cell::face_down)
            .collect();
        Ok(Self { rows, cols, cells })
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "{} outside {}x{}", pos, self.rows, self.cols);
        pos.row * self.cols + pos.col
    }

    pub(crate) fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.index(pos)]
    }

    fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let idx = self.index(pos);
        &mut self.cells[idx]
    }

    /// All positions in row-major order.
    pub(crate) fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Position::new(i / cols, i % cols))
    }

    /// Cells paired with their positions, row-major.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.positions().zip(self.cells.iter())
    }

    pub(crate) fn card(&self, pos: Position) -> Option<&Card> {
        match self.cell(pos) {
            Cell::Empty => None,
            Cell::Occupied { card, .. } => Some(card),
        }
    }

    pub(crate) fn is_face_up(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Cell::Occupied { face_up: true, .. })
    }

    pub(crate) fn controller(&self, pos: Position) -> Option<&str> {
        match self.cell(pos) {
            Cell::Occupied {
                controller: Some(player),
                ..
            } => Some(player.as_str()),
            _ => None,
        }
    }

    /// Turn an occupied card face up. Returns true if it was face down.
    pub(crate) fn turn_face_up(&mut self, pos: Position) -> bool {
        match self.cell_mut(pos) {
            Cell::Occupied { face_up, .. } if !*face_up => {
                *face_up = true;
                true
            }
            _ => false,
        }
    }

    /// Turn an uncontrolled card face down. Returns true if it was face up.
    pub(crate) fn turn_face_down(&mut self, pos: Position) -> bool {
        match self.cell_mut(pos) {
            Cell::Occupied {
                face_up,
                controller: None,
                ..
            } if *face_up => {
                *face_up = false;
                true
            }
            _ => false,
        }
    }

    /// Set or clear the controller of an occupied cell.
    pub(crate) fn set_controller(&mut self, pos: Position, player: Option<&str>) {
        if let Cell::Occupied { controller, .. } = self.cell_mut(pos) {
            *controller = player.map(str::to_string);
        }
    }

    /// Remove the card. Returns true if there was one.
    pub(crate) fn remove(&mut self, pos: Position) -> bool {
        let cell = self.cell_mut(pos);
        let was_occupied = matches!(cell, Cell::Occupied { .. });
        *cell = Cell::Empty;
        was_occupied
    }

    /// Replace the card value at `pos` if it currently equals `from`.
    pub(crate) fn rewrite(&mut self, pos: Position, from: &Card, to: &Card) -> bool {
        match self.cell_mut(pos) {
            Cell::Occupied { card, .. } if card == from => {
                *card = to.clone();
                true
            }
            _ => false,
        }
    }
}

/// Debug view: `---` empty, `???` face down, `[X]` controlled, ` X ` face up.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, cell) in self.iter() {
            if pos.col > 0 {
                f.write_str(" ")?;
            }
            match cell {
                Cell::Empty => f.write_str("---")?,
                Cell::Occupied { face_up: false, .. } => f.write_str("???")?,
                Cell::Occupied {
                    card,
                    controller: Some(_),
                    ..
                } => write!(f, "[{}]", card)?,
                Cell::Occupied { card, .. } => write!(f, " {} ", card)?,
            }
            if pos.col + 1 == self.cols && pos.row + 1 < self.rows {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
