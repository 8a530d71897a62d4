//! Core domain types for the maze.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A cell on the maze grid.
///
/// Cells travel as small integers (JSON and the stored maze column), so the
/// discriminants are part of the wire contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::FromRepr, strum::Display,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Cell {
    /// Walkable cell.
    Path = 0,
    /// Wall; can never be entered.
    Obstacle = 1,
    /// Bottom-right cell that finishes the match.
    Goal = 2,
    /// Top-left cell, written only at generation time.
    StartMarker = 3,
}

impl Cell {
    /// Returns true if a player may stand on this cell.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Cell::Obstacle)
    }

    fn symbol(self) -> char {
        match self {
            Cell::Path => '.',
            Cell::Obstacle => '#',
            Cell::Goal => 'G',
            Cell::StartMarker => 'S',
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell as u8
    }
}

impl TryFrom<u8> for Cell {
    type Error = GridShapeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Cell::from_repr(code).ok_or(GridShapeError::UnknownCell(code))
    }
}

/// A position on the grid. `x` is the column, `y` is the row.
///
/// Coordinates are signed so that client-supplied out-of-range values
/// (including negatives) can be represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[display("({}, {})", x, y)]
pub struct Position {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl Position {
    /// The start position of every match.
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    /// Creates a new position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Builds a position from wide client coordinates, saturating at the
    /// `i32` range. A clamped value is still outside every grid.
    pub fn saturating(x: i64, y: i64) -> Self {
        let narrow = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Self::new(narrow(x), narrow(y))
    }
}

/// Reasons a nested cell matrix cannot be a grid.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GridShapeError {
    /// No rows at all.
    #[display("Grid has no rows")]
    Empty,
    /// A row length differs from the number of rows.
    #[display("Row {} has {} cells, expected {}", row, len, expected)]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// The grid side.
        expected: usize,
    },
    /// A cell code outside the known set.
    #[display("Unknown cell code {}", _0)]
    UnknownCell(#[error(not(source))] u8),
}

/// Square N×N maze grid stored row-major (`cells[y][x]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Cell>>", try_from = "Vec<Vec<Cell>>")]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Creates an all-`Path` grid of side `size`.
    pub fn filled(size: usize) -> Self {
        Self {
            cells: vec![vec![Cell::Path; size]; size],
        }
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        let n = self.size() as i64;
        (0..n).contains(&i64::from(pos.x)) && (0..n).contains(&i64::from(pos.y))
    }

    /// Gets the cell at a position, or `None` when outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if !self.contains(pos) {
            return None;
        }
        Some(self.cells[pos.y as usize][pos.x as usize])
    }

    /// Gets the cell at `(row, column)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Sets the cell at `(row, column)`. Out-of-range indices are ignored.
    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    /// The goal position `(N-1, N-1)`.
    pub fn goal(&self) -> Position {
        let last = self.size().saturating_sub(1) as i32;
        Position::new(last, last)
    }

    /// Rows of the grid.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Number of cells of the given type.
    pub fn count(&self, kind: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == kind)
            .count()
    }

    /// Formats the grid as text, one row per line.
    pub fn display(&self) -> String {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = GridShapeError;

    fn try_from(cells: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        if cells.is_empty() {
            return Err(GridShapeError::Empty);
        }
        let expected = cells.len();
        if let Some((row, r)) = cells.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(GridShapeError::NotSquare {
                row,
                len: r.len(),
                expected,
            });
        }
        Ok(Self { cells })
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}
