//! Maze grid generation with obstacle placement.

use tracing::{debug, instrument, warn};

use super::random::RandomSource;
use super::types::{Cell, Grid};
use crate::error::GameError;

/// Scan-phase obstacle probability at full remaining ratio.
const BASE_OBSTACLE_PROBABILITY: f64 = 0.15;

/// Divisor of the raw obstacle formula `ceil(n² / 0.33)`.
const RAW_TARGET_DIVISOR: f64 = 0.33;

/// Default share of interior cells that may become obstacles.
pub const DEFAULT_MAX_INTERIOR_FILL: f64 = 0.5;

/// Failed fallback draws allowed per interior cell before enumerating.
const FALLBACK_DRAWS_PER_CELL: usize = 4;

/// Number of interior cells (rows and columns `1..=n-2`).
pub fn interior_cells(n: usize) -> usize {
    n.saturating_sub(2).pow(2)
}

/// Raw obstacle target `ceil(n² / 0.33)`.
///
/// This exceeds the number of cells for every n; [`obstacle_target`] clamps it.
pub fn raw_obstacle_target(n: usize) -> usize {
    ((n * n) as f64 / RAW_TARGET_DIVISOR).ceil() as usize
}

/// Obstacle target bounded by the interior capacity.
///
/// The capacity is `floor(interior × max_interior_fill)`, which keeps part of
/// the interior open and guarantees the fallback phase can always finish.
#[instrument]
pub fn obstacle_target(n: usize, max_interior_fill: f64) -> usize {
    let fill = max_interior_fill.clamp(0.0, 1.0);
    let capacity = (interior_cells(n) as f64 * fill).floor() as usize;
    let target = raw_obstacle_target(n).min(capacity);
    debug!(n, raw = raw_obstacle_target(n), capacity, target, "Obstacle target computed");
    target
}

/// True for the two cells orthogonally adjacent to the goal.
///
/// Both lie on the last row or column, outside the interior, so once the scan
/// skips them nothing can wall in the goal.
fn is_goal_neighbour(n: usize, row: usize, col: usize) -> bool {
    (row == n - 1 && col + 2 == n) || (col == n - 1 && row + 2 == n)
}

/// Builds maze grids.
#[derive(Debug, Clone, Copy, Default)]
pub struct MazeGenerator;

impl MazeGenerator {
    /// Generates an `n`×`n` grid with `obstacle_count` obstacles.
    ///
    /// Cell (0,0) is [`Cell::StartMarker`] and (n-1,n-1) is [`Cell::Goal`].
    /// Row 0, column 0 and both neighbours of the goal are always `Path`.
    /// If the interior runs out of free cells the grid is returned with fewer
    /// obstacles than requested.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidDimension`] when `n <= 0`.
    #[instrument(skip(rng))]
    pub fn generate(
        n: i64,
        obstacle_count: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<Grid, GameError> {
        if n <= 0 {
            warn!(n, "Rejected non-positive grid size");
            return Err(GameError::InvalidDimension {
                size: n,
                min: 1,
                max: usize::MAX,
            });
        }
        let n = n as usize;
        let target = obstacle_count;
        let mut grid = Grid::filled(n);
        let mut placed = 0usize;

        for i in 0..n {
            for j in 0..n {
                let cell = if i == n - 1 && j == n - 1 {
                    Cell::Goal
                } else if i == 0 && j == 0 {
                    Cell::StartMarker
                } else if placed < target && i != 0 && j != 0 && !is_goal_neighbour(n, i, j) {
                    let roll = rng.next_f64();
                    let remaining_ratio = (target - placed) as f64 / target as f64;
                    if roll < BASE_OBSTACLE_PROBABILITY * remaining_ratio {
                        placed += 1;
                        Cell::Obstacle
                    } else {
                        Cell::Path
                    }
                } else {
                    Cell::Path
                };
                grid.set(i, j, cell);
            }
        }
        debug!(placed, target, "Scan phase complete");

        if placed < target {
            placed += Self::fill_interior(&mut grid, target - placed, rng);
        }

        if placed < target {
            warn!(placed, target, "Interior exhausted, obstacle count capped");
        }
        debug!(n, obstacles = placed, "Maze generated");
        Ok(grid)
    }

    /// Places up to `missing` obstacles on interior `Path` cells.
    ///
    /// Random draws first; after too many misses the remaining free interior
    /// cells are enumerated and picked from directly. Returns the number placed.
    fn fill_interior(grid: &mut Grid, missing: usize, rng: &mut dyn RandomSource) -> usize {
        let n = grid.size();
        if n < 3 {
            return 0;
        }
        let last_interior = n - 2;
        let max_misses = FALLBACK_DRAWS_PER_CELL * interior_cells(n);
        let mut placed = 0;
        let mut misses = 0;

        while placed < missing && misses < max_misses {
            let row = rng.next_in_range(1, last_interior);
            let col = rng.next_in_range(1, last_interior);
            if grid.cell(row, col) == Some(Cell::Path) {
                grid.set(row, col, Cell::Obstacle);
                placed += 1;
            } else {
                misses += 1;
            }
        }

        if placed < missing {
            debug!(placed, missing, misses, "Switching to enumerated placement");
            let mut free: Vec<(usize, usize)> = (1..=last_interior)
                .flat_map(|row| (1..=last_interior).map(move |col| (row, col)))
                .filter(|&(row, col)| grid.cell(row, col) == Some(Cell::Path))
                .collect();
            while placed < missing && !free.is_empty() {
                let pick = rng.next_in_range(0, free.len() - 1);
                let (row, col) = free.swap_remove(pick);
                grid.set(row, col, Cell::Obstacle);
                placed += 1;
            }
        }

        placed
    }
}
