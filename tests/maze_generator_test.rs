//! Property tests for maze generation across the supported grid sizes.

use maze_walking::{
    Cell, DEFAULT_MAX_INTERIOR_FILL, GameError, MAX_GRID_SIZE, MIN_GRID_SIZE, MazeGenerator,
    SeededRandom, interior_cells, obstacle_target,
};

fn generate(n: usize, seed: u64) -> maze_walking::Grid {
    let mut rng = SeededRandom::new(seed);
    let target = obstacle_target(n, DEFAULT_MAX_INTERIOR_FILL);
    MazeGenerator::generate(n as i64, target, &mut rng).expect("Generation failed")
}

#[test]
fn test_grid_is_square_for_every_size() {
    for n in MIN_GRID_SIZE..=MAX_GRID_SIZE {
        let grid = generate(n, n as u64);
        assert_eq!(grid.size(), n);
        assert!(grid.rows().iter().all(|row| row.len() == n));
    }
}

#[test]
fn test_start_and_goal_are_fixed() {
    for n in MIN_GRID_SIZE..=MAX_GRID_SIZE {
        let grid = generate(n, 7);
        assert_eq!(grid.cell(0, 0), Some(Cell::StartMarker));
        assert_eq!(grid.cell(n - 1, n - 1), Some(Cell::Goal));
        assert_eq!(grid.count(Cell::StartMarker), 1);
        assert_eq!(grid.count(Cell::Goal), 1);
    }
}

#[test]
fn test_first_row_and_column_stay_open() {
    for n in MIN_GRID_SIZE..=MAX_GRID_SIZE {
        let grid = generate(n, 42);
        for k in 1..n {
            assert_eq!(grid.cell(0, k), Some(Cell::Path), "row 0 col {k} for n={n}");
            assert_eq!(grid.cell(k, 0), Some(Cell::Path), "row {k} col 0 for n={n}");
        }
    }
}

#[test]
fn test_obstacle_count_matches_bounded_target() {
    for n in MIN_GRID_SIZE..=MAX_GRID_SIZE {
        let grid = generate(n, 1234);
        let target = obstacle_target(n, DEFAULT_MAX_INTERIOR_FILL);
        assert_eq!(grid.count(Cell::Obstacle), target, "n={n}");
        assert!(target <= interior_cells(n));
    }
}

#[test]
fn test_same_seed_same_maze() {
    assert_eq!(generate(25, 99), generate(25, 99));
}

#[test]
fn test_high_fill_still_terminates() {
    let mut rng = SeededRandom::new(5);
    let n = 20;
    let target = obstacle_target(n, 0.95);
    let grid = MazeGenerator::generate(n as i64, target, &mut rng).expect("Generation failed");
    assert_eq!(grid.count(Cell::Obstacle), target);
}

#[test]
fn test_non_positive_size_is_rejected() {
    let mut rng = SeededRandom::new(0);
    for n in [0, -1, -50] {
        let err = MazeGenerator::generate(n, 0, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::InvalidDimension { size, .. } if size == n));
    }
}

#[test]
fn test_grid_serializes_as_cell_codes() {
    let grid = generate(3, 0);
    let json = serde_json::to_string(&grid).expect("Serialize failed");
    assert_eq!(json, "[[3,0,0],[0,0,0],[0,0,2]]");
}

#[test]
fn test_goal_is_never_walled_in() {
    for fill in [DEFAULT_MAX_INTERIOR_FILL, 0.95] {
        for n in 4..=8usize {
            for seed in 0..2000u64 {
                let mut rng = SeededRandom::new(seed);
                let target = obstacle_target(n, fill);
                let grid = MazeGenerator::generate(n as i64, target, &mut rng)
                    .expect("Generation failed");
                assert_eq!(grid.cell(n - 1, n - 2), Some(Cell::Path), "seed {seed}, n={n}");
                assert_eq!(grid.cell(n - 2, n - 1), Some(Cell::Path), "seed {seed}, n={n}");
                assert_eq!(grid.count(Cell::Obstacle), target, "seed {seed}, n={n}");
            }
        }
    }
    for n in MIN_GRID_SIZE..=MAX_GRID_SIZE {
        for seed in 0..20u64 {
            let grid = generate(n, seed);
            assert_eq!(grid.cell(n - 1, n - 2), Some(Cell::Path), "seed {seed}, n={n}");
            assert_eq!(grid.cell(n - 2, n - 1), Some(Cell::Path), "seed {seed}, n={n}");
        }
    }
}
