//! Tests for move validation and the match engine.

use chrono::{Duration, Utc};
use maze_walking::{
    Cell, GameError, Grid, GridLimits, MOVE_SUCCESS_MESSAGE, Match, MatchEngine, MatchState, MoveOutcome,
    NewMatch, Position, SeededRandom, is_unit_step, validate,
};
use uuid::Uuid;

/// 4×4 grid with walls at (1, 1) and (2, 2).
fn walled_grid() -> Grid {
    use Cell::*;
    Grid::try_from(vec![
        vec![StartMarker, Path, Path, Path],
        vec![Path, Obstacle, Path, Path],
        vec![Path, Path, Obstacle, Path],
        vec![Path, Path, Path, Goal],
    ])
    .expect("Valid grid")
}

fn new_match(grid: Grid) -> Match {
    NewMatch::new(None, "tester".to_string(), grid).into_match(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "tester".to_string(),
        Utc::now(),
    )
}

#[test]
fn test_validate_accepts_orthogonal_step() {
    let grid = walled_grid();
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(1, 0)), MoveOutcome::Accepted);
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(0, 1)), MoveOutcome::Accepted);
}

#[test]
fn test_validate_rejects_out_of_bounds_first() {
    let grid = walled_grid();
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(-1, 0)), MoveOutcome::OutOfBounds);
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(0, 4)), MoveOutcome::OutOfBounds);
    // Far away and outside: bounds wins over step shape.
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(9, 9)), MoveOutcome::OutOfBounds);
}

#[test]
fn test_validate_rejects_obstacle_before_step_shape() {
    let grid = walled_grid();
    // Diagonal into a wall reports the wall.
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(1, 1)), MoveOutcome::Obstacle);
    assert_eq!(validate(&grid, Position::new(1, 0), Position::new(1, 1)), MoveOutcome::Obstacle);
}

#[test]
fn test_validate_rejects_diagonal_jump_and_stay() {
    let grid = walled_grid();
    assert_eq!(validate(&grid, Position::new(1, 0), Position::new(2, 1)), MoveOutcome::IllegalStep);
    assert_eq!(validate(&grid, Position::ORIGIN, Position::new(2, 0)), MoveOutcome::IllegalStep);
    assert_eq!(validate(&grid, Position::new(1, 0), Position::new(1, 0)), MoveOutcome::IllegalStep);
}

#[test]
fn test_start_marker_is_walkable() {
    let grid = walled_grid();
    assert_eq!(validate(&grid, Position::new(1, 0), Position::ORIGIN), MoveOutcome::Accepted);
}

#[test]
fn test_unit_step_helper() {
    assert!(is_unit_step(Position::new(3, 3), Position::new(3, 2)));
    assert!(!is_unit_step(Position::new(3, 3), Position::new(4, 4)));
    assert!(!is_unit_step(Position::new(3, 3), Position::new(3, 3)));
}

#[test]
fn test_apply_move_does_not_mutate_input() {
    let engine = MatchEngine::default();
    let current = new_match(walled_grid());
    let applied = engine
        .apply_move(&current, Position::new(1, 0), Utc::now())
        .expect("Move failed");
    assert_eq!(*current.current_position(), Position::ORIGIN);
    assert_eq!(*applied.updated().current_position(), Position::new(1, 0));
    assert_eq!(applied.message(), MOVE_SUCCESS_MESSAGE);
    assert!(!*applied.finished_now());
}

#[test]
fn test_rejections_carry_positions() {
    let engine = MatchEngine::default();
    let current = new_match(walled_grid());
    let now = Utc::now();

    let err = engine.apply_move(&current, Position::new(0, -1), now).unwrap_err();
    assert_eq!(err, GameError::OutOfBounds(Position::new(0, -1)));

    let err = engine.apply_move(&current, Position::new(2, 0), now).unwrap_err();
    assert_eq!(
        err,
        GameError::IllegalStep {
            from: Position::ORIGIN,
            to: Position::new(2, 0)
        }
    );
}

#[test]
fn test_reaching_goal_finishes_match() {
    let engine = MatchEngine::default();
    let start = Utc::now();
    let mut current = new_match(walled_grid());
    let path = [(1, 0), (2, 0), (3, 0), (3, 1), (3, 2), (3, 3)];

    let mut last = None;
    for (i, (x, y)) in path.into_iter().enumerate() {
        let applied = engine
            .apply_move(&current, Position::new(x, y), start + Duration::seconds(i as i64 + 1))
            .expect("Move failed");
        current = applied.updated().clone();
        last = Some(applied);
    }

    let last = last.expect("At least one move");
    assert!(*last.finished_now());
    assert_eq!(current.state(), MatchState::Finished);
    assert!(*current.finished());
    assert!(last.message().starts_with("Congratulations! You finished the maze in"));

    let err = engine
        .apply_move(&current, Position::new(3, 2), Utc::now())
        .unwrap_err();
    assert_eq!(err, GameError::AlreadyFinished);
}

#[test]
fn test_elapsed_never_decreases() {
    let engine = MatchEngine::default();
    let current = new_match(walled_grid());
    let later = *current.created_at() + Duration::seconds(10);
    let first = engine
        .apply_move(&current, Position::new(1, 0), later)
        .expect("Move failed")
        .into_match();
    assert!((first.elapsed_seconds() - 10.0).abs() < 1e-9);

    // Clock stepped back.
    let earlier = *current.created_at() + Duration::seconds(3);
    let second = engine
        .apply_move(&first, Position::ORIGIN, earlier)
        .expect("Move failed")
        .into_match();
    assert!(*second.elapsed_seconds() >= *first.elapsed_seconds());
}

#[test]
fn test_prepare_match_validates_input() {
    let engine = MatchEngine::default();
    let mut rng = SeededRandom::new(3);

    assert!(matches!(
        engine.prepare_match("   ", None, 5, &mut rng),
        Err(GameError::InvalidPlayerName { .. })
    ));
    assert!(matches!(
        engine.prepare_match(&"x".repeat(101), None, 5, &mut rng),
        Err(GameError::InvalidPlayerName { .. })
    ));
    for n in [2, 51, 0, -4] {
        assert!(matches!(
            engine.prepare_match("alice", None, n, &mut rng),
            Err(GameError::InvalidDimension { .. })
        ));
    }

    let prepared = engine
        .prepare_match("  alice ", None, 5, &mut rng)
        .expect("Prepare failed");
    assert_eq!(prepared.player_name(), "alice");
    assert_eq!(prepared.grid().size(), 5);
}

#[test]
fn test_tiny_grids_rejected_even_with_loose_limits() {
    let engine = MatchEngine::new(GridLimits::new(1, 50, 0.5));
    for n in [1, 2] {
        assert!(matches!(
            engine.check_size(n),
            Err(GameError::InvalidDimension { min: 3, .. })
        ));
    }
    assert_eq!(engine.check_size(3).expect("Size 3 accepted"), 3);
}
