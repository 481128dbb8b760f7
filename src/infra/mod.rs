mod config;
mod default_observer;
mod game_observer;
mod pathfinding;
mod replay;
mod tile;
mod types;

pub use config::{Config, ConfigError};
pub use default_observer::DefaultObserver;
pub use game_observer::GameObserver;
pub use pathfinding::{AStar, MAX_EXPANSIONS, no_extra_blocked};
pub use replay::ReplayFile;
pub use tile::{Tile, TileError};
pub use types::{Action, Bounds, Direction, Position, StepError, Team, TerminationReason};

// ============================================================================
// Helper functions
// ============================================================================

/// Direction of the unit step from `from` to `to`.
///
/// # Panics
///
/// Panics when the two cells are not orthogonally adjacent. Paths handed to
/// the policy are always unit steps, so this is a defect in path handling.
pub fn determine_direction(from: Position, to: Position) -> Direction {
    match Direction::between(from, to) {
        Ok(direction) => direction,
        Err(err) => panic!("invalid move: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_direction() {
        let origin = Position::new(0, 0);
        assert_eq!(determine_direction(origin, Position::new(1, 0)), Direction::Right);
        assert_eq!(determine_direction(origin, Position::new(0, -1)), Direction::Up);
    }

    #[test]
    #[should_panic(expected = "invalid move")]
    fn test_determine_direction_rejects_diagonal() {
        determine_direction(Position::new(0, 0), Position::new(1, 1));
    }
}
