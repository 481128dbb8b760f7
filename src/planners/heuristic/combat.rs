use crate::infra::{Direction, Team};
use crate::state::Observation;

// Offsets (dx, dy) from the agent scanned for each firing direction.
const UP: &[(i32, i32)] = &[(0, -2)];
const DOWN: &[(i32, i32)] = &[(0, 2)];
const LEFT: &[(i32, i32)] = &[(-1, 1), (-1, -1), (-2, 0)];
const RIGHT: &[(i32, i32)] = &[(1, 1), (1, -1), (2, 0)];

fn offsets(direction: Direction) -> &'static [(i32, i32)] {
    match direction {
        Direction::Up => UP,
        Direction::Down => DOWN,
        Direction::Left => LEFT,
        Direction::Right => RIGHT,
    }
}

/// First direction, in up/down/left/right order, whose offsets show an
/// enemy agent. The agent's own cell is also checked, on the home side.
pub fn detect_enemy(team: Team, window: &Observation) -> Option<Direction> {
    Direction::ALL.into_iter().find(|&direction| {
        let own_cell: &[(i32, i32)] = if direction == team.home_direction() {
            &[(0, 0)]
        } else {
            &[]
        };
        offsets(direction)
            .iter()
            .chain(own_cell)
            .any(|&(dx, dy)| window.get(dx, dy).is_some_and(|tile| tile.is_enemy_agent(team)))
    })
}
