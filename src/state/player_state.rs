use std::cell::OnceCell;
use std::collections::VecDeque;

use crate::infra::Position;

/// Per-agent navigation state. The agent's position is supplied by the
/// game every tick and is not stored here.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub carrying_flag: bool,
    path: VecDeque<Position>,
    /// Own flag tile, assigned on first sighting and never moved.
    base: OnceCell<Position>,
    /// Enemy flag tile, assigned on first sighting and never moved.
    enemy_flag: OnceCell<Position>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> Option<Position> {
        self.base.get().copied()
    }

    pub fn enemy_flag(&self) -> Option<Position> {
        self.enemy_flag.get().copied()
    }

    /// Returns true if this call set the base. Later calls are ignored.
    pub fn discover_base(&self, pos: Position) -> bool {
        self.base.set(pos).is_ok()
    }

    pub fn discover_enemy_flag(&self, pos: Position) -> bool {
        self.enemy_flag.set(pos).is_ok()
    }

    /// Replaces the queued path. `steps` must not include the current
    /// position.
    pub fn set_path<I>(&mut self, steps: I)
    where
        I: IntoIterator<Item = Position>,
    {
        self.path = steps.into_iter().collect();
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    pub fn peek_step(&self) -> Option<Position> {
        self.path.front().copied()
    }

    pub fn pop_step(&mut self) -> Option<Position> {
        self.path.pop_front()
    }

    /// Final cell of the queued path.
    pub fn destination(&self) -> Option<Position> {
        self.path.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_is_assigned_once() {
        let state = PlayerState::new();
        assert_eq!(state.base(), None);
        assert!(state.discover_base(Position::new(1, 2)));
        assert!(!state.discover_base(Position::new(7, 7)));
        assert_eq!(state.base(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_enemy_flag_is_assigned_once() {
        let state = PlayerState::new();
        assert!(state.discover_enemy_flag(Position::new(9, 1)));
        assert!(!state.discover_enemy_flag(Position::new(0, 0)));
        assert_eq!(state.enemy_flag(), Some(Position::new(9, 1)));
    }

    #[test]
    fn test_path_is_fifo() {
        let mut state = PlayerState::new();
        state.set_path([Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]);
        assert_eq!(state.destination(), Some(Position::new(3, 0)));
        assert_eq!(state.pop_step(), Some(Position::new(1, 0)));
        assert_eq!(state.pop_step(), Some(Position::new(2, 0)));
        assert_eq!(state.path_len(), 1);
        state.clear_path();
        assert!(!state.has_path());
        assert_eq!(state.pop_step(), None);
    }
}
