use std::collections::HashSet;

use crate::infra::{Position, Tile};
use crate::state::Map;

/// Team-wide knowledge fused from every teammate's observations. Both parts
/// only ever grow: map cells are first-writer-wins, visited marks are never
/// removed.
#[derive(Clone, Debug)]
pub struct SharedKnowledge {
    map: Map,
    visited: HashSet<Position>,
}

impl SharedKnowledge {
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_map(Map::new(width, height))
    }

    pub fn from_map(map: Map) -> Self {
        Self {
            map,
            visited: HashSet::new(),
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn record(&mut self, pos: Position, tile: Tile) -> bool {
        self.map.record(pos, tile)
    }

    /// Cells already chosen (or ruled out) as exploration targets.
    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    pub fn mark_visited<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Position>,
    {
        self.visited.extend(positions);
    }
}
