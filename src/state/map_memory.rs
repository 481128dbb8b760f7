use tracing::trace;

use crate::infra::Position;
use crate::state::{Map, Observation, SharedKnowledge};

/// Folds an agent's observation window into the team map and into the
/// agent's own copy.
#[derive(Clone, Debug)]
pub struct MapMemory {
    known: Map,
}

impl MapMemory {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            known: Map::new(width, height),
        }
    }

    /// Cells this agent has observed itself.
    pub fn known(&self) -> &Map {
        &self.known
    }

    #[tracing::instrument(level = "trace", skip(self, window, shared), fields(x = agent_pos.x, y = agent_pos.y))]
    pub fn update(&mut self, window: &Observation, agent_pos: Position, shared: &mut SharedKnowledge) {
        let mut learned = 0;
        for (dx, dy, tile) in window.cells() {
            // Unknown carries no information.
            if tile.is_unknown() {
                continue;
            }
            let pos = Position::new(agent_pos.x + dx, agent_pos.y + dy);
            if !self.known.in_bounds(&pos) {
                continue;
            }
            if shared.record(pos, tile) {
                learned += 1;
            }
            self.known.record(pos, tile);
        }
        trace!(learned, "Map memory updated");
    }
}
