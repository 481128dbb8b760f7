use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::infra::{Position, Tile};
use crate::state::Map;

/// Upper bound on node expansions per search. Hitting it means "no path",
/// it keeps a search over a large unknown region from stalling the tick.
pub const MAX_EXPANSIONS: usize = 10_000;

#[derive(Clone, Copy, Eq, PartialEq)]
struct Node {
    pos: Position,
    g: i64,
    h: i64,
    /// Discovery order, last tie-breaker.
    seq: u64,
}

impl Node {
    fn f(&self) -> i64 {
        self.g + self.h
    }
}

impl Ord for Node {
    // Reversed for a min-heap: lowest f, then lowest h, then first discovered.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f()
            .cmp(&self.f())
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStar;

impl AStar {
    /// Four-connected search over the known part of `map` with unit step
    /// cost. A cell is traversable when it is known, not blocking, and not
    /// matched by `extra_blocked`. Returns the path including `start` and
    /// `goal`, or `None` when the goal is unreachable or the expansion cap is
    /// reached.
    ///
    /// The heuristic is the squared euclidean distance. It overestimates for
    /// anything further than one step, so paths are usually but not always
    /// shortest.
    pub fn find_path<F>(map: &Map, start: Position, goal: Position, extra_blocked: F) -> Option<Vec<Position>>
    where
        F: Fn(&Tile) -> bool,
    {
        Self::find_path_bounded(map, start, goal, extra_blocked, MAX_EXPANSIONS)
    }

    #[tracing::instrument(level = "trace", skip(map, extra_blocked), fields(start_x = start.x, start_y = start.y, goal_x = goal.x, goal_y = goal.y))]
    pub fn find_path_bounded<F>(
        map: &Map,
        start: Position,
        goal: Position,
        extra_blocked: F,
        max_expansions: usize,
    ) -> Option<Vec<Position>>
    where
        F: Fn(&Tile) -> bool,
    {
        if start == goal {
            return Some(vec![goal]);
        }

        let is_walkable = |pos: &Position| match map.get(pos) {
            Some(tile) => !tile.is_blocking() && !extra_blocked(tile),
            None => false,
        };

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_score: HashMap<Position, i64> = HashMap::new();
        let mut closed_set: HashSet<Position> = HashSet::new();
        let mut seq = 0;

        g_score.insert(start, 0);
        open_set.push(Node {
            pos: start,
            g: 0,
            h: heuristic(start, goal),
            seq,
        });

        let mut expansions = 0;

        while let Some(node) = open_set.pop() {
            let current = node.pos;

            // Superseded entry: the cell was reached again with a lower g.
            if closed_set.contains(&current) || node.g > *g_score.get(&current).unwrap_or(&i64::MAX) {
                continue;
            }

            if current == goal {
                tracing::trace!(expansions, "Path found");
                return Some(reconstruct_path(&came_from, current));
            }

            closed_set.insert(current);

            expansions += 1;
            if expansions > max_expansions {
                tracing::warn!(expansions, "Max expansions reached, giving up");
                return None;
            }

            for neighbor in current.neighbors() {
                if closed_set.contains(&neighbor) || !is_walkable(&neighbor) {
                    continue;
                }

                let tentative_g = node.g + 1;
                if tentative_g < *g_score.get(&neighbor).unwrap_or(&i64::MAX) {
                    seq += 1;
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    open_set.push(Node {
                        pos: neighbor,
                        g: tentative_g,
                        h: heuristic(neighbor, goal),
                        seq,
                    });
                }
            }
        }

        tracing::trace!(expansions, "No path found");
        None
    }
}

/// Tile class that blocks nothing beyond walls and obstacles.
pub fn no_extra_blocked(_tile: &Tile) -> bool {
    false
}

fn heuristic(a: Position, b: Position) -> i64 {
    a.distance_squared(&b)
}

fn reconstruct_path(came_from: &HashMap<Position, Position>, mut current: Position) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
