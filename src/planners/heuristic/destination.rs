use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use tracing::debug;

use crate::infra::{Bounds, Direction, Position, Team};
use crate::state::SharedKnowledge;

// Logistic remap of linear progress: slow decay early, sharp decay late.
const PROGRESS_STEEPNESS: f64 = 8.0;
const PROGRESS_MIDPOINT: f64 = 0.65;

const DIRECTION_PRIORITY_INITIAL: f64 = 2.7;
const DIRECTION_PRIORITY_DECAY: f64 = 0.6;
const CENTER_PRIORITY_INITIAL: f64 = 1.8;
const CENTER_PRIORITY_DECAY: f64 = 1.3;

/// Weights of remembered cells outside the current window are raised to
/// `1 / STALENESS_PENALTY`.
const STALENESS_PENALTY: f64 = 2.5;

/// Bases of the per-candidate weight `direction^x_score * center^y_score`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priorities {
    pub direction: f64,
    pub center: f64,
}

impl Priorities {
    pub fn at(progress: f64) -> Self {
        Self {
            direction: DIRECTION_PRIORITY_INITIAL - DIRECTION_PRIORITY_DECAY * progress,
            center: CENTER_PRIORITY_INITIAL - CENTER_PRIORITY_DECAY * progress,
        }
    }
}

/// Linear progress toward the enemy side, in [0, 1].
pub fn linear_progress(team: Team, x: i32, width: i32) -> f64 {
    if width <= 0 {
        return 0.0;
    }
    let width = f64::from(width);
    let progress = match team.attack_direction() {
        Direction::Right => f64::from(x) / width,
        _ => (width - 1.0 - f64::from(x)) / width,
    };
    progress.clamp(0.0, 1.0)
}

/// Remaps linear progress through the logistic curve, rescaled so that 0
/// and 1 are fixed points.
pub fn progress_curve(linear: f64) -> f64 {
    let sigmoid = |p: f64| 1.0 / (1.0 + (-PROGRESS_STEEPNESS * (p - PROGRESS_MIDPOINT)).exp());
    let low = sigmoid(0.0);
    let high = sigmoid(1.0);
    ((sigmoid(linear) - low) / (high - low)).clamp(0.0, 1.0)
}

/// Picks exploration targets among known, unvisited, non-wall cells.
#[derive(Debug, Clone, Copy)]
pub struct DestinationSelector {
    team: Team,
}

impl DestinationSelector {
    pub fn new(team: Team) -> Self {
        Self { team }
    }

    /// Known cells that are neither blocking, the own flag, nor visited.
    /// Sorted so a seeded draw is reproducible.
    pub fn candidates(&self, shared: &SharedKnowledge) -> Vec<Position> {
        let visited = shared.visited();
        let mut candidates: Vec<Position> = shared
            .map()
            .iter()
            .filter(|(pos, tile)| {
                !tile.is_blocking() && !tile.is_own_flag(self.team) && !visited.contains(*pos)
            })
            .map(|(pos, _)| *pos)
            .collect();
        candidates.sort_by_key(|pos| (pos.y, pos.x));
        candidates
    }

    /// Relative weight per candidate, scaled so the heaviest is 1.
    ///
    /// Computed in log space: the ratios match the direct power formula but
    /// large maps cannot overflow to infinity.
    pub fn weights(
        &self,
        candidates: &[Position],
        position: Position,
        carrying_flag: bool,
        visible: Bounds,
        map_width: i32,
        map_height: i32,
    ) -> Vec<f64> {
        let Some(max_x) = candidates.iter().map(|pos| pos.x).max() else {
            return Vec::new();
        };

        let progress = progress_curve(linear_progress(self.team, position.x, map_width));
        let priorities = Priorities::at(progress);
        let direction_ln = priorities.direction.ln();
        let center_ln = priorities.center.ln();

        let heading = if carrying_flag {
            self.team.home_direction()
        } else {
            self.team.attack_direction()
        };
        let half_height = f64::from(map_height) / 2.0;

        let log_weights: Vec<f64> = candidates
            .iter()
            .map(|pos| {
                let x_score = match heading {
                    Direction::Right => f64::from(pos.x),
                    _ => f64::from(max_x - pos.x),
                };
                let y_score = half_height - (f64::from(pos.y) - half_height).abs();
                let log_weight = x_score * direction_ln + y_score * center_ln;
                if visible.contains(pos) {
                    log_weight
                } else {
                    log_weight / STALENESS_PENALTY
                }
            })
            .collect();

        let max_log = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        log_weights.iter().map(|lw| (lw - max_log).exp()).collect()
    }

    /// Weighted random draw of the next exploration target. The chosen cell
    /// and its four neighbours are marked visited so the next draw looks
    /// elsewhere.
    #[tracing::instrument(level = "debug", skip(self, shared, rng), fields(team = %self.team))]
    pub fn select<R: Rng + ?Sized>(
        &self,
        shared: &mut SharedKnowledge,
        position: Position,
        carrying_flag: bool,
        visible: Bounds,
        rng: &mut R,
    ) -> Option<Position> {
        let candidates = self.candidates(shared);
        let weights = self.weights(
            &candidates,
            position,
            carrying_flag,
            visible,
            shared.map().width,
            shared.map().height,
        );

        let distribution = match WeightedIndex::new(&weights) {
            Ok(distribution) => distribution,
            Err(err) => {
                debug!(candidates = candidates.len(), %err, "No exploration target");
                return None;
            }
        };

        let selected = candidates[distribution.sample(rng)];
        shared.mark_visited(std::iter::once(selected).chain(selected.neighbors()));
        debug!(?selected, candidates = candidates.len(), "Exploration target selected");
        Some(selected)
    }
}
