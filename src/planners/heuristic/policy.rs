use rand::Rng;
use tracing::{debug, info};

use super::combat::detect_enemy;
use super::destination::DestinationSelector;
use crate::infra::{AStar, Action, Position, Team, TerminationReason, Tile, determine_direction};
use crate::state::{Map, MapMemory, Observation, PlayerState, SharedKnowledge};

/// Everything the game hands an agent on its turn.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub observation: &'a Observation,
    pub position: Position,
    pub can_shoot: bool,
    pub carrying_flag: bool,
    /// Informational only.
    pub health: i32,
    /// Informational only, firing is gated by `can_shoot`.
    pub ammo: i32,
}

/// One capture-the-flag agent: map memory, navigation state and the
/// per-tick decision rules.
#[derive(Debug, Clone)]
pub struct Agent {
    team: Team,
    index: usize,
    memory: MapMemory,
    state: PlayerState,
    selector: DestinationSelector,
}

impl Agent {
    pub fn new(team: Team, index: usize, map_width: i32, map_height: i32) -> Self {
        Self {
            team,
            index,
            memory: MapMemory::new(map_width, map_height),
            state: PlayerState::new(),
            selector: DestinationSelector::new(team),
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Resolves this tick's action. Rules are tried in order and the first
    /// that applies wins: combat, flag return, flag capture, path
    /// continuation, exploration.
    #[tracing::instrument(level = "debug", skip_all, fields(team = %self.team, index = self.index, x = input.position.x, y = input.position.y))]
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        input: &TickInput<'_>,
        shared: &mut SharedKnowledge,
        rng: &mut R,
    ) -> Action {
        let position = input.position;
        self.memory.update(input.observation, position, shared);
        self.discover_flags(shared.map());
        self.state.carrying_flag = input.carrying_flag;
        debug!(health = input.health, ammo = input.ammo, carrying = input.carrying_flag, "Tick");

        if input.can_shoot
            && let Some(direction) = detect_enemy(self.team, input.observation)
        {
            debug!(%direction, "Enemy in range, shooting");
            return Action::Shoot(direction);
        }

        if self.state.carrying_flag {
            return self.return_flag(position, input.observation, shared.map());
        }

        if let Some(flag) = self.state.enemy_flag() {
            if position == flag {
                debug!("Standing on the enemy flag, waiting");
                return Action::Idle;
            }
            if self.state.destination() != Some(flag)
                && let Some(path) = plan(shared.map(), position, flag, None)
                && let Some(action) = self.follow(position, path, input.observation)
            {
                debug!(?flag, "Targeting enemy flag");
                return action;
            }
        }

        if self.state.has_path()
            && let Some(action) = self.continue_path(position, input.observation, shared.map())
        {
            return action;
        }

        self.explore(position, input.observation, shared, rng)
    }

    pub fn terminate(&mut self, reason: TerminationReason) {
        info!(team = %self.team, index = self.index, %reason, "Agent terminated");
        self.state.clear_path();
    }

    fn discover_flags(&self, map: &Map) {
        let team = self.team;
        if self.state.base().is_none()
            && let Some(base) = map.find(|tile| tile.is_own_flag(team))
            && self.state.discover_base(base)
        {
            info!(team = %team, index = self.index, ?base, "Base located");
        }
        if self.state.enemy_flag().is_none()
            && let Some(flag) = map.find(|tile| tile.is_enemy_flag(team))
            && self.state.discover_enemy_flag(flag)
        {
            info!(team = %team, index = self.index, ?flag, "Enemy flag located");
        }
    }

    /// Carrying the flag: head home or hold still. Never explores.
    fn return_flag(&mut self, position: Position, window: &Observation, map: &Map) -> Action {
        let Some(base) = self.state.base() else {
            debug!("Carrying the flag but base unknown, idling");
            return Action::Idle;
        };
        if position == base {
            debug!("Home with the flag, waiting for the capture");
            return Action::Idle;
        }
        let Some(path) = plan(map, position, base, None) else {
            debug!(?base, "No path home, idling");
            return Action::Idle;
        };
        self.follow(position, path, window).unwrap_or_else(|| {
            debug!(?base, "Way home is occupied, waiting");
            Action::Idle
        })
    }

    /// Pops the next queued step after checking it against the live window.
    /// An occupied or blocked step drops the path. A step out of reach (the
    /// last move was refused) is replanned once toward the same destination.
    /// `None` hands over to exploration.
    fn continue_path(&mut self, position: Position, window: &Observation, map: &Map) -> Option<Action> {
        let next = self.state.peek_step()?;
        if next.is_adjacent(&position) {
            if map.is_traversable(&next) && step_is_clear(window, position, next) {
                self.state.pop_step();
                return Some(Action::Move(determine_direction(position, next)));
            }
            debug!(?next, "Next step is occupied, dropping path");
            self.state.clear_path();
            return None;
        }

        let destination = self.state.destination()?;
        debug!(?next, ?destination, "Queued step is out of reach, replanning");
        self.state.clear_path();
        let blocked = self.blocked_toward(map, destination);
        let path = plan(map, position, destination, blocked)?;
        self.follow(position, path, window)
    }

    fn explore<R: Rng + ?Sized>(
        &mut self,
        position: Position,
        window: &Observation,
        shared: &mut SharedKnowledge,
        rng: &mut R,
    ) -> Action {
        let Some(target) = self.selector.select(
            shared,
            position,
            self.state.carrying_flag,
            window.bounds(position),
            rng,
        ) else {
            return Action::Idle;
        };

        let blocked = self.blocked_toward(shared.map(), target);
        let Some(path) = plan(shared.map(), position, target, blocked) else {
            debug!(?target, "Exploration target unreachable, idling");
            return Action::Idle;
        };
        self.follow(position, path, window).unwrap_or_else(|| {
            debug!(?target, "Route to exploration target is occupied, idling");
            Action::Idle
        })
    }

    /// Tile class kept out of a route to `target`: the enemy flag collider,
    /// unless the target is the enemy flag or that collider itself.
    fn blocked_toward(&self, map: &Map, target: Position) -> Option<Tile> {
        if self.state.enemy_flag() == Some(target) {
            return None;
        }
        exploration_blocked(self.team, map, target)
    }

    /// Queues `path` and takes its first step. Leaves the current path alone
    /// when the window shows that step blocked or occupied.
    fn follow(&mut self, position: Position, path: Vec<Position>, window: &Observation) -> Option<Action> {
        let next = *path.get(1)?;
        if !step_is_clear(window, position, next) {
            debug!(?next, "First step is occupied");
            return None;
        }
        self.state.set_path(path.into_iter().skip(2));
        Some(Action::Move(determine_direction(position, next)))
    }
}

pub(crate) fn exploration_blocked(team: Team, map: &Map, target: Position) -> Option<Tile> {
    let collider = Tile::FlagCollider(team.opponent());
    if map.get(&target) == Some(&collider) {
        None
    } else {
        Some(collider)
    }
}

/// False when the window currently shows `next` as a wall, an obstacle or
/// another agent. Cells outside the window count as clear.
fn step_is_clear(window: &Observation, position: Position, next: Position) -> bool {
    match window.get(next.x - position.x, next.y - position.y) {
        Some(tile) => !tile.is_blocking() && !matches!(tile, Tile::Agent { .. }),
        None => true,
    }
}

/// A* route that moves at least one step, or `None`.
fn plan(map: &Map, from: Position, to: Position, blocked: Option<Tile>) -> Option<Vec<Position>> {
    let path = AStar::find_path(map, from, to, |tile| Some(*tile) == blocked)?;
    (path.len() > 1).then_some(path)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::infra::Direction;

    fn knowledge(rows: &[&str]) -> SharedKnowledge {
        SharedKnowledge::from_map(Map::from_rows(rows).unwrap())
    }

    fn input(observation: &Observation, position: Position) -> TickInput<'_> {
        TickInput {
            observation,
            position,
            can_shoot: false,
            carrying_flag: false,
            health: 3,
            ammo: 5,
        }
    }

    fn blind() -> Observation {
        Observation::unknown(2)
    }

    #[test]
    fn test_end_to_end_capture_route() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let start = Position::new(0, 2);
        let path = AStar::find_path(shared.map(), start, Position::new(4, 2), |_| false).unwrap();
        assert_eq!(path.len(), 5);

        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(1);

        let action = agent.decide(&input(&window, start), &mut shared, &mut rng);

        assert_eq!(action, Action::Move(Direction::Right));
        assert_eq!(agent.state().enemy_flag(), Some(Position::new(4, 2)));
        assert_eq!(agent.state().path_len(), 3);
        assert!(shared.visited().is_empty());
    }

    #[test]
    fn test_path_is_followed_one_step_per_tick() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(1);

        let mut position = Position::new(0, 2);
        for _ in 0..4 {
            let action = agent.decide(&input(&window, position), &mut shared, &mut rng);
            let Action::Move(direction) = action else {
                panic!("expected a move, got {action:?}");
            };
            position = position.step(direction);
        }
        assert_eq!(position, Position::new(4, 2));
        assert!(!agent.state().has_path());
        assert_eq!(agent.decide(&input(&window, position), &mut shared, &mut rng), Action::Idle);
    }

    #[test]
    fn test_refused_move_replans_instead_of_panicking() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(1);
        let start = Position::new(0, 2);

        assert_eq!(
            agent.decide(&input(&window, start), &mut shared, &mut rng),
            Action::Move(Direction::Right)
        );
        // The game refused the move: still at the start, next queued step is two away.
        assert_eq!(
            agent.decide(&input(&window, start), &mut shared, &mut rng),
            Action::Move(Direction::Right)
        );
        assert_eq!(agent.state().destination(), Some(Position::new(4, 2)));
    }

    #[test]
    fn test_occupied_next_step_drops_path() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let mut rng = StdRng::seed_from_u64(1);
        let blind = blind();

        assert_eq!(
            agent.decide(&input(&blind, Position::new(0, 2)), &mut shared, &mut rng),
            Action::Move(Direction::Right)
        );
        assert_eq!(agent.state().peek_step(), Some(Position::new(2, 2)));

        // A teammate now stands on the next queued cell.
        let window = Observation::parse(&["...", ".bb", "..."]).unwrap();
        let action = agent.decide(&input(&window, Position::new(1, 2)), &mut shared, &mut rng);

        assert_ne!(action, Action::Move(Direction::Right));
        assert_ne!(agent.state().peek_step(), Some(Position::new(2, 2)));
        assert!(!shared.visited().is_empty());
    }

    #[test]
    fn test_refused_move_into_occupied_cell_is_not_retried() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let mut rng = StdRng::seed_from_u64(1);
        let start = Position::new(0, 2);

        assert_eq!(
            agent.decide(&input(&blind(), start), &mut shared, &mut rng),
            Action::Move(Direction::Right)
        );

        // The move was refused because a red agent holds (1, 2).
        let window = Observation::parse(&["?..", "?br", "?.."]).unwrap();
        for _ in 0..3 {
            let action = agent.decide(&input(&window, start), &mut shared, &mut rng);
            assert_ne!(action, Action::Move(Direction::Right));
        }
    }

    #[test]
    fn test_combat_wins_over_queued_path() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let mut rng = StdRng::seed_from_u64(1);

        agent.decide(&input(&blind(), Position::new(0, 2)), &mut shared, &mut rng);
        assert!(agent.state().has_path());

        let window = Observation::parse(&["?....", "?....", "?.b..", "?....", "?.r.."]).unwrap();
        let mut tick = input(&window, Position::new(1, 2));
        tick.can_shoot = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Shoot(Direction::Down));
        assert_eq!(agent.state().destination(), Some(Position::new(4, 2)));
    }

    #[test]
    fn test_combat_overrides_everything() {
        let mut shared = knowledge(&["B....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let mut rng = StdRng::seed_from_u64(1);
        let window = Observation::parse(&[".....", ".....", "..p..", ".....", "..r.."]).unwrap();

        let mut tick = input(&window, Position::new(2, 2));
        tick.can_shoot = true;
        tick.carrying_flag = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Shoot(Direction::Down));
    }

    #[test]
    fn test_no_shot_when_weapon_not_ready() {
        let mut shared = knowledge(&["B....", ".....", ".....", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let mut rng = StdRng::seed_from_u64(1);
        let window = Observation::parse(&[".....", ".....", "..p..", ".....", "..r.."]).unwrap();

        let mut tick = input(&window, Position::new(2, 2));
        tick.carrying_flag = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Move(Direction::Up));
    }

    #[test]
    fn test_carrier_heads_home() {
        let mut shared = knowledge(&["B....", ".....", "....R"]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 3);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(3);

        let mut tick = input(&window, Position::new(4, 0));
        tick.carrying_flag = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Move(Direction::Left));
        assert_eq!(agent.state().base(), Some(Position::new(0, 0)));
        assert_eq!(agent.state().destination(), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_carrier_without_base_idles_and_does_not_explore() {
        let mut shared = knowledge(&[".....", ".....", "....R"]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 3);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(3);

        let mut tick = input(&window, Position::new(4, 1));
        tick.carrying_flag = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Idle);
        assert!(shared.visited().is_empty());
        assert!(!agent.state().has_path());
    }

    #[test]
    fn test_carrier_at_base_idles() {
        let mut shared = knowledge(&["B....", "....R"]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 2);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(3);

        let mut tick = input(&window, Position::new(0, 0));
        tick.carrying_flag = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Idle);
    }

    #[test]
    fn test_carrier_with_walled_off_base_idles() {
        let mut shared = knowledge(&["B#...", "##...", "....R"]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 3);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(3);

        let mut tick = input(&window, Position::new(4, 0));
        tick.carrying_flag = true;

        assert_eq!(agent.decide(&tick, &mut shared, &mut rng), Action::Idle);
    }

    #[test]
    fn test_waits_on_enemy_flag() {
        let mut shared = knowledge(&["..R"]);
        let mut agent = Agent::new(Team::Blue, 0, 3, 1);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(
            agent.decide(&input(&window, Position::new(2, 0)), &mut shared, &mut rng),
            Action::Idle
        );
    }

    #[test]
    fn test_explores_when_nothing_else_to_do() {
        let mut shared = knowledge(&["......", "......", "......"]);
        let mut agent = Agent::new(Team::Red, 1, 6, 3);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(11);
        let position = Position::new(5, 1);

        let action = agent.decide(&input(&window, position), &mut shared, &mut rng);

        if let Action::Move(_) = action {
            let target = agent.state().destination().unwrap_or(position);
            assert!(shared.visited().contains(&target));
        } else {
            // Only possible if the draw picked our own cell.
            assert!(shared.visited().contains(&position));
        }
        assert!(shared.visited().len() >= 3);
    }

    #[test]
    fn test_exploration_without_candidates_idles() {
        let mut shared = knowledge(&["#####", "#B..#", "#####"]);
        shared.mark_visited([Position::new(2, 1), Position::new(3, 1)]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 3);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            agent.decide(&input(&window, Position::new(2, 1)), &mut shared, &mut rng),
            Action::Idle
        );
    }

    #[test]
    fn test_flags_discovered_from_teammate_knowledge() {
        let mut shared = knowledge(&["B...?", "????R"]);
        let mut agent = Agent::new(Team::Blue, 2, 5, 2);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(5);

        agent.decide(&input(&window, Position::new(1, 0)), &mut shared, &mut rng);

        assert_eq!(agent.state().base(), Some(Position::new(0, 0)));
        assert_eq!(agent.state().enemy_flag(), Some(Position::new(4, 1)));
    }

    #[test]
    fn test_exploration_blocks_enemy_collider_unless_it_is_the_target() {
        let map = Map::from_rows(&["..}.."]).unwrap();
        assert_eq!(
            exploration_blocked(Team::Blue, &map, Position::new(4, 0)),
            Some(Tile::FlagCollider(Team::Red))
        );
        assert_eq!(exploration_blocked(Team::Blue, &map, Position::new(2, 0)), None);
        assert_eq!(
            exploration_blocked(Team::Red, &map, Position::new(4, 0)),
            Some(Tile::FlagCollider(Team::Blue))
        );
    }

    #[test]
    fn test_terminate_clears_path() {
        let mut shared = knowledge(&[".....", ".....", "....R", ".....", "....."]);
        let mut agent = Agent::new(Team::Blue, 0, 5, 5);
        let window = blind();
        let mut rng = StdRng::seed_from_u64(1);

        agent.decide(&input(&window, Position::new(0, 2)), &mut shared, &mut rng);
        assert!(agent.state().has_path());
        agent.terminate(TerminationReason::Eliminated);
        assert!(!agent.state().has_path());
    }
}
