use std::fmt;

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::arena::{Arena, ArenaEvent};
use crate::infra::{Config, GameObserver, ReplayFile, Team, TerminationReason};
use crate::planners::heuristic::{Agent, TickInput};
use crate::state::SharedKnowledge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Captured(Team),
    Eliminated { winner: Team },
    TimedOut,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Captured(team) => write!(f, "{team} captured the flag"),
            MatchResult::Eliminated { winner } => write!(f, "{winner} eliminated the opponents"),
            MatchResult::TimedOut => write!(f, "timed out"),
        }
    }
}

fn slot(team: Team) -> usize {
    match team {
        Team::Blue => 0,
        Team::Red => 1,
    }
}

/// Runs a match on the local arena. Agents act one at a time in spawn
/// order, each team sharing one knowledge store.
pub struct Game {
    arena: Arena,
    agents: Vec<Agent>,
    knowledge: [SharedKnowledge; 2],
    observer: Box<dyn GameObserver>,
    replay: Option<ReplayFile>,
    rng: StdRng,
    seed: Option<u64>,
    vision_radius: i32,
    max_ticks: u32,
}

impl Game {
    pub fn new(arena: Arena, config: &Config, rng: StdRng, observer: impl GameObserver + 'static) -> Self {
        let (width, height) = (arena.width(), arena.height());
        let agents = arena
            .bodies()
            .iter()
            .map(|body| Agent::new(body.team, body.index, width, height))
            .collect();

        Self {
            arena,
            agents,
            knowledge: [SharedKnowledge::new(width, height), SharedKnowledge::new(width, height)],
            observer: Box::new(observer),
            replay: None,
            rng,
            seed: config.seed,
            vision_radius: config.vision_radius,
            max_ticks: config.max_ticks,
        }
    }

    pub fn with_replay(mut self, replay: ReplayFile) -> Self {
        self.replay = Some(replay);
        self
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn knowledge(&self, team: Team) -> &SharedKnowledge {
        &self.knowledge[slot(team)]
    }

    pub fn run(&mut self) -> Result<MatchResult, Box<dyn std::error::Error>> {
        self.observer.on_game_start(&self.arena, self.seed, self.vision_radius);

        let mut final_tick = self.max_ticks;
        let mut result = MatchResult::TimedOut;

        'ticks: for tick in 1..=self.max_ticks {
            self.observer.on_tick(tick, &self.arena);
            if let Some(ref mut replay) = self.replay {
                replay.append(tick, &self.arena.render())?;
            }

            for body in 0..self.agents.len() {
                if let Some(outcome) = self.play_turn(tick, body) {
                    result = outcome;
                    final_tick = tick;
                    break 'ticks;
                }
            }
            self.arena.cool_down();
        }

        if result == MatchResult::TimedOut {
            warn!(max_ticks = self.max_ticks, "Tick limit reached");
        }
        for (body, agent) in self.agents.iter_mut().enumerate() {
            if self.arena.body(body).alive {
                agent.terminate(TerminationReason::MatchOver);
                self.observer.on_agent_terminated(agent, TerminationReason::MatchOver);
            }
        }
        self.observer.on_game_finished(result, final_tick);
        info!(%result, final_tick, "Match over");
        Ok(result)
    }

    /// One agent observes, decides and acts. Returns the match result when
    /// the action ended the match.
    fn play_turn(&mut self, tick: u32, body: usize) -> Option<MatchResult> {
        let state = self.arena.body(body).clone();
        if !state.alive {
            return None;
        }

        let observation = self.arena.observe(body, self.vision_radius);
        let input = TickInput {
            observation: &observation,
            position: state.position,
            can_shoot: state.can_shoot(),
            carrying_flag: state.carrying,
            health: state.health,
            ammo: state.ammo,
        };
        let action = self.agents[body].decide(&input, &mut self.knowledge[slot(state.team)], &mut self.rng);
        self.observer.on_action_selected(tick, &self.agents[body], action);

        let mut outcome = None;
        for event in self.arena.apply(body, action, self.vision_radius) {
            self.observer.on_event(tick, &event);
            match event {
                ArenaEvent::Hit {
                    target,
                    eliminated: true,
                    ..
                } => {
                    debug!(tick, target, "Agent eliminated");
                    self.agents[target].terminate(TerminationReason::Eliminated);
                    self.observer
                        .on_agent_terminated(&self.agents[target], TerminationReason::Eliminated);
                }
                ArenaEvent::Captured { team } => outcome = Some(MatchResult::Captured(team)),
                _ => {}
            }
        }

        if outcome.is_none() && self.arena.alive_count(state.team.opponent()) == 0 {
            outcome = Some(MatchResult::Eliminated { winner: state.team });
        }
        outcome
    }
}
