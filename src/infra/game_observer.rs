use crate::arena::{Arena, ArenaEvent};
use crate::game::MatchResult;
use crate::infra::{Action, TerminationReason};
use crate::planners::heuristic::Agent;

/// Hooks into the match loop, for logging and inspection.
pub trait GameObserver {
    fn on_game_start(&mut self, arena: &Arena, seed: Option<u64>, vision_radius: i32);

    /// Called at the start of every tick, before any agent acts.
    fn on_tick(&mut self, tick: u32, arena: &Arena);

    fn on_action_selected(&mut self, tick: u32, agent: &Agent, action: Action);

    fn on_event(&mut self, _tick: u32, _event: &ArenaEvent) {}

    fn on_agent_terminated(&mut self, agent: &Agent, reason: TerminationReason);

    fn on_game_finished(&mut self, result: MatchResult, final_tick: u32);
}
