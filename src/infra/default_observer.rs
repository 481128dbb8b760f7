use std::io::{self, Write};

use tracing::{debug, info};

use crate::arena::{Arena, ArenaEvent};
use crate::game::MatchResult;
use crate::infra::{Action, GameObserver, TerminationReason};
use crate::planners::heuristic::Agent;

/// Logs the match and prints the arena every tick.
pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_game_start(&mut self, arena: &Arena, seed: Option<u64>, vision_radius: i32) {
        info!("Match started");
        if let Some(seed) = seed {
            info!("- seed: {}", seed);
        }
        info!("- arena size: {}x{}", arena.width(), arena.height());
        info!("- vision radius: {}", vision_radius);
        info!("- agents: {}", arena.bodies().len());
    }

    fn on_tick(&mut self, tick: u32, arena: &Arena) {
        let _ = writeln!(io::stdout(), "tick {}\n{}", tick, arena.render());
    }

    fn on_action_selected(&mut self, tick: u32, agent: &Agent, action: Action) {
        debug!(tick, team = %agent.team(), index = agent.index(), "action: {}", action);
    }

    fn on_event(&mut self, tick: u32, event: &ArenaEvent) {
        match event {
            ArenaEvent::Moved { .. } | ArenaEvent::Fired { .. } => {}
            other => info!(tick, "{:?}", other),
        }
    }

    fn on_agent_terminated(&mut self, agent: &Agent, reason: TerminationReason) {
        info!("{} agent {} terminated: {}", agent.team(), agent.index(), reason);
    }

    fn on_game_finished(&mut self, result: MatchResult, final_tick: u32) {
        info!("Match finished: {}", result);
        info!("Final tick: {}", final_tick);
    }
}
