pub mod arena;
pub mod game;
pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use infra::{AStar, Action, Position, Team, Tile};
pub use planners::heuristic::Agent;
pub use state::{Map, SharedKnowledge};
