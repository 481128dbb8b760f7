mod knowledge;
mod map;
mod map_memory;
mod observation;
mod player_state;

pub use knowledge::SharedKnowledge;
pub use map::Map;
pub use map_memory::MapMemory;
pub use observation::{Observation, ObservationError};
pub use player_state::PlayerState;
