mod combat;
mod destination;
mod policy;

pub use combat::detect_enemy;
pub use destination::{DestinationSelector, Priorities, linear_progress, progress_curve};
pub use policy::{Agent, TickInput};
