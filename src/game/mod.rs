//! Game simulation modules

pub mod ball;
pub mod constants;
pub mod player;
pub mod simulation;
pub mod snapshot;

pub use ball::Ball;
pub use player::{Player, PlayerState};
pub use simulation::Simulation;
