pub mod config;
pub mod storage;
pub mod world;

pub use self::config::SolverConfig;
pub use self::storage::{BodyStorage, Storage};
pub use self::world::SimulationWorld;

/// A unique identifier for a body in the simulation world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);
