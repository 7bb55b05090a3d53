pub mod math;
pub mod core;
pub mod bodies;
pub mod collision;
pub mod constraints;

/// Re-export common types for easier usage
pub use crate::core::{BodyHandle, SimulationWorld, SolverConfig};
pub use crate::bodies::{Body, BodyKind};
pub use crate::constraints::{Constraint, FemMaterialType, PbdSolver};
pub use crate::math::Vector3;

/// Error types for the simulation engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PbdError {
        #[error("Invalid configuration: {0}")]
        InvalidConfiguration(String),

        #[error("Degenerate geometry: {0}")]
        DegenerateGeometry(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Internal error: {0}")]
        InternalError(String),
    }
}

/// Result type for simulation engine operations
pub type Result<T> = std::result::Result<T, error::PbdError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
