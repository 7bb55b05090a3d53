//! Collision detection and response.
//!
//! Detection produces tagged contact geometry ([`CollisionElement`]) into a
//! per-pair [`CollisionData`] container; response handlers interpret that
//! geometry either as accumulated forces or as transient position
//! constraints. The [`CollisionGraph`] tracks which bodies interact.

pub mod detector;
pub mod element;
pub mod graph;
pub mod handling;
pub mod pair;
pub mod predicates;

pub use detector::{CollisionDetector, MeshToMeshDetector};
pub use element::{CellType, CollisionData, CollisionElement};
pub use graph::CollisionGraph;
pub use handling::{CollisionHandler, PbdConstraintHandler, PenaltyHandler, Side};
pub use pair::InteractionPair;
