#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// The kind of a simulated body, which decides the collision response it supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BodyKind {
    /// Deformable body whose vertices are moved by position constraints
    Deformable,

    /// Rigid body that accumulates penalty contact forces
    Rigid,

    /// Immovable body, collision geometry only
    Static,
}

impl BodyKind {
    /// Returns whether this kind of body ever moves
    pub fn is_movable(&self) -> bool {
        !matches!(self, BodyKind::Static)
    }
}
