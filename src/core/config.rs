use crate::constraints::FemMaterialType;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration for constraint generation and the position solver
///
/// Internal elastic constraints are generated from a body's topology for
/// every enabled constraint type; `None` disables the type. The stiffness
/// defaults follow the reference material parameters for cloth-like bodies.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// The number of Gauss-Seidel iterations per solve pass
    pub iterations: u32,

    /// Stiffness for distance constraints generated per unique edge
    pub distance_stiffness: Option<f64>,

    /// Stiffness for dihedral bending constraints generated per adjacent triangle pair
    pub dihedral_stiffness: Option<f64>,

    /// Stiffness for area constraints generated per triangle
    pub area_stiffness: Option<f64>,

    /// Stiffness for volume constraints generated per tetrahedron
    pub volume_stiffness: Option<f64>,

    /// Material model for FEM constraints generated per tetrahedron
    pub fem_material: Option<FemMaterialType>,

    /// First Lame parameter (mu) for the FEM material models
    pub first_lame: f64,

    /// Second Lame parameter (lambda) for the FEM material models
    pub second_lame: f64,

    /// Vertex ids pinned at configuration time (inverse mass set to zero)
    pub fixed_nodes: Vec<usize>,

    /// Global proximity margin applied to newly added bodies
    pub proximity: f64,

    /// Global contact spring stiffness applied to newly added bodies
    pub contact_stiffness: f64,

    /// Global contact damping applied to newly added bodies
    pub contact_damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            distance_stiffness: Some(0.1),
            dihedral_stiffness: Some(0.001),
            area_stiffness: None,
            volume_stiffness: None,
            fem_material: None,
            first_lame: 1.0,
            second_lame: 1.0,
            fixed_nodes: Vec::new(),
            proximity: 0.01,
            contact_stiffness: 1.0,
            contact_damping: 0.0,
        }
    }
}
