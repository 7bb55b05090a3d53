//! Position-based constraints and the Gauss-Seidel projection solver.
//!
//! Every constraint projects its participant vertices directly in position
//! space: a correction of `-w_i * lambda * grad_i C` per vertex, where the
//! multiplier is the constraint value over the inverse-mass-weighted squared
//! gradient norm. Vertices with zero inverse mass never move.

mod area;
mod dihedral;
mod distance;
mod edge_edge;
mod fem_tet;
mod point_triangle;
mod volume;

pub use area::AreaConstraint;
pub use dihedral::DihedralConstraint;
pub use distance::DistanceConstraint;
pub use edge_edge::EdgeEdgeConstraint;
pub use fem_tet::{FemMaterialType, FemTetConstraint};
pub use point_triangle::PointTriangleConstraint;
pub use volume::VolumeConstraint;

use std::collections::{HashMap, HashSet};

use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage, SolverConfig};
use crate::error::PbdError;
use crate::Result;

/// A position-based constraint over one or two bodies
///
/// The elastic variants act within a single body and are generated from its
/// topology; `EdgeEdge` and `PointTriangle` are contact constraints created
/// by collision handling and live for a single step.
#[derive(Debug, Clone)]
pub enum Constraint {
    Distance(DistanceConstraint),
    Area(AreaConstraint),
    Volume(VolumeConstraint),
    Dihedral(DihedralConstraint),
    FemTet(FemTetConstraint),
    EdgeEdge(EdgeEdgeConstraint),
    PointTriangle(PointTriangleConstraint),
}

impl Constraint {
    /// Runs one projection of the constraint
    ///
    /// Returns false when the constraint is already satisfied, degenerate in
    /// the current configuration, or acts only on pinned vertices. A false
    /// return leaves every position untouched.
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        match self {
            Self::Distance(c) => c.solve_position(bodies),
            Self::Area(c) => c.solve_position(bodies),
            Self::Volume(c) => c.solve_position(bodies),
            Self::Dihedral(c) => c.solve_position(bodies),
            Self::FemTet(c) => c.solve_position(bodies),
            Self::EdgeEdge(c) => c.solve_position(bodies),
            Self::PointTriangle(c) => c.solve_position(bodies),
        }
    }

    /// Returns whether the constraint references the given body
    pub fn involves(&self, handle: BodyHandle) -> bool {
        match self {
            Self::Distance(c) => c.body() == handle,
            Self::Area(c) => c.body() == handle,
            Self::Volume(c) => c.body() == handle,
            Self::Dihedral(c) => c.body() == handle,
            Self::FemTet(c) => c.body() == handle,
            Self::EdgeEdge(c) => c.body_a() == handle || c.body_b() == handle,
            Self::PointTriangle(c) => c.body_a() == handle || c.body_b() == handle,
        }
    }
}

/// The Gauss-Seidel position projection solver
///
/// Runs a fixed number of sweeps over the constraint list in its stored
/// order. There is no convergence test and no early exit, so a solve is
/// deterministic for a given constraint order.
#[derive(Debug, Clone, Copy)]
pub struct PbdSolver {
    iterations: u32,
}

impl PbdSolver {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
    }

    /// Projects all constraints for the configured number of sweeps
    pub fn solve(&self, constraints: &[Constraint], bodies: &mut BodyStorage<Body>) {
        for _ in 0..self.iterations {
            for constraint in constraints {
                constraint.solve_position(bodies);
            }
        }
    }
}

impl Default for PbdSolver {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Collects the unique edges of a body, combining its explicit edge list
/// with the edges implied by its triangles and tetrahedra
fn unique_edges(body: &Body) -> Vec<[usize; 2]> {
    let mut seen: HashSet<[usize; 2]> = HashSet::new();
    let mut edges = Vec::new();

    fn push(a: usize, b: usize, seen: &mut HashSet<[usize; 2]>, out: &mut Vec<[usize; 2]>) {
        let key = if a < b { [a, b] } else { [b, a] };
        if seen.insert(key) {
            out.push(key);
        }
    }

    for e in body.edges() {
        push(e[0], e[1], &mut seen, &mut edges);
    }
    for t in body.triangles() {
        push(t[0], t[1], &mut seen, &mut edges);
        push(t[1], t[2], &mut seen, &mut edges);
        push(t[2], t[0], &mut seen, &mut edges);
    }
    for t in body.tetrahedra() {
        push(t[0], t[1], &mut seen, &mut edges);
        push(t[0], t[2], &mut seen, &mut edges);
        push(t[0], t[3], &mut seen, &mut edges);
        push(t[1], t[2], &mut seen, &mut edges);
        push(t[1], t[3], &mut seen, &mut edges);
        push(t[2], t[3], &mut seen, &mut edges);
    }

    edges
}

/// Pushes a freshly initialized constraint, skipping degenerate rest
/// geometry with a warning and propagating configuration errors
fn push_checked(out: &mut Vec<Constraint>, result: Result<Constraint>) -> Result<()> {
    match result {
        Ok(constraint) => {
            out.push(constraint);
            Ok(())
        }
        Err(PbdError::DegenerateGeometry(msg)) => {
            log::warn!("skipping constraint: {}", msg);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Generates the internal elastic constraints of a body from its topology
///
/// One distance constraint per unique edge, one dihedral constraint per
/// adjacent triangle pair, one area constraint per triangle, and one volume
/// or FEM constraint per tetrahedron, for each constraint type enabled in
/// the configuration. Constraints over degenerate rest geometry are skipped
/// with a warning; an unusable material model fails the whole generation.
pub fn generate_body_constraints(
    handle: BodyHandle,
    body: &Body,
    config: &SolverConfig,
) -> Result<Vec<Constraint>> {
    let mut constraints = Vec::new();

    if let Some(k) = config.distance_stiffness {
        for e in unique_edges(body) {
            push_checked(
                &mut constraints,
                DistanceConstraint::new(handle, body, e[0], e[1], k).map(Constraint::Distance),
            )?;
        }
    }

    if let Some(k) = config.dihedral_stiffness {
        // map each (sorted) edge to the triangles sharing it
        let mut edge_tris: HashMap<[usize; 2], Vec<usize>> = HashMap::new();
        for (ti, t) in body.triangles().iter().enumerate() {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let key = if a < b { [a, b] } else { [b, a] };
                edge_tris.entry(key).or_default().push(ti);
            }
        }

        let mut shared: Vec<(&[usize; 2], &Vec<usize>)> = edge_tris
            .iter()
            .filter(|(_, tris)| tris.len() == 2)
            .collect();
        shared.sort_by_key(|(edge, _)| **edge);

        for (edge, tris) in shared {
            let wing = |ti: usize| {
                body.triangles()[ti]
                    .iter()
                    .copied()
                    .find(|v| *v != edge[0] && *v != edge[1])
            };
            if let (Some(w0), Some(w1)) = (wing(tris[0]), wing(tris[1])) {
                push_checked(
                    &mut constraints,
                    DihedralConstraint::new(handle, body, w0, w1, edge[0], edge[1], k)
                        .map(Constraint::Dihedral),
                )?;
            }
        }
    }

    if let Some(k) = config.area_stiffness {
        for t in body.triangles() {
            push_checked(
                &mut constraints,
                AreaConstraint::new(handle, body, t[0], t[1], t[2], k).map(Constraint::Area),
            )?;
        }
    }

    if let Some(k) = config.volume_stiffness {
        for t in body.tetrahedra() {
            push_checked(
                &mut constraints,
                VolumeConstraint::new(handle, body, t[0], t[1], t[2], t[3], k)
                    .map(Constraint::Volume),
            )?;
        }
    }

    if let Some(material) = config.fem_material {
        for t in body.tetrahedra() {
            push_checked(
                &mut constraints,
                FemTetConstraint::new(
                    handle,
                    body,
                    t[0],
                    t[1],
                    t[2],
                    t[3],
                    material,
                    config.first_lame,
                    config.second_lame,
                )
                .map(Constraint::FemTet),
            )?;
        }
    }

    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn distance_solve_reaches_rest_length_in_one_pass() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let rest = Body::new_deformable(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ]);
        let handle = bodies.add(rest);
        let constraint = {
            let b = bodies.get_body(handle).unwrap();
            DistanceConstraint::new(handle, b, 0, 1, 1.0).unwrap()
        };
        // stretch the body to twice the rest length
        bodies
            .get_body_mut(handle)
            .unwrap()
            .set_vertex_position(1, Vector3::new(2.0, 0.0, 0.0));

        assert!(constraint.solve_position(&mut bodies));

        let b = bodies.get_body(handle).unwrap();
        assert_relative_eq!(b.vertex_position(0).x, 0.5);
        assert_relative_eq!(b.vertex_position(1).x, 1.5);

        // converged; a second solve reports no change
        assert!(!constraint.solve_position(&mut bodies));
    }

    #[test]
    fn pinned_vertex_takes_no_correction() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let rest = Body::new_deformable(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ]);
        let handle = bodies.add(rest);
        let constraint = {
            let b = bodies.get_body(handle).unwrap();
            DistanceConstraint::new(handle, b, 0, 1, 1.0).unwrap()
        };
        {
            let body = bodies.get_body_mut(handle).unwrap();
            body.fix_vertices(&[0]);
            body.set_vertex_position(1, Vector3::new(2.0, 0.0, 0.0));
        }

        assert!(constraint.solve_position(&mut bodies));

        let b = bodies.get_body(handle).unwrap();
        assert_relative_eq!(b.vertex_position(0).x, 0.0);
        assert_relative_eq!(b.vertex_position(1).x, 1.0);
    }

    #[test]
    fn generation_covers_all_enabled_types() {
        // two triangles sharing edge 1-2, forming a quad
        let mut body = Body::new_deformable(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ]);
        body.set_triangles(vec![[0, 1, 2], [1, 3, 2]]);

        let config = SolverConfig {
            distance_stiffness: Some(0.5),
            dihedral_stiffness: Some(0.1),
            area_stiffness: Some(0.5),
            ..Default::default()
        };

        let constraints = generate_body_constraints(BodyHandle(1), &body, &config).unwrap();
        let distances = constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Distance(_)))
            .count();
        let dihedrals = constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Dihedral(_)))
            .count();
        let areas = constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Area(_)))
            .count();

        assert_eq!(distances, 5); // 4 boundary edges plus the shared diagonal
        assert_eq!(dihedrals, 1);
        assert_eq!(areas, 2);
    }

    #[test]
    fn degenerate_tetrahedron_is_skipped() {
        // all four vertices coplanar
        let mut body = Body::new_deformable(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ]);
        body.set_tetrahedra(vec![[0, 1, 2, 3]]);

        let config = SolverConfig {
            distance_stiffness: None,
            dihedral_stiffness: None,
            volume_stiffness: Some(1.0),
            ..Default::default()
        };

        let constraints = generate_body_constraints(BodyHandle(1), &body, &config).unwrap();
        assert!(constraints.is_empty());
    }

    #[test]
    fn fem_constraint_rejects_coplanar_rest_points() {
        // flat rest tetrahedron: the rest edge matrix is singular
        let body = Body::new_deformable(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ]);

        let result = FemTetConstraint::new(
            BodyHandle(1),
            &body,
            0,
            1,
            2,
            3,
            FemMaterialType::StVK,
            1.0,
            1.0,
        );
        assert!(matches!(result, Err(PbdError::DegenerateGeometry(_))));
    }

    #[test]
    fn linear_material_fails_generation() {
        let mut body = Body::new_deformable(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]);
        body.set_tetrahedra(vec![[0, 1, 2, 3]]);

        let config = SolverConfig {
            distance_stiffness: None,
            dihedral_stiffness: None,
            fem_material: Some(FemMaterialType::Linear),
            ..Default::default()
        };

        assert!(generate_body_constraints(BodyHandle(1), &body, &config).is_err());
    }
}
