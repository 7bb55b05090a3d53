use crate::bodies::body_flags::BodyFlags;
use crate::bodies::BodyKind;
use crate::math::Vector3;

/// A simulated body: an indexed store of vertex state plus collision geometry.
///
/// Holds the current and rest position buffers, per-vertex inverse masses
/// (0 means pinned), per-vertex velocities and an external force accumulation
/// buffer, along with the mesh topology used for collision detection and
/// constraint generation.
#[derive(Debug, Clone)]
pub struct Body {
    /// The kind of the body, deciding which collision responses it supports
    kind: BodyKind,

    /// Current vertex positions, mutated in place by the constraint solver
    positions: Vec<Vector3>,

    /// Rest (initial) vertex positions; constraints precompute from these
    rest_positions: Vec<Vector3>,

    /// Per-vertex inverse masses; 0 denotes a pinned vertex
    inv_masses: Vec<f64>,

    /// Per-vertex velocities, used by the penalty damping term
    velocities: Vec<Vector3>,

    /// Per-vertex external force accumulation buffer
    external_forces: Vec<Vector3>,

    /// Net contact force accumulated on the body as a whole
    contact_force: Vector3,

    /// Edge topology (pairs of vertex indices)
    edges: Vec<[usize; 2]>,

    /// Triangle topology
    triangles: Vec<[usize; 3]>,

    /// Tetrahedral topology
    tetrahedra: Vec<[usize; 4]>,

    /// Proximity margin used when generating contact candidates
    proximity: f64,

    /// Contact spring stiffness for penalty response
    contact_stiffness: f64,

    /// Contact damping for penalty response
    contact_damping: f64,

    /// Behavior flags
    flags: BodyFlags,
}

impl Body {
    /// Creates a new body of the given kind from a set of vertex positions
    ///
    /// The rest positions are snapshotted from the given positions. Static
    /// bodies get all vertices pinned; movable bodies start with unit mass.
    pub fn new(kind: BodyKind, positions: Vec<Vector3>) -> Self {
        let n = positions.len();
        let inv_mass = if kind.is_movable() { 1.0 } else { 0.0 };
        Self {
            kind,
            rest_positions: positions.clone(),
            positions,
            inv_masses: vec![inv_mass; n],
            velocities: vec![Vector3::zero(); n],
            external_forces: vec![Vector3::zero(); n],
            contact_force: Vector3::zero(),
            edges: Vec::new(),
            triangles: Vec::new(),
            tetrahedra: Vec::new(),
            proximity: 0.01,
            contact_stiffness: 1.0,
            contact_damping: 0.0,
            flags: BodyFlags::COLLIDABLE | BodyFlags::GENERATE_CONSTRAINTS,
        }
    }

    /// Creates a deformable body
    pub fn new_deformable(positions: Vec<Vector3>) -> Self {
        Self::new(BodyKind::Deformable, positions)
    }

    /// Creates a rigid body
    pub fn new_rigid(positions: Vec<Vector3>) -> Self {
        Self::new(BodyKind::Rigid, positions)
    }

    /// Creates a static (immovable) body
    pub fn new_static(positions: Vec<Vector3>) -> Self {
        Self::new(BodyKind::Static, positions)
    }

    /// Returns the kind of the body
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Returns the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the current position of vertex `i`
    #[inline]
    pub fn vertex_position(&self, i: usize) -> Vector3 {
        self.positions[i]
    }

    /// Overwrites the current position of vertex `i`
    #[inline]
    pub fn set_vertex_position(&mut self, i: usize, p: Vector3) {
        self.positions[i] = p;
    }

    /// Adds a correction to the current position of vertex `i`
    #[inline]
    pub fn displace_vertex(&mut self, i: usize, delta: Vector3) {
        self.positions[i] += delta;
    }

    /// Returns the rest position of vertex `i`
    #[inline]
    pub fn initial_vertex_position(&self, i: usize) -> Vector3 {
        self.rest_positions[i]
    }

    /// Returns the inverse mass of vertex `i`
    #[inline]
    pub fn inv_mass(&self, i: usize) -> f64 {
        self.inv_masses[i]
    }

    /// Sets the inverse mass of vertex `i`
    ///
    /// Inverse masses must be non-negative; negative input is clamped to zero.
    pub fn set_inv_mass(&mut self, i: usize, inv_mass: f64) {
        self.inv_masses[i] = inv_mass.max(0.0);
    }

    /// Sets a uniform inverse mass across all vertices
    pub fn set_uniform_inv_mass(&mut self, inv_mass: f64) {
        let w = inv_mass.max(0.0);
        for m in &mut self.inv_masses {
            *m = w;
        }
    }

    /// Pins the given vertices by zeroing their inverse masses
    pub fn fix_vertices(&mut self, ids: &[usize]) {
        for &i in ids {
            self.inv_masses[i] = 0.0;
        }
    }

    /// Returns the velocity of vertex `i`
    #[inline]
    pub fn velocity(&self, i: usize) -> Vector3 {
        self.velocities[i]
    }

    /// Sets the velocity of vertex `i`
    pub fn set_velocity(&mut self, i: usize, v: Vector3) {
        self.velocities[i] = v;
    }

    /// Accumulates an external force on vertex `i`
    pub fn add_external_force(&mut self, i: usize, force: Vector3) {
        self.external_forces[i] += force;
    }

    /// Returns the accumulated external force on vertex `i`
    pub fn external_force(&self, i: usize) -> Vector3 {
        self.external_forces[i]
    }

    /// Accumulates a net contact force on the body
    pub fn add_contact_force(&mut self, force: Vector3) {
        self.contact_force += force;
    }

    /// Returns the net contact force accumulated on the body
    pub fn contact_force(&self) -> Vector3 {
        self.contact_force
    }

    /// Clears all accumulated forces, called at the start of each step
    pub fn clear_forces(&mut self) {
        for f in &mut self.external_forces {
            *f = Vector3::zero();
        }
        self.contact_force = Vector3::zero();
    }

    /// Sets the edge topology
    pub fn set_edges(&mut self, edges: Vec<[usize; 2]>) {
        self.edges = edges;
    }

    /// Sets the triangle topology
    pub fn set_triangles(&mut self, triangles: Vec<[usize; 3]>) {
        self.triangles = triangles;
    }

    /// Sets the tetrahedral topology
    pub fn set_tetrahedra(&mut self, tetrahedra: Vec<[usize; 4]>) {
        self.tetrahedra = tetrahedra;
    }

    /// Returns the edge topology
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Returns the triangle topology
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Returns the tetrahedral topology
    pub fn tetrahedra(&self) -> &[[usize; 4]] {
        &self.tetrahedra
    }

    /// Returns the proximity margin
    #[inline]
    pub fn proximity(&self) -> f64 {
        self.proximity
    }

    /// Sets the proximity margin
    pub fn set_proximity(&mut self, proximity: f64) {
        self.proximity = proximity.max(0.0);
    }

    /// Returns the contact spring stiffness
    #[inline]
    pub fn contact_stiffness(&self) -> f64 {
        self.contact_stiffness
    }

    /// Sets the contact spring stiffness
    pub fn set_contact_stiffness(&mut self, stiffness: f64) {
        self.contact_stiffness = stiffness.max(0.0);
    }

    /// Returns the contact damping factor
    #[inline]
    pub fn contact_damping(&self) -> f64 {
        self.contact_damping
    }

    /// Sets the contact damping factor
    pub fn set_contact_damping(&mut self, damping: f64) {
        self.contact_damping = damping.max(0.0);
    }

    /// Returns the behavior flags
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Sets the behavior flags
    pub fn set_flags(&mut self, flags: BodyFlags) {
        self.flags = flags;
    }

    /// Returns whether the body participates in collision detection
    pub fn is_collidable(&self) -> bool {
        self.flags.contains(BodyFlags::COLLIDABLE)
    }

    /// Computes the axis-aligned bounding box of the current vertex positions
    ///
    /// Returns None for a body with no vertices.
    pub fn compute_bounding_box(&self) -> Option<(Vector3, Vector3)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in self.positions.iter().skip(1) {
            min = min.min_components(p);
            max = max.max_components(p);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_body_is_fully_pinned() {
        let body = Body::new_static(vec![Vector3::zero(), Vector3::unit_x()]);
        assert_eq!(body.inv_mass(0), 0.0);
        assert_eq!(body.inv_mass(1), 0.0);
    }

    #[test]
    fn fix_vertices_zeroes_inverse_mass() {
        let mut body = Body::new_deformable(vec![Vector3::zero(), Vector3::unit_x()]);
        assert_eq!(body.inv_mass(0), 1.0);
        body.fix_vertices(&[0]);
        assert_eq!(body.inv_mass(0), 0.0);
        assert_eq!(body.inv_mass(1), 1.0);
    }

    #[test]
    fn bounding_box_covers_all_vertices() {
        let body = Body::new_deformable(vec![
            Vector3::new(-1.0, 2.0, 0.5),
            Vector3::new(3.0, -4.0, 0.0),
            Vector3::new(0.0, 0.0, -2.0),
        ]);
        let (min, max) = body.compute_bounding_box().unwrap();
        assert_eq!(min, Vector3::new(-1.0, -4.0, -2.0));
        assert_eq!(max, Vector3::new(3.0, 2.0, 0.5));
    }
}
