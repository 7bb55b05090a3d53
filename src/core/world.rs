use crate::bodies::{body_flags::BodyFlags, Body, BodyKind};
use crate::collision::{CollisionGraph, InteractionPair};
use crate::constraints::{generate_body_constraints, Constraint, PbdSolver};
use crate::core::{BodyHandle, BodyStorage, SolverConfig, Storage};
use crate::Result;

/// The top-level simulation container
///
/// Owns the bodies, their internal elastic constraints, the interaction
/// graph, and the position solver. One [`step`](Self::step) runs a full
/// detect / respond / solve pass.
pub struct SimulationWorld {
    bodies: BodyStorage<Body>,
    graph: CollisionGraph,
    internal_constraints: Vec<Constraint>,
    /// Contact constraints of the current step, rebuilt every pass
    contact_constraints: Vec<Constraint>,
    solver: PbdSolver,
    config: SolverConfig,
}

impl SimulationWorld {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            bodies: BodyStorage::new(),
            graph: CollisionGraph::new(),
            internal_constraints: Vec::new(),
            contact_constraints: Vec::new(),
            solver: PbdSolver::new(config.iterations),
            config,
        }
    }

    /// Adds a body, applying the global contact parameters and generating
    /// its internal constraints
    ///
    /// Deformable bodies get the configured nodes pinned and one constraint
    /// per enabled type and topology element. An unusable material model
    /// fails the add; the body is not inserted.
    pub fn add_body(&mut self, mut body: Body) -> Result<BodyHandle> {
        body.set_proximity(self.config.proximity);
        body.set_contact_stiffness(self.config.contact_stiffness);
        body.set_contact_damping(self.config.contact_damping);

        if body.kind() == BodyKind::Deformable {
            for &i in &self.config.fixed_nodes {
                if i < body.vertex_count() {
                    body.fix_vertices(&[i]);
                } else {
                    log::warn!("fixed node {} is out of range for a body with {} vertices", i, body.vertex_count());
                }
            }
        }

        let generate = body.kind() == BodyKind::Deformable
            && body.flags().contains(BodyFlags::GENERATE_CONSTRAINTS);

        let handle = self.bodies.add(body);

        if generate {
            let constraints = {
                let body = self.bodies.get_body(handle)?;
                generate_body_constraints(handle, body, &self.config)
            };
            match constraints {
                Ok(constraints) => self.internal_constraints.extend(constraints),
                Err(err) => {
                    self.bodies.remove(handle);
                    return Err(err);
                }
            }
        }

        Ok(handle)
    }

    /// Removes a body along with its constraints and interactions
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        self.graph.remove_pairs_of(handle);
        self.internal_constraints.retain(|c| !c.involves(handle));
        self.bodies.remove(handle)
    }

    pub fn get_body(&self, handle: BodyHandle) -> Result<&Body> {
        self.bodies.get_body(handle)
    }

    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        self.bodies.get_body_mut(handle)
    }

    pub fn bodies(&self) -> &BodyStorage<Body> {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Registers an interacting pair of bodies
    pub fn add_interaction_pair(&mut self, pair: InteractionPair) -> Option<usize> {
        self.graph.add_interaction_pair(pair)
    }

    /// Unregisters the interaction between two bodies, in either order
    pub fn remove_interaction_pair(&mut self, a: BodyHandle, b: BodyHandle) -> bool {
        self.graph.remove_interaction_pair(a, b).is_some()
    }

    pub fn collision_graph(&self) -> &CollisionGraph {
        &self.graph
    }

    pub fn internal_constraints(&self) -> &[Constraint] {
        &self.internal_constraints
    }

    /// Manually registers an internal constraint
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.internal_constraints.push(constraint);
    }

    pub fn solver(&self) -> &PbdSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut PbdSolver {
        &mut self.solver
    }

    /// Runs one simulation pass: detection, response, then constraint
    /// projection
    ///
    /// Force buffers and the contact constraint list are cleared at the
    /// start of the pass, so their contents always describe the latest
    /// step. Internal constraints are solved before the transient contact
    /// constraints; both use the fixed iteration count.
    pub fn step(&mut self) -> Result<()> {
        for (_, body) in self.bodies.iter_mut() {
            body.clear_forces();
        }
        self.contact_constraints.clear();

        for pair in self.graph.pairs_mut() {
            pair.detect(&self.bodies)?;
        }
        for index in 0..self.graph.len() {
            let constraints = self.graph.pairs()[index].handle(&mut self.bodies);
            self.contact_constraints.extend(constraints);
        }

        self.solver.solve(&self.internal_constraints, &mut self.bodies);
        self.solver.solve(&self.contact_constraints, &mut self.bodies);

        Ok(())
    }
}

impl Default for SimulationWorld {
    fn default() -> Self {
        Self::new()
    }
}
