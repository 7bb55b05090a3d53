use crate::bodies::{Body, BodyKind};
use crate::collision::element::{CellType, CollisionData, CollisionElement};
use crate::constraints::{Constraint, EdgeEdgeConstraint, PointTriangleConstraint};
use crate::core::{BodyHandle, BodyStorage};
use crate::error::PbdError;
use crate::Result;

/// Which side(s) of an interacting pair a handler acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
    Both,
}

/// Interprets the contact geometry of one detection pass
///
/// A handler either mutates body state directly (force accumulation) or
/// returns transient constraints for the position solver to project this
/// step.
pub trait CollisionHandler {
    /// The side of the pair this handler acts on
    fn side(&self) -> Side;

    /// Consumes the collision data of one pass
    fn handle(
        &self,
        pair: (BodyHandle, BodyHandle),
        data: &CollisionData,
        bodies: &mut BodyStorage<Body>,
    ) -> Vec<Constraint>;
}

/// Spring-damper force response for rigid bodies
///
/// For every penetrating point contact a force of
/// `-k_s * depth * dir - k_d * (v . dir) * dir` is accumulated on the
/// handled body. Non-penetrating candidates (depth <= 0) contribute
/// nothing. Positions are never touched.
#[derive(Debug)]
pub struct PenaltyHandler {
    side: Side,
}

impl PenaltyHandler {
    /// Creates a penalty handler bound to one side of the pair
    ///
    /// Penalty response only makes sense for a rigid body, and acts on a
    /// single side; any other pairing is a configuration error.
    pub fn new(side: Side, kind: BodyKind) -> Result<Self> {
        if side == Side::Both {
            log::warn!("penalty response cannot act on both sides of a pair");
            return Err(PbdError::InvalidConfiguration(
                "penalty response acts on a single side".to_string(),
            ));
        }
        if kind != BodyKind::Rigid {
            log::warn!("penalty response requested for a non-rigid body");
            return Err(PbdError::InvalidConfiguration(format!(
                "penalty response requires a rigid body, got {:?}",
                kind
            )));
        }
        Ok(Self { side })
    }
}

impl CollisionHandler for PenaltyHandler {
    fn side(&self) -> Side {
        self.side
    }

    fn handle(
        &self,
        pair: (BodyHandle, BodyHandle),
        data: &CollisionData,
        bodies: &mut BodyStorage<Body>,
    ) -> Vec<Constraint> {
        let (handle, elements) = match self.side {
            Side::A => (pair.0, &data.elements_a),
            Side::B => (pair.1, &data.elements_b),
            Side::Both => return Vec::new(),
        };

        let body = match bodies.get_body_mut(handle) {
            Ok(body) => body,
            Err(_) => return Vec::new(),
        };
        let ks = body.contact_stiffness();
        let kd = body.contact_damping();

        for element in elements {
            match *element {
                CollisionElement::PointIndexDirection { pt_index, dir, depth } => {
                    if depth <= 0.0 {
                        continue;
                    }
                    let v = body.velocity(pt_index);
                    let force = dir * (-ks * depth) - dir * (kd * v.dot(&dir));
                    body.add_external_force(pt_index, force);
                    body.add_contact_force(force);
                }
                CollisionElement::PointDirection { dir, depth, .. } => {
                    if depth <= 0.0 {
                        continue;
                    }
                    // no vertex to attach to, accumulate on the body
                    body.add_contact_force(dir * (-ks * depth));
                }
                _ => {}
            }
        }

        Vec::new()
    }
}

/// Constraint-based contact response for deformable bodies
///
/// Converts vertex-triangle and edge-edge candidates into transient
/// position constraints, consumed by the solver within the same step and
/// discarded afterwards.
#[derive(Debug)]
pub struct PbdConstraintHandler {
    stiffness: f64,
}

impl PbdConstraintHandler {
    /// Creates a constraint handler for a deformable pair
    ///
    /// At least one side must be deformable for position corrections to
    /// have any effect.
    pub fn new(kind_a: BodyKind, kind_b: BodyKind) -> Result<Self> {
        if kind_a != BodyKind::Deformable && kind_b != BodyKind::Deformable {
            log::warn!("constraint response requested for a pair with no deformable body");
            return Err(PbdError::InvalidConfiguration(
                "constraint response requires at least one deformable body".to_string(),
            ));
        }
        Ok(Self { stiffness: 1.0 })
    }
}

impl CollisionHandler for PbdConstraintHandler {
    fn side(&self) -> Side {
        Side::Both
    }

    fn handle(
        &self,
        pair: (BodyHandle, BodyHandle),
        data: &CollisionData,
        _bodies: &mut BodyStorage<Body>,
    ) -> Vec<Constraint> {
        let mut constraints = Vec::new();

        for (a, b) in data.elements_a.iter().zip(data.elements_b.iter()) {
            match (a, b) {
                (
                    CollisionElement::PointIndexDirection { pt_index, .. },
                    CollisionElement::CellIndex {
                        ids,
                        cell_type: CellType::Triangle,
                        ..
                    },
                ) => {
                    constraints.push(Constraint::PointTriangle(PointTriangleConstraint::new(
                        pair.0,
                        *pt_index,
                        pair.1,
                        [ids[0], ids[1], ids[2]],
                        self.stiffness,
                    )));
                }
                (
                    CollisionElement::CellIndex {
                        ids: ids_a,
                        cell_type: CellType::Edge,
                        ..
                    },
                    CollisionElement::CellIndex {
                        ids: ids_b,
                        cell_type: CellType::Edge,
                        ..
                    },
                ) => {
                    constraints.push(Constraint::EdgeEdge(EdgeEdgeConstraint::new(
                        pair.0,
                        [ids_a[0], ids_a[1]],
                        pair.1,
                        [ids_b[0], ids_b[1]],
                        self.stiffness,
                    )));
                }
                _ => {}
            }
        }

        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;
    use crate::math::Vector3;

    #[test]
    fn penalty_refuses_deformable_bodies() {
        assert!(PenaltyHandler::new(Side::A, BodyKind::Deformable).is_err());
        assert!(PenaltyHandler::new(Side::Both, BodyKind::Rigid).is_err());
        assert!(PenaltyHandler::new(Side::A, BodyKind::Rigid).is_ok());
    }

    #[test]
    fn constraint_handler_requires_a_deformable_side() {
        assert!(PbdConstraintHandler::new(BodyKind::Rigid, BodyKind::Static).is_err());
        assert!(PbdConstraintHandler::new(BodyKind::Deformable, BodyKind::Static).is_ok());
    }

    #[test]
    fn penalty_accumulates_spring_damper_force() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let mut rigid = Body::new_rigid(vec![Vector3::zero()]);
        rigid.set_contact_stiffness(10.0);
        rigid.set_contact_damping(1.0);
        rigid.set_velocity(0, Vector3::new(0.0, -2.0, 0.0));
        let handle = bodies.add(rigid);
        let other = bodies.add(Body::new_static(vec![Vector3::zero()]));

        let mut data = CollisionData::new();
        data.push_pair(
            CollisionElement::PointIndexDirection {
                pt_index: 0,
                dir: Vector3::unit_y(),
                depth: 0.5,
            },
            CollisionElement::Empty,
        );
        // non-penetrating candidate, ignored
        data.push_pair(
            CollisionElement::PointIndexDirection {
                pt_index: 0,
                dir: Vector3::unit_y(),
                depth: -0.1,
            },
            CollisionElement::Empty,
        );

        let handler = PenaltyHandler::new(Side::A, BodyKind::Rigid).unwrap();
        let constraints = handler.handle((handle, other), &data, &mut bodies);
        assert!(constraints.is_empty());

        let body = bodies.get_body(handle).unwrap();
        // spring: -10 * 0.5 = -5, damper: -1 * (-2) = +2
        assert_eq!(body.external_force(0), Vector3::new(0.0, -3.0, 0.0));
        assert_eq!(body.contact_force(), Vector3::new(0.0, -3.0, 0.0));
    }

    #[test]
    fn constraint_handler_builds_contact_constraints() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let a = bodies.add(Body::new_deformable(vec![Vector3::zero()]));
        let b = bodies.add(Body::new_static(vec![Vector3::zero()]));

        let mut data = CollisionData::new();
        data.push_pair(
            CollisionElement::PointIndexDirection {
                pt_index: 0,
                dir: Vector3::unit_y(),
                depth: 0.1,
            },
            CollisionElement::triangle(0, 1, 2),
        );
        data.push_pair(CollisionElement::edge(0, 1), CollisionElement::edge(2, 3));

        let handler = PbdConstraintHandler::new(BodyKind::Deformable, BodyKind::Static).unwrap();
        let constraints = handler.handle((a, b), &data, &mut bodies);

        assert_eq!(constraints.len(), 2);
        assert!(matches!(constraints[0], Constraint::PointTriangle(_)));
        assert!(matches!(constraints[1], Constraint::EdgeEdge(_)));
    }
}
