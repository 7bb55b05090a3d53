use crate::bodies::Body;
use crate::collision::detector::CollisionDetector;
use crate::collision::element::CollisionData;
use crate::collision::handling::CollisionHandler;
use crate::constraints::Constraint;
use crate::core::{BodyHandle, BodyStorage};
use crate::Result;

/// One interacting pair of bodies: a detector, up to two response
/// handlers, and the collision data flowing between them
///
/// The pair owns its collision data; it is cleared and refilled on every
/// detection pass. Handlers run in slot order (A then B).
pub struct InteractionPair {
    body_a: BodyHandle,
    body_b: BodyHandle,
    detector: Box<dyn CollisionDetector>,
    handler_a: Option<Box<dyn CollisionHandler>>,
    handler_b: Option<Box<dyn CollisionHandler>>,
    data: CollisionData,
}

impl InteractionPair {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        detector: Box<dyn CollisionDetector>,
        handler_a: Option<Box<dyn CollisionHandler>>,
        handler_b: Option<Box<dyn CollisionHandler>>,
    ) -> Self {
        Self {
            body_a,
            body_b,
            detector,
            handler_a,
            handler_b,
            data: CollisionData::new(),
        }
    }

    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Returns whether this pair references the given body
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }

    /// Returns the collision data of the latest detection pass
    pub fn collision_data(&self) -> &CollisionData {
        &self.data
    }

    /// Runs one detection pass, replacing the stored collision data
    ///
    /// A pair with a non-collidable body detects nothing.
    pub fn detect(&mut self, bodies: &BodyStorage<Body>) -> Result<()> {
        let body_a = bodies.get_body(self.body_a)?;
        let body_b = bodies.get_body(self.body_b)?;

        if !body_a.is_collidable() || !body_b.is_collidable() {
            self.data.clear_all();
            return Ok(());
        }

        self.detector.detect(body_a, body_b, &mut self.data);
        Ok(())
    }

    /// Runs the response handlers over the stored collision data
    ///
    /// Returns the transient contact constraints produced by constraint
    /// based handlers, to be solved within the current step.
    pub fn handle(&self, bodies: &mut BodyStorage<Body>) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        let pair = (self.body_a, self.body_b);

        if let Some(handler) = &self.handler_a {
            constraints.extend(handler.handle(pair, &self.data, bodies));
        }
        if let Some(handler) = &self.handler_b {
            constraints.extend(handler.handle(pair, &self.data, bodies));
        }

        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::body_flags::BodyFlags;
    use crate::collision::detector::MeshToMeshDetector;
    use crate::core::Storage;
    use crate::math::Vector3;

    fn floor_triangle() -> Body {
        let mut body = Body::new_static(vec![
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]);
        body.set_triangles(vec![[0, 1, 2]]);
        body
    }

    #[test]
    fn non_collidable_body_detects_nothing() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let mut point = Body::new_deformable(vec![Vector3::new(0.0, 0.005, 0.0)]);
        point.set_flags(BodyFlags::empty());
        let a = bodies.add(point);
        let b = bodies.add(floor_triangle());

        let mut pair =
            InteractionPair::new(a, b, Box::new(MeshToMeshDetector::new()), None, None);
        pair.detect(&bodies).unwrap();
        assert!(pair.collision_data().is_empty());
    }

    #[test]
    fn detection_replaces_previous_data() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let a = bodies.add(Body::new_deformable(vec![Vector3::new(0.0, 0.005, 0.0)]));
        let b = bodies.add(floor_triangle());

        let mut pair =
            InteractionPair::new(a, b, Box::new(MeshToMeshDetector::new()), None, None);
        pair.detect(&bodies).unwrap();
        assert!(!pair.collision_data().is_empty());

        // move the point far away; the old candidates must not survive
        bodies
            .get_body_mut(a)
            .unwrap()
            .set_vertex_position(0, Vector3::new(0.0, 50.0, 0.0));
        pair.detect(&bodies).unwrap();
        assert!(pair.collision_data().is_empty());
    }
}
