use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::error::PbdError;
use crate::math::EPSILON;
use crate::Result;

/// Maintains the rest distance between two vertices of a body
#[derive(Debug, Clone)]
pub struct DistanceConstraint {
    /// The body owning both vertices
    body: BodyHandle,

    /// The participant vertex indices
    ids: [usize; 2],

    /// Rest length, precomputed from the rest position buffer
    rest_length: f64,

    /// Constraint stiffness in (0, 1]
    stiffness: f64,
}

impl DistanceConstraint {
    /// Creates the constraint, precomputing the rest length
    ///
    /// Fails if the two rest positions coincide.
    pub fn new(handle: BodyHandle, body: &Body, i1: usize, i2: usize, stiffness: f64) -> Result<Self> {
        let p1 = body.initial_vertex_position(i1);
        let p2 = body.initial_vertex_position(i2);
        let rest_length = (p1 - p2).length();
        if rest_length < EPSILON {
            return Err(PbdError::DegenerateGeometry(format!(
                "distance constraint over coincident rest vertices {} and {}",
                i1, i2
            )));
        }

        Ok(Self {
            body: handle,
            ids: [i1, i2],
            rest_length,
            stiffness,
        })
    }

    /// Returns the body handle this constraint acts on
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Projects both vertices toward the rest distance
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let [i1, i2] = self.ids;

        let (p0, p1, w0, w1) = {
            let body = match bodies.get_body(self.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(i1),
                body.vertex_position(i2),
                body.inv_mass(i1),
                body.inv_mass(i2),
            )
        };

        let wsum = w0 + w1;
        if wsum == 0.0 {
            return false;
        }

        let n = p1 - p0;
        let len = n.length();
        if len < EPSILON {
            return false;
        }

        let c = len - self.rest_length;
        if c.abs() < EPSILON {
            return false;
        }

        let grad = n * (self.stiffness * c / (len * wsum));

        if let Ok(body) = bodies.get_body_mut(self.body) {
            if w0 > 0.0 {
                body.displace_vertex(i1, grad * w0);
            }
            if w1 > 0.0 {
                body.displace_vertex(i2, grad * (-w1));
            }
        }

        true
    }
}
