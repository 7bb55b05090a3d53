use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::error::PbdError;
use crate::math::EPSILON;
use crate::Result;

/// Preserves the signed rest volume of a tetrahedron
#[derive(Debug, Clone)]
pub struct VolumeConstraint {
    body: BodyHandle,
    ids: [usize; 4],
    rest_volume: f64,
    stiffness: f64,
}

impl VolumeConstraint {
    /// Creates the constraint, precomputing the signed rest volume
    ///
    /// Fails when the rest tetrahedron is (near) flat.
    pub fn new(
        handle: BodyHandle,
        body: &Body,
        i1: usize,
        i2: usize,
        i3: usize,
        i4: usize,
        stiffness: f64,
    ) -> Result<Self> {
        let p0 = body.initial_vertex_position(i1);
        let p1 = body.initial_vertex_position(i2);
        let p2 = body.initial_vertex_position(i3);
        let p3 = body.initial_vertex_position(i4);

        let rest_volume = (1.0 / 6.0) * (p1 - p0).cross(&(p2 - p0)).dot(&(p3 - p0));
        if rest_volume.abs() < EPSILON {
            return Err(PbdError::DegenerateGeometry(format!(
                "volume constraint over flat rest tetrahedron {} {} {} {}",
                i1, i2, i3, i4
            )));
        }

        Ok(Self {
            body: handle,
            ids: [i1, i2, i3, i4],
            rest_volume,
            stiffness,
        })
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Projects the four vertices toward the signed rest volume
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let [i0, i1, i2, i3] = self.ids;

        let (x1, x2, x3, x4, w) = {
            let body = match bodies.get_body(self.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(i0),
                body.vertex_position(i1),
                body.vertex_position(i2),
                body.vertex_position(i3),
                [
                    body.inv_mass(i0),
                    body.inv_mass(i1),
                    body.inv_mass(i2),
                    body.inv_mass(i3),
                ],
            )
        };

        let one_sixth = 1.0 / 6.0;
        let grad = [
            (x2 - x3).cross(&(x4 - x2)) * one_sixth,
            (x3 - x1).cross(&(x4 - x1)) * one_sixth,
            (x4 - x1).cross(&(x2 - x1)) * one_sixth,
            (x2 - x1).cross(&(x3 - x1)) * one_sixth,
        ];

        let volume = grad[3].dot(&(x4 - x1));

        let mut lambda = 0.0;
        for k in 0..4 {
            lambda += w[k] * grad[k].length_squared();
        }
        if lambda < EPSILON {
            return false;
        }

        let c = volume - self.rest_volume;
        if c.abs() < EPSILON {
            return false;
        }

        let s = c / lambda * self.stiffness;

        if let Ok(body) = bodies.get_body_mut(self.body) {
            for k in 0..4 {
                if w[k] > 0.0 {
                    body.displace_vertex(self.ids[k], grad[k] * (-w[k] * s));
                }
            }
        }

        true
    }
}
