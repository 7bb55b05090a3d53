use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::error::PbdError;
use crate::math::EPSILON;
use crate::Result;

/// Preserves the rest area of a triangle
#[derive(Debug, Clone)]
pub struct AreaConstraint {
    body: BodyHandle,
    ids: [usize; 3],
    rest_area: f64,
    stiffness: f64,
}

impl AreaConstraint {
    /// Creates the constraint, precomputing the rest area
    ///
    /// Fails when the rest triangle has (near) zero area.
    pub fn new(
        handle: BodyHandle,
        body: &Body,
        i1: usize,
        i2: usize,
        i3: usize,
        stiffness: f64,
    ) -> Result<Self> {
        let p0 = body.initial_vertex_position(i1);
        let p1 = body.initial_vertex_position(i2);
        let p2 = body.initial_vertex_position(i3);

        let rest_area = 0.5 * (p1 - p0).cross(&(p2 - p0)).length();
        if rest_area < EPSILON {
            return Err(PbdError::DegenerateGeometry(format!(
                "area constraint over degenerate rest triangle {} {} {}",
                i1, i2, i3
            )));
        }

        Ok(Self {
            body: handle,
            ids: [i1, i2, i3],
            rest_area,
            stiffness,
        })
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Projects the three vertices toward the rest area
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let [i0, i1, i2] = self.ids;

        let (p0, p1, p2, w) = {
            let body = match bodies.get_body(self.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(i0),
                body.vertex_position(i1),
                body.vertex_position(i2),
                [body.inv_mass(i0), body.inv_mass(i1), body.inv_mass(i2)],
            )
        };

        let e1 = p0 - p1;
        let e2 = p1 - p2;
        let e3 = p2 - p0;

        let mut n = e1.cross(&e2);
        let area = 0.5 * n.length();
        if area < EPSILON {
            return false;
        }
        n = n / (2.0 * area);

        let grad = [e2.cross(&n), e3.cross(&n), e1.cross(&n)];

        let mut lambda = 0.0;
        for k in 0..3 {
            lambda += w[k] * grad[k].length_squared();
        }
        if lambda < EPSILON {
            return false;
        }

        let c = area - self.rest_area;
        if c.abs() < EPSILON {
            return false;
        }

        let s = c / lambda * self.stiffness;

        if let Ok(body) = bodies.get_body_mut(self.body) {
            for k in 0..3 {
                if w[k] > 0.0 {
                    body.displace_vertex(self.ids[k], grad[k] * (-w[k] * s));
                }
            }
        }

        true
    }
}
