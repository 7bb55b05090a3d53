use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::error::PbdError;
use crate::math::EPSILON;
use crate::Result;

/// Resists bending across the shared edge of two triangles
///
/// The participants are ordered (wing0, wing1, edge0, edge1): the first two
/// vertices are the triangle apexes, the last two span the shared edge. The
/// bend angle is measured with `atan2` so the full signed range is covered
/// and a flat rest configuration yields a rest angle of exactly zero.
#[derive(Debug, Clone)]
pub struct DihedralConstraint {
    body: BodyHandle,
    ids: [usize; 4],
    rest_angle: f64,
    stiffness: f64,
}

impl DihedralConstraint {
    /// Creates the constraint, measuring the rest angle from the rest positions
    ///
    /// Fails when either rest triangle is degenerate or the shared edge has
    /// zero length.
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

        let n1 = (p2 - p0).cross(&(p3 - p0));
        let n2 = (p3 - p1).cross(&(p2 - p1));
        let e = p3 - p2;
        let elen = e.length();
        if elen < EPSILON || n1.length() < EPSILON || n2.length() < EPSILON {
            return Err(PbdError::DegenerateGeometry(format!(
                "dihedral constraint over degenerate rest triangles {} {} {} {}",
                i1, i2, i3, i4
            )));
        }

        let rest_angle = f64::atan2(n1.cross(&n2).dot(&e), elen * n1.dot(&n2));

        Ok(Self {
            body: handle,
            ids: [i1, i2, i3, i4],
            rest_angle,
            stiffness,
        })
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn rest_angle(&self) -> f64 {
        self.rest_angle
    }

    /// Projects the four vertices toward the rest bend angle
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let [i0, i1, i2, i3] = self.ids;

        let (p0, p1, p2, p3, w) = {
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

        if w[0] == 0.0 && w[1] == 0.0 && w[2] == 0.0 && w[3] == 0.0 {
            return false;
        }

        let e = p3 - p2;
        let e1 = p3 - p0;
        let e2 = p0 - p2;
        let e3 = p3 - p1;
        let e4 = p1 - p2;

        let mut n1 = e1.cross(&e);
        let mut n2 = e.cross(&e3);
        let a1 = n1.length();
        let a2 = n2.length();
        if a1 < EPSILON || a2 < EPSILON {
            return false;
        }
        n1 = n1 / (a1 * a1);
        n2 = n2 / (a2 * a2);

        let l = e.length();
        if l < EPSILON {
            return false;
        }

        let grad = [
            n1 * (-l),
            n2 * (-l),
            n1 * (e.dot(&e1) / l) + n2 * (e.dot(&e3) / l),
            n1 * (e.dot(&e2) / l) + n2 * (e.dot(&e4) / l),
        ];

        let mut lambda = 0.0;
        for k in 0..4 {
            lambda += w[k] * grad[k].length_squared();
        }
        if lambda < EPSILON {
            return false;
        }

        // signed bend angle relative to rest
        let n1u = n1 * (a1 * a1);
        let n2u = n2 * (a2 * a2);
        let angle = f64::atan2(n1u.cross(&n2u).dot(&e), l * n1u.dot(&n2u));
        let c = angle - self.rest_angle;
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
