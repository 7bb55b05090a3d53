use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::math::EPSILON;

/// Pushes two edges of (possibly) different bodies apart to their combined
/// proximity margin
///
/// The closest-approach parameters are recomputed on every solve. When the
/// closest points fall outside either segment the edges are not in contact
/// and the solve is a no-op. Near-parallel edges fall back to both segment
/// midpoints.
#[derive(Debug, Clone)]
pub struct EdgeEdgeConstraint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    /// Edge vertex ids on body A
    edge_a: [usize; 2],
    /// Edge vertex ids on body B
    edge_b: [usize; 2],
    stiffness: f64,
}

impl EdgeEdgeConstraint {
    pub fn new(
        body_a: BodyHandle,
        edge_a: [usize; 2],
        body_b: BodyHandle,
        edge_b: [usize; 2],
        stiffness: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            edge_a,
            edge_b,
            stiffness,
        }
    }

    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Separates the two edges along their closest-approach direction
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let (x0, x1, w0, w1, prox_a) = {
            let body = match bodies.get_body(self.body_a) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(self.edge_a[0]),
                body.vertex_position(self.edge_a[1]),
                body.inv_mass(self.edge_a[0]),
                body.inv_mass(self.edge_a[1]),
                body.proximity(),
            )
        };
        let (x2, x3, w2, w3, prox_b) = {
            let body = match bodies.get_body(self.body_b) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(self.edge_b[0]),
                body.vertex_position(self.edge_b[1]),
                body.inv_mass(self.edge_b[0]),
                body.inv_mass(self.edge_b[1]),
                body.proximity(),
            )
        };

        let u = x1 - x0;
        let v = x3 - x2;
        let r = x0 - x2;

        let a = v.dot(&u);
        let b = u.dot(&u);
        let c = r.dot(&u);
        let d = v.dot(&v);
        let f = r.dot(&v);

        let det = a * a - d * b;
        let (s, t) = if det.abs() > EPSILON {
            let s = (a * c - b * f) / det;
            let t = (c * d - a * f) / det;
            if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
                // closest approach lies outside a segment, no contact
                return false;
            }
            (s, t)
        } else {
            // near-parallel edges
            (0.5, 0.5)
        };

        let pa = x0 + u * t;
        let pb = x2 + v * s;
        let mut n = pb - pa;
        let l = n.length();
        if l < EPSILON {
            return false;
        }
        n = n / l;

        let dist = prox_a + prox_b;
        if l >= dist {
            return false;
        }

        let grad = [n * -(1.0 - t), n * (-t), n * (1.0 - s), n * s];
        let w = [w0, w1, w2, w3];

        let mut lambda = 0.0;
        for k in 0..4 {
            lambda += w[k] * grad[k].length_squared();
        }
        if lambda < EPSILON {
            return false;
        }

        let delta = (l - dist) / lambda * self.stiffness;

        if let Ok(body) = bodies.get_body_mut(self.body_a) {
            if w0 > 0.0 {
                body.displace_vertex(self.edge_a[0], grad[0] * (-w0 * delta));
            }
            if w1 > 0.0 {
                body.displace_vertex(self.edge_a[1], grad[1] * (-w1 * delta));
            }
        }
        if let Ok(body) = bodies.get_body_mut(self.body_b) {
            if w2 > 0.0 {
                body.displace_vertex(self.edge_b[0], grad[2] * (-w2 * delta));
            }
            if w3 > 0.0 {
                body.displace_vertex(self.edge_b[1], grad[3] * (-w3 * delta));
            }
        }

        true
    }
}
