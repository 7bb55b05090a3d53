use crate::bodies::Body;
use crate::core::{BodyHandle, BodyStorage};
use crate::math::EPSILON;

/// Pushes a vertex of one body away from a triangle of another to their
/// combined proximity margin
///
/// Contact only exists while the vertex projects inside the triangle and
/// its signed distance along the face normal is within the margin. A
/// zero-area triangle is never in contact.
#[derive(Debug, Clone)]
pub struct PointTriangleConstraint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    /// Vertex id on body A
    point: usize,
    /// Triangle vertex ids on body B
    tri: [usize; 3],
    stiffness: f64,
}

impl PointTriangleConstraint {
    pub fn new(
        body_a: BodyHandle,
        point: usize,
        body_b: BodyHandle,
        tri: [usize; 3],
        stiffness: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            point,
            tri,
            stiffness,
        }
    }

    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Separates the vertex from the triangle along the face normal
    pub fn solve_position(&self, bodies: &mut BodyStorage<Body>) -> bool {
        let (x0, w0, prox_a) = {
            let body = match bodies.get_body(self.body_a) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(self.point),
                body.inv_mass(self.point),
                body.proximity(),
            )
        };
        let (x1, x2, x3, w1, w2, w3, prox_b) = {
            let body = match bodies.get_body(self.body_b) {
                Ok(body) => body,
                Err(_) => return false,
            };
            (
                body.vertex_position(self.tri[0]),
                body.vertex_position(self.tri[1]),
                body.vertex_position(self.tri[2]),
                body.inv_mass(self.tri[0]),
                body.inv_mass(self.tri[1]),
                body.inv_mass(self.tri[2]),
                body.proximity(),
            )
        };

        let x12 = x2 - x1;
        let x13 = x3 - x1;
        let n = x12.cross(&x13);
        let n2 = n.length_squared();
        if n2 < EPSILON {
            // zero-area triangle
            return false;
        }

        let x01 = x0 - x1;
        let alpha = n.dot(&x01.cross(&x13)) / n2;
        let beta = n.dot(&x12.cross(&x01)) / n2;
        if alpha < 0.0 || beta < 0.0 || alpha + beta > 1.0 {
            // projection falls outside the triangle, no contact
            return false;
        }

        let nhat = n / n2.sqrt();
        let l = x01.dot(&nhat);

        let dist = prox_a + prox_b;
        if l >= dist {
            return false;
        }

        let grad0 = nhat;
        let grad1 = nhat * -(1.0 - alpha - beta);
        let grad2 = nhat * (-alpha);
        let grad3 = nhat * (-beta);

        let lambda = w0
            + w1 * (1.0 - alpha - beta) * (1.0 - alpha - beta)
            + w2 * alpha * alpha
            + w3 * beta * beta;
        if lambda < EPSILON {
            return false;
        }

        let delta = (l - dist) / lambda * self.stiffness;

        if let Ok(body) = bodies.get_body_mut(self.body_a) {
            if w0 > 0.0 {
                body.displace_vertex(self.point, grad0 * (-w0 * delta));
            }
        }
        if let Ok(body) = bodies.get_body_mut(self.body_b) {
            if w1 > 0.0 {
                body.displace_vertex(self.tri[0], grad1 * (-w1 * delta));
            }
            if w2 > 0.0 {
                body.displace_vertex(self.tri[1], grad2 * (-w2 * delta));
            }
            if w3 > 0.0 {
                body.displace_vertex(self.tri[2], grad3 * (-w3 * delta));
            }
        }

        true
    }
}
