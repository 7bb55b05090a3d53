//! Pure geometric proximity and intersection tests.
//!
//! These are allocation-free building blocks for contact candidate
//! generation. The AABB-based segment and point-triangle tests are
//! deliberately approximate: they accept near-misses inside the proximity
//! envelope, which is what the soft-margin contact generation wants.

use crate::math::{Vector3, EPSILON};

/// Returns true iff the intervals [a, b] and [c, d] intersect
#[inline]
pub fn intervals_overlap(a: f64, b: f64, c: f64, d: f64) -> bool {
    (a <= d && a >= c) || (c <= b && c >= a)
}

/// Returns true iff two axis-aligned boxes overlap on all three axes
#[inline]
pub fn aabb_overlap(min1: Vector3, max1: Vector3, min2: Vector3, max2: Vector3) -> bool {
    intervals_overlap(min1.x, max1.x, min2.x, max2.x)
        && intervals_overlap(min1.y, max1.y, min2.y, max2.y)
        && intervals_overlap(min1.z, max1.z, min2.z, max2.z)
}

/// Proximity test between two line segments via their expanded bounding boxes
///
/// Each segment's box is expanded by its owner's proximity margin. Accepts
/// near-misses within the combined margins.
pub fn line_segment_aabb_test(
    a1: Vector3,
    a2: Vector3,
    b1: Vector3,
    b2: Vector3,
    prox1: f64,
    prox2: f64,
) -> bool {
    let min1 = a1.min_components(&a2);
    let max1 = a1.max_components(&a2);
    let min2 = b1.min_components(&b2);
    let max2 = b1.max_components(&b2);

    let m1 = Vector3::new(prox1, prox1, prox1);
    let m2 = Vector3::new(prox2, prox2, prox2);
    aabb_overlap(min1 - m1, max1 + m1, min2 - m2, max2 + m2)
}

/// Proximity test between a point and a triangle via expanded bounding boxes
pub fn point_triangle_aabb_test(
    point: Vector3,
    t0: Vector3,
    t1: Vector3,
    t2: Vector3,
    prox1: f64,
    prox2: f64,
) -> bool {
    let min = t0.min_components(&t1).min_components(&t2);
    let max = t0.max_components(&t1).max_components(&t2);

    let m1 = Vector3::new(prox1, prox1, prox1);
    let m2 = Vector3::new(prox2, prox2, prox2);
    aabb_overlap(point - m1, point + m1, min - m2, max + m2)
}

/// Exact segment-triangle intersection using the Moller-Trumbore algorithm
///
/// Rejects segments parallel to the triangle plane. The hit parameter must
/// lie strictly inside the open interval (0, segment length).
pub fn segment_intersects_triangle(
    p: Vector3,
    q: Vector3,
    a: Vector3,
    b: Vector3,
    c: Vector3,
) -> bool {
    let dir = q - p;
    let len = dir.length();
    if len < EPSILON {
        return false;
    }
    let d = dir / len;

    let e1 = b - a;
    let e2 = c - a;

    let pvec = d.cross(&e2);
    let det = e1.dot(&pvec);
    if det.abs() < EPSILON {
        return false;
    }
    let inv_det = 1.0 / det;

    let tvec = p - a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let qvec = tvec.cross(&e1);
    let v = d.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = e2.dot(&qvec) * inv_det;
    t > 0.0 && t < len
}

/// Closest distance from a point to the segment x1-x2
pub fn point_segment_closest_distance(point: Vector3, x1: Vector3, x2: Vector3) -> f64 {
    let dx = x2 - x1;
    let m2 = dx.length_squared();
    if m2 < 1e-20 {
        return (point - x1).length();
    }

    // parameter of the closest point, measured from x2 toward x1
    let mut s12 = dx.dot(&(x2 - point)) / m2;
    if s12 < 0.0 {
        s12 = 0.0;
    } else if s12 > 1.0 {
        s12 = 1.0;
    }

    (point - (x1 * s12 + x2 * (1.0 - s12))).length()
}

/// Closest distance from a point to the triangle x1-x2-x3
///
/// Computes the closest point under the unclamped planar barycentric
/// coordinates; when a coordinate is negative the query falls back to the
/// two edge segments bordering that vertex. The edge selection matters for
/// tie-breaks in degenerate configurations and must not be widened.
pub fn point_triangle_closest_distance(
    point: Vector3,
    x1: Vector3,
    x2: Vector3,
    x3: Vector3,
) -> f64 {
    let x13 = x1 - x3;
    let x23 = x2 - x3;
    let xp3 = point - x3;

    let m13 = x13.length_squared();
    let m23 = x23.length_squared();
    let d = x13.dot(&x23);

    let inv_det = 1.0 / (m13 * m23 - d * d).max(1e-30);
    let a = x13.dot(&xp3);
    let b = x23.dot(&xp3);

    // barycentric coordinates of the planar projection
    let w23 = inv_det * (m23 * a - d * b);
    let w31 = inv_det * (m13 * b - d * a);
    let w12 = 1.0 - w23 - w31;

    if w23 >= 0.0 && w31 >= 0.0 && w12 >= 0.0 {
        // inside the triangle
        return (point - (x1 * w23 + x2 * w31 + x3 * w12)).length();
    }

    if w23 > 0.0 {
        // rules out edge x2-x3
        point_segment_closest_distance(point, x1, x2)
            .min(point_segment_closest_distance(point, x1, x3))
    } else if w31 > 0.0 {
        // rules out edge x1-x3
        point_segment_closest_distance(point, x1, x2)
            .min(point_segment_closest_distance(point, x2, x3))
    } else {
        // w12 must be > 0, ruling out edge x1-x2
        point_segment_closest_distance(point, x1, x3)
            .min(point_segment_closest_distance(point, x2, x3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interval_overlap_basic() {
        assert!(intervals_overlap(0.0, 2.0, 1.0, 3.0));
        assert!(intervals_overlap(1.0, 3.0, 0.0, 2.0));
        assert!(!intervals_overlap(0.0, 1.0, 2.0, 3.0));
        // touching counts as overlap
        assert!(intervals_overlap(0.0, 1.0, 1.0, 2.0));
    }

    #[test]
    fn segment_triangle_hit_and_parallel_miss() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);

        // crosses the triangle interior
        assert!(segment_intersects_triangle(
            Vector3::new(0.2, 0.2, -1.0),
            Vector3::new(0.2, 0.2, 1.0),
            a,
            b,
            c
        ));

        // parallel to the plane
        assert!(!segment_intersects_triangle(
            Vector3::new(0.2, 0.2, 1.0),
            Vector3::new(0.8, 0.2, 1.0),
            a,
            b,
            c
        ));

        // stops short of the plane
        assert!(!segment_intersects_triangle(
            Vector3::new(0.2, 0.2, -1.0),
            Vector3::new(0.2, 0.2, -0.1),
            a,
            b,
            c
        ));
    }

    #[test]
    fn point_triangle_distance_interior_and_edge() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(2.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 2.0, 0.0);

        // above the interior
        let d = point_triangle_closest_distance(Vector3::new(0.5, 0.5, 1.0), a, b, c);
        assert_relative_eq!(d, 1.0);

        // beyond the a-b edge
        let d = point_triangle_closest_distance(Vector3::new(1.0, -1.0, 0.0), a, b, c);
        assert_relative_eq!(d, 1.0);

        // beyond vertex a
        let d = point_triangle_closest_distance(Vector3::new(-3.0, -4.0, 0.0), a, b, c);
        assert_relative_eq!(d, 5.0);
    }
}
