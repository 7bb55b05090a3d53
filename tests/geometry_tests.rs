use pbd_engine::collision::predicates::{
    aabb_overlap, intervals_overlap, line_segment_aabb_test, point_segment_closest_distance,
    point_triangle_closest_distance, segment_intersects_triangle,
};
use pbd_engine::math::Vector3;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn interval_overlap_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..1000 {
        let mut ends = [0.0f64; 4];
        for e in &mut ends {
            *e = rng.gen_range(-10.0..10.0);
        }
        let (a, b) = if ends[0] < ends[1] {
            (ends[0], ends[1])
        } else {
            (ends[1], ends[0])
        };
        let (c, d) = if ends[2] < ends[3] {
            (ends[2], ends[3])
        } else {
            (ends[3], ends[2])
        };

        assert_eq!(
            intervals_overlap(a, b, c, d),
            intervals_overlap(c, d, a, b),
            "asymmetric result for [{}, {}] vs [{}, {}]",
            a,
            b,
            c,
            d
        );
    }
}

#[test]
fn cubes_overlap_within_center_distance_two() {
    // two cubes with half-extent 1; they overlap while their centers are
    // at most 2 apart, touching included
    let cube = |center: f64| {
        (
            Vector3::new(center - 1.0, -1.0, -1.0),
            Vector3::new(center + 1.0, 1.0, 1.0),
        )
    };

    let (min1, max1) = cube(0.0);

    let (min2, max2) = cube(1.5);
    assert!(aabb_overlap(min1, max1, min2, max2));

    // exactly touching faces count as overlap
    let (min2, max2) = cube(2.0);
    assert!(aabb_overlap(min1, max1, min2, max2));

    let (min2, max2) = cube(2.5);
    assert!(!aabb_overlap(min1, max1, min2, max2));
}

#[test]
fn expanded_segment_boxes_accept_near_misses() {
    // two skew segments that miss by 0.1
    let a1 = Vector3::new(-1.0, 0.0, 0.0);
    let a2 = Vector3::new(1.0, 0.0, 0.0);
    let b1 = Vector3::new(0.0, 0.1, -1.0);
    let b2 = Vector3::new(0.0, 0.1, 1.0);

    assert!(!line_segment_aabb_test(a1, a2, b1, b2, 0.0, 0.0));
    // combined margins cover the gap
    assert!(line_segment_aabb_test(a1, a2, b1, b2, 0.06, 0.06));
}

#[test]
fn segment_triangle_endpoint_on_plane_is_rejected() {
    let a = Vector3::new(0.0, 0.0, 0.0);
    let b = Vector3::new(1.0, 0.0, 0.0);
    let c = Vector3::new(0.0, 1.0, 0.0);

    // the hit parameter range is open at both ends
    assert!(!segment_intersects_triangle(
        Vector3::new(0.2, 0.2, 0.0),
        Vector3::new(0.2, 0.2, 1.0),
        a,
        b,
        c
    ));

    // pushing the start just below the plane produces a hit
    assert!(segment_intersects_triangle(
        Vector3::new(0.2, 0.2, -0.01),
        Vector3::new(0.2, 0.2, 1.0),
        a,
        b,
        c
    ));
}

#[test]
fn point_segment_distance_clamps_to_endpoints() {
    let x1 = Vector3::new(0.0, 0.0, 0.0);
    let x2 = Vector3::new(2.0, 0.0, 0.0);

    // closest to the interior
    assert_relative_eq!(
        point_segment_closest_distance(Vector3::new(1.0, 3.0, 0.0), x1, x2),
        3.0
    );
    // beyond an endpoint
    assert_relative_eq!(
        point_segment_closest_distance(Vector3::new(-3.0, 4.0, 0.0), x1, x2),
        5.0
    );
}

#[test]
fn point_triangle_distance_agrees_with_plane_distance_inside() {
    let x1 = Vector3::new(0.0, 0.0, 0.0);
    let x2 = Vector3::new(4.0, 0.0, 0.0);
    let x3 = Vector3::new(0.0, 4.0, 0.0);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        // random point over the triangle interior
        let u: f64 = rng.gen_range(0.05..0.45);
        let v: f64 = rng.gen_range(0.05..0.45);
        let h: f64 = rng.gen_range(-2.0..2.0);
        let p = x1 * (1.0 - u - v) + x2 * u + x3 * v + Vector3::new(0.0, 0.0, h);

        let d = point_triangle_closest_distance(p, x1, x2, x3);
        assert_relative_eq!(d, h.abs(), epsilon = 1e-9);
    }
}
