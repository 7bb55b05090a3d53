use std::collections::HashSet;

use crate::bodies::Body;
use crate::collision::element::{CollisionData, CollisionElement};
use crate::collision::predicates::{aabb_overlap, line_segment_aabb_test, point_triangle_aabb_test};
use crate::math::{Vector3, EPSILON};

/// Produces contact candidate geometry for one interacting pair
pub trait CollisionDetector {
    /// Clears `data` and repopulates it with the candidates of this pass
    fn detect(&self, body_a: &Body, body_b: &Body, data: &mut CollisionData);
}

/// Brute-force proximity detection between two meshes
///
/// A whole-mesh bounding box test gates the pass; inside it every vertex of
/// side A is tested against every triangle of side B and every edge of A
/// against every unique triangle edge of B, all through expanded-AABB
/// proximity predicates. Reported vertex candidates carry the triangle
/// plane direction and penetration depth so force-based handlers can
/// consume them directly.
#[derive(Debug, Default)]
pub struct MeshToMeshDetector;

impl MeshToMeshDetector {
    pub fn new() -> Self {
        Self
    }

    fn broad_phase(body_a: &Body, body_b: &Body) -> bool {
        let (min_a, max_a) = match body_a.compute_bounding_box() {
            Some(bounds) => bounds,
            None => return false,
        };
        let (min_b, max_b) = match body_b.compute_bounding_box() {
            Some(bounds) => bounds,
            None => return false,
        };

        let m_a = Vector3::new(body_a.proximity(), body_a.proximity(), body_a.proximity());
        let m_b = Vector3::new(body_b.proximity(), body_b.proximity(), body_b.proximity());
        aabb_overlap(min_a - m_a, max_a + m_a, min_b - m_b, max_b + m_b)
    }

    fn detect_vertex_triangle(body_a: &Body, body_b: &Body, data: &mut CollisionData) {
        let prox_a = body_a.proximity();
        let prox_b = body_b.proximity();
        let margin = prox_a + prox_b;

        for i in 0..body_a.vertex_count() {
            let p = body_a.vertex_position(i);
            for tri in body_b.triangles() {
                let p0 = body_b.vertex_position(tri[0]);
                let p1 = body_b.vertex_position(tri[1]);
                let p2 = body_b.vertex_position(tri[2]);

                if !point_triangle_aabb_test(p, p0, p1, p2, prox_a, prox_b) {
                    continue;
                }

                let n = (p1 - p0).cross(&(p2 - p0));
                let n_len = n.length();
                if n_len < EPSILON {
                    continue;
                }
                let nhat = n / n_len;
                let signed = (p - p0).dot(&nhat);
                let depth = margin - signed;

                data.push_pair(
                    CollisionElement::PointIndexDirection {
                        pt_index: i,
                        dir: nhat,
                        depth,
                    },
                    CollisionElement::triangle(tri[0], tri[1], tri[2]),
                );
            }
        }
    }

    fn detect_edge_edge(body_a: &Body, body_b: &Body, data: &mut CollisionData) {
        let prox_a = body_a.proximity();
        let prox_b = body_b.proximity();

        // each triangle edge of B is tested once per edge of A
        let mut tested: HashSet<([usize; 2], [usize; 2])> = HashSet::new();

        for edge_a in body_a.edges() {
            let pa = body_a.vertex_position(edge_a[0]);
            let qa = body_a.vertex_position(edge_a[1]);
            let key_a = if edge_a[0] < edge_a[1] {
                [edge_a[0], edge_a[1]]
            } else {
                [edge_a[1], edge_a[0]]
            };

            for tri in body_b.triangles() {
                for (u, v) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                    let key_b = if u < v { [u, v] } else { [v, u] };
                    if !tested.insert((key_a, key_b)) {
                        continue;
                    }

                    let pb = body_b.vertex_position(u);
                    let qb = body_b.vertex_position(v);
                    if line_segment_aabb_test(pa, qa, pb, qb, prox_a, prox_b) {
                        data.push_pair(
                            CollisionElement::edge(edge_a[0], edge_a[1]),
                            CollisionElement::edge(u, v),
                        );
                    }
                }
            }
        }
    }
}

impl CollisionDetector for MeshToMeshDetector {
    fn detect(&self, body_a: &Body, body_b: &Body, data: &mut CollisionData) {
        data.clear_all();

        if !Self::broad_phase(body_a, body_b) {
            return;
        }

        Self::detect_vertex_triangle(body_a, body_b, data);
        Self::detect_edge_edge(body_a, body_b, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn vertex_near_triangle_is_reported() {
        let point = Body::new_deformable(vec![Vector3::new(0.0, 0.005, 0.0)]);
        let floor = floor_triangle();

        let mut data = CollisionData::new();
        MeshToMeshDetector::new().detect(&point, &floor, &mut data);

        assert_eq!(data.elements_a.len(), 1);
        match data.elements_a[0] {
            CollisionElement::PointIndexDirection { pt_index, depth, .. } => {
                assert_eq!(pt_index, 0);
                assert!(depth > 0.0);
            }
            _ => panic!("expected a point index element"),
        }
    }

    #[test]
    fn distant_bodies_produce_no_candidates() {
        let point = Body::new_deformable(vec![Vector3::new(0.0, 10.0, 0.0)]);
        let floor = floor_triangle();

        let mut data = CollisionData::new();
        data.push_pair(CollisionElement::Empty, CollisionElement::Empty);
        MeshToMeshDetector::new().detect(&point, &floor, &mut data);

        // stale elements from the previous pass are gone
        assert!(data.is_empty());
    }

    #[test]
    fn crossing_edges_are_reported_once() {
        // the same edge listed in both orders is one geometric edge
        let mut rope = Body::new_deformable(vec![
            Vector3::new(-1.0, 0.005, 0.0),
            Vector3::new(1.0, 0.005, 0.0),
        ]);
        rope.set_edges(vec![[0, 1], [1, 0]]);
        let floor = floor_triangle();

        let mut data = CollisionData::new();
        MeshToMeshDetector::new().detect(&rope, &floor, &mut data);

        let edge_pairs = data
            .elements_a
            .iter()
            .filter(|e| matches!(e, CollisionElement::CellIndex { .. }))
            .count();
        assert!(edge_pairs > 0);
        // three unique triangle edges at most for a single edge of A
        assert!(edge_pairs <= 3);
    }
}
