use crate::math::Vector3;

/// The kind of mesh cell a [`CollisionElement::CellIndex`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Point,
    Edge,
    Triangle,
    Quad,
    Tetrahedron,
}

/// One piece of contact geometry reported by a detector.
///
/// Collision data is not contacts; it is the raw geometric evidence a
/// response strategy interprets. A cell can be reported by vertex values
/// (implicit geometry), by vertex ids, or directly as a point-direction
/// contact. Exactly one variant is live at a time and assignment replaces
/// the whole payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionElement {
    /// No contact geometry
    Empty,

    /// A direct point-direction contact
    PointDirection {
        /// Contact point in world space
        point: Vector3,
        /// Contact direction (unit)
        dir: Vector3,
        /// Penetration depth along `dir`
        depth: f64,
    },

    /// A point-direction contact with the point given by vertex id
    PointIndexDirection {
        /// Vertex id of the contact point
        pt_index: usize,
        /// Contact direction
        dir: Vector3,
        /// Penetration depth along `dir`
        depth: f64,
    },

    /// A cell given by its vertex values, up to a tetrahedron
    CellVertex {
        /// Vertex positions of the cell
        pts: [Vector3; 4],
        /// Number of live entries in `pts`
        size: usize,
    },

    /// A cell given by its vertex ids, up to a tetrahedron
    CellIndex {
        /// Vertex ids of the cell
        ids: [usize; 4],
        /// Number of live entries in `ids`
        id_count: usize,
        /// The kind of cell the ids describe
        cell_type: CellType,
    },
}

impl CollisionElement {
    /// Creates an edge cell element from two vertex ids
    pub fn edge(i0: usize, i1: usize) -> Self {
        Self::CellIndex {
            ids: [i0, i1, 0, 0],
            id_count: 2,
            cell_type: CellType::Edge,
        }
    }

    /// Creates a triangle cell element from three vertex ids
    pub fn triangle(i0: usize, i1: usize, i2: usize) -> Self {
        Self::CellIndex {
            ids: [i0, i1, i2, 0],
            id_count: 3,
            cell_type: CellType::Triangle,
        }
    }
}

impl Default for CollisionElement {
    fn default() -> Self {
        Self::Empty
    }
}

/// The contact geometry exchanged between one detector and its handlers.
///
/// Holds one element list per side of the interacting pair. When both
/// lists were filled by the same predicate invocation they are
/// index-aligned: element `i` of side A corresponds to element `i` of
/// side B. Cleared and repopulated on every detection pass.
#[derive(Debug, Default)]
pub struct CollisionData {
    /// Elements reported against side A
    pub elements_a: Vec<CollisionElement>,

    /// Elements reported against side B
    pub elements_b: Vec<CollisionElement>,
}

impl CollisionData {
    /// Creates an empty collision data container
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an index-aligned pair of elements
    pub fn push_pair(&mut self, a: CollisionElement, b: CollisionElement) {
        self.elements_a.push(a);
        self.elements_b.push(b);
    }

    /// Clears both element lists, keeping their allocations
    pub fn clear_all(&mut self) {
        self.elements_a.clear();
        self.elements_b.clear();
    }

    /// Returns whether both element lists are empty
    pub fn is_empty(&self) -> bool {
        self.elements_a.is_empty() && self.elements_b.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pair_keeps_sides_aligned() {
        let mut data = CollisionData::new();
        data.push_pair(
            CollisionElement::PointIndexDirection {
                pt_index: 3,
                dir: Vector3::unit_y(),
                depth: 0.5,
            },
            CollisionElement::triangle(0, 1, 2),
        );
        assert_eq!(data.elements_a.len(), data.elements_b.len());

        data.clear_all();
        assert!(data.is_empty());
    }

    #[test]
    fn element_constructors_fill_counts() {
        match CollisionElement::edge(4, 7) {
            CollisionElement::CellIndex { ids, id_count, cell_type } => {
                assert_eq!(&ids[..id_count], &[4, 7]);
                assert_eq!(cell_type, CellType::Edge);
            }
            _ => panic!("expected a cell index element"),
        }
    }
}
