use std::collections::HashMap;

use crate::collision::pair::InteractionPair;
use crate::core::BodyHandle;

/// The set of active interacting pairs, indexed per body
///
/// Pairs are unordered: {A, B} and {B, A} name the same interaction and a
/// second registration of the same pair is refused. A per-body secondary
/// index keeps lookups of all interactions of one body cheap.
#[derive(Default)]
pub struct CollisionGraph {
    pairs: Vec<InteractionPair>,
    by_body: HashMap<BodyHandle, Vec<usize>>,
}

impl CollisionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interacting pair, returning its index
    ///
    /// Self-pairs and duplicates (in either order) are refused with a
    /// warning.
    pub fn add_interaction_pair(&mut self, pair: InteractionPair) -> Option<usize> {
        let (a, b) = (pair.body_a(), pair.body_b());
        if a == b {
            log::warn!("refusing interaction pair of a body with itself: {:?}", a);
            return None;
        }
        if self.pair_index(a, b).is_some() {
            log::warn!("interaction pair {:?}-{:?} already registered", a, b);
            return None;
        }

        let index = self.pairs.len();
        self.pairs.push(pair);
        self.by_body.entry(a).or_default().push(index);
        self.by_body.entry(b).or_default().push(index);
        Some(index)
    }

    /// Unregisters the pair between two bodies, in either order
    pub fn remove_interaction_pair(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<InteractionPair> {
        let index = self.pair_index(a, b)?;
        let last = self.pairs.len() - 1;
        let pair = self.pairs.swap_remove(index);

        self.unindex(pair.body_a(), index);
        self.unindex(pair.body_b(), index);

        // the former last pair now lives at `index`
        if index != last {
            let (moved_a, moved_b) = {
                let moved = &self.pairs[index];
                (moved.body_a(), moved.body_b())
            };
            self.reindex(moved_a, last, index);
            self.reindex(moved_b, last, index);
        }

        Some(pair)
    }

    /// Unregisters every pair involving the given body
    pub fn remove_pairs_of(&mut self, handle: BodyHandle) {
        while let Some(&index) = self.by_body.get(&handle).and_then(|v| v.first()) {
            let (a, b) = {
                let pair = &self.pairs[index];
                (pair.body_a(), pair.body_b())
            };
            self.remove_interaction_pair(a, b);
        }
    }

    /// Looks up the pair between two bodies, in either order
    pub fn get_interaction_pair(&self, a: BodyHandle, b: BodyHandle) -> Option<&InteractionPair> {
        self.pair_index(a, b).map(|i| &self.pairs[i])
    }

    /// Returns the indices of all pairs involving the given body
    pub fn pairs_of(&self, handle: BodyHandle) -> &[usize] {
        self.by_body.get(&handle).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pairs(&self) -> &[InteractionPair] {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut [InteractionPair] {
        &mut self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn pair_index(&self, a: BodyHandle, b: BodyHandle) -> Option<usize> {
        self.by_body.get(&a)?.iter().copied().find(|&i| {
            let pair = &self.pairs[i];
            // exact unordered match; {a, a} never names a registered pair
            (pair.body_a() == a && pair.body_b() == b)
                || (pair.body_a() == b && pair.body_b() == a)
        })
    }

    fn unindex(&mut self, handle: BodyHandle, index: usize) {
        if let Some(list) = self.by_body.get_mut(&handle) {
            list.retain(|&i| i != index);
            if list.is_empty() {
                self.by_body.remove(&handle);
            }
        }
    }

    fn reindex(&mut self, handle: BodyHandle, from: usize, to: usize) {
        if let Some(list) = self.by_body.get_mut(&handle) {
            for i in list.iter_mut() {
                if *i == from {
                    *i = to;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::detector::MeshToMeshDetector;

    fn pair(a: BodyHandle, b: BodyHandle) -> InteractionPair {
        InteractionPair::new(a, b, Box::new(MeshToMeshDetector::new()), None, None)
    }

    #[test]
    fn duplicate_pairs_are_refused_in_either_order() {
        let mut graph = CollisionGraph::new();
        let (a, b) = (BodyHandle(1), BodyHandle(2));

        assert!(graph.add_interaction_pair(pair(a, b)).is_some());
        assert!(graph.add_interaction_pair(pair(a, b)).is_none());
        assert!(graph.add_interaction_pair(pair(b, a)).is_none());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn self_pair_is_refused() {
        let mut graph = CollisionGraph::new();
        let a = BodyHandle(1);
        assert!(graph.add_interaction_pair(pair(a, a)).is_none());
    }

    #[test]
    fn lookup_is_order_insensitive() {
        let mut graph = CollisionGraph::new();
        let (a, b) = (BodyHandle(1), BodyHandle(2));
        graph.add_interaction_pair(pair(a, b));

        assert!(graph.get_interaction_pair(a, b).is_some());
        assert!(graph.get_interaction_pair(b, a).is_some());
        assert!(graph.get_interaction_pair(a, BodyHandle(3)).is_none());
    }

    #[test]
    fn self_lookup_never_matches_a_registered_pair() {
        let mut graph = CollisionGraph::new();
        let (a, b) = (BodyHandle(1), BodyHandle(2));
        graph.add_interaction_pair(pair(a, b));

        // {a, a} names no pair; it must not resolve to {a, b}
        assert!(graph.get_interaction_pair(a, a).is_none());
        assert!(graph.remove_interaction_pair(a, a).is_none());
        assert_eq!(graph.len(), 1);
        assert!(graph.get_interaction_pair(a, b).is_some());
    }

    #[test]
    fn removal_keeps_the_index_consistent() {
        let mut graph = CollisionGraph::new();
        let (a, b, c) = (BodyHandle(1), BodyHandle(2), BodyHandle(3));
        graph.add_interaction_pair(pair(a, b));
        graph.add_interaction_pair(pair(b, c));
        graph.add_interaction_pair(pair(a, c));

        assert!(graph.remove_interaction_pair(b, a).is_some());
        assert_eq!(graph.len(), 2);
        assert!(graph.get_interaction_pair(a, b).is_none());
        // the swapped-in pair is still reachable through the index
        assert!(graph.get_interaction_pair(a, c).is_some());
        assert!(graph.get_interaction_pair(c, b).is_some());
        assert_eq!(graph.pairs_of(a).len(), 1);
        assert_eq!(graph.pairs_of(b).len(), 1);
    }

    #[test]
    fn remove_pairs_of_clears_every_interaction() {
        let mut graph = CollisionGraph::new();
        let (a, b, c) = (BodyHandle(1), BodyHandle(2), BodyHandle(3));
        graph.add_interaction_pair(pair(a, b));
        graph.add_interaction_pair(pair(a, c));
        graph.add_interaction_pair(pair(b, c));

        graph.remove_pairs_of(a);
        assert_eq!(graph.len(), 1);
        assert!(graph.pairs_of(a).is_empty());
        assert!(graph.get_interaction_pair(b, c).is_some());
    }
}
