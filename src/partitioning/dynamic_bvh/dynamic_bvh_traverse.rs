use super::dynamic_bvh_tree::NULL_NODE;
use super::DynamicBvh;
use crate::bounding_volume::Aabb;
use smallvec::SmallVec;
use std::fmt;
use std::hash::Hash;

const TRAVERSAL_STACK_SIZE: usize = 32;

impl<T: Copy + Eq + Hash + fmt::Debug> DynamicBvh<T> {
    /// Enumerates every unordered pair of stored objects whose AABBs
    /// currently overlap.
    ///
    /// Each pair appears exactly once; the order of pairs (and of the two
    /// handles within a pair) is unspecified but deterministic for a given
    /// sequence of tree operations. Trees holding at most one object yield
    /// an empty set.
    pub fn compute_collision_pairs(&self) -> Vec<(T, T)> {
        let mut pairs = Vec::new();

        if self.root == NULL_NODE || self.nodes[self.root].is_leaf() {
            return pairs;
        }

        self.self_pairs(self.root, &mut |n1, n2| {
            pairs.push((self.object(n1), self.object(n2)));
        });

        pairs
    }

    // Descends the whole tree; at each internal node the left and right
    // subtrees are cross-traversed, so every leaf pair is reached exactly
    // once: at the lowest common ancestor of the two leaves.
    fn self_pairs(&self, id: u32, f: &mut impl FnMut(u32, u32)) {
        let left = self.nodes[id].left;
        let right = self.nodes[id].right;

        if !self.nodes[left].is_leaf() {
            self.self_pairs(left, f);
        }
        if !self.nodes[right].is_leaf() {
            self.self_pairs(right, f);
        }

        self.cross_pairs(left, right, f);
    }

    // Emits the overlapping leaf pairs between the subtrees rooted at `a`
    // and `b`, pruned by AABB overlap.
    fn cross_pairs(&self, a: u32, b: u32, f: &mut impl FnMut(u32, u32)) {
        if !self.nodes[a].aabb.intersects(&self.nodes[b].aabb) {
            return;
        }

        match (self.nodes[a].is_leaf(), self.nodes[b].is_leaf()) {
            (true, true) => f(a, b),
            (true, false) => {
                self.cross_pairs(a, self.nodes[b].left, f);
                self.cross_pairs(a, self.nodes[b].right, f);
            }
            (false, true) => {
                self.cross_pairs(self.nodes[a].left, b, f);
                self.cross_pairs(self.nodes[a].right, b, f);
            }
            (false, false) => {
                let (a_left, a_right) = (self.nodes[a].left, self.nodes[a].right);
                let (b_left, b_right) = (self.nodes[b].left, self.nodes[b].right);
                self.cross_pairs(a_left, b_left, f);
                self.cross_pairs(a_left, b_right, f);
                self.cross_pairs(a_right, b_left, f);
                self.cross_pairs(a_right, b_right, f);
            }
        }
    }

    /// Collects the AABBs of this tree's nodes, restricted to the leaves
    /// when `leaf_only` is set. Intended for debug visualization.
    pub fn all_boxes(&self, leaf_only: bool) -> Vec<Aabb> {
        let mut out = Vec::new();
        if self.root == NULL_NODE {
            return out;
        }

        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(self.root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                out.push(node.aabb);
            } else {
                if !leaf_only {
                    out.push(node.aabb);
                }
                stack.push(node.left);
                stack.push(node.right);
            }
        }

        out
    }
}
