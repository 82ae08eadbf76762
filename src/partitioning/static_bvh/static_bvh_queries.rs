use super::StaticBvh;
use crate::bounding_volume::Aabb;
use smallvec::SmallVec;

const TRAVERSAL_STACK_SIZE: usize = 32;

impl StaticBvh {
    /// Collects the boxes of the leaves overlapping `aabb`.
    ///
    /// The query runs an iterative depth-first descent with an explicit
    /// stack; callers probing with a world-space box must transform it into
    /// the tree's local space first.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<Aabb> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }

        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(0);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];

            if !aabb.intersects(&node.aabb) {
                continue;
            }

            if node.is_leaf() {
                out.push(node.aabb);
            } else {
                stack.push(node.first);
                stack.push(node.first + 1);
            }
        }

        out
    }

    /// Simultaneous descent of `self` and `other`, collecting the boxes of
    /// every pair of leaves whose AABBs overlap across the two trees.
    ///
    /// Each match contributes both leaf boxes, adjacent in the output;
    /// narrow-phase interpretation of the pairs is the caller's business.
    pub fn query_tree(&self, other: &StaticBvh) -> Vec<Aabb> {
        let mut out = Vec::new();
        if self.nodes.is_empty() || other.nodes.is_empty() {
            return out;
        }

        let mut stack: SmallVec<[(u32, u32); TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push((0, 0));

        while let Some((mine, theirs)) = stack.pop() {
            let a = &self.nodes[mine as usize];
            let b = &other.nodes[theirs as usize];

            if !a.aabb.intersects(&b.aabb) {
                continue;
            }

            match (a.is_leaf(), b.is_leaf()) {
                (true, true) => {
                    out.push(a.aabb);
                    out.push(b.aabb);
                }
                (true, false) => {
                    stack.push((mine, b.first));
                    stack.push((mine, b.first + 1));
                }
                (false, true) => {
                    stack.push((a.first, theirs));
                    stack.push((a.first + 1, theirs));
                }
                (false, false) => {
                    stack.push((a.first, b.first));
                    stack.push((a.first + 1, b.first));
                    stack.push((a.first, b.first + 1));
                    stack.push((a.first + 1, b.first + 1));
                }
            }
        }

        out
    }
}
