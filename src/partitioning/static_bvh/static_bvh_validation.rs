use super::StaticBvh;
use na;

impl StaticBvh {
    /// Panics if the tree isn't well-formed.
    ///
    /// The tree is well-formed if the triangle permutation covers every
    /// source triangle exactly once, sibling nodes sit at consecutive
    /// indices, leaf ranges tile the permutation, and every node's box
    /// encloses its children (or its triangles, for leaves).
    pub fn assert_well_formed(&self) {
        if self.nodes.is_empty() {
            assert!(self.tris.is_empty());
            assert!(self.tri_idx.is_empty());
            return;
        }

        assert_eq!(self.tri_idx.len(), self.tris.len());
        let mut seen = vec![false; self.tris.len()];
        for &tri_id in &self.tri_idx {
            assert!(
                !seen[tri_id as usize],
                "triangle {} appears twice in the permutation",
                tri_id
            );
            seen[tri_id as usize] = true;
        }

        let covered = self.assert_well_formed_recurse(0);
        assert_eq!(covered as usize, self.tris.len());
    }

    // Returns the number of triangles covered by the subtree at `id`.
    fn assert_well_formed_recurse(&self, id: u32) -> u32 {
        let node = &self.nodes[id as usize];

        if node.is_leaf() {
            for slot in node.first..node.first + node.tri_count {
                let tri = self.triangle(slot as usize);
                assert!(node.aabb.contains_local_point(&tri.a));
                assert!(node.aabb.contains_local_point(&tri.b));
                assert!(node.aabb.contains_local_point(&tri.c));
            }
            return node.tri_count;
        }

        // Siblings are adjacent by construction.
        let left = node.first;
        let right = node.first + 1;
        assert!((right as usize) < self.nodes.len());
        assert!(left != id && right != id, "node {} links to itself", id);

        for child in [left, right] {
            let child_node = &self.nodes[child as usize];
            assert!(
                na::partial_le(&node.aabb.mins, &child_node.aabb.mins)
                    && na::partial_ge(&node.aabb.maxs, &child_node.aabb.maxs),
                "node {} does not enclose its child {}",
                id,
                child
            );
        }

        self.assert_well_formed_recurse(left) + self.assert_well_formed_recurse(right)
    }
}
