use super::dynamic_bvh_tree::NULL_NODE;
use super::DynamicBvh;
use std::fmt;
use std::hash::Hash;

impl<T: Copy + Eq + Hash + fmt::Debug> DynamicBvh<T> {
    /// Panics if the tree isn't well-formed.
    ///
    /// The tree is well-formed if it is topologically correct (parent and
    /// child links mirror each other, the handle↔node maps are mutually
    /// inverse and cover exactly the live leaves) and geometrically correct
    /// (every internal node's box is the merge of its children, heights
    /// propagate as `1 + max(children)`, and no node is out of balance by
    /// more than one level).
    pub fn assert_well_formed(&self) {
        if self.root == NULL_NODE {
            assert!(self.object_to_node.is_empty());
            assert!(self.node_to_object.is_empty());
            assert_eq!(self.nodes.live_count(), 0);
            return;
        }

        assert_eq!(self.nodes[self.root].parent, NULL_NODE);

        let mut leaf_count = 0;
        self.assert_well_formed_recurse(self.root, &mut leaf_count);

        assert_eq!(leaf_count, self.object_to_node.len());
        assert_eq!(self.node_to_object.len(), self.object_to_node.len());
        assert_eq!(self.nodes.live_count(), 2 * leaf_count - 1);

        for (object, node) in self.object_to_node.iter() {
            assert_eq!(self.node_to_object.get(node), Some(object));
            assert!(self.nodes[*node].is_leaf());
        }
    }

    fn assert_well_formed_recurse(&self, id: u32, leaf_count: &mut usize) {
        let node = &self.nodes[id];

        if node.is_leaf() {
            assert_eq!(node.height, 0);
            assert!(
                self.node_to_object.contains_key(&id),
                "leaf {} has no registered object",
                id
            );
            *leaf_count += 1;
            return;
        }

        let left = node.left;
        let right = node.right;
        assert_ne!(left, NULL_NODE, "internal node {} misses its left child", id);
        assert_ne!(right, NULL_NODE, "internal node {} misses its right child", id);
        assert_ne!(left, right);
        assert_eq!(self.nodes[left].parent, id);
        assert_eq!(self.nodes[right].parent, id);

        let left_height = self.nodes[left].height;
        let right_height = self.nodes[right].height;
        assert_eq!(node.height, 1 + left_height.max(right_height));
        assert!(
            (left_height as i64 - right_height as i64).abs() <= 1,
            "node {} is out of balance: left height {}, right height {}",
            id,
            left_height,
            right_height
        );

        let merged = self.nodes[left].aabb.merged(&self.nodes[right].aabb);
        assert_relative_eq!(node.aabb.mins, merged.mins, max_relative = 1.0e-5);
        assert_relative_eq!(node.aabb.maxs, merged.maxs, max_relative = 1.0e-5);

        self.assert_well_formed_recurse(left, leaf_count);
        self.assert_well_formed_recurse(right, leaf_count);
    }
}
