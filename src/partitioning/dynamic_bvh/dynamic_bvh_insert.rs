use super::dynamic_bvh_tree::NULL_NODE;
use super::DynamicBvh;
use crate::bounding_volume::Aabb;
use crate::math::Real;
use std::fmt;
use std::hash::Hash;

impl<T: Copy + Eq + Hash + fmt::Debug> DynamicBvh<T> {
    /// Inserts `object` with the given `aabb`.
    ///
    /// Panics if `object` is already present; use [`DynamicBvh::update`] to
    /// move an existing object.
    pub fn insert(&mut self, object: T, aabb: Aabb) {
        assert!(
            !self.object_to_node.contains_key(&object),
            "insert: object {:?} is already present",
            object
        );

        let leaf = self.nodes.allocate();
        self.nodes[leaf].aabb = aabb;
        let _ = self.node_to_object.insert(leaf, object);
        let _ = self.object_to_node.insert(object, leaf);

        self.insert_leaf(leaf);
    }

    fn insert_leaf(&mut self, leaf: u32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf].parent = NULL_NODE;
            return;
        }

        let sibling = self.find_best_sibling(leaf);

        // Splice a new parent between the chosen sibling and its old parent.
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.nodes.allocate();

        self.nodes[new_parent].parent = old_parent;
        let merged = self.nodes[leaf].aabb.merged(&self.nodes[sibling].aabb);
        self.nodes[new_parent].aabb = merged;
        self.nodes[new_parent].height = self.nodes[sibling].height + 1;
        self.nodes[new_parent].left = sibling;
        self.nodes[new_parent].right = leaf;

        self.nodes[sibling].parent = new_parent;
        self.nodes[leaf].parent = new_parent;

        if old_parent != NULL_NODE {
            if self.nodes[old_parent].left == sibling {
                self.nodes[old_parent].left = new_parent;
            } else {
                self.nodes[old_parent].right = new_parent;
            }
        } else {
            // The sibling was the root.
            self.root = new_parent;
        }

        let start = self.nodes[leaf].parent;
        self.refit_upward(start);
    }

    // Picks the leaf the new node should share a fresh parent with, by a
    // surface-area branch-and-bound descent from the root.
    fn find_best_sibling(&self, leaf: u32) -> u32 {
        let leaf_aabb = self.nodes[leaf].aabb;
        let mut sibling = self.root;

        while !self.nodes[sibling].is_leaf() {
            let node = &self.nodes[sibling];
            let combined_area = node.aabb.merged(&leaf_aabb).surface_area;

            // Cost of ending the descent here: a new parent over `sibling`
            // and the leaf.
            let cost = 2.0 * combined_area;

            // Lower bound on the cost a deeper placement inherits from
            // growing this node's box.
            let inherited_cost = 2.0 * (combined_area - node.aabb.surface_area);

            let cost_left = self.descent_cost(node.left, &leaf_aabb) + inherited_cost;
            let cost_right = self.descent_cost(node.right, &leaf_aabb) + inherited_cost;

            if cost < cost_left && cost < cost_right {
                break;
            }

            sibling = if cost_left < cost_right {
                self.nodes[sibling].left
            } else {
                self.nodes[sibling].right
            };
        }

        sibling
    }

    // SAH cost of pushing the new leaf into `child`: the full merged area
    // for a leaf child (a new parent is unavoidable there), the area growth
    // for an internal one.
    fn descent_cost(&self, child: u32, leaf_aabb: &Aabb) -> Real {
        let child_node = &self.nodes[child];
        let merged_area = child_node.aabb.merged(leaf_aabb).surface_area;

        if child_node.is_leaf() {
            merged_area
        } else {
            merged_area - child_node.aabb.surface_area
        }
    }

    // Walks from `node` to the root, rebalancing and refitting each
    // ancestor's box and height from its children.
    pub(super) fn refit_upward(&mut self, mut node: u32) {
        while node != NULL_NODE {
            node = self.balance(node);

            let left = self.nodes[node].left;
            let right = self.nodes[node].right;
            self.nodes[node].height = 1 + self.nodes[left].height.max(self.nodes[right].height);
            let merged = self.nodes[left].aabb.merged(&self.nodes[right].aabb);
            self.nodes[node].aabb = merged;

            node = self.nodes[node].parent;
        }
    }

    // Applies at most one rotation at `node`, returning the index now
    // occupying `node`'s position in the tree.
    pub(super) fn balance(&mut self, node: u32) -> u32 {
        if self.nodes[node].is_leaf() {
            return node;
        }

        let left = self.nodes[node].left;
        let right = self.nodes[node].right;
        let balance = self.nodes[right].height as i64 - self.nodes[left].height as i64;

        if balance > 1 {
            // Rotate the right branch up.
            self.rotate_up(node, right, left)
        } else if balance < -1 {
            // Rotate the left branch up.
            self.rotate_up(node, left, right)
        } else {
            node
        }
    }

    // Promotes `up` (the taller child of `node`) one level: `up` takes
    // `node`'s place under its parent, `node` becomes `up`'s left child,
    // and `node` adopts the shorter grandchild in exchange. `other` is
    // `node`'s remaining child.
    fn rotate_up(&mut self, node: u32, up: u32, other: u32) -> u32 {
        let up_left = self.nodes[up].left;
        let up_right = self.nodes[up].right;

        // Swap node and `up`.
        self.nodes[up].left = node;
        self.nodes[up].parent = self.nodes[node].parent;
        self.nodes[node].parent = up;

        let up_parent = self.nodes[up].parent;
        if up_parent != NULL_NODE {
            if self.nodes[up_parent].left == node {
                self.nodes[up_parent].left = up;
            } else {
                self.nodes[up_parent].right = up;
            }
        } else {
            self.root = up;
        }

        // `up` keeps its taller child; `node` adopts the shorter one.
        let (kept, adopted) = if self.nodes[up_left].height > self.nodes[up_right].height {
            (up_left, up_right)
        } else {
            (up_right, up_left)
        };

        self.nodes[up].right = kept;
        if self.nodes[node].left == up {
            self.nodes[node].left = adopted;
        } else {
            self.nodes[node].right = adopted;
        }
        self.nodes[adopted].parent = node;

        let node_aabb = self.nodes[other].aabb.merged(&self.nodes[adopted].aabb);
        self.nodes[node].aabb = node_aabb;
        let up_aabb = self.nodes[node].aabb.merged(&self.nodes[kept].aabb);
        self.nodes[up].aabb = up_aabb;

        self.nodes[node].height =
            1 + self.nodes[other].height.max(self.nodes[adopted].height);
        self.nodes[up].height = 1 + self.nodes[node].height.max(self.nodes[kept].height);

        up
    }
}
