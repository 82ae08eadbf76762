use crate::bounding_volume::Aabb;
use crate::partitioning::node_arena::NodeArena;
use crate::utils::hashmap::HashMap;
use std::fmt;
use std::hash::Hash;

/// The sentinel index marking an absent node link.
///
/// Index 0 is a legal node, so the sentinel lives at the top of the index
/// space instead.
pub(super) const NULL_NODE: u32 = u32::MAX;

/// A node of the dynamic AABB tree.
#[derive(Copy, Clone, Debug)]
pub struct DynamicBvhNode {
    /// This node's bounding box: a leaf's own box, or the merge of both
    /// children for internal nodes.
    pub aabb: Aabb,
    pub(super) parent: u32,
    pub(super) left: u32,
    pub(super) right: u32,
    pub(super) height: u32,
}

impl Default for DynamicBvhNode {
    fn default() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
            height: 0,
        }
    }
}

impl DynamicBvhNode {
    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let leaf = self.left == NULL_NODE && self.right == NULL_NODE;
        debug_assert!(!leaf || self.height == 0);
        leaf
    }
}

/// A dynamic bounding-volume hierarchy over mobile objects.
///
/// Callers register opaque handles of type `T` together with a world-space
/// AABB per object, update the AABB whenever the object moves, and ask for
/// the set of overlapping handle pairs each simulation tick to drive the
/// broad phase.
///
/// Insertions pick their position with a surface-area-heuristic
/// branch-and-bound descent; the walk back up applies AVL-style rotations
/// keyed on node height so the tree stays balanced under any insertion
/// order.
///
/// The tree is single-threaded: one caller owns it and no operation spawns
/// tasks internally.
pub struct DynamicBvh<T> {
    pub(super) nodes: NodeArena<DynamicBvhNode>,
    pub(super) root: u32,
    pub(super) node_to_object: HashMap<u32, T>,
    pub(super) object_to_node: HashMap<T, u32>,
}

impl<T: Copy + Eq + Hash + fmt::Debug> Default for DynamicBvh<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq + Hash + fmt::Debug> DynamicBvh<T> {
    /// An empty dynamic tree.
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// An empty dynamic tree pre-sized for `capacity` objects.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // A tree over n leaves uses 2n - 1 nodes.
            nodes: NodeArena::with_capacity((capacity * 2).max(1)),
            root: NULL_NODE,
            node_to_object: HashMap::with_capacity(capacity),
            object_to_node: HashMap::with_capacity(capacity),
        }
    }

    /// Number of objects currently stored in the tree.
    pub fn len(&self) -> usize {
        self.object_to_node.len()
    }

    /// Does this tree contain no object?
    pub fn is_empty(&self) -> bool {
        self.object_to_node.is_empty()
    }

    /// The AABB bounding everything contained by this tree.
    pub fn root_aabb(&self) -> Aabb {
        if self.root == NULL_NODE {
            Aabb::new_invalid()
        } else {
            self.nodes[self.root].aabb
        }
    }

    /// The current AABB of `object`.
    ///
    /// Panics if `object` was never inserted or has been removed.
    pub fn bounding_box(&self, object: T) -> Aabb {
        let node = self
            .object_to_node
            .get(&object)
            .unwrap_or_else(|| panic!("bounding_box: unknown object {:?}", object));
        self.nodes[*node].aabb
    }

    /// Removes `object` from the tree, promoting its sibling in place of
    /// their common parent.
    ///
    /// Panics if `object` was never inserted or has already been removed.
    pub fn remove(&mut self, object: T) {
        let node = self
            .object_to_node
            .remove(&object)
            .unwrap_or_else(|| panic!("remove: unknown object {:?}", object));
        let _ = self.node_to_object.remove(&node);

        if node == self.root {
            self.nodes.free(node);
            self.root = NULL_NODE;
            return;
        }

        let old_parent = self.nodes[node].parent;
        let sibling = self.sibling(node);
        let grandparent = self.nodes[old_parent].parent;

        if grandparent != NULL_NODE {
            if self.nodes[grandparent].left == old_parent {
                self.nodes[grandparent].left = sibling;
            } else {
                self.nodes[grandparent].right = sibling;
            }
            self.nodes[sibling].parent = grandparent;
        } else {
            self.root = sibling;
            self.nodes[sibling].parent = NULL_NODE;
        }

        self.nodes.free(old_parent);
        self.nodes.free(node);

        // The ancestors lost a leaf: restore their box/height bookkeeping.
        self.refit_upward(grandparent);
    }

    /// Moves `object` to a new AABB.
    ///
    /// This is exactly a removal followed by a fresh insertion with the
    /// new box.
    pub fn update(&mut self, object: T, aabb: Aabb) {
        self.remove(object);
        self.insert(object, aabb);
    }

    pub(super) fn object(&self, node: u32) -> T {
        self.node_to_object[&node]
    }

    // The other child of `node`'s parent. Only valid on non-root nodes.
    pub(super) fn sibling(&self, node: u32) -> u32 {
        let parent = &self.nodes[self.nodes[node].parent];
        if parent.left == node {
            parent.right
        } else {
            debug_assert_eq!(parent.right, node, "sibling: node not linked to its parent");
            parent.left
        }
    }
}
