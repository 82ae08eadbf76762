use crate::bounding_volume::Aabb;
use crate::math::{Matrix4, Point, Real};

/// A triangle gathered from the caller's vertex and index buffers, with its
/// centroid cached at build time.
#[derive(Copy, Clone, Debug)]
pub struct Triangle {
    /// First vertex.
    pub a: Point<Real>,
    /// Second vertex.
    pub b: Point<Real>,
    /// Third vertex.
    pub c: Point<Real>,
    pub(super) centroid: Point<Real>,
}

impl Triangle {
    pub(super) fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Self {
        let centroid = ((a.coords + b.coords + c.coords) / 3.0).into();
        Self { a, b, c, centroid }
    }
}

/// A node of the static tree.
///
/// `tri_count > 0` marks a leaf owning the triangle-permutation range
/// `[first, first + tri_count)`. Internal nodes store the index of their
/// left child in `first`; the right child always sits at `first + 1`
/// because both children of a split are allocated with a single atomic
/// bump.
#[derive(Copy, Clone, Debug)]
pub struct StaticBvhNode {
    /// Bounding box of every triangle below this node.
    pub aabb: Aabb,
    pub(super) first: u32,
    pub(super) tri_count: u32,
}

impl StaticBvhNode {
    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.tri_count > 0
    }
}

impl Default for StaticBvhNode {
    fn default() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            first: 0,
            tri_count: 0,
        }
    }
}

/// A bounding-volume hierarchy built once over a triangle mesh.
///
/// The build runs binned surface-area-heuristic splits in parallel on a
/// worker pool (see [`StaticBvh::from_trimesh`]); once built, the tree is
/// immutable and all queries are lock-free. Triangles keep their source
/// order: the build permutes a parallel index array instead.
pub struct StaticBvh {
    pub(super) nodes: Vec<StaticBvhNode>,
    pub(super) tris: Vec<Triangle>,
    pub(super) tri_idx: Vec<u32>,
}

impl StaticBvh {
    /// Does this tree index any triangle?
    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    /// Number of nodes used by the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of triangles indexed by the tree.
    pub fn tri_count(&self) -> usize {
        self.tris.len()
    }

    /// The AABB bounding the whole mesh.
    pub fn root_aabb(&self) -> Aabb {
        if self.nodes.is_empty() {
            Aabb::new_invalid()
        } else {
            self.nodes[0].aabb
        }
    }

    /// Collects the node AABBs, restricted to the leaves when `leaf_only`
    /// is set. Intended for debug visualization.
    pub fn boxes(&self, leaf_only: bool) -> Vec<Aabb> {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf() || !leaf_only)
            .map(|node| node.aabb)
            .collect()
    }

    /// Same as [`StaticBvh::boxes`], with each box corner mapped through
    /// `model_mat` before emission so world-space consumers don't need a
    /// second pass.
    pub fn boxes_transformed(&self, model_mat: &Matrix4<Real>, leaf_only: bool) -> Vec<Aabb> {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf() || !leaf_only)
            .map(|node| node.aabb.transformed_by(model_mat))
            .collect()
    }

    // The triangle stored in the `slot`-th position of the permutation.
    pub(super) fn triangle(&self, slot: usize) -> &Triangle {
        &self.tris[self.tri_idx[slot] as usize]
    }
}
