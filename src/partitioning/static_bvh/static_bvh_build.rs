use super::{StaticBvh, StaticBvhNode, Triangle};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DIM};
use crate::utils::ThreadPool;
use log::{debug, info};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Subdivision stops once a node holds this many triangles or fewer.
const TRI_LIMIT: u32 = 2;

/// Number of SAH bins per candidate axis.
const NUM_BINS: usize = 8;

// Node slab shared by the build workers.
//
// SAFETY: access is disjoint by protocol. `subdivide(k)` is the only job
// ever touching node `k` once its job is queued, and a parent writes both
// children entirely before queueing their jobs; the job channel provides
// the happens-before edge between those writes and the child jobs' reads.
struct NodeSlab(Box<[UnsafeCell<StaticBvhNode>]>);

unsafe impl Sync for NodeSlab {}

impl NodeSlab {
    fn new(len: usize) -> Self {
        let mut slab = Vec::with_capacity(len);
        slab.resize_with(len, || UnsafeCell::new(StaticBvhNode::default()));
        Self(slab.into_boxed_slice())
    }

    // SAFETY: the caller must be the unique owner of node `id` under the
    // build protocol above.
    #[allow(clippy::mut_from_ref)]
    unsafe fn node_mut(&self, id: usize) -> &mut StaticBvhNode {
        &mut *self.0[id].get()
    }

    fn into_nodes(self, used: usize) -> Vec<StaticBvhNode> {
        let mut nodes: Vec<StaticBvhNode> = self
            .0
            .into_vec()
            .into_iter()
            .map(UnsafeCell::into_inner)
            .collect();
        nodes.truncate(used);
        nodes
    }
}

// Triangle-index permutation shared by the build workers. Partitioning has
// already separated the ranges two sibling jobs own, so ranges handed out
// to distinct jobs never overlap.
struct IndexSlab(Box<[UnsafeCell<u32>]>);

unsafe impl Sync for IndexSlab {}

impl IndexSlab {
    fn new(indices: Vec<u32>) -> Self {
        Self(
            indices
                .into_iter()
                .map(UnsafeCell::new)
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        )
    }

    // SAFETY: the caller must own `[first, first + len)` under the build
    // protocol above.
    #[allow(clippy::mut_from_ref)]
    unsafe fn range_mut(&self, first: usize, len: usize) -> &mut [u32] {
        debug_assert!(first + len <= self.0.len());
        // `UnsafeCell<u32>` has the layout of `u32`, and deriving the
        // pointer from the whole slab keeps its provenance over the range.
        let base = self.0.as_ptr() as *mut u32;
        std::slice::from_raw_parts_mut(base.add(first), len)
    }

    fn into_vec(self) -> Vec<u32> {
        self.0
            .into_vec()
            .into_iter()
            .map(UnsafeCell::into_inner)
            .collect()
    }
}

struct BuildContext {
    nodes: NodeSlab,
    tri_idx: IndexSlab,
    tris: Vec<Triangle>,
    // Sole shared counter of the build; every allocation takes two
    // consecutive indices in one atomic bump so siblings stay adjacent.
    nodes_used: AtomicUsize,
    pool: ThreadPool,
}

struct BestSplit {
    axis: usize,
    pos: Real,
    cost: Real,
}

impl StaticBvh {
    /// Builds a static tree over the mesh described by `vertices` and
    /// `indices` (three indices per triangle).
    ///
    /// Subdivision jobs run on `pool` and this call blocks until the pool
    /// drains, so the pool should not be carrying unrelated work at the
    /// same time. Degenerate meshes (no triangles, coincident centroids)
    /// produce a minimal tree and never panic.
    pub fn from_trimesh(vertices: &[Point<Real>], indices: &[u32], pool: &ThreadPool) -> StaticBvh {
        assert_eq!(
            indices.len() % 3,
            0,
            "from_trimesh: index count {} is not a multiple of 3",
            indices.len()
        );

        let tri_count = indices.len() / 3;
        info!("building static tree over {} triangles", tri_count);

        if tri_count == 0 {
            return StaticBvh {
                nodes: Vec::new(),
                tris: Vec::new(),
                tri_idx: Vec::new(),
            };
        }

        let start_time = Instant::now();

        let tris: Vec<Triangle> = indices
            .chunks_exact(3)
            .map(|tri| {
                Triangle::new(
                    vertices[tri[0] as usize],
                    vertices[tri[1] as usize],
                    vertices[tri[2] as usize],
                )
            })
            .collect();

        let ctx = Arc::new(BuildContext {
            // Upper bound for a binary tree over `tri_count` leaves.
            nodes: NodeSlab::new(2 * tri_count + 1),
            tri_idx: IndexSlab::new((0..tri_count as u32).collect()),
            tris,
            nodes_used: AtomicUsize::new(1),
            pool: pool.clone(),
        });

        {
            // SAFETY: no job is running yet; this thread owns the root.
            let root = unsafe { ctx.nodes.node_mut(0) };
            root.first = 0;
            root.tri_count = tri_count as u32;
        }

        pool.start();
        ctx.spawn_subdivide(0);
        pool.wait_idle();

        let ctx = match Arc::try_unwrap(ctx) {
            Ok(ctx) => ctx,
            // Unreachable: every job dropped its handle before the pool
            // went idle.
            Err(_) => panic!("static tree build jobs still hold the build context"),
        };

        let used = ctx.nodes_used.into_inner();
        let tree = StaticBvh {
            nodes: ctx.nodes.into_nodes(used),
            tris: ctx.tris,
            tri_idx: ctx.tri_idx.into_vec(),
        };

        debug!(
            "static tree finished with {} nodes in {:.3}s",
            tree.nodes.len(),
            start_time.elapsed().as_secs_f64()
        );

        tree
    }
}

impl BuildContext {
    fn spawn_subdivide(self: &Arc<Self>, node_id: usize) {
        let ctx = Arc::clone(self);
        self.pool.queue(move || ctx.subdivide(node_id));
    }

    fn subdivide(self: &Arc<Self>, node_id: usize) {
        // SAFETY: this job is the sole owner of `node_id` and of the
        // triangle range the node covers.
        let node = unsafe { self.nodes.node_mut(node_id) };
        let range = unsafe {
            self.tri_idx
                .range_mut(node.first as usize, node.tri_count as usize)
        };

        self.refit(node, range);

        if node.tri_count <= TRI_LIMIT {
            return;
        }

        let split = match self.find_best_split(range) {
            Some(split) => split,
            // All centroids coincide; no plane separates them.
            None => return,
        };

        // Splitting must beat the SAH cost of leaving the node as a leaf.
        if split.cost >= node.aabb.surface_area * node.tri_count as Real {
            return;
        }

        // Two-pointer partition of the node's index range by centroid
        // position against the split plane.
        let mut begin = 0;
        let mut end = range.len();
        while begin < end {
            if self.tris[range[begin] as usize].centroid[split.axis] <= split.pos {
                begin += 1;
            } else {
                end -= 1;
                range.swap(begin, end);
            }
        }

        let left_count = begin;
        if left_count == 0 || left_count == range.len() {
            // The binned plane failed to separate anything; keep the leaf.
            return;
        }

        let left_id = self.nodes_used.fetch_add(2, Ordering::Relaxed);
        let right_id = left_id + 1;

        // SAFETY: both indices were just allocated and are not visible to
        // any other job yet.
        let left = unsafe { self.nodes.node_mut(left_id) };
        let right = unsafe { self.nodes.node_mut(right_id) };

        left.first = node.first;
        left.tri_count = left_count as u32;
        right.first = node.first + left_count as u32;
        right.tri_count = node.tri_count - left_count as u32;

        node.first = left_id as u32;
        node.tri_count = 0;

        self.spawn_subdivide(left_id);
        self.spawn_subdivide(right_id);
    }

    // Recomputes the node box from the triangles in its range.
    fn refit(&self, node: &mut StaticBvhNode, range: &[u32]) {
        node.aabb = Aabb::new_invalid();
        for &tri_id in range.iter() {
            let tri = &self.tris[tri_id as usize];
            node.aabb.take_point(tri.a);
            node.aabb.take_point(tri.b);
            node.aabb.take_point(tri.c);
        }
        node.aabb.update_surface_area();
    }

    // Binned SAH search over the centroid extents of the given range.
    // Returns `None` when no axis offers a separating plane.
    fn find_best_split(&self, range: &[u32]) -> Option<BestSplit> {
        let mut centroid_box = Aabb::new_invalid();
        for &tri_id in range.iter() {
            centroid_box.take_point(self.tris[tri_id as usize].centroid);
        }

        let mut best: Option<BestSplit> = None;

        for axis in 0..DIM {
            let extent = centroid_box.maxs[axis] - centroid_box.mins[axis];
            if extent <= 0.0 {
                // Zero centroid extent: every split plane on this axis
                // would put all triangles on one side.
                continue;
            }

            let mut bins = [Bin::default(); NUM_BINS];
            let scale = NUM_BINS as Real / extent;

            for &tri_id in range.iter() {
                let tri = &self.tris[tri_id as usize];
                let offset = (tri.centroid[axis] - centroid_box.mins[axis]) * scale;
                let bin = &mut bins[(offset as usize).min(NUM_BINS - 1)];
                bin.tri_count += 1;
                bin.bounds.take_point(tri.a);
                bin.bounds.take_point(tri.b);
                bin.bounds.take_point(tri.c);
            }

            // Prefix and suffix sweeps accumulating the bounds area and the
            // triangle count on each side of the NUM_BINS - 1 planes.
            let mut left_area = [0.0 as Real; NUM_BINS - 1];
            let mut right_area = [0.0 as Real; NUM_BINS - 1];
            let mut left_count = [0u32; NUM_BINS - 1];
            let mut right_count = [0u32; NUM_BINS - 1];

            let mut left_box = Aabb::new_invalid();
            let mut right_box = Aabb::new_invalid();
            let mut left_sum = 0;
            let mut right_sum = 0;

            for i in 0..NUM_BINS - 1 {
                left_sum += bins[i].tri_count;
                left_count[i] = left_sum;
                if bins[i].tri_count > 0 {
                    left_box = left_box.merged(&bins[i].bounds);
                }
                left_area[i] = left_box.surface_area;

                let j = NUM_BINS - 2 - i;
                right_sum += bins[j + 1].tri_count;
                right_count[j] = right_sum;
                if bins[j + 1].tri_count > 0 {
                    right_box = right_box.merged(&bins[j + 1].bounds);
                }
                right_area[j] = right_box.surface_area;
            }

            let bin_width = extent / NUM_BINS as Real;
            for i in 0..NUM_BINS - 1 {
                if left_count[i] == 0 || right_count[i] == 0 {
                    continue;
                }

                let cost = left_count[i] as Real * left_area[i]
                    + right_count[i] as Real * right_area[i];
                if best.as_ref().map_or(true, |best| cost < best.cost) {
                    best = Some(BestSplit {
                        axis,
                        pos: centroid_box.mins[axis] + bin_width * (i + 1) as Real,
                        cost,
                    });
                }
            }
        }

        best
    }
}

#[derive(Copy, Clone)]
struct Bin {
    bounds: Aabb,
    tri_count: u32,
}

impl Default for Bin {
    fn default() -> Self {
        Self {
            bounds: Aabb::new_invalid(),
            tri_count: 0,
        }
    }
}
