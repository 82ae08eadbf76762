use broadphase3d::bounding_volume::Aabb;
use broadphase3d::math::{Matrix4, Point, Real, Vector};
use broadphase3d::partitioning::StaticBvh;
use broadphase3d::utils::ThreadPool;

// The classic 12-triangle unit cube, centered at `center`.
fn unit_cube(center: Point<Real>) -> (Vec<Point<Real>>, Vec<u32>) {
    let h = 0.5;
    let vertices = vec![
        Point::new(center.x - h, center.y - h, center.z - h),
        Point::new(center.x + h, center.y - h, center.z - h),
        Point::new(center.x + h, center.y + h, center.z - h),
        Point::new(center.x - h, center.y + h, center.z - h),
        Point::new(center.x - h, center.y - h, center.z + h),
        Point::new(center.x + h, center.y - h, center.z + h),
        Point::new(center.x + h, center.y + h, center.z + h),
        Point::new(center.x - h, center.y + h, center.z + h),
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, // back
        4, 6, 5, 4, 7, 6, // front
        0, 3, 7, 0, 7, 4, // left
        1, 5, 6, 1, 6, 2, // right
        0, 4, 5, 0, 5, 1, // bottom
        3, 2, 6, 3, 6, 7, // top
    ];
    (vertices, indices)
}

fn build(vertices: &[Point<Real>], indices: &[u32]) -> StaticBvh {
    let pool = ThreadPool::new(4);
    pool.start();
    StaticBvh::from_trimesh(vertices, indices, &pool)
}

#[test]
fn unit_cube_build_answers_region_queries() {
    let (vertices, indices) = unit_cube(Point::origin());
    let tree = build(&vertices, &indices);
    tree.assert_well_formed();

    assert_eq!(tree.tri_count(), 12);
    // Twelve triangles cannot fit a single leaf: the tree must have split.
    assert!(tree.node_count() > 1);

    // A box around the whole mesh reaches every leaf.
    let everything = Aabb::from_half_extents(Point::origin(), Vector::repeat(2.0));
    assert_eq!(
        tree.query_aabb(&everything).len(),
        tree.boxes(true).len()
    );

    // A distant box reaches nothing.
    let far = Aabb::new(Point::new(5.0, 5.0, 5.0), Point::new(6.0, 6.0, 6.0));
    assert!(tree.query_aabb(&far).is_empty());
}

#[test]
fn disjoint_meshes_share_no_leaf_pairs() {
    let (va, ia) = unit_cube(Point::origin());
    let (vb, ib) = unit_cube(Point::new(10.0, 0.0, 0.0));

    let tree_a = build(&va, &ia);
    let tree_b = build(&vb, &ib);

    assert!(tree_a.query_tree(&tree_b).is_empty());
}

#[test]
fn overlapping_meshes_emit_leaf_box_pairs() {
    let (va, ia) = unit_cube(Point::origin());
    let (vb, ib) = unit_cube(Point::new(0.25, 0.0, 0.0));

    let tree_a = build(&va, &ia);
    let tree_b = build(&vb, &ib);

    let hits = tree_a.query_tree(&tree_b);
    assert!(!hits.is_empty());
    // Matches always come as (mine, theirs) box pairs.
    assert_eq!(hits.len() % 2, 0);

    for pair in hits.chunks_exact(2) {
        assert!(pair[0].intersects(&pair[1]));
    }
}

#[test]
fn transformed_boxes_follow_the_model_matrix() {
    let (vertices, indices) = unit_cube(Point::origin());
    let tree = build(&vertices, &indices);

    let translation = Vector::new(3.0, -1.0, 0.5);
    let model_mat = Matrix4::new_translation(&translation);

    let plain = tree.boxes(false);
    let moved = tree.boxes_transformed(&model_mat, false);
    assert_eq!(plain.len(), moved.len());

    for (a, b) in plain.iter().zip(moved.iter()) {
        assert_eq!(a.mins + translation, b.mins);
        assert_eq!(a.maxs + translation, b.maxs);
    }
}

#[test]
fn world_space_probes_reach_a_translated_mesh() {
    // The tree lives in local space; a world-space probe is brought into
    // local space by the caller before querying.
    let (vertices, indices) = unit_cube(Point::origin());
    let tree = build(&vertices, &indices);

    let model_pos = Vector::new(100.0, 0.0, 0.0);
    let world_probe = Aabb::from_half_extents(Point::new(100.2, 0.0, 0.0), Vector::repeat(0.1));
    let local_probe = Aabb::new(world_probe.mins - model_pos, world_probe.maxs - model_pos);

    assert!(!tree.query_aabb(&local_probe).is_empty());
}
