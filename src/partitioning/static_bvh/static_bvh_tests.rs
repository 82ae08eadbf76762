use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::partitioning::StaticBvh;
use crate::utils::ThreadPool;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn build_pool() -> ThreadPool {
    let pool = ThreadPool::new(4);
    pool.start();
    pool
}

fn random_soup(count: usize, seed: u64) -> (Vec<Point<Real>>, Vec<u32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for _ in 0..count {
        let center = Point::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        for _ in 0..3 {
            let offset = Vector::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            );
            indices.push(vertices.len() as u32);
            vertices.push(center + offset);
        }
    }

    (vertices, indices)
}

fn triangle_aabb(vertices: &[Point<Real>], indices: &[u32], tri: usize) -> Aabb {
    let mut aabb = Aabb::new_invalid();
    for k in 0..3 {
        aabb.take_point(vertices[indices[tri * 3 + k] as usize]);
    }
    aabb.update_surface_area();
    aabb
}

#[test]
fn build_over_a_soup_is_well_formed() {
    let pool = build_pool();
    let (vertices, indices) = random_soup(500, 7);
    let tree = StaticBvh::from_trimesh(&vertices, &indices, &pool);

    tree.assert_well_formed();
    assert_eq!(tree.tri_count(), 500);
    assert!(tree.node_count() > 1);
    assert!(tree.node_count() <= 2 * 500 + 1);

    // The root bounds every source vertex.
    let root = tree.root_aabb();
    for vertex in &vertices {
        assert!(root.contains_local_point(vertex));
    }
}

#[test]
fn region_queries_cover_every_overlapping_triangle() {
    let pool = build_pool();
    let (vertices, indices) = random_soup(300, 11);
    let tree = StaticBvh::from_trimesh(&vertices, &indices, &pool);
    tree.assert_well_formed();

    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..40 {
        let center = Point::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        let query = Aabb::from_half_extents(center, Vector::repeat(rng.gen_range(0.5..4.0)));
        let hits = tree.query_aabb(&query);

        // Every triangle whose AABB overlaps the query must lie under at
        // least one emitted leaf box.
        for tri in 0..300 {
            let tri_aabb = triangle_aabb(&vertices, &indices, tri);
            if tri_aabb.intersects(&query) {
                assert!(
                    hits.iter().any(|hit| hit.contains(&tri_aabb)),
                    "triangle {} overlaps the query but no emitted box covers it",
                    tri
                );
            }
        }
    }
}

#[test]
fn empty_mesh_builds_an_empty_tree() {
    let pool = build_pool();
    let tree = StaticBvh::from_trimesh(&[], &[], &pool);

    tree.assert_well_formed();
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 0);
    assert!(tree
        .query_aabb(&Aabb::from_half_extents(Point::origin(), Vector::repeat(100.0)))
        .is_empty());
    assert!(tree.boxes(false).is_empty());
}

#[test]
fn coincident_centroids_build_a_single_leaf() {
    let pool = build_pool();

    // 24 copies of the same triangle: every centroid coincides, so no axis
    // offers a split and the root stays a leaf.
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ];
    let indices: Vec<u32> = std::iter::repeat([0u32, 1, 2]).take(24).flatten().collect();

    let tree = StaticBvh::from_trimesh(&vertices, &indices, &pool);
    tree.assert_well_formed();
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.tri_count(), 24);

    let hits = tree.query_aabb(&Aabb::from_half_extents(Point::origin(), Vector::repeat(5.0)));
    assert_eq!(hits.len(), 1);
}

#[test]
fn tiny_meshes_stay_a_leaf() {
    let pool = build_pool();
    let (vertices, indices) = random_soup(2, 3);
    let tree = StaticBvh::from_trimesh(&vertices, &indices, &pool);

    tree.assert_well_formed();
    assert_eq!(tree.node_count(), 1);
}

#[test]
#[should_panic(expected = "from_trimesh: index count")]
fn truncated_index_buffer_panics() {
    let pool = build_pool();
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ];
    let _ = StaticBvh::from_trimesh(&vertices, &[0, 1], &pool);
}
