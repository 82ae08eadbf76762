pub use static_bvh_tree::{StaticBvh, StaticBvhNode, Triangle};

mod static_bvh_build;
mod static_bvh_queries;
mod static_bvh_tree;
mod static_bvh_validation;

#[cfg(test)]
mod static_bvh_tests;
