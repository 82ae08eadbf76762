pub use dynamic_bvh_tree::{DynamicBvh, DynamicBvhNode};

mod dynamic_bvh_insert;
mod dynamic_bvh_traverse;
mod dynamic_bvh_tree;
mod dynamic_bvh_validation;
