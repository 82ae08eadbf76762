//! Spatial partitioning structures: the dynamic and the static
//! bounding-volume hierarchies.

pub use self::dynamic_bvh::{DynamicBvh, DynamicBvhNode};
pub use self::static_bvh::{StaticBvh, StaticBvhNode, Triangle};

mod dynamic_bvh;
mod node_arena;
mod static_bvh;
