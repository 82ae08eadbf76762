//! Bounding volume types.

pub use self::aabb::Aabb;

mod aabb;
