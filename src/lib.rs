/*!
broadphase3d
============

**broadphase3d** is a 3-dimensional broad-phase collision-detection library
written with the rust programming language.

It provides two bounding-volume hierarchies sharing one AABB algebra:

- [`partitioning::DynamicBvh`], an incrementally balanced AABB tree over
  mobile objects supporting insertion, removal, per-tick updates, and
  self-pair enumeration for broad-phase collision detection;
- [`partitioning::StaticBvh`], built once per triangle mesh with binned
  surface-area-heuristic splits executed on a worker pool, answering
  region and tree-vs-tree queries.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::module_inception)]

#[macro_use]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod partitioning;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    pub use f32 as Real;
}

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use super::real::*;
    pub use na::{Matrix4, Point3, Vector3};

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;
}
