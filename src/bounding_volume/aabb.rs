//! Axis Aligned Bounding Box.

use crate::math::{Matrix4, Point, Real, Vector, DIM};
use na;
use num::Bounded;

/// An Axis Aligned Bounding Box with a cached surface area.
///
/// The cache keeps the surface-area-heuristic hot loops of both trees from
/// recomputing `2·(dx·dy + dy·dz + dz·dx)` on every comparison. Every
/// operation that both mutates the corners and returns a box ready for
/// inspection refreshes the cache; [`Aabb::take_point`] is the one
/// exception so that point batches pay for a single
/// [`Aabb::update_surface_area`] at the end.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Aabb {
    /// The point with the smallest coordinates contained by this AABB.
    pub mins: Point<Real>,
    /// The point with the highest coordinates contained by this AABB.
    pub maxs: Point<Real>,
    /// Cached surface area; meaningless until at least one point has been
    /// taken into account.
    pub surface_area: Real,
}

impl Aabb {
    /// Creates a new AABB.
    ///
    /// # Arguments:
    ///   * `mins` - position of the point with the smallest coordinates.
    ///   * `maxs` - position of the point with the highest coordinates.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        let mut result = Aabb {
            mins,
            maxs,
            surface_area: 0.0,
        };
        result.update_surface_area();
        result
    }

    /// Creates an invalid AABB with `mins` components set to `Real::max_value`
    /// and `maxs` components set to `-Real::max_value`.
    ///
    /// This is the initial state of every box-merging loop: the first
    /// [`Aabb::take_point`] replaces both corners. The cached surface area of
    /// an invalid AABB must not be consumed.
    #[inline]
    pub fn new_invalid() -> Self {
        Self {
            mins: Vector::repeat(Real::max_value()).into(),
            maxs: Vector::repeat(-Real::max_value()).into(),
            surface_area: 0.0,
        }
    }

    /// Creates a new AABB from its center and its half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    ///
    /// The cached surface area is left stale; callers batching several
    /// points issue one [`Aabb::update_surface_area`] at the end.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Sets this AABB to the componentwise union of `a` and `b` and
    /// refreshes the cached surface area.
    #[inline]
    pub fn merge(&mut self, a: &Aabb, b: &Aabb) {
        self.mins = a.mins.coords.inf(&b.mins.coords).into();
        self.maxs = a.maxs.coords.sup(&b.maxs.coords).into();
        self.update_surface_area();
    }

    /// The union of `self` and `other`, with a fresh surface area.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            self.mins.coords.inf(&other.mins.coords).into(),
            self.maxs.coords.sup(&other.maxs.coords).into(),
        )
    }

    /// Checks whether the intervals of `self` and `other` overlap on all
    /// three axes. The comparison is inclusive: touching boxes collide.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    /// Checks whether `self` fully encloses `other`.
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }

    /// Checks whether this AABB contains the point `pt`.
    #[inline]
    pub fn contains_local_point(&self, pt: &Point<Real>) -> bool {
        for i in 0..DIM {
            if pt[i] < self.mins[i] || pt[i] > self.maxs[i] {
                return false;
            }
        }

        true
    }

    /// Recomputes the cached surface area from the current corners.
    #[inline]
    pub fn update_surface_area(&mut self) {
        let d = self.maxs - self.mins;
        self.surface_area = 2.0 * (d.x * d.y + d.y * d.z + d.z * d.x);
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// Maps both corners of this AABB through the homogeneous transform `m`.
    ///
    /// The corners are transformed verbatim, without re-sorting the result,
    /// which is what the debug-visualization consumers expect.
    #[inline]
    pub fn transformed_by(&self, m: &Matrix4<Real>) -> Aabb {
        Aabb::new(m.transform_point(&self.mins), m.transform_point(&self.maxs))
    }
}

#[cfg(test)]
mod test {
    use super::Aabb;
    use crate::math::{Point, Vector};

    #[test]
    fn take_point_initializes_from_invalid() {
        let mut aabb = Aabb::new_invalid();
        aabb.take_point(Point::new(1.0, 2.0, 3.0));
        aabb.update_surface_area();

        assert_eq!(aabb.mins, Point::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.maxs, Point::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.surface_area, 0.0);
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let aabb = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        assert_relative_eq!(aabb.surface_area, 6.0);

        let merged = aabb.merged(&Aabb::from_half_extents(
            Point::new(2.0, 0.5, 0.5),
            Vector::repeat(0.5),
        ));
        // 2.5 x 1 x 1 box.
        assert_relative_eq!(merged.surface_area, 2.0 * (2.5 + 1.0 + 2.5));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point::new(1.0, 0.0, 0.0), Point::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Point::new(1.1, 0.0, 0.0), Point::new(2.0, 1.0, 1.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }
}
