//! Geometric primitives for cell placement.
//!
//! - [`Geometry`] - The position and size record attached to every vertex
//! - [`Point`] - A 2D coordinate used by the layout engines
//! - [`Bounds`] - An axis-aligned bounding box
//!
//! # Coordinate System
//!
//! Coordinates follow the draw.io canvas convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! A [`Geometry`] stores the **top-left** corner of its cell. Values are
//! unconstrained: negative positions and zero sizes are legal.

use serde::{Deserialize, Serialize};

/// Position and size of a vertex in canvas units.
///
/// Geometries are replaced wholesale when edited; see
/// [`Geometry::with_overrides`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Geometry {
    /// Creates a geometry from its top-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Builds a new geometry taking each given field and falling back to
    /// this geometry's value for the omitted ones.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drawkit_core::geometry::Geometry;
    /// let current = Geometry::new(10.0, 10.0, 120.0, 60.0);
    /// let moved = current.with_overrides(Some(50.0), None, None, Some(90.0));
    /// assert_eq!(moved, Geometry::new(50.0, 10.0, 120.0, 90.0));
    /// ```
    pub fn with_overrides(
        &self,
        x: Option<f64>,
        y: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Self {
        Self {
            x: x.unwrap_or(self.x),
            y: y.unwrap_or(self.y),
            width: width.unwrap_or(self.width),
            height: height.unwrap_or(self.height),
        }
    }

    /// Returns the same size placed at a new top-left corner.
    pub fn moved_to(&self, top_left: Point) -> Self {
        Self {
            x: top_left.x(),
            y: top_left.y(),
            ..*self
        }
    }

    /// Returns the center point of the cell.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns the bounding box covered by the cell.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        )
    }
}

/// A 2D point in canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Subtracts another point from this point, returning a new point.
    pub fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance from the origin.
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Swaps the axes, turning a top-down placement into a left-right one.
    pub fn transpose(self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn min_x(self) -> f64 {
        self.min.x
    }

    pub fn min_y(self) -> f64 {
        self.min.y
    }

    pub fn max_x(self) -> f64 {
        self.max.x
    }

    pub fn max_y(self) -> f64 {
        self.max.y
    }

    pub fn min_point(self) -> Point {
        self.min
    }

    pub fn width(self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f64 {
        self.max.y - self.min.y
    }

    /// Smallest bounds covering both boxes.
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Merges every box of an iterator, `None` when it is empty.
    pub fn merge_all(mut boxes: impl Iterator<Item = Bounds>) -> Option<Self> {
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, b| acc.merge(&b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides_keeps_omitted_fields() {
        let current = Geometry::new(1.0, 2.0, 3.0, 4.0);

        assert_eq!(current.with_overrides(None, None, None, None), current);
        assert_eq!(
            current.with_overrides(Some(-5.0), None, Some(0.0), None),
            Geometry::new(-5.0, 2.0, 0.0, 4.0)
        );
    }

    #[test]
    fn test_center_and_bounds() {
        let geometry = Geometry::new(10.0, 20.0, 100.0, 50.0);

        assert_eq!(geometry.center(), Point::new(60.0, 45.0));
        let bounds = geometry.bounds();
        assert_eq!(bounds.max_x(), 110.0);
        assert_eq!(bounds.max_y(), 70.0);
        assert_eq!(bounds.width(), 100.0);
    }

    #[test]
    fn test_moved_to_keeps_size() {
        let geometry = Geometry::new(10.0, 20.0, 100.0, 50.0);
        let moved = geometry.moved_to(Point::new(-1.0, -2.0));

        assert_eq!(moved, Geometry::new(-1.0, -2.0, 100.0, 50.0));
    }

    #[test]
    fn test_merge_all() {
        let a = Geometry::new(0.0, 0.0, 10.0, 10.0).bounds();
        let b = Geometry::new(-5.0, 20.0, 10.0, 10.0).bounds();

        let merged = Bounds::merge_all([a, b].into_iter()).unwrap();
        assert_eq!(merged.min_x(), -5.0);
        assert_eq!(merged.max_y(), 30.0);
        assert!(Bounds::merge_all(std::iter::empty()).is_none());
    }

    #[test]
    fn test_point_math() {
        let p = Point::new(3.0, 4.0);

        assert_eq!(p.hypot(), 5.0);
        assert_eq!(p.transpose(), Point::new(4.0, 3.0));
        assert_eq!(p.scale(2.0).sub_point(p), p);
        assert_eq!(p.add_point(Point::new(1.0, 1.0)), Point::new(4.0, 5.0));
    }
}
