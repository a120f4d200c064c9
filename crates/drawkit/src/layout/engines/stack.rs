//! Stack layout engine: a single row in storage order, starting at the
//! scope's top-left corner.

use drawkit_core::geometry::Point;

use super::Engine;
use crate::{
    error::DrawkitError,
    layout::{LayoutScope, Placement},
};

pub struct Stack {
    spacing: f64,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            spacing: super::DEFAULT_STACK_SPACING,
        }
    }

    /// Set the gap between neighbouring vertices
    pub fn set_spacing(&mut self, spacing: f64) -> &mut Self {
        self.spacing = spacing;
        self
    }
}

impl Engine for Stack {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        let mut placement = Placement::new();
        let Some(bounds) = scope.bounds() else {
            return Ok(placement);
        };

        let mut x = bounds.min_x();
        for (id, geometry) in scope.vertices() {
            placement.insert(id, geometry.moved_to(Point::new(x, bounds.min_y())));
            x += geometry.width() + self.spacing;
        }
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use drawkit_core::{geometry::Geometry, identifier::Id};

    use super::*;

    #[test]
    fn test_row_from_top_left() {
        let scope = LayoutScope::new(
            [
                (Id::new("a"), Geometry::new(50.0, 90.0, 100.0, 40.0)),
                (Id::new("b"), Geometry::new(10.0, 300.0, 60.0, 60.0)),
                (Id::new("c"), Geometry::new(400.0, 30.0, 20.0, 20.0)),
            ],
            [],
        );

        let placement = Stack::new().calculate(&scope).unwrap();

        assert_eq!(placement.get(Id::new("a")), Some(Geometry::new(10.0, 30.0, 100.0, 40.0)));
        assert_eq!(placement.get(Id::new("b")), Some(Geometry::new(130.0, 30.0, 60.0, 60.0)));
        assert_eq!(placement.get(Id::new("c")), Some(Geometry::new(210.0, 30.0, 20.0, 20.0)));
    }
}
