//! Partition layout engine.
//!
//! Splits the bounding box of the scope into equal columns, one per vertex
//! in storage order. Vertices are resized to fill their column.

use drawkit_core::geometry::Geometry;

use super::Engine;
use crate::{
    error::DrawkitError,
    layout::{LayoutScope, Placement},
};

pub struct Partition;

impl Partition {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for Partition {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        let mut placement = Placement::new();
        let Some(bounds) = scope.bounds() else {
            return Ok(placement);
        };

        let column_width = bounds.width() / scope.len() as f64;
        for (i, (id, _)) in scope.vertices().enumerate() {
            placement.insert(
                id,
                Geometry::new(
                    bounds.min_x() + i as f64 * column_width,
                    bounds.min_y(),
                    column_width,
                    bounds.height(),
                ),
            );
        }
        Ok(placement)
    }
}
