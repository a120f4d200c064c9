//! Circle layout engine.
//!
//! Vertices sit on one circle in storage order, the first one at the bottom,
//! continuing counter-clockwise. The radius grows with the number and size
//! of vertices and never drops below the configured minimum.

use std::f64::consts::PI;

use drawkit_core::geometry::Point;

use super::Engine;
use crate::{
    error::DrawkitError,
    layout::{LayoutScope, Placement},
};

pub struct Circle {
    min_radius: f64,
}

impl Circle {
    pub fn new() -> Self {
        Self {
            min_radius: super::DEFAULT_CIRCLE_MIN_RADIUS,
        }
    }

    pub fn set_min_radius(&mut self, radius: f64) -> &mut Self {
        self.min_radius = radius;
        self
    }

    fn radius(&self, scope: &LayoutScope) -> f64 {
        let (max_width, max_height) = scope.max_size();
        let max_dimension = max_width.max(max_height);
        (scope.len() as f64 * max_dimension / PI).max(self.min_radius)
    }
}

impl Engine for Circle {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        let mut placement = Placement::new();
        let Some(bounds) = scope.bounds() else {
            return Ok(placement);
        };

        let radius = self.radius(scope);
        let phi = 2.0 * PI / scope.len() as f64;
        let (left, top) = (bounds.min_x(), bounds.min_y());

        for (i, (id, geometry)) in scope.vertices().enumerate() {
            let angle = i as f64 * phi;
            let top_left = Point::new(
                left + radius + radius * angle.sin(),
                top + radius + radius * angle.cos(),
            );
            placement.insert(id, geometry.moved_to(top_left));
        }

        placement.anchor_at(bounds.min_point());
        Ok(placement)
    }
}
