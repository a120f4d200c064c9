//! Layout engine factory module
//!
//! Every algorithm is an [`Engine`]; the [`EngineBuilder`] carries the shared
//! configuration (spacings, iterations, seed), creates engines on first use
//! and caches them per [`LayoutPlan`].

mod circle;
mod hierarchical;
mod organic;
mod partition;
mod stack;
mod tree;

use std::collections::HashMap;

use log::trace;

use drawkit_core::geometry::{Geometry, Point};

use super::{Algorithm, LayoutPlan, LayoutScope, Placement};
use crate::error::DrawkitError;

pub const DEFAULT_HORIZONTAL_SPACING: f64 = 50.0;
pub const DEFAULT_VERTICAL_SPACING: f64 = 80.0;
pub const DEFAULT_ORGANIC_ITERATIONS: usize = 100;
pub const DEFAULT_CIRCLE_MIN_RADIUS: f64 = 100.0;
pub const DEFAULT_STACK_SPACING: f64 = 20.0;
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Trait defining the interface for layout engines.
pub trait Engine {
    /// Computes a new geometry for every vertex of the scope.
    ///
    /// Engines never touch the graph; the dispatcher applies the returned
    /// placement.
    ///
    /// # Errors
    /// Returns `DrawkitError::Layout` if the engine fails to calculate positions.
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError>;
}

/// Builder for creating and configuring layout engines.
pub struct EngineBuilder {
    // Cache for reusing engines with the same plan
    engines: HashMap<LayoutPlan, Box<dyn Engine>>,

    horizontal_spacing: f64,
    vertical_spacing: f64,
    organic_iterations: usize,
    circle_min_radius: f64,
    stack_spacing: f64,
    seed: u64,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            engines: HashMap::new(),
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
            organic_iterations: DEFAULT_ORGANIC_ITERATIONS,
            circle_min_radius: DEFAULT_CIRCLE_MIN_RADIUS,
            stack_spacing: DEFAULT_STACK_SPACING,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineBuilder {
    /// Create a new engine builder with default engine cache and configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal spacing between vertices
    pub fn with_horizontal_spacing(mut self, spacing: f64) -> Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the vertical spacing between layers
    pub fn with_vertical_spacing(mut self, spacing: f64) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Set the number of force simulation steps of the organic layout
    pub fn with_organic_iterations(mut self, iterations: usize) -> Self {
        self.organic_iterations = iterations;
        self
    }

    /// Set the smallest radius of the circle layout
    pub fn with_circle_min_radius(mut self, radius: f64) -> Self {
        self.circle_min_radius = radius;
        self
    }

    /// Set the gap between stacked vertices
    pub fn with_stack_spacing(mut self, spacing: f64) -> Self {
        self.stack_spacing = spacing;
        self
    }

    /// Set the seed of the organic layout's initial jitter
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Get an engine for the plan, configured with the builder's options
    pub fn engine(&mut self, plan: LayoutPlan) -> &dyn Engine {
        let engine = self.engines.entry(plan).or_insert_with(|| {
            trace!(algorithm:% = plan.algorithm(), direction:% = plan.direction(); "Creating layout engine");
            let engine: Box<dyn Engine> = match plan.algorithm() {
                Algorithm::Hierarchical => {
                    let mut e = hierarchical::Hierarchical::new();
                    e.set_horizontal_spacing(self.horizontal_spacing)
                        .set_vertical_spacing(self.vertical_spacing)
                        .set_direction(plan.direction());
                    Box::new(e)
                }
                Algorithm::Circle => {
                    let mut e = circle::Circle::new();
                    e.set_min_radius(self.circle_min_radius);
                    Box::new(e)
                }
                Algorithm::Organic => {
                    let mut e = organic::Organic::new();
                    e.set_iterations(self.organic_iterations)
                        .set_min_distance(self.horizontal_spacing.max(1.0) * 1.6)
                        .set_seed(self.seed);
                    Box::new(e)
                }
                Algorithm::CompactTree => {
                    let mut e = tree::CompactTree::new();
                    e.set_horizontal_spacing(self.horizontal_spacing)
                        .set_vertical_spacing(self.vertical_spacing);
                    Box::new(e)
                }
                Algorithm::RadialTree => {
                    let mut e = tree::RadialTree::new();
                    e.set_ring_spacing(self.vertical_spacing)
                        .set_tree_spacing(self.horizontal_spacing);
                    Box::new(e)
                }
                Algorithm::Partition => Box::new(partition::Partition::new()),
                Algorithm::Stack => {
                    let mut e = stack::Stack::new();
                    e.set_spacing(self.stack_spacing);
                    Box::new(e)
                }
            };
            engine
        });

        &**engine
    }
}

/// Places a geometry so that its center lands on `center`, keeping its size.
fn centered_at(geometry: Geometry, center: Point) -> Geometry {
    geometry.moved_to(Point::new(
        center.x() - geometry.width() / 2.0,
        center.y() - geometry.height() / 2.0,
    ))
}
