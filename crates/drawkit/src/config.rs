//! Configuration types for Drawkit.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out and how batch edits behave. All types implement
//! [`serde::Deserialize`] for loading from TOML files.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining layout and editing settings.
//! - [`LayoutConfig`] - Spacings and parameters handed to the layout engines.
//! - [`EditingConfig`] - Batch semantics and removal policy of the tool operations.
//!
//! # Example
//!
//! ```
//! # use drawkit::config::{AppConfig, BatchMode};
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.editing().batch(), BatchMode::AllOrNothing);
//! assert_eq!(config.layout().horizontal_spacing(), 50.0);
//! ```

use serde::Deserialize;

use drawkit_core::graph::RemovalPolicy;

use crate::layout::{
    Direction, EngineBuilder, LayoutDispatcher,
    engines::{
        DEFAULT_CIRCLE_MIN_RADIUS, DEFAULT_HORIZONTAL_SPACING, DEFAULT_ORGANIC_ITERATIONS,
        DEFAULT_SEED, DEFAULT_STACK_SPACING, DEFAULT_VERTICAL_SPACING,
    },
};

/// Top-level application configuration combining layout and editing settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Editing configuration section.
    #[serde(default)]
    editing: EditingConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and editing configurations.
    ///
    /// # Arguments
    ///
    /// * `layout` - Layout engine settings.
    /// * `editing` - Batch and removal settings of the tool operations.
    pub fn new(layout: LayoutConfig, editing: EditingConfig) -> Self {
        Self { layout, editing }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the editing configuration.
    pub fn editing(&self) -> &EditingConfig {
        &self.editing
    }
}

/// Parameters of the layout engines.
///
/// Every field is optional in the file; missing fields keep the engine
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between neighbouring vertices and between separate trees.
    horizontal_spacing: f64,

    /// Gap between layers, levels and rings.
    vertical_spacing: f64,

    /// Steps of the organic force simulation.
    organic_iterations: usize,

    /// Smallest radius of the circle layout.
    circle_min_radius: f64,

    /// Gap between vertices of the stack layout.
    stack_spacing: f64,

    /// Hierarchical direction used when a request names none.
    direction: Direction,

    /// Seed of the organic layout's initial jitter.
    seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
            organic_iterations: DEFAULT_ORGANIC_ITERATIONS,
            circle_min_radius: DEFAULT_CIRCLE_MIN_RADIUS,
            stack_spacing: DEFAULT_STACK_SPACING,
            direction: Direction::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl LayoutConfig {
    pub fn horizontal_spacing(&self) -> f64 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f64 {
        self.vertical_spacing
    }

    pub fn organic_iterations(&self) -> usize {
        self.organic_iterations
    }

    pub fn circle_min_radius(&self) -> f64 {
        self.circle_min_radius
    }

    pub fn stack_spacing(&self) -> f64 {
        self.stack_spacing
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Creates an [`EngineBuilder`] carrying these parameters.
    pub fn engine_builder(&self) -> EngineBuilder {
        EngineBuilder::new()
            .with_horizontal_spacing(self.horizontal_spacing)
            .with_vertical_spacing(self.vertical_spacing)
            .with_organic_iterations(self.organic_iterations)
            .with_circle_min_radius(self.circle_min_radius)
            .with_stack_spacing(self.stack_spacing)
            .with_seed(self.seed)
    }

    /// Creates a [`LayoutDispatcher`] carrying these parameters.
    pub fn dispatcher(&self) -> LayoutDispatcher {
        LayoutDispatcher::new(self.engine_builder()).with_default_direction(self.direction)
    }
}

/// How a tool operation treats a request holding several items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// The first failing item aborts the request and nothing is saved.
    #[default]
    AllOrNothing,
    /// Failing items are skipped and reported; the rest is saved.
    BestEffort,
}

/// Editing behavior of the tool operations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    batch: BatchMode,

    /// Remove edges attached to removed vertices.
    cascade_edges: bool,
}

impl EditingConfig {
    /// Creates a new [`EditingConfig`].
    ///
    /// # Arguments
    ///
    /// * `batch` - Batch semantics of multi-item requests.
    /// * `cascade_edges` - Whether removing a vertex removes its edges.
    pub fn new(batch: BatchMode, cascade_edges: bool) -> Self {
        Self {
            batch,
            cascade_edges,
        }
    }

    pub fn batch(&self) -> BatchMode {
        self.batch
    }

    pub fn cascade_edges(&self) -> bool {
        self.cascade_edges
    }

    /// Returns the removal policy matching `cascade_edges`.
    pub fn removal_policy(&self) -> RemovalPolicy {
        if self.cascade_edges {
            RemovalPolicy::CascadeEdges
        } else {
            RemovalPolicy::Keep
        }
    }
}
