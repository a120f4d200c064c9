//! Force-directed layout engine
//!
//! Vertices repel each other, edges act as springs. Starting positions sit on
//! a grid with a seeded jitter, so the same graph and seed always produce
//! the same drawing.

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};

use drawkit_core::geometry::Point;

use super::{Engine, centered_at};
use crate::{
    error::DrawkitError,
    layout::{LayoutScope, Placement},
};

/// Force layout engine for organic drawings
///
/// This engine implements a simple physics simulation: every pair of
/// vertices pushes apart, every edge pulls its endpoints together, and the
/// velocities are damped after each step.
pub struct Organic {
    // Simulation parameters
    iterations: usize,
    spring_constant: f64,
    repulsion_constant: f64,
    damping_factor: f64,
    // Used for maintaining distance between vertices
    min_distance: f64,
    seed: u64,
}

impl Organic {
    /// Create a new organic layout engine
    pub fn new() -> Self {
        Self {
            iterations: super::DEFAULT_ORGANIC_ITERATIONS,
            spring_constant: 0.1,
            repulsion_constant: 1000.0,
            damping_factor: 0.85,
            min_distance: 80.0,
            seed: super::DEFAULT_SEED,
        }
    }

    /// Set the number of iterations for the force simulation
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Set the minimum distance between vertices
    pub fn set_min_distance(&mut self, distance: f64) -> &mut Self {
        self.min_distance = distance;
        self
    }

    /// Set the seed of the initial jitter
    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Initialize jittered grid positions for the vertices
    fn initialize_positions(&self, count: usize) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let grid_size = (count as f64).sqrt().ceil().max(1.0) as usize;
        let cell_size = self.min_distance * 1.5;

        (0..count)
            .map(|i| {
                let row = i / grid_size;
                let col = i % grid_size;

                let base = Point::new(col as f64 * cell_size, row as f64 * cell_size);

                // Avoid perfect grid alignment
                let jitter =
                    Point::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0));

                base.add_point(jitter)
            })
            .collect()
    }

    /// Run the force simulation and return the center of every vertex, in
    /// scope order.
    fn run_force_simulation(&self, scope: &LayoutScope) -> Vec<Point> {
        let sizes: Vec<(f64, f64)> = scope
            .vertices()
            .map(|(_, geometry)| (geometry.width(), geometry.height()))
            .collect();
        let edges = scope.index_edges();

        let mut positions = self.initialize_positions(sizes.len());
        let mut velocities = vec![Point::default(); sizes.len()];
        // Displacement per step is capped so close pairs cannot fling each other away
        let max_step = self.min_distance.max(1.0);

        for _ in 0..self.iterations {
            let mut forces = vec![Point::default(); sizes.len()];

            // Repulsive forces between all vertices
            for i in 0..positions.len() {
                for j in 0..positions.len() {
                    if i == j {
                        continue;
                    }

                    let trans = positions[i].sub_point(positions[j]);
                    let (wi, hi) = sizes[i];
                    let (wj, hj) = sizes[j];

                    let min_dist = (wi + wj + hi + hj) / 4.0 + self.min_distance;

                    // Avoid division by zero
                    let distance = trans.hypot().max(1.0);

                    // Stronger repulsion when vertices are too close
                    let force_factor = if distance < min_dist {
                        self.repulsion_constant * (min_dist / distance).powi(2)
                    } else {
                        self.repulsion_constant / distance
                    };

                    forces[i] = forces[i].add_point(trans.scale(force_factor / distance));
                }
            }

            // Spring forces between connected vertices
            for &(source, target) in &edges {
                // Proportional to distance
                let pull = positions[source]
                    .sub_point(positions[target])
                    .scale(self.spring_constant);

                forces[source] = forces[source].sub_point(pull);
                forces[target] = forces[target].add_point(pull);
            }

            for ((position, velocity), force) in
                positions.iter_mut().zip(velocities.iter_mut()).zip(&forces)
            {
                let mut next = velocity.add_point(*force).scale(self.damping_factor);
                let speed = next.hypot();
                if speed > max_step {
                    next = next.scale(max_step / speed);
                }
                *velocity = next;
                *position = position.add_point(next);
            }
        }

        positions
    }
}

impl Engine for Organic {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        debug!(
            node_count = scope.len(),
            iterations = self.iterations;
            "Running force simulation"
        );

        let centers = self.run_force_simulation(scope);

        let mut placement = Placement::new();
        for ((id, geometry), center) in scope.vertices().zip(centers) {
            if !center.x().is_finite() || !center.y().is_finite() {
                return Err(DrawkitError::Layout(format!(
                    "Force simulation diverged for vertex {id}"
                )));
            }
            placement.insert(id, centered_at(geometry, center));
        }

        if let Some(bounds) = scope.bounds() {
            placement.anchor_at(bounds.min_point());
        }
        Ok(placement)
    }
}
