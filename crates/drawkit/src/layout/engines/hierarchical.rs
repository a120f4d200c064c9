//! Hierarchical layout engine.
//!
//! Layered drawing of the directed graph through the Sugiyama implementation
//! of `rust-sugiyama`. Each connected component comes back as its own
//! layering; components are placed side by side, the one holding the seed
//! vertex (the first vertex in storage order) first. Vertices without edges
//! are appended in a row on the first layer.

use std::{collections::HashMap, panic};

use log::debug;
use rust_sugiyama::configure::Config;

use drawkit_core::geometry::Point;

use super::{Engine, centered_at};
use crate::{
    error::DrawkitError,
    layout::{Direction, LayoutScope, Placement},
};

/// A vertex's slot in a layering: position along the layer and layer rank.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    index: usize,
    order: f64,
    rank: f64,
}

/// The Sugiyama layout engine.
pub struct Hierarchical {
    /// Horizontal spacing between vertices
    horizontal_spacing: f64,

    /// Vertical spacing between layers
    vertical_spacing: f64,

    direction: Direction,
}

impl Hierarchical {
    /// Create a new hierarchical layout engine
    pub fn new() -> Self {
        Self {
            horizontal_spacing: super::DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: super::DEFAULT_VERTICAL_SPACING,
            direction: Direction::TopDown,
        }
    }

    /// Set the horizontal spacing between vertices
    pub fn set_horizontal_spacing(&mut self, spacing: f64) -> &mut Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the vertical spacing between layers
    pub fn set_vertical_spacing(&mut self, spacing: f64) -> &mut Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Set the flow direction of the layers
    pub fn set_direction(&mut self, direction: Direction) -> &mut Self {
        self.direction = direction;
        self
    }

    /// Runs the Sugiyama layering and returns one list of slots per
    /// connected component.
    fn layered_components(&self, scope: &LayoutScope) -> Result<Vec<Vec<Slot>>, DrawkitError> {
        let edges: Vec<(u32, u32)> = scope
            .index_edges()
            .into_iter()
            .filter_map(|(source, target)| {
                Some((u32::try_from(source).ok()?, u32::try_from(target).ok()?))
            })
            .collect();
        if edges.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            node_count = scope.len(),
            edge_count = edges.len();
            "Applying Sugiyama algorithm"
        );

        let sugiyama_edges = edges.clone();
        let layouts = panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: 1.0,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&sugiyama_edges, &config)
        })
        .map_err(|err| {
            let message = if let Some(panic_msg) = err.downcast_ref::<String>() {
                format!("Rust-sugiyama layout engine panicked: {panic_msg}")
            } else if let Some(panic_msg) = err.downcast_ref::<&str>() {
                format!("Rust-sugiyama layout engine panicked: {panic_msg}")
            } else {
                "Rust-sugiyama layout engine panicked with unknown error".to_string()
            };
            DrawkitError::Layout(message)
        })?;

        if layouts.is_empty() {
            return Err(DrawkitError::Layout(
                "Rust-sugiyama returned empty layout results".to_string(),
            ));
        }

        Ok(layouts
            .iter()
            .filter(|(coords, _, _)| !coords.is_empty())
            .map(|(coords, _, _)| normalize_component(coords, &edges))
            .collect())
    }

    /// Center of the grid cell at `order` along the layer and layer `rank`.
    fn grid_center(&self, order: f64, rank: f64, cell_width: f64, cell_height: f64) -> Point {
        let cell = match self.direction {
            Direction::TopDown => Point::new(order, rank),
            Direction::LeftRight => Point::new(order, rank).transpose(),
        };
        Point::new(
            cell.x() * (cell_width + self.horizontal_spacing) + cell_width / 2.0,
            cell.y() * (cell_height + self.vertical_spacing) + cell_height / 2.0,
        )
    }
}

/// Converts raw coordinates into slots with layer ranks counted from 0 and
/// orders shifted to start at 0.
///
/// Ranks are flipped when needed so that edges point down the layers.
fn normalize_component(coords: &[(usize, (f64, f64))], edges: &[(u32, u32)]) -> Vec<Slot> {
    const EPSILON: f64 = 1e-6;

    let mut layers: Vec<f64> = coords.iter().map(|&(_, (_, y))| y).collect();
    layers.sort_by(f64::total_cmp);
    layers.dedup_by(|a, b| (*a - *b).abs() < EPSILON);

    let min_x = coords
        .iter()
        .map(|&(_, (x, _))| x)
        .fold(f64::INFINITY, f64::min);

    let mut slots: Vec<Slot> = coords
        .iter()
        .map(|&(index, (x, y))| Slot {
            index,
            order: x - min_x,
            rank: layers
                .iter()
                .position(|&layer| (layer - y).abs() < EPSILON)
                .unwrap_or_default() as f64,
        })
        .collect();

    let ranks: HashMap<usize, f64> = slots.iter().map(|slot| (slot.index, slot.rank)).collect();
    let downward: f64 = edges
        .iter()
        .filter_map(|&(source, target)| {
            Some(ranks.get(&(target as usize))? - ranks.get(&(source as usize))?)
        })
        .sum();
    if downward < 0.0 {
        let last_rank = layers.len().saturating_sub(1) as f64;
        for slot in &mut slots {
            slot.rank = last_rank - slot.rank;
        }
    }

    slots
}

impl Engine for Hierarchical {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        let vertices: Vec<_> = scope.vertices().collect();
        let (cell_width, cell_height) = scope.max_size();

        let mut components = self.layered_components(scope)?;
        if let Some(seed_component) = components
            .iter()
            .position(|slots| slots.iter().any(|slot| slot.index == 0))
        {
            let seeded = components.remove(seed_component);
            components.insert(0, seeded);
        }

        let mut placement = Placement::new();
        let mut order_offset = 0.0;
        for slots in &components {
            let mut span: f64 = 0.0;
            for slot in slots {
                let Some(&(id, geometry)) = vertices.get(slot.index) else {
                    debug!(index = slot.index; "Sugiyama returned an unknown vertex index");
                    continue;
                };
                let center =
                    self.grid_center(order_offset + slot.order, slot.rank, cell_width, cell_height);
                placement.insert(id, centered_at(geometry, center));
                span = span.max(slot.order);
            }
            order_offset += span.ceil() + 1.0;
        }

        for &(id, geometry) in &vertices {
            if placement.get(id).is_none() {
                let center = self.grid_center(order_offset, 0.0, cell_width, cell_height);
                placement.insert(id, centered_at(geometry, center));
                order_offset += 1.0;
            }
        }

        if placement.len() != vertices.len() {
            return Err(DrawkitError::Layout(
                "Failed to map rust-sugiyama positions back to every vertex".to_string(),
            ));
        }

        if let Some(bounds) = scope.bounds() {
            placement.anchor_at(bounds.min_point());
        }
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use drawkit_core::{geometry::Geometry, identifier::Id};
    use float_cmp::approx_eq;

    use super::*;

    fn chain_scope() -> LayoutScope {
        LayoutScope::new(
            [
                (Id::new("a"), Geometry::new(300.0, 300.0, 120.0, 60.0)),
                (Id::new("b"), Geometry::new(10.0, 10.0, 120.0, 60.0)),
                (Id::new("c"), Geometry::new(500.0, 10.0, 120.0, 60.0)),
                (Id::new("lonely"), Geometry::new(40.0, 40.0, 80.0, 80.0)),
            ],
            [
                (Id::new("a"), Id::new("b")),
                (Id::new("b"), Id::new("c")),
            ],
        )
    }

    fn center_of(placement: &Placement, id: &str) -> Point {
        placement.get(Id::new(id)).unwrap().center()
    }

    #[test]
    fn test_top_down_layers() {
        let placement = Hierarchical::new().calculate(&chain_scope()).unwrap();

        assert_eq!(placement.len(), 4);
        let (a, b, c) = (
            center_of(&placement, "a"),
            center_of(&placement, "b"),
            center_of(&placement, "c"),
        );
        assert!(a.y() < b.y(), "{a:?} should be above {b:?}");
        assert!(b.y() < c.y(), "{b:?} should be above {c:?}");
    }

    #[test]
    fn test_left_right_layers() {
        let mut engine = Hierarchical::new();
        engine.set_direction(Direction::LeftRight);
        let placement = engine.calculate(&chain_scope()).unwrap();

        let (a, b, c) = (
            center_of(&placement, "a"),
            center_of(&placement, "b"),
            center_of(&placement, "c"),
        );
        assert!(a.x() < b.x());
        assert!(b.x() < c.x());
    }

    #[test]
    fn test_anchored_at_scope_top_left() {
        let scope = chain_scope();
        let placement = Hierarchical::new().calculate(&scope).unwrap();

        let bounds = drawkit_core::geometry::Bounds::merge_all(
            placement.iter().map(|(_, geometry)| geometry.bounds()),
        )
        .unwrap();
        let anchor = scope.bounds().unwrap().min_point();
        assert!(approx_eq!(f64, bounds.min_x(), anchor.x(), epsilon = 1e-9));
        assert!(approx_eq!(f64, bounds.min_y(), anchor.y(), epsilon = 1e-9));
    }

    #[test]
    fn test_without_edges_vertices_form_a_row() {
        let scope = LayoutScope::new(
            [
                (Id::new("a"), Geometry::new(0.0, 100.0, 120.0, 60.0)),
                (Id::new("b"), Geometry::new(0.0, 0.0, 120.0, 60.0)),
            ],
            [],
        );
        let placement = Hierarchical::new().calculate(&scope).unwrap();

        let (a, b) = (center_of(&placement, "a"), center_of(&placement, "b"));
        assert_eq!(a.y(), b.y());
        assert!(a.x() < b.x());
    }
}
