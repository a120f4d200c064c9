//! Tree layout engines.
//!
//! Both engines work on a breadth-first spanning forest of the scope. Roots
//! are the vertices without incoming edges, in storage order, followed by
//! any vertex still unreached (cycles). Children keep storage order.

use std::{collections::VecDeque, f64::consts::PI};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::DfsPostOrder,
};

use drawkit_core::{
    geometry::{Geometry, Point},
    identifier::Id,
};

use super::{Engine, centered_at};
use crate::{
    error::DrawkitError,
    layout::{LayoutScope, Placement},
};

/// Spanning forest over the scope vertices; node `i` is scope vertex `i`.
struct SpanningForest {
    tree: DiGraph<(), ()>,
    roots: Vec<NodeIndex>,
    depth: Vec<usize>,
}

impl SpanningForest {
    fn new(scope: &LayoutScope) -> Self {
        let count = scope.len();
        let mut graph = DiGraph::<(), ()>::with_capacity(count, scope.edges().len());
        let mut tree = DiGraph::<(), ()>::with_capacity(count, count);
        for _ in 0..count {
            graph.add_node(());
            tree.add_node(());
        }
        for (source, target) in scope.index_edges() {
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        }

        let starts: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&node| {
                graph
                    .neighbors_directed(node, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .chain(graph.node_indices())
            .collect();

        let mut visited = vec![false; count];
        let mut depth = vec![0; count];
        let mut roots = Vec::new();
        for start in starts {
            if visited[start.index()] {
                continue;
            }
            visited[start.index()] = true;
            roots.push(start);

            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                let mut next: Vec<NodeIndex> = graph
                    .neighbors_directed(current, Direction::Outgoing)
                    .collect();
                next.sort_unstable();
                for child in next {
                    if !visited[child.index()] {
                        visited[child.index()] = true;
                        depth[child.index()] = depth[current.index()] + 1;
                        tree.add_edge(current, child, ());
                        queue.push_back(child);
                    }
                }
            }
        }

        Self { tree, roots, depth }
    }

    fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    fn depth(&self, node: NodeIndex) -> usize {
        self.depth[node.index()]
    }

    fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .tree
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        children.sort_unstable();
        children
    }

    /// Width of every subtree: the larger of the node's own extent and its
    /// children's extents laid side by side with `spacing` between them.
    fn subtree_extents(&self, own: impl Fn(NodeIndex) -> f64, spacing: f64) -> Vec<f64> {
        let mut extents = vec![0.0; self.tree.node_count()];
        for &root in &self.roots {
            let mut dfs = DfsPostOrder::new(&self.tree, root);
            while let Some(node) = dfs.next(&self.tree) {
                let children = self.children(node);
                let children_extent = children
                    .iter()
                    .map(|child| extents[child.index()])
                    .sum::<f64>()
                    + spacing * children.len().saturating_sub(1) as f64;
                extents[node.index()] = own(node).max(children_extent);
            }
        }
        extents
    }
}

/// Compact tree engine: each subtree is centered over its children, levels
/// are stacked top to bottom and separate trees sit side by side.
pub struct CompactTree {
    horizontal_spacing: f64,
    vertical_spacing: f64,
}

impl CompactTree {
    pub fn new() -> Self {
        Self {
            horizontal_spacing: super::DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: super::DEFAULT_VERTICAL_SPACING,
        }
    }

    /// Set the gap between siblings and between trees
    pub fn set_horizontal_spacing(&mut self, spacing: f64) -> &mut Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the gap between levels
    pub fn set_vertical_spacing(&mut self, spacing: f64) -> &mut Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Top coordinate of every level.
    fn level_tops(&self, forest: &SpanningForest, geometries: &[(Id, Geometry)]) -> Vec<f64> {
        let levels = forest.depth.iter().max().map_or(0, |deepest| deepest + 1);
        let mut heights = vec![0.0_f64; levels];
        for (index, (_, geometry)) in geometries.iter().enumerate() {
            let level = forest.depth(NodeIndex::new(index));
            heights[level] = heights[level].max(geometry.height());
        }

        let mut top = 0.0;
        heights
            .into_iter()
            .map(|height| {
                let level_top = top;
                top += height + self.vertical_spacing;
                level_top
            })
            .collect()
    }
}

impl Engine for CompactTree {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        let forest = SpanningForest::new(scope);
        let geometries: Vec<(Id, Geometry)> = scope.vertices().collect();
        let extents = forest.subtree_extents(
            |node| geometries[node.index()].1.width(),
            self.horizontal_spacing,
        );
        let level_tops = self.level_tops(&forest, &geometries);

        let mut placement = Placement::new();
        let mut cursor = 0.0;
        for &root in forest.roots() {
            let mut pending = vec![(root, cursor)];
            while let Some((node, left)) = pending.pop() {
                let (id, geometry) = geometries[node.index()];
                let extent = extents[node.index()];
                let x = left + (extent - geometry.width()) / 2.0;
                placement.insert(
                    id,
                    geometry.moved_to(Point::new(x, level_tops[forest.depth(node)])),
                );

                let children = forest.children(node);
                let children_extent = children
                    .iter()
                    .map(|child| extents[child.index()])
                    .sum::<f64>()
                    + self.horizontal_spacing * children.len().saturating_sub(1) as f64;
                let mut child_left = left + (extent - children_extent) / 2.0;
                for child in children {
                    pending.push((child, child_left));
                    child_left += extents[child.index()] + self.horizontal_spacing;
                }
            }
            cursor += extents[root.index()] + self.horizontal_spacing;
        }

        if let Some(bounds) = scope.bounds() {
            placement.anchor_at(bounds.min_point());
        }
        Ok(placement)
    }
}

/// Radial tree engine: the root sits in the middle, each level on a ring
/// around it. A subtree gets an angular sector proportional to its number
/// of leaves.
pub struct RadialTree {
    ring_spacing: f64,
    tree_spacing: f64,
}

impl RadialTree {
    pub fn new() -> Self {
        Self {
            ring_spacing: super::DEFAULT_VERTICAL_SPACING,
            tree_spacing: super::DEFAULT_HORIZONTAL_SPACING,
        }
    }

    /// Set the gap between neighbouring rings
    pub fn set_ring_spacing(&mut self, spacing: f64) -> &mut Self {
        self.ring_spacing = spacing;
        self
    }

    /// Set the gap between separate trees
    pub fn set_tree_spacing(&mut self, spacing: f64) -> &mut Self {
        self.tree_spacing = spacing;
        self
    }
}

impl Engine for RadialTree {
    fn calculate(&self, scope: &LayoutScope) -> Result<Placement, DrawkitError> {
        let forest = SpanningForest::new(scope);
        let geometries: Vec<(Id, Geometry)> = scope.vertices().collect();
        let leaves = forest.subtree_extents(|_| 1.0, 0.0);
        let (max_width, max_height) = scope.max_size();
        let max_dimension = max_width.max(max_height);
        let ring = max_dimension + self.ring_spacing;

        let mut placement = Placement::new();
        let mut cursor = 0.0;
        for &root in forest.roots() {
            // Offsets from the root, collected before the tree's extent is known
            let mut offsets = Vec::new();
            let mut deepest = 0;
            let mut pending = vec![(root, 0.0, 2.0 * PI)];
            while let Some((node, start, sweep)) = pending.pop() {
                let depth = forest.depth(node) - forest.depth(root);
                deepest = deepest.max(depth);
                let angle = start + sweep / 2.0;
                let distance = ring * depth as f64;
                offsets.push((node, Point::new(distance * angle.cos(), distance * angle.sin())));

                let mut child_start = start;
                for child in forest.children(node) {
                    let child_sweep = sweep * leaves[child.index()] / leaves[node.index()];
                    pending.push((child, child_start, child_sweep));
                    child_start += child_sweep;
                }
            }

            let radius = ring * deepest as f64 + max_dimension / 2.0;
            let center = Point::new(cursor + radius, radius);
            for (node, offset) in offsets {
                let (id, geometry) = geometries[node.index()];
                placement.insert(id, centered_at(geometry, center.add_point(offset)));
            }
            cursor += 2.0 * radius + self.tree_spacing;
        }

        if let Some(bounds) = scope.bounds() {
            placement.anchor_at(bounds.min_point());
        }
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn vertex(name: &str) -> (Id, Geometry) {
        (Id::new(name), Geometry::new(0.0, 0.0, 100.0, 40.0))
    }

    fn edge(from: &str, to: &str) -> (Id, Id) {
        (Id::new(from), Id::new(to))
    }

    /// root -> (left, right), left -> leaf, plus a separate tree `other`.
    fn forest_scope() -> LayoutScope {
        LayoutScope::new(
            ["left", "root", "right", "leaf", "other"].map(vertex),
            [
                edge("root", "left"),
                edge("root", "right"),
                edge("left", "leaf"),
            ],
        )
    }

    fn geometry(placement: &Placement, name: &str) -> Geometry {
        placement.get(Id::new(name)).unwrap()
    }

    #[test]
    fn test_spanning_forest_roots_and_depths() {
        let scope = forest_scope();
        let forest = SpanningForest::new(&scope);

        let roots: Vec<usize> = forest.roots().iter().map(|n| n.index()).collect();
        assert_eq!(roots, vec![1, 4]);
        assert_eq!(forest.depth(NodeIndex::new(3)), 2);
        assert_eq!(
            forest.children(NodeIndex::new(1)),
            vec![NodeIndex::new(0), NodeIndex::new(2)]
        );
    }

    #[test]
    fn test_cycle_picks_first_vertex_as_root() {
        let scope = LayoutScope::new(
            ["a", "b"].map(vertex),
            [edge("a", "b"), edge("b", "a")],
        );
        let forest = SpanningForest::new(&scope);

        assert_eq!(forest.roots(), &[NodeIndex::new(0)]);
        assert_eq!(forest.depth(NodeIndex::new(1)), 1);
    }

    #[test]
    fn test_compact_tree_levels() {
        let placement = CompactTree::new().calculate(&forest_scope()).unwrap();
        assert_eq!(placement.len(), 5);

        let (root, left, right, leaf) = (
            geometry(&placement, "root"),
            geometry(&placement, "left"),
            geometry(&placement, "right"),
            geometry(&placement, "leaf"),
        );
        assert!(root.y() < left.y());
        assert_eq!(left.y(), right.y());
        assert!(left.y() < leaf.y());
        assert!(left.x() < right.x());
        assert!(approx_eq!(
            f64,
            root.center().x(),
            (left.center().x() + right.center().x()) / 2.0,
            epsilon = 1e-9
        ));
        assert!(approx_eq!(f64, leaf.center().x(), left.center().x(), epsilon = 1e-9));
    }

    #[test]
    fn test_compact_tree_places_trees_side_by_side() {
        let placement = CompactTree::new().calculate(&forest_scope()).unwrap();

        let other = geometry(&placement, "other");
        let right = geometry(&placement, "right");
        assert!(other.x() >= right.x() + right.width());
        assert_eq!(other.y(), geometry(&placement, "root").y());
    }

    #[test]
    fn test_radial_tree_rings() {
        let placement = RadialTree::new().calculate(&forest_scope()).unwrap();
        assert_eq!(placement.len(), 5);

        let root = geometry(&placement, "root").center();
        let ring = 100.0 + 80.0;
        for (name, depth) in [("left", 1.0), ("right", 1.0), ("leaf", 2.0)] {
            let distance = geometry(&placement, name).center().sub_point(root).hypot();
            assert!(
                approx_eq!(f64, distance, ring * depth, epsilon = 1e-6),
                "{name} at {distance}"
            );
        }
    }

    #[test]
    fn test_radial_tree_anchored_at_scope_top_left() {
        let scope = LayoutScope::new(
            [
                (Id::new("a"), Geometry::new(300.0, 200.0, 50.0, 50.0)),
                (Id::new("b"), Geometry::new(400.0, 500.0, 50.0, 50.0)),
            ],
            [edge("a", "b")],
        );
        let placement = RadialTree::new().calculate(&scope).unwrap();

        let bounds = drawkit_core::geometry::Bounds::merge_all(
            placement.iter().map(|(_, geometry)| geometry.bounds()),
        )
        .unwrap();
        assert!(approx_eq!(f64, bounds.min_x(), 300.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, bounds.min_y(), 200.0, epsilon = 1e-9));
    }
}
