//! Layout dispatcher for repositioning diagram vertices.
//!
//! A [`LayoutRequest`] names an algorithm and its options as the caller sent
//! them. The dispatcher turns it into a [`LayoutPlan`] (rejecting unknown
//! algorithms and directions), collects the [`LayoutScope`], lets the
//! selected engine compute a full [`Placement`] and only then writes the new
//! geometries back into the graph.
//!
//! # Pipeline
//!
//! ```text
//! LayoutRequest
//!     ↓ validate
//! LayoutPlan ──► EngineBuilder::engine
//!     ↓
//! LayoutScope ──► Engine::calculate ──► Placement
//!     ↓ apply
//! DiagramGraph (vertex geometries replaced)
//! ```
//!
//! Edges never receive geometry; they stay routed by the renderer.
//!
//! # Re-exports
//!
//! - [`EngineBuilder`] - Builder for creating and configuring layout engines

pub mod engines;

pub use engines::{Engine, EngineBuilder};

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Deserializer};

use drawkit_core::{
    cell::{Cell, Parent},
    geometry::{Bounds, Geometry, Point},
    graph::{DiagramGraph, GraphError},
    identifier::Id,
};

use crate::error::DrawkitError;

/// Supported layout algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Hierarchical,
    Circle,
    Organic,
    CompactTree,
    RadialTree,
    Partition,
    Stack,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Hierarchical,
        Algorithm::Circle,
        Algorithm::Organic,
        Algorithm::CompactTree,
        Algorithm::RadialTree,
        Algorithm::Partition,
        Algorithm::Stack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Hierarchical => "hierarchical",
            Algorithm::Circle => "circle",
            Algorithm::Organic => "organic",
            Algorithm::CompactTree => "compact-tree",
            Algorithm::RadialTree => "radial-tree",
            Algorithm::Partition => "partition",
            Algorithm::Stack => "stack",
        }
    }

    /// Comma separated list of every algorithm name.
    pub fn allowed() -> String {
        Self::ALL.map(Algorithm::name).join(", ")
    }
}

impl FromStr for Algorithm {
    type Err = DrawkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == s)
            .ok_or_else(|| {
                DrawkitError::Validation(format!(
                    "Unsupported layout algorithm: {s}. Supported algorithms: {}",
                    Self::allowed()
                ))
            })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flow direction of a hierarchical layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Layers stacked from top to bottom.
    #[default]
    TopDown,
    /// Layers arranged from left to right.
    LeftRight,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::TopDown => "top-down",
            Direction::LeftRight => "left-right",
        }
    }
}

impl FromStr for Direction {
    type Err = DrawkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-down" => Ok(Direction::TopDown),
            "left-right" => Ok(Direction::LeftRight),
            other => Err(DrawkitError::Validation(format!(
                "Invalid direction: {other}. Supported directions: top-down, left-right"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Options of a layout request, unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LayoutOptions {
    #[serde(default)]
    pub direction: Option<String>,
}

/// A layout request exactly as received from a caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutRequest {
    pub algorithm: String,
    #[serde(default)]
    pub options: LayoutOptions,
}

impl LayoutRequest {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            options: LayoutOptions::default(),
        }
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.options.direction = Some(direction.into());
        self
    }

    /// Checks the request and resolves it into a [`LayoutPlan`].
    ///
    /// The direction only applies to the hierarchical algorithm; other
    /// algorithms take no options and ignore it.
    ///
    /// # Errors
    ///
    /// Returns [`DrawkitError::Validation`] for an unknown algorithm or, for
    /// the hierarchical algorithm, an unknown direction.
    pub fn validate(&self, default_direction: Direction) -> Result<LayoutPlan, DrawkitError> {
        let algorithm: Algorithm = self.algorithm.parse()?;
        let direction = match (algorithm, self.options.direction.as_deref()) {
            (Algorithm::Hierarchical, Some(direction)) => direction.parse()?,
            (Algorithm::Hierarchical, None) => default_direction,
            (_, Some(direction)) => {
                debug!(algorithm:% = algorithm, direction = direction; "Ignoring direction option");
                Direction::default()
            }
            (_, None) => Direction::default(),
        };
        Ok(LayoutPlan {
            algorithm,
            direction,
        })
    }
}

/// A validated layout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutPlan {
    algorithm: Algorithm,
    direction: Direction,
}

impl LayoutPlan {
    pub fn new(algorithm: Algorithm, direction: Direction) -> Self {
        Self {
            algorithm,
            direction,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// The vertices a layout moves and the edges between them.
///
/// The scope is every vertex placed directly in the root container, in
/// graph storage order, and every edge whose endpoints are both in scope.
#[derive(Debug, Clone, Default)]
pub struct LayoutScope {
    vertices: IndexMap<Id, Geometry>,
    edges: Vec<(Id, Id)>,
}

impl LayoutScope {
    /// Collects the root-level scope of a graph.
    pub fn root(graph: &DiagramGraph) -> Self {
        let vertices: IndexMap<Id, Geometry> = graph
            .children_of(Parent::Root)
            .filter_map(|cell| cell.geometry().map(|geometry| (cell.id(), geometry)))
            .collect();
        let edges = graph
            .edges()
            .filter_map(Cell::as_edge)
            .map(|edge| (edge.source(), edge.target()))
            .filter(|(source, target)| {
                vertices.contains_key(source) && vertices.contains_key(target)
            })
            .collect();
        Self { vertices, edges }
    }

    /// Builds a scope from explicit parts. Edges leaving the scope are dropped.
    pub fn new(
        vertices: impl IntoIterator<Item = (Id, Geometry)>,
        edges: impl IntoIterator<Item = (Id, Id)>,
    ) -> Self {
        let vertices: IndexMap<Id, Geometry> = vertices.into_iter().collect();
        let edges = edges
            .into_iter()
            .filter(|(source, target)| {
                vertices.contains_key(source) && vertices.contains_key(target)
            })
            .collect();
        Self { vertices, edges }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Scoped vertices with their current geometry, in storage order.
    pub fn vertices(&self) -> impl Iterator<Item = (Id, Geometry)> + '_ {
        self.vertices.iter().map(|(id, geometry)| (*id, *geometry))
    }

    pub fn geometry(&self, id: Id) -> Option<Geometry> {
        self.vertices.get(&id).copied()
    }

    /// Position of a vertex in storage order.
    pub fn index_of(&self, id: Id) -> Option<usize> {
        self.vertices.get_index_of(&id)
    }

    pub fn edges(&self) -> &[(Id, Id)] {
        &self.edges
    }

    /// Edges as pairs of vertex indices, self loops and duplicates removed.
    pub fn index_edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .edges
            .iter()
            .filter_map(|(source, target)| {
                Some((self.index_of(*source)?, self.index_of(*target)?))
            })
            .filter(|(source, target)| source != target)
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Bounding box of the scoped vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::merge_all(self.vertices.values().map(Geometry::bounds))
    }

    /// Largest width and largest height among the scoped vertices.
    pub fn max_size(&self) -> (f64, f64) {
        self.vertices.values().fold((0.0, 0.0), |(w, h), geometry| {
            (w.max(geometry.width()), h.max(geometry.height()))
        })
    }
}

/// New geometries computed by an engine, keyed by vertex id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    geometries: IndexMap<Id, Geometry>,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: Id, geometry: Geometry) {
        self.geometries.insert(id, geometry);
    }

    pub fn get(&self, id: Id) -> Option<Geometry> {
        self.geometries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Geometry)> + '_ {
        self.geometries.iter().map(|(id, geometry)| (*id, *geometry))
    }

    /// Shifts every geometry so the placement's top-left corner lands on
    /// `anchor`.
    pub fn anchor_at(&mut self, anchor: Point) {
        let Some(bounds) = Bounds::merge_all(self.geometries.values().map(Geometry::bounds)) else {
            return;
        };
        let offset = anchor.sub_point(bounds.min_point());
        for geometry in self.geometries.values_mut() {
            *geometry = geometry.moved_to(Point::new(geometry.x(), geometry.y()).add_point(offset));
        }
    }

    /// Writes every geometry into the graph and returns how many moved.
    pub fn apply(&self, graph: &mut DiagramGraph) -> Result<usize, GraphError> {
        for (id, geometry) in self.iter() {
            graph.set_geometry(id, geometry)?;
        }
        Ok(self.len())
    }
}

/// Validates layout requests and runs the selected engine.
#[derive(Default)]
pub struct LayoutDispatcher {
    engines: EngineBuilder,
    default_direction: Direction,
}

impl LayoutDispatcher {
    /// Creates a dispatcher using the given engine configuration.
    pub fn new(engines: EngineBuilder) -> Self {
        Self {
            engines,
            default_direction: Direction::default(),
        }
    }

    /// Sets the hierarchical direction used when a request names none.
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Validates a request without running it.
    pub fn plan(&self, request: &LayoutRequest) -> Result<LayoutPlan, DrawkitError> {
        request.validate(self.default_direction)
    }

    /// Validates and applies a layout request, returning the number of
    /// vertices repositioned.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before anything is computed. Engine
    /// errors are returned before any geometry is written, so the graph is
    /// never partially laid out.
    pub fn apply(
        &mut self,
        graph: &mut DiagramGraph,
        request: &LayoutRequest,
    ) -> Result<usize, DrawkitError> {
        let plan = self.plan(request)?;
        self.apply_plan(graph, plan)
    }

    /// Applies an already validated plan.
    pub fn apply_plan(
        &mut self,
        graph: &mut DiagramGraph,
        plan: LayoutPlan,
    ) -> Result<usize, DrawkitError> {
        let scope = LayoutScope::root(graph);
        if scope.is_empty() {
            debug!(algorithm:% = plan.algorithm(); "Nothing to lay out");
            return Ok(0);
        }

        let placement = self.engines.engine(plan).calculate(&scope)?;
        let moved = placement.apply(graph)?;
        info!(
            algorithm:% = plan.algorithm(),
            direction:% = plan.direction(),
            moved = moved;
            "Layout applied"
        );
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use drawkit_core::graph::{NewEdge, NewNode};

    use super::*;

    fn sample_graph() -> DiagramGraph {
        let mut graph = DiagramGraph::new();
        for (id, x) in [("a", 0.0), ("b", 200.0), ("c", 400.0)] {
            graph.add_node(&NewNode::new(id).at(x, 0.0)).unwrap();
        }
        graph
            .add_node(&NewNode::new("inner").with_parent("a"))
            .unwrap();
        graph.link_nodes(&NewEdge::new("a", "b")).unwrap();
        graph.link_nodes(&NewEdge::new("b", "inner")).unwrap();
        graph
    }

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_unknown_algorithm_lists_allowed_set() {
        let err = LayoutRequest::new("spiral")
            .validate(Direction::TopDown)
            .unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, DrawkitError::Validation(_)));
        assert!(message.contains("spiral"));
        assert!(message.contains("hierarchical, circle, organic, compact-tree, radial-tree, partition, stack"));
    }

    #[test]
    fn test_direction_validation() {
        let plan = LayoutRequest::new("hierarchical")
            .with_direction("left-right")
            .validate(Direction::TopDown)
            .unwrap();
        assert_eq!(plan.direction(), Direction::LeftRight);

        let plan = LayoutRequest::new("hierarchical")
            .validate(Direction::LeftRight)
            .unwrap();
        assert_eq!(plan.direction(), Direction::LeftRight);

        let err = LayoutRequest::new("hierarchical")
            .with_direction("diagonal")
            .validate(Direction::TopDown)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid direction: diagonal"));

        assert!(
            LayoutRequest::new("circle")
                .with_direction("diagonal")
                .validate(Direction::TopDown)
                .is_ok()
        );
    }

    #[test]
    fn test_request_deserializes() {
        let request: LayoutRequest = serde_json::from_str(
            r#"{"algorithm": "hierarchical", "options": {"direction": "left-right"}}"#,
        )
        .unwrap();
        assert_eq!(request, LayoutRequest::new("hierarchical").with_direction("left-right"));

        let request: LayoutRequest = serde_json::from_str(r#"{"algorithm": "stack"}"#).unwrap();
        assert_eq!(request.options.direction, None);
    }

    #[test]
    fn test_scope_is_root_level_only() {
        let graph = sample_graph();
        let scope = LayoutScope::root(&graph);

        assert_eq!(scope.len(), 3);
        assert!(scope.index_of(Id::new("inner")).is_none());
        assert_eq!(scope.edges(), &[(Id::new("a"), Id::new("b"))]);
        assert_eq!(scope.index_edges(), vec![(0, 1)]);
    }

    #[test]
    fn test_invalid_direction_moves_nothing() {
        let mut graph = sample_graph();
        let before = graph.clone();
        let mut dispatcher = LayoutDispatcher::default();

        let result = dispatcher.apply(
            &mut graph,
            &LayoutRequest::new("hierarchical").with_direction("diagonal"),
        );

        assert!(matches!(result, Err(DrawkitError::Validation(_))));
        assert_eq!(graph, before);
    }

    #[test]
    fn test_empty_graph_is_a_no_op() {
        let mut graph = DiagramGraph::new();
        let mut dispatcher = LayoutDispatcher::default();

        for algorithm in Algorithm::ALL {
            let moved = dispatcher
                .apply(&mut graph, &LayoutRequest::new(algorithm.name()))
                .unwrap();
            assert_eq!(moved, 0);
        }
    }

    #[test]
    fn test_every_algorithm_moves_only_root_vertices() {
        for algorithm in Algorithm::ALL {
            let mut graph = sample_graph();
            let inner_before = graph.cell(Id::new("inner")).unwrap().geometry();
            let mut dispatcher = LayoutDispatcher::default();

            let moved = dispatcher
                .apply(&mut graph, &LayoutRequest::new(algorithm.name()))
                .unwrap();

            assert_eq!(moved, 3, "{algorithm}");
            assert_eq!(graph.cell(Id::new("inner")).unwrap().geometry(), inner_before);
            assert_eq!(graph.edge_count(), 2);
        }
    }

    #[test]
    fn test_anchor_at_moves_top_left() {
        let mut placement = Placement::new();
        placement.insert(Id::new("a"), Geometry::new(50.0, 60.0, 10.0, 10.0));
        placement.insert(Id::new("b"), Geometry::new(80.0, 40.0, 10.0, 10.0));

        placement.anchor_at(Point::new(0.0, 0.0));

        assert_eq!(placement.get(Id::new("a")), Some(Geometry::new(0.0, 20.0, 10.0, 10.0)));
        assert_eq!(placement.get(Id::new("b")), Some(Geometry::new(30.0, 0.0, 10.0, 10.0)));
    }
}
