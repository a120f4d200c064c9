//! Diagram graph: an id-keyed store of cells and the operations that mutate it.
//!
//! Cells live in an insertion-ordered map so that serialization order is
//! stable: a cell keeps its position when it is overwritten, and removal
//! preserves the order of the remaining cells.
//!
//! # Identity rules
//!
//! - Vertex ids are caller supplied. Adding a vertex under an existing id
//!   overwrites the stored cell (last write wins).
//! - Edge ids are derived from their endpoints (`{from}-2-{to}`), so linking
//!   the same pair again updates the existing edge.
//! - Removing a vertex does not remove the edges attached to it unless the
//!   caller asks for [`RemovalPolicy::CascadeEdges`].

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cell::{Cell, Edge, Parent, Vertex},
    geometry::{Bounds, Geometry},
    identifier::Id,
    kind::{KindParams, ShapeKind},
    style::{Style, StyleSource},
};

/// Parent name designating the implicit root container.
pub const ROOT_PARENT: &str = "root";

/// Id of the structural model root cell written ahead of every diagram.
pub const MODEL_ROOT_ID: &str = "0";
/// Id of the default layer that root-level cells belong to.
pub const DEFAULT_PARENT_ID: &str = "1";

/// Position used when a new vertex omits `x` or `y`.
pub const DEFAULT_POSITION: f64 = 10.0;

/// Errors raised by graph mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("id '{0}' is reserved for the diagram's structural cells")]
    ReservedId(String),

    #[error("Parent node not found: {0}")]
    ParentNotFound(String),

    #[error("parent '{0}' is an edge and cannot contain nodes")]
    InvalidParent(String),

    #[error("field '{field}' only applies to nodes, but '{id}' is an edge")]
    NotAVertex { id: String, field: &'static str },
}

/// Request to create a vertex.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewNode {
    pub id: String,
    #[serde(default, alias = "title")]
    pub label: Option<String>,
    /// Containing vertex id; `None` or `"root"` selects the root container.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub kind: ShapeKind,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// Explicit style entries layered over the kind defaults.
    #[serde(default)]
    pub style: Option<StyleSource>,
    #[serde(default, flatten)]
    pub params: KindParams,
}

impl NewNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, style: impl Into<StyleSource>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.params.corner_radius = Some(radius);
        self
    }
}

/// Request to change an existing cell. Omitted fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeEdit {
    pub id: String,
    #[serde(default, alias = "title")]
    pub label: Option<String>,
    /// Replaces the whole style with the kind's default style.
    #[serde(default)]
    pub kind: Option<ShapeKind>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, flatten)]
    pub params: KindParams,
}

impl NodeEdit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.params.corner_radius = Some(radius);
        self
    }

    fn touches_geometry(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.width.is_some() || self.height.is_some()
    }

    /// First requested field that edges do not support.
    fn vertex_only_field(&self) -> Option<&'static str> {
        if self.kind.is_some() {
            Some("kind")
        } else if self.params.corner_radius.is_some() {
            Some("corner_radius")
        } else if self.touches_geometry() {
            Some("geometry")
        } else {
            None
        }
    }
}

/// Request to connect two cells.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewEdge {
    pub from: String,
    pub to: String,
    #[serde(default, alias = "title")]
    pub label: Option<String>,
    #[serde(default)]
    pub style: Option<StyleSource>,
    #[serde(default)]
    pub dashed: bool,
    #[serde(default)]
    pub reverse: bool,
}

impl NewEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<StyleSource>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// What happens to edges attached to a removed vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalPolicy {
    /// Leave attached edges in place; they may dangle afterwards.
    #[default]
    Keep,
    /// Remove every edge whose source or target is removed.
    CascadeEdges,
}

/// Default style of a new edge, before caller overrides.
fn default_edge_style() -> Style {
    Style::new()
        .with("edgeStyle", "none")
        .with("noEdgeStyle", 1)
        .with("orthogonal", 1)
        .with("html", 1)
}

/// All cells of a diagram, keyed by id, in insertion order.
///
/// The implicit root container is not stored; vertices refer to it through
/// [`Parent::Root`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramGraph {
    cells: IndexMap<Id, Cell>,
}

impl DiagramGraph {
    /// Creates an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells (vertices and edges).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: Id) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.cells.contains_key(&id)
    }

    /// All cells in storage order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().filter(|cell| cell.is_vertex())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().filter(|cell| cell.is_edge())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Vertices directly contained in `parent`.
    pub fn children_of(&self, parent: Parent) -> impl Iterator<Item = &Cell> {
        self.vertices().filter(move |cell| cell.parent() == parent)
    }

    /// Edges whose source or target no longer exists.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Cell> {
        self.edges().filter(|cell| {
            cell.as_edge().is_some_and(|edge| {
                !self.contains(edge.source()) || !self.contains(edge.target())
            })
        })
    }

    /// Bounding box of the vertices placed directly in the root container.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::merge_all(
            self.children_of(Parent::Root)
                .filter_map(Cell::geometry)
                .map(|geometry| geometry.bounds()),
        )
    }

    /// Stores a cell as is, replacing any cell with the same id.
    ///
    /// This is the raw insertion used when rebuilding a graph from a
    /// document; it performs no validation.
    pub fn insert(&mut self, cell: Cell) -> Option<Cell> {
        self.cells.insert(cell.id(), cell)
    }

    /// Replaces the geometry of a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] for an unknown id and
    /// [`GraphError::NotAVertex`] for an edge.
    pub fn set_geometry(&mut self, id: Id, geometry: Geometry) -> Result<(), GraphError> {
        let cell = self
            .cells
            .get_mut(&id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))?;
        let vertex = cell.vertex_mut().ok_or_else(|| GraphError::NotAVertex {
            id: id.to_string(),
            field: "geometry",
        })?;
        vertex.set_geometry(geometry);
        Ok(())
    }

    /// Adds a vertex built from its kind's archetype.
    ///
    /// The style is the archetype default, then kind adjustments (corner
    /// radius), then the caller's explicit entries. Omitted geometry fields
    /// fall back to `(10, 10)` and the archetype size.
    ///
    /// # Errors
    ///
    /// - [`GraphError::MissingField`] when the id is empty
    /// - [`GraphError::ReservedId`] when the id is `"0"` or `"1"`
    /// - [`GraphError::ParentNotFound`] when a non-root parent does not exist
    /// - [`GraphError::InvalidParent`] when the parent is an edge
    pub fn add_node(&mut self, node: &NewNode) -> Result<&Cell, GraphError> {
        if node.id.is_empty() {
            return Err(GraphError::MissingField("id"));
        }
        if is_reserved_id(&node.id) {
            return Err(GraphError::ReservedId(node.id.clone()));
        }
        let id = Id::new(&node.id);
        let parent = self.resolve_parent(node.parent.as_deref())?;

        let archetype = node.kind.archetype();
        let mut style = node.kind.default_style();
        if let Some(adjustments) = node.kind.adjustments(&node.params) {
            style.merge(&adjustments);
        }
        if let Some(overrides) = &node.style {
            style.merge(&overrides.to_style());
        }

        let geometry = Geometry::new(
            node.x.unwrap_or(DEFAULT_POSITION),
            node.y.unwrap_or(DEFAULT_POSITION),
            node.width.unwrap_or(archetype.width),
            node.height.unwrap_or(archetype.height),
        );

        if self.cells.contains_key(&id) {
            warn!(id:% = id; "Overwriting existing cell with new node");
        }

        let cell = Cell::vertex(
            id,
            node.label.clone(),
            style.stringify(),
            Vertex::new(Some(node.kind), geometry, parent),
        );
        let (index, _) = self.cells.insert_full(id, cell);
        debug!(id:% = id, kind:% = node.kind; "Node added");

        Ok(&self.cells[index])
    }

    /// Edits an existing node or edge.
    ///
    /// Steps, in order:
    /// 1. a non-empty label replaces the current one;
    /// 2. a kind replaces the **entire** style with that kind's default,
    ///    discarding any custom entries;
    /// 3. for a rounded rectangle (given kind, or the cell's own kind) a
    ///    corner radius is layered on top of the current style;
    /// 4. any of `x`/`y`/`width`/`height` builds a fresh geometry, omitted
    ///    fields copied from the current one.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NotFound`] when the id does not resolve; the graph is
    ///   left unchanged
    /// - [`GraphError::NotAVertex`] when node-only fields target an edge
    pub fn edit_node(&mut self, edit: &NodeEdit) -> Result<&Cell, GraphError> {
        if edit.id.is_empty() {
            return Err(GraphError::MissingField("id"));
        }
        let id = Id::new(&edit.id);
        let cell = self
            .cells
            .get_mut(&id)
            .ok_or_else(|| GraphError::NotFound(edit.id.clone()))?;

        if cell.is_edge()
            && let Some(field) = edit.vertex_only_field()
        {
            return Err(GraphError::NotAVertex {
                id: edit.id.clone(),
                field,
            });
        }

        if let Some(label) = edit.label.as_deref().filter(|label| !label.is_empty()) {
            cell.set_label(label);
        }

        if let Some(kind) = edit.kind {
            trace!(id:% = id, kind:% = kind; "Replacing style with kind default");
            cell.set_style(kind.archetype().style);
            if let Some(vertex) = cell.vertex_mut() {
                vertex.set_kind(kind);
            }
        }

        let resolved_kind = edit.kind.or_else(|| cell.kind());
        if let Some(adjustments) = resolved_kind.and_then(|kind| kind.adjustments(&edit.params)) {
            let style = cell.parsed_style().merged(&adjustments);
            cell.set_style(style.stringify());
        }

        if edit.touches_geometry()
            && let Some(vertex) = cell.vertex_mut()
        {
            let geometry =
                vertex
                    .geometry()
                    .with_overrides(edit.x, edit.y, edit.width, edit.height);
            vertex.set_geometry(geometry);
        }

        debug!(id:% = id; "Node edited");
        Ok(&*cell)
    }

    /// Connects two existing cells and returns the edge id.
    ///
    /// The edge id is `{from}-2-{to}`; linking the same pair again replaces
    /// the earlier edge's label and style under the same id.
    ///
    /// # Errors
    ///
    /// - [`GraphError::MissingField`] for an empty `from` or `to`
    /// - [`GraphError::NotFound`] when an endpoint does not exist
    pub fn link_nodes(&mut self, link: &NewEdge) -> Result<Id, GraphError> {
        if link.from.is_empty() {
            return Err(GraphError::MissingField("from"));
        }
        if link.to.is_empty() {
            return Err(GraphError::MissingField("to"));
        }

        let from = Id::new(&link.from);
        let to = Id::new(&link.to);
        for (name, endpoint) in [(&link.from, from), (&link.to, to)] {
            if !self.cells.contains_key(&endpoint) {
                return Err(GraphError::NotFound(name.clone()));
            }
        }

        let mut style = default_edge_style();
        if link.dashed {
            style.insert("dashed", 1);
        }
        if link.reverse {
            style.insert("reverse", true);
        }
        if let Some(overrides) = &link.style {
            style.merge(&overrides.to_style());
        }

        let id = Id::edge_between(from, to);
        let label = link.label.clone().filter(|label| !label.is_empty());
        let previous = self.cells.insert(
            id,
            Cell::edge(id, label, style.stringify(), Edge::new(from, to)),
        );
        debug!(id:% = id, replaced = previous.is_some(); "Nodes linked");

        Ok(id)
    }

    /// Removes the given cells in one batch and returns the removed ids in
    /// storage order.
    ///
    /// Ids that do not resolve are skipped. Vertices nested inside a removed
    /// vertex go with it. Edges attached to removed vertices stay unless
    /// `policy` is [`RemovalPolicy::CascadeEdges`].
    pub fn remove_nodes<S: AsRef<str>>(&mut self, ids: &[S], policy: RemovalPolicy) -> Vec<Id> {
        let mut doomed: HashSet<Id> = HashSet::new();
        for name in ids {
            let id = Id::new(name.as_ref());
            if self.cells.contains_key(&id) {
                doomed.insert(id);
            } else {
                debug!(id = name.as_ref(); "Skipping removal of unknown cell");
            }
        }

        loop {
            let nested: Vec<Id> = self
                .vertices()
                .filter(|cell| !doomed.contains(&cell.id()))
                .filter(|cell| matches!(cell.parent(), Parent::Cell(parent) if doomed.contains(&parent)))
                .map(Cell::id)
                .collect();
            if nested.is_empty() {
                break;
            }
            doomed.extend(nested);
        }

        if policy == RemovalPolicy::CascadeEdges {
            let attached: Vec<Id> = self
                .edges()
                .filter(|cell| {
                    cell.as_edge().is_some_and(|edge| {
                        doomed.contains(&edge.source()) || doomed.contains(&edge.target())
                    })
                })
                .map(Cell::id)
                .collect();
            doomed.extend(attached);
        }

        let removed: Vec<Id> = self
            .cells
            .keys()
            .copied()
            .filter(|id| doomed.contains(id))
            .collect();
        self.cells.retain(|id, _| !doomed.contains(id));
        debug!(removed_count = removed.len(); "Cells removed");

        removed
    }

    fn resolve_parent(&self, parent: Option<&str>) -> Result<Parent, GraphError> {
        let name = match parent {
            None | Some("") | Some(ROOT_PARENT) => return Ok(Parent::Root),
            Some(name) => name,
        };
        let id = Id::new(name);
        match self.cells.get(&id) {
            Some(cell) if cell.is_vertex() => Ok(Parent::Cell(id)),
            Some(_) => Err(GraphError::InvalidParent(name.to_string())),
            None => Err(GraphError::ParentNotFound(name.to_string())),
        }
    }
}

/// Whether `id` names one of the structural cells every serialized diagram
/// starts with.
pub fn is_reserved_id(id: &str) -> bool {
    id == MODEL_ROOT_ID || id == DEFAULT_PARENT_ID
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn two_linked_nodes() -> DiagramGraph {
        let mut graph = DiagramGraph::new();
        graph.add_node(&NewNode::new("a").at(0.0, 0.0)).unwrap();
        graph.add_node(&NewNode::new("b").at(200.0, 0.0)).unwrap();
        graph.link_nodes(&NewEdge::new("a", "b")).unwrap();
        graph
    }

    #[test]
    fn test_add_node_uses_archetype_defaults() {
        let mut graph = DiagramGraph::new();
        let cell = graph
            .add_node(&NewNode::new("n1").with_label("Hello\nWorld"))
            .unwrap();

        assert_eq!(cell.style(), "rounded=1;whiteSpace=wrap;html=1;");
        assert_eq!(cell.label(), Some("Hello\nWorld"));
        assert_eq!(cell.geometry(), Some(Geometry::new(10.0, 10.0, 120.0, 60.0)));
        assert_eq!(cell.parent(), Parent::Root);
        assert_eq!(cell.kind(), Some(ShapeKind::Rectangle));
    }

    #[test]
    fn test_add_node_overrides() {
        let mut graph = DiagramGraph::new();
        let cell = graph
            .add_node(
                &NewNode::new("db")
                    .with_kind(ShapeKind::Cylinder)
                    .at(-5.0, 7.5)
                    .with_size(90.0, 100.0)
                    .with_style("size=20;fillColor=#dae8fc"),
            )
            .unwrap();

        assert_eq!(
            cell.style(),
            "shape=cylinder3;whiteSpace=wrap;html=1;boundedLbl=1;backgroundOutline=1;size=20;fillColor=#dae8fc;"
        );
        assert_eq!(cell.geometry(), Some(Geometry::new(-5.0, 7.5, 90.0, 100.0)));
    }

    #[test]
    fn test_add_rounded_rectangle_with_corner_radius() {
        let mut graph = DiagramGraph::new();
        let cell = graph
            .add_node(
                &NewNode::new("n1")
                    .with_kind(ShapeKind::RoundedRectangle)
                    .with_corner_radius(5.0),
            )
            .unwrap();
        assert_eq!(cell.parsed_style().get_str("arcSize").as_deref(), Some("10"));
        assert_eq!(
            cell.parsed_style().get_str("absoluteArcSize").as_deref(),
            Some("1")
        );

        let cell = graph
            .add_node(
                &NewNode::new("n2")
                    .with_kind(ShapeKind::RoundedRectangle)
                    .with_corner_radius(0.0),
            )
            .unwrap();
        assert_eq!(cell.parsed_style().get_str("arcSize").as_deref(), Some("24"));
    }

    #[test]
    fn test_add_node_duplicate_id_overwrites_in_place() {
        let mut graph = two_linked_nodes();
        graph
            .add_node(&NewNode::new("a").with_kind(ShapeKind::Circle))
            .unwrap();

        assert_eq!(graph.len(), 3);
        let first = graph.cells().next().unwrap();
        assert_eq!(first.id(), "a");
        assert_eq!(first.kind(), Some(ShapeKind::Circle));
    }

    #[test]
    fn test_add_node_into_parent() {
        let mut graph = DiagramGraph::new();
        graph.add_node(&NewNode::new("group")).unwrap();
        let cell = graph
            .add_node(&NewNode::new("child").with_parent("group"))
            .unwrap();
        assert_eq!(cell.parent(), Parent::Cell(Id::new("group")));
        assert_eq!(graph.children_of(Parent::Cell(Id::new("group"))).count(), 1);

        let err = graph
            .add_node(&NewNode::new("orphan").with_parent("missing"))
            .unwrap_err();
        assert_eq!(err, GraphError::ParentNotFound("missing".to_string()));
        assert!(!graph.contains(Id::new("orphan")));
    }

    #[test]
    fn test_add_node_requires_id() {
        let mut graph = DiagramGraph::new();
        assert_eq!(
            graph.add_node(&NewNode::default()).unwrap_err(),
            GraphError::MissingField("id")
        );
    }

    #[test]
    fn test_edit_missing_node_leaves_graph_unchanged() {
        let mut graph = two_linked_nodes();
        let before = graph.clone();

        let err = graph
            .edit_node(&NodeEdit::new("missing-id").with_label("x"))
            .unwrap_err();

        assert_eq!(err, GraphError::NotFound("missing-id".to_string()));
        assert_eq!(graph, before);
    }

    #[test]
    fn test_edit_kind_replaces_custom_style() {
        let mut graph = DiagramGraph::new();
        graph
            .add_node(&NewNode::new("n").with_style("fillColor=#f00"))
            .unwrap();

        let cell = graph
            .edit_node(&NodeEdit::new("n").with_kind(ShapeKind::Ellipse))
            .unwrap();

        assert_eq!(cell.style(), "ellipse;whiteSpace=wrap;html=1;");
        assert_eq!(cell.kind(), Some(ShapeKind::Ellipse));
    }

    #[test]
    fn test_edit_corner_radius_keeps_current_style() {
        let mut graph = DiagramGraph::new();
        graph
            .add_node(
                &NewNode::new("n")
                    .with_kind(ShapeKind::RoundedRectangle)
                    .with_style("fillColor=#f00"),
            )
            .unwrap();

        let cell = graph
            .edit_node(&NodeEdit::new("n").with_corner_radius(8.0))
            .unwrap();

        let style = cell.parsed_style();
        assert_eq!(style.get_str("fillColor").as_deref(), Some("#f00"));
        assert_eq!(style.get_str("arcSize").as_deref(), Some("16"));
    }

    #[test]
    fn test_edit_corner_radius_ignored_for_other_kinds() {
        let mut graph = DiagramGraph::new();
        graph.add_node(&NewNode::new("n")).unwrap();

        let cell = graph
            .edit_node(&NodeEdit::new("n").with_corner_radius(8.0))
            .unwrap();
        assert!(!cell.parsed_style().contains_key("arcSize"));
    }

    #[test]
    fn test_edit_geometry_falls_back_per_field() {
        let mut graph = DiagramGraph::new();
        graph
            .add_node(&NewNode::new("n").at(1.0, 2.0).with_size(3.0, 4.0))
            .unwrap();

        let mut edit = NodeEdit::new("n");
        edit.y = Some(20.0);
        edit.width = Some(30.0);
        let geometry = graph.edit_node(&edit).unwrap().geometry().unwrap();

        assert!(approx_eq!(f64, geometry.x(), 1.0));
        assert!(approx_eq!(f64, geometry.y(), 20.0));
        assert!(approx_eq!(f64, geometry.width(), 30.0));
        assert!(approx_eq!(f64, geometry.height(), 4.0));
    }

    #[test]
    fn test_edit_empty_label_is_ignored() {
        let mut graph = DiagramGraph::new();
        graph
            .add_node(&NewNode::new("n").with_label("keep"))
            .unwrap();

        let cell = graph.edit_node(&NodeEdit::new("n").with_label("")).unwrap();
        assert_eq!(cell.label(), Some("keep"));
    }

    #[test]
    fn test_edit_edge_label_but_not_geometry() {
        let mut graph = two_linked_nodes();

        let cell = graph
            .edit_node(&NodeEdit::new("a-2-b").with_label("calls"))
            .unwrap();
        assert_eq!(cell.label(), Some("calls"));

        let err = graph
            .edit_node(&NodeEdit::new("a-2-b").with_position(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, GraphError::NotAVertex { field: "geometry", .. }));
    }

    #[test]
    fn test_link_nodes_default_style_and_id() {
        let mut graph = two_linked_nodes();
        let edge = graph.cell(Id::new("a-2-b")).unwrap();

        assert_eq!(edge.style(), "edgeStyle=none;noEdgeStyle=1;orthogonal=1;html=1;");
        assert_eq!(edge.label(), None);
        let endpoints = edge.as_edge().unwrap();
        assert_eq!(endpoints.source(), "a");
        assert_eq!(endpoints.target(), "b");

        let id = graph
            .link_nodes(&NewEdge::new("a", "b").dashed().reversed().with_label("uses"))
            .unwrap();
        assert_eq!(id, "a-2-b");
        assert_eq!(graph.edge_count(), 1);

        let edge = graph.cell(id).unwrap();
        assert_eq!(edge.label(), Some("uses"));
        assert_eq!(
            edge.style(),
            "edgeStyle=none;noEdgeStyle=1;orthogonal=1;html=1;dashed=1;reverse=true;"
        );
    }

    #[test]
    fn test_link_nodes_style_overrides() {
        let mut graph = two_linked_nodes();
        let style = Style::new().with("edgeStyle", "orthogonalEdgeStyle");
        let id = graph
            .link_nodes(&NewEdge::new("b", "a").with_style(style))
            .unwrap();

        assert_eq!(id, "b-2-a");
        assert!(graph.cell(id).unwrap().style().starts_with("edgeStyle=orthogonalEdgeStyle;"));
    }

    #[test]
    fn test_link_nodes_missing_endpoint() {
        let mut graph = two_linked_nodes();
        let err = graph.link_nodes(&NewEdge::new("a", "ghost")).unwrap_err();

        assert_eq!(err, GraphError::NotFound("ghost".to_string()));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_edge_keeps_nodes() {
        let mut graph = two_linked_nodes();
        let removed = graph.remove_nodes(&["a-2-b"], RemovalPolicy::Keep);

        assert_eq!(removed, vec![Id::new("a-2-b")]);
        assert!(graph.contains(Id::new("a")));
        assert!(graph.contains(Id::new("b")));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_remove_node_leaves_dangling_edge() {
        let mut graph = two_linked_nodes();
        graph.remove_nodes(&["a", "unknown"], RemovalPolicy::Keep);

        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dangling_edges().count(), 1);
    }

    #[test]
    fn test_remove_node_cascade_edges() {
        let mut graph = two_linked_nodes();
        let removed = graph.remove_nodes(&["b"], RemovalPolicy::CascadeEdges);

        assert_eq!(removed, vec![Id::new("b"), Id::new("a-2-b")]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_remove_container_takes_nested_nodes() {
        let mut graph = DiagramGraph::new();
        graph.add_node(&NewNode::new("outer")).unwrap();
        graph
            .add_node(&NewNode::new("inner").with_parent("outer"))
            .unwrap();
        graph
            .add_node(&NewNode::new("deepest").with_parent("inner"))
            .unwrap();
        graph.add_node(&NewNode::new("other")).unwrap();

        let removed = graph.remove_nodes(&["outer"], RemovalPolicy::Keep);

        assert_eq!(removed.len(), 3);
        assert_eq!(graph.len(), 1);
        assert!(graph.contains(Id::new("other")));
    }

    #[test]
    fn test_add_node_rejects_structural_ids() {
        let mut graph = DiagramGraph::new();

        for id in [MODEL_ROOT_ID, DEFAULT_PARENT_ID] {
            let err = graph.add_node(&NewNode::new(id)).unwrap_err();
            assert_eq!(err, GraphError::ReservedId(id.to_string()));
        }
        assert!(graph.is_empty());

        graph.add_node(&NewNode::new("10")).unwrap();
        assert!(graph.contains(Id::new("10")));
    }

    #[test]
    fn test_bounds_cover_root_vertices() {
        let graph = two_linked_nodes();
        let bounds = graph.bounds().unwrap();

        assert_eq!(bounds.min_x(), 0.0);
        assert_eq!(bounds.max_x(), 320.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert!(DiagramGraph::new().bounds().is_none());
    }

    #[test]
    fn test_requests_deserialize_from_json() {
        let node: NewNode = serde_json::from_str(
            r##"{"id": "n1", "title": "Node", "kind": "RoundedRectangle", "x": 5, "y": 6, "corner_radius": 4, "style": {"fillColor": "#fff"}}"##,
        )
        .unwrap();
        assert_eq!(node.label.as_deref(), Some("Node"));
        assert_eq!(node.kind, ShapeKind::RoundedRectangle);
        assert_eq!(node.params.corner_radius, Some(4.0));

        let edge: NewEdge = serde_json::from_str(r#"{"from": "a", "to": "b", "dashed": true}"#).unwrap();
        assert!(edge.dashed);
        assert!(!edge.reverse);

        let policy: RemovalPolicy = serde_json::from_str(r#""cascade-edges""#).unwrap();
        assert_eq!(policy, RemovalPolicy::CascadeEdges);
    }
}
