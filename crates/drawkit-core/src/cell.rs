//! Cells: the vertices and edges of a diagram.

use crate::{geometry::Geometry, identifier::Id, kind::ShapeKind, style::Style};

/// Container of a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The implicit root container (default parent).
    #[default]
    Root,
    /// Another vertex.
    Cell(Id),
}

/// Vertex-only data.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    kind: Option<ShapeKind>,
    geometry: Geometry,
    parent: Parent,
}

impl Vertex {
    pub fn new(kind: Option<ShapeKind>, geometry: Geometry, parent: Parent) -> Self {
        Self {
            kind,
            geometry,
            parent,
        }
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        self.kind
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }
}

/// Edge-only data. Edges carry no geometry of their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    source: Id,
    target: Id,
}

impl Edge {
    pub fn new(source: Id, target: Id) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellBody {
    Vertex(Vertex),
    Edge(Edge),
}

/// A node or an edge of the diagram graph.
///
/// The style is kept in its flattened form so that a style loaded from a
/// document is written back byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    id: Id,
    label: Option<String>,
    style: String,
    body: CellBody,
}

impl Cell {
    /// Creates a vertex cell.
    pub fn vertex(
        id: Id,
        label: Option<String>,
        style: impl Into<String>,
        vertex: Vertex,
    ) -> Self {
        Self {
            id,
            label,
            style: style.into(),
            body: CellBody::Vertex(vertex),
        }
    }

    /// Creates an edge cell.
    pub fn edge(id: Id, label: Option<String>, style: impl Into<String>, edge: Edge) -> Self {
        Self {
            id,
            label,
            style: style.into(),
            body: CellBody::Edge(edge),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Flattened style string.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Structured view of the style.
    pub fn parsed_style(&self) -> Style {
        Style::parse(&self.style)
    }

    pub fn body(&self) -> &CellBody {
        &self.body
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self.body, CellBody::Vertex(_))
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.body, CellBody::Edge(_))
    }

    pub fn as_vertex(&self) -> Option<&Vertex> {
        match &self.body {
            CellBody::Vertex(vertex) => Some(vertex),
            CellBody::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match &self.body {
            CellBody::Edge(edge) => Some(edge),
            CellBody::Vertex(_) => None,
        }
    }

    /// Geometry of a vertex, `None` for edges.
    pub fn geometry(&self) -> Option<Geometry> {
        self.as_vertex().map(Vertex::geometry)
    }

    /// Container of the cell. Edges always live in the root.
    pub fn parent(&self) -> Parent {
        self.as_vertex().map(Vertex::parent).unwrap_or_default()
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        self.as_vertex().and_then(Vertex::kind)
    }

    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub(crate) fn set_style(&mut self, style: impl Into<String>) {
        self.style = style.into();
    }

    pub(crate) fn vertex_mut(&mut self) -> Option<&mut Vertex> {
        match &mut self.body {
            CellBody::Vertex(vertex) => Some(vertex),
            CellBody::Edge(_) => None,
        }
    }
}

impl Vertex {
    pub(crate) fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = Some(kind);
    }

    pub(crate) fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_accessors() {
        let cell = Cell::vertex(
            Id::new("v"),
            Some("Label".to_string()),
            "ellipse;",
            Vertex::new(
                Some(ShapeKind::Ellipse),
                Geometry::new(1.0, 2.0, 3.0, 4.0),
                Parent::Cell(Id::new("group")),
            ),
        );

        assert!(cell.is_vertex());
        assert_eq!(cell.label(), Some("Label"));
        assert_eq!(cell.kind(), Some(ShapeKind::Ellipse));
        assert_eq!(cell.geometry(), Some(Geometry::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(cell.parent(), Parent::Cell(Id::new("group")));
        assert!(cell.parsed_style().contains_key("ellipse"));
    }

    #[test]
    fn test_edge_has_no_geometry() {
        let cell = Cell::edge(
            Id::new("a-2-b"),
            None,
            "html=1;",
            Edge::new(Id::new("a"), Id::new("b")),
        );

        assert!(cell.is_edge());
        assert_eq!(cell.geometry(), None);
        assert_eq!(cell.parent(), Parent::Root);
        assert_eq!(cell.as_edge().map(Edge::source), Some(Id::new("a")));
        assert_eq!(cell.kind(), None);
    }
}
