//! Diagram serializer: [`DiagramGraph`] to and from mxGraph model XML.
//!
//! Output layout:
//!
//! ```text
//! <mxGraphModel>
//!   <root>
//!     <mxCell id="0"/>
//!     <mxCell id="1" parent="0"/>
//!     <mxCell id="a" value="A" style="..." vertex="1" parent="1">
//!       <mxGeometry x="0" y="0" width="120" height="60" as="geometry"/>
//!     </mxCell>
//!     <mxCell id="a-2-b" style="..." edge="1" parent="1" source="a" target="b">
//!       <mxGeometry relative="1" as="geometry"/>
//!     </mxCell>
//!   </root>
//! </mxGraphModel>
//! ```
//!
//! Cells `0` and `1` are the structural root and default layer; vertices
//! placed in the implicit root container point at `1`. Graph mutations
//! refuse those two ids, so user cells never collide with them.
//!
//! When reading, a cell wrapped in `<UserObject>` or `<object>` (draw.io's
//! form for cells carrying links or custom properties) takes its id and label
//! from the wrapper. The extra wrapper attributes are not kept.

use std::{
    collections::{BTreeMap, HashSet},
    str,
};

use log::{debug, warn};
use quick_xml::{
    Reader, Writer,
    escape::escape,
    events::{BytesEnd, BytesStart, Event},
};

pub use drawkit_core::graph::{DEFAULT_PARENT_ID, MODEL_ROOT_ID};
use drawkit_core::{
    cell::{Cell, CellBody, Edge, Parent, Vertex},
    geometry::Geometry,
    graph::DiagramGraph,
    identifier::Id,
    kind::ShapeKind,
    style::Style,
};

use crate::error::XmlError;

type XmlResult<T> = Result<T, XmlError>;

/// Serializes the graph as indented mxGraph model XML.
///
/// The output is deterministic: cells appear in graph storage order and
/// attributes in a fixed order.
pub fn to_xml(graph: &DiagramGraph) -> XmlResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Start(BytesStart::new("mxGraphModel")))?;
    write(&mut writer, Event::Start(BytesStart::new("root")))?;

    let mut model_root = BytesStart::new("mxCell");
    push_attr(&mut model_root, "id", MODEL_ROOT_ID);
    write(&mut writer, Event::Empty(model_root))?;

    let mut layer = BytesStart::new("mxCell");
    push_attr(&mut layer, "id", DEFAULT_PARENT_ID);
    push_attr(&mut layer, "parent", MODEL_ROOT_ID);
    write(&mut writer, Event::Empty(layer))?;

    for cell in graph.cells() {
        write_cell(&mut writer, cell)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("root")))?;
    write(&mut writer, Event::End(BytesEnd::new("mxGraphModel")))?;

    let xml = String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))?;
    debug!(cells = graph.len(), bytes = xml.len(); "Serialized diagram");
    Ok(xml)
}

fn write_cell(writer: &mut Writer<Vec<u8>>, cell: &Cell) -> XmlResult<()> {
    let id = cell.id().to_string();
    let mut element = BytesStart::new("mxCell");
    push_attr(&mut element, "id", &id);
    if let Some(label) = cell.label() {
        push_attr(&mut element, "value", label);
    }
    push_attr(&mut element, "style", cell.style());

    let mut geometry = BytesStart::new("mxGeometry");
    match cell.body() {
        CellBody::Vertex(vertex) => {
            push_attr(&mut element, "vertex", "1");
            push_attr(&mut element, "parent", &parent_id(vertex.parent()));

            let bounds = vertex.geometry();
            push_attr(&mut geometry, "x", &bounds.x().to_string());
            push_attr(&mut geometry, "y", &bounds.y().to_string());
            push_attr(&mut geometry, "width", &bounds.width().to_string());
            push_attr(&mut geometry, "height", &bounds.height().to_string());
        }
        CellBody::Edge(edge) => {
            push_attr(&mut element, "edge", "1");
            push_attr(&mut element, "parent", DEFAULT_PARENT_ID);
            push_attr(&mut element, "source", &edge.source().to_string());
            push_attr(&mut element, "target", &edge.target().to_string());

            push_attr(&mut geometry, "relative", "1");
        }
    }
    push_attr(&mut geometry, "as", "geometry");

    write(writer, Event::Start(element))?;
    write(writer, Event::Empty(geometry))?;
    write(writer, Event::End(BytesEnd::new("mxCell")))
}

fn parent_id(parent: Parent) -> String {
    match parent {
        Parent::Root => DEFAULT_PARENT_ID.to_string(),
        Parent::Cell(id) => id.to_string(),
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

/// Pushes an attribute escaped the way mxGraph writes it: markup characters
/// as entities and line breaks as character references.
fn push_attr(element: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = escape(value)
        .replace('\n', "&#xa;")
        .replace('\r', "&#xd;")
        .replace('\t', "&#x9;");
    element.push_attribute((key.as_bytes(), escaped.as_bytes()));
}

/// Parses mxGraph model XML into a graph.
///
/// Cells flagged neither `vertex` nor `edge` are structural (model root and
/// layers); vertices whose parent is structural belong to the implicit root.
/// Shape kinds are inferred from the styles since the XML does not record
/// them.
///
/// # Errors
///
/// Empty input, broken markup, a missing `<mxGraphModel>` element and
/// non-numeric geometry attributes are all errors. A well-formed model
/// without cells yields an empty graph.
pub fn from_xml(xml: &str) -> XmlResult<DiagramGraph> {
    if xml.trim().is_empty() {
        return Err(XmlError::Empty);
    }

    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut state = ParseState::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                state.depth += 1;
                state.element(&e, false)?;
            }
            Event::Empty(e) => state.element(&e, true)?,
            Event::End(e) => state.end(&e)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if state.depth != 0 {
        return Err(XmlError::Structure("document ends inside an element".into()));
    }
    if !state.saw_model {
        return Err(XmlError::Structure(
            "no <mxGraphModel> root element found".into(),
        ));
    }

    Ok(build_graph(state.cells))
}

/// A cell as read from the document, before parent resolution.
#[derive(Debug, Default)]
struct RawCell {
    id: String,
    value: Option<String>,
    style: Option<String>,
    vertex: bool,
    edge: bool,
    parent: Option<String>,
    source: Option<String>,
    target: Option<String>,
    geometry: Option<Geometry>,
}

/// Id and label carried by a `<UserObject>`/`<object>` wrapper.
#[derive(Debug)]
struct Wrapper {
    id: String,
    label: Option<String>,
}

#[derive(Debug, Default)]
struct ParseState {
    depth: usize,
    saw_model: bool,
    wrapper: Option<Wrapper>,
    open_cell: Option<RawCell>,
    cells: Vec<RawCell>,
}

impl ParseState {
    fn element(&mut self, e: &BytesStart<'_>, self_closing: bool) -> XmlResult<()> {
        match e.name().as_ref() {
            b"mxGraphModel" => self.saw_model = true,
            b"UserObject" | b"object" => {
                if self.wrapper.is_some() || self.open_cell.is_some() {
                    return Err(XmlError::Structure("nested cell wrapper element".into()));
                }
                let wrapper = parse_wrapper(e)?;
                if self_closing {
                    debug!(id = wrapper.id.as_str(); "Skipping cell wrapper without a cell");
                } else {
                    self.wrapper = Some(wrapper);
                }
            }
            b"mxCell" => {
                if self.open_cell.is_some() {
                    return Err(XmlError::Structure("nested <mxCell> element".into()));
                }
                let cell = parse_cell(e, self.wrapper.as_ref())?;
                if self_closing {
                    self.cells.push(cell);
                } else {
                    self.open_cell = Some(cell);
                }
            }
            b"mxGeometry" => {
                if let Some(cell) = self.open_cell.as_mut() {
                    cell.geometry = Some(parse_geometry(e)?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, e: &BytesEnd<'_>) -> XmlResult<()> {
        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
            XmlError::Structure(format!(
                "unexpected closing tag </{}>",
                String::from_utf8_lossy(e.name().as_ref())
            ))
        })?;
        match e.name().as_ref() {
            b"mxCell" => {
                if let Some(cell) = self.open_cell.take() {
                    self.cells.push(cell);
                }
            }
            b"UserObject" | b"object" => self.wrapper = None,
            _ => {}
        }
        Ok(())
    }
}

fn build_graph(cells: Vec<RawCell>) -> DiagramGraph {
    let structural: HashSet<&str> = cells
        .iter()
        .filter(|cell| !cell.vertex && !cell.edge)
        .map(|cell| cell.id.as_str())
        .collect();

    let mut graph = DiagramGraph::new();
    for raw in &cells {
        let id = Id::new(&raw.id);
        let style = raw.style.clone().unwrap_or_default();

        if raw.vertex {
            let parent = match raw.parent.as_deref() {
                Some(parent) if !structural.contains(parent) => Parent::Cell(Id::new(parent)),
                _ => Parent::Root,
            };
            let kind = ShapeKind::infer(&Style::parse(&style));
            let vertex = Vertex::new(kind, raw.geometry.unwrap_or_default(), parent);
            graph.insert(Cell::vertex(id, raw.value.clone(), style, vertex));
        } else if raw.edge {
            match (raw.source.as_deref(), raw.target.as_deref()) {
                (Some(source), Some(target)) => {
                    let edge = Edge::new(Id::new(source), Id::new(target));
                    graph.insert(Cell::edge(id, raw.value.clone(), style, edge));
                }
                _ => warn!(id = raw.id.as_str(); "Skipping edge without both endpoints"),
            }
        }
    }

    debug!(cells = graph.len(); "Parsed diagram");
    graph
}

fn parse_wrapper(e: &BytesStart<'_>) -> XmlResult<Wrapper> {
    let mut attrs = attrs_to_map(e)?;
    let id = attrs
        .remove("id")
        .ok_or(XmlError::MissingAttr("UserObject@id"))?;
    Ok(Wrapper {
        id,
        label: attrs.remove("label"),
    })
}

/// Reads an `<mxCell>`; a wrapper supplies the id and label when present.
fn parse_cell(e: &BytesStart<'_>, wrapper: Option<&Wrapper>) -> XmlResult<RawCell> {
    let mut attrs = attrs_to_map(e)?;
    let (id, value) = match wrapper {
        Some(wrapper) => (wrapper.id.clone(), wrapper.label.clone()),
        None => {
            let id = attrs
                .remove("id")
                .ok_or(XmlError::MissingAttr("mxCell@id"))?;
            (id, attrs.remove("value"))
        }
    };

    Ok(RawCell {
        id,
        value,
        style: attrs.remove("style"),
        vertex: parse_flag(attrs.get("vertex")),
        edge: parse_flag(attrs.get("edge")),
        parent: attrs.remove("parent"),
        source: attrs.remove("source"),
        target: attrs.remove("target"),
        geometry: None,
    })
}

fn parse_geometry(e: &BytesStart<'_>) -> XmlResult<Geometry> {
    let attrs = attrs_to_map(e)?;
    Ok(Geometry::new(
        parse_number(attrs.get("x"), "x")?,
        parse_number(attrs.get("y"), "y")?,
        parse_number(attrs.get("width"), "width")?,
        parse_number(attrs.get("height"), "height")?,
    ))
}

fn attrs_to_map(e: &BytesStart<'_>) -> XmlResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for a in e.attributes() {
        let a = a?;
        let key = str::from_utf8(a.key.as_ref())?.to_string();
        let val = a.unescape_value()?.to_string();
        out.insert(key, val);
    }
    Ok(out)
}

fn parse_flag(value: Option<&String>) -> bool {
    matches!(value.map(String::as_str), Some("1" | "true"))
}

/// Absent or blank attributes read as zero.
fn parse_number(value: Option<&String>, field: &'static str) -> XmlResult<f64> {
    let Some(raw) = value else { return Ok(0.0) };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(|_| XmlError::InvalidNumber {
        field,
        value: raw.clone(),
    })
}
